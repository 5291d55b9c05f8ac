//! crates/doc_chat_core/src/catalog.rs
//!
//! The in-memory document catalog and the current selection into it.

use crate::domain::{DocumentId, DocumentRecord, DocumentUpload, MAX_PAGE_COUNT};
use crate::error::{SessionError, SessionResult, ValidationReason};
use crate::ports::PageCounter;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct CatalogModel {
    records: Vec<DocumentRecord>,
    selection: Option<DocumentId>,
    last_issued_id: i64,
}

impl CatalogModel {
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        Self {
            records,
            selection: None,
            last_issued_id: 0,
        }
    }

    /// The catalog an admin starts with.
    pub fn admin_sample() -> Self {
        Self::new(vec![
            sample_record("1", "Company Policy.pdf", 120, (2023, 5, 15)),
            sample_record("2", "Employee Handbook.pdf", 85, (2023, 6, 20)),
        ])
    }

    /// The fixed catalog of the user app. It carries no page data of its
    /// own, so every entry reports zero pages.
    pub fn user_sample() -> Self {
        Self::new(
            [
                ("1", "Company Policy 2023"),
                ("2", "Employee Handbook"),
                ("3", "Technical Documentation"),
                ("4", "Project Requirements"),
            ]
            .into_iter()
            .map(|(id, name)| sample_record(id, name, 0, (2023, 1, 1)))
            .collect(),
        )
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn get(&self, id: &DocumentId) -> Option<&DocumentRecord> {
        self.records.iter().find(|doc| &doc.id == id)
    }

    pub fn selection(&self) -> Option<&DocumentId> {
        self.selection.as_ref()
    }

    pub fn selected(&self) -> Option<&DocumentRecord> {
        self.selection.as_ref().and_then(|id| self.get(id))
    }

    /// Validates the upload, asks `pages` for its length and appends it.
    ///
    /// `display_name` overrides the upload's file name when given.
    pub fn create(
        &mut self,
        upload: &DocumentUpload,
        display_name: Option<&str>,
        pages: &dyn PageCounter,
        now: DateTime<Utc>,
    ) -> SessionResult<DocumentRecord> {
        let name = display_name.unwrap_or(&upload.file_name).trim();
        if name.is_empty() {
            return Err(ValidationReason::EmptyName.into());
        }
        if !upload.kind.is_document() {
            warn!("Rejected upload '{}' of kind {:?}.", upload.file_name, upload.kind);
            return Err(ValidationReason::UnsupportedType.into());
        }

        let page_count = pages.count_pages(upload)?;
        if page_count > MAX_PAGE_COUNT {
            warn!("Rejected upload '{}' with {} pages.", name, page_count);
            return Err(ValidationReason::PageLimitExceeded { pages: page_count }.into());
        }

        let record = DocumentRecord {
            id: self.next_id(now),
            name: name.to_string(),
            page_count,
            upload_date: now.date_naive(),
        };
        self.records.push(record.clone());
        info!("Added document {} ('{}', {} pages).", record.id, record.name, page_count);
        Ok(record)
    }

    /// Renames a record in place; nothing else about it changes.
    pub fn rename(&mut self, id: &DocumentId, new_name: &str) -> SessionResult<DocumentRecord> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ValidationReason::EmptyName.into());
        }
        let record = self
            .records
            .iter_mut()
            .find(|doc| &doc.id == id)
            .ok_or_else(|| SessionError::NotFound { id: id.clone() })?;
        record.name = new_name.to_string();
        info!("Renamed document {} to '{}'.", id, new_name);
        Ok(record.clone())
    }

    /// Removes a record, dropping the selection if it pointed there.
    pub fn remove(&mut self, id: &DocumentId) -> SessionResult<DocumentRecord> {
        let index = self
            .records
            .iter()
            .position(|doc| &doc.id == id)
            .ok_or_else(|| SessionError::NotFound { id: id.clone() })?;
        let removed = self.records.remove(index);
        if self.selection.as_ref() == Some(id) {
            self.selection = None;
        }
        info!("Deleted document {}.", id);
        Ok(removed)
    }

    pub fn select(&mut self, id: &DocumentId) -> SessionResult<DocumentRecord> {
        let record = self
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound { id: id.clone() })?;
        self.selection = Some(id.clone());
        Ok(record)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Millisecond timestamp of `now`, bumped past every id handed out so far.
    fn next_id(&mut self, now: DateTime<Utc>) -> DocumentId {
        let mut candidate = now.timestamp_millis().max(self.last_issued_id + 1);
        while self.records.iter().any(|doc| doc.id.as_str() == candidate.to_string()) {
            candidate += 1;
        }
        self.last_issued_id = candidate;
        DocumentId::new(candidate.to_string())
    }
}

fn sample_record(id: &str, name: &str, page_count: u32, (y, m, d): (i32, u32, u32)) -> DocumentRecord {
    DocumentRecord {
        id: DocumentId::from(id),
        name: name.to_string(),
        page_count,
        upload_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
    }
}
