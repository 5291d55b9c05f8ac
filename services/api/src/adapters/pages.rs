//! services/api/src/adapters/pages.rs
//!
//! Page counting without a PDF library: a random count stands in for real
//! document inspection.

use doc_chat_core::{DocumentUpload, PageCounter, PortResult};
use rand::Rng;

/// Draws a page count uniformly from `1..=ceiling`.
///
/// With the default ceiling of 600, roughly one upload in six lands above
/// the catalog's page limit and is rejected.
#[derive(Clone, Debug)]
pub struct RandomPageCounter {
    ceiling: u32,
}

impl RandomPageCounter {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling: ceiling.max(1),
        }
    }
}

impl PageCounter for RandomPageCounter {
    fn count_pages(&self, _upload: &DocumentUpload) -> PortResult<u32> {
        Ok(rand::thread_rng().gen_range(1..=self.ceiling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_chat_core::FileKind;

    #[test]
    fn counts_stay_within_the_ceiling() {
        let counter = RandomPageCounter::new(3);
        let upload = DocumentUpload::new("a.pdf", FileKind::Pdf, &b"%PDF"[..]);
        for _ in 0..200 {
            let pages = counter.count_pages(&upload).unwrap();
            assert!((1..=3).contains(&pages));
        }
    }

    #[test]
    fn zero_ceiling_is_clamped() {
        let counter = RandomPageCounter::new(0);
        let upload = DocumentUpload::new("a.pdf", FileKind::Pdf, &b""[..]);
        assert_eq!(counter.count_pages(&upload).unwrap(), 1);
    }
}
