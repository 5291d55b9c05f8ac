//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use doc_chat_core::{Credentials, SessionProfile};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which of the two front ends this process serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionVariant {
    Admin,
    User,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub variant: SessionVariant,
    pub admin_credentials: Credentials,
    pub reply_latency: Duration,
    pub simulated_page_ceiling: u32,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:5173");
        let max_upload_bytes = parse_number("MAX_UPLOAD_BYTES", &var_or("MAX_UPLOAD_BYTES", "10485760"))?;

        // --- Session Settings ---
        let variant = match var_or("SESSION_VARIANT", "admin").to_lowercase().as_str() {
            "admin" => SessionVariant::Admin,
            "user" => SessionVariant::User,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SESSION_VARIANT".to_string(),
                    format!("'{}' is neither 'admin' nor 'user'", other),
                ))
            }
        };

        let admin_credentials = Credentials::new(
            var_or("ADMIN_USERNAME", "admin"),
            var_or("ADMIN_PASSWORD", "admin123"),
        );
        if variant == SessionVariant::Admin
            && (admin_credentials.username.is_empty() || admin_credentials.password.is_empty())
        {
            return Err(ConfigError::MissingVar("ADMIN_USERNAME/ADMIN_PASSWORD".to_string()));
        }

        // --- Simulation Settings ---
        let reply_latency = Duration::from_millis(parse_number(
            "REPLY_LATENCY_MS",
            &var_or("REPLY_LATENCY_MS", "1000"),
        )?);
        let simulated_page_ceiling: u32 = parse_number(
            "SIMULATED_PAGE_CEILING",
            &var_or("SIMULATED_PAGE_CEILING", "600"),
        )?;
        if simulated_page_ceiling == 0 {
            return Err(ConfigError::InvalidValue(
                "SIMULATED_PAGE_CEILING".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            variant,
            admin_credentials,
            reply_latency,
            simulated_page_ceiling,
            cors_origin,
            max_upload_bytes,
        })
    }

    /// The session profile matching the configured variant.
    pub fn session_profile(&self) -> SessionProfile {
        match self.variant {
            SessionVariant::Admin => SessionProfile::admin(self.admin_credentials.clone()),
            SessionVariant::User => SessionProfile::user(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_describe_the_admin_dashboard() {
        let config = load(&[]).unwrap();
        assert_eq!(config.variant, SessionVariant::Admin);
        assert_eq!(config.admin_credentials, Credentials::new("admin", "admin123"));
        assert_eq!(config.reply_latency, Duration::from_millis(1000));
        assert_eq!(config.simulated_page_ceiling, 600);
        assert_eq!(config.bind_address.port(), 3000);
        assert!(config.session_profile().can_manage_catalog);
    }

    #[test]
    fn user_variant_is_read_only() {
        let config = load(&[("SESSION_VARIANT", "User")]).unwrap();
        assert_eq!(config.variant, SessionVariant::User);
        assert!(!config.session_profile().can_manage_catalog);
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = load(&[("SESSION_VARIANT", "guest")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "SESSION_VARIANT"));

        let err = load(&[("REPLY_LATENCY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "REPLY_LATENCY_MS"));

        let err = load(&[("BIND_ADDRESS", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "BIND_ADDRESS"));
    }

    #[test]
    fn admin_variant_needs_a_password() {
        let err = load(&[("ADMIN_PASSWORD", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
        assert!(load(&[("ADMIN_PASSWORD", ""), ("SESSION_VARIANT", "user")]).is_ok());
    }
}
