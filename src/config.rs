use std::env;
use std::time::Duration;

use crate::error::AdminError;

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "travelling_db";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings shared by every admin binary.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminConfig {
    pub mongo_uri: String,
    pub database: String,
    pub timeout: Duration,
}

impl AdminConfig {
    /// Reads `MONGODB_URI`, `MONGODB_DATABASE` and `MONGODB_TIMEOUT_SECS`.
    /// A `.env` file is honoured in debug builds.
    pub fn from_env() -> Result<Self, AdminError> {
        if cfg!(debug_assertions) {
            dotenv::dotenv().ok();
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdminError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongo_uri = lookup("MONGODB_URI")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string());

        let database = lookup("MONGODB_DATABASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let timeout_secs = match lookup("MONGODB_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AdminError::Config(format!("MONGODB_TIMEOUT_SECS must be a whole number, got '{}'", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = AdminConfig {
            mongo_uri,
            database,
            timeout: Duration::from_secs(timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_database(mut self, database: Option<String>) -> Result<Self, AdminError> {
        if let Some(name) = database {
            self.database = name;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), AdminError> {
        // MongoDB rejects these characters in database names
        if self.database.is_empty()
            || self
                .database
                .chars()
                .any(|c| matches!(c, '/' | '\\' | '.' | ' ' | '"' | '$' | '\0'))
        {
            return Err(AdminError::Config(format!(
                "'{}' is not a valid database name",
                self.database
            )));
        }
        if self.timeout.is_zero() {
            return Err(AdminError::Config(
                "MONGODB_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
