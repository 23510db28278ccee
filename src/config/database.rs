//! Database configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Minimum connections to maintain
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum connections allowed
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Delay between connection attempts at startup, in seconds
    #[serde(default = "default_connect_retry")]
    pub connect_retry_secs: u64,

    /// Apply embedded migrations before opening the readiness gate
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn connect_retry(&self) -> Duration {
        Duration::from_secs(self.connect_retry_secs.max(1))
    }

    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > 100 {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            connect_retry_secs: default_connect_retry(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_connect_retry() -> u64 {
    5
}

fn default_run_migrations() -> bool {
    true
}
