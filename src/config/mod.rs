//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ENTITLEMENT_RELAY`
//! prefix and nested values are separated by a double underscore.
//!
//! # Example
//!
//! ```no_run
//! use entitlement_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ENTITLEMENT_RELAY";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection. Optional outside production; without it the
    /// relay keeps entitlements in memory.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Payment configuration (Stripe)
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `ENTITLEMENT_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `ENTITLEMENT_RELAY__SERVER__PORT=3000` -> `server.port = 3000`
    /// - `ENTITLEMENT_RELAY__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or cannot be
    /// parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        match &self.database {
            Some(database) => database.validate()?,
            None if self.is_production() => {
                return Err(ValidationError::MissingRequired("DATABASE__URL"))
            }
            None => {}
        }
        self.payment.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const MINIMAL: &[(&str, &str)] = &[
        ("ENTITLEMENT_RELAY__PAYMENT__STRIPE_API_KEY", "sk_test_xxx"),
        ("ENTITLEMENT_RELAY__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx"),
        ("ENTITLEMENT_RELAY__PAYMENT__SUCCESS_URL", "https://app.example.com/ok"),
        ("ENTITLEMENT_RELAY__PAYMENT__CANCEL_URL", "https://app.example.com/cancel"),
    ];

    const OPTIONAL: &[&str] = &[
        "ENTITLEMENT_RELAY__DATABASE__URL",
        "ENTITLEMENT_RELAY__SERVER__PORT",
        "ENTITLEMENT_RELAY__SERVER__ENVIRONMENT",
    ];

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in MINIMAL.iter().chain(extra) {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        for (key, _) in MINIMAL {
            env::remove_var(key);
        }
        for key in OPTIONAL {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[(
            "ENTITLEMENT_RELAY__DATABASE__URL",
            "postgresql://test@localhost/relay",
        )])
        .unwrap();

        let database = config.database.as_ref().unwrap();
        assert_eq!(database.url, "postgresql://test@localhost/relay");
        assert!(database.run_migrations);
        assert_eq!(config.payment.stripe_api_key, "sk_test_xxx");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.payment.api_base_url, "https://api.stripe.com");
    }

    #[test]
    fn test_custom_server_port() {
        let config = load_with(&[("ENTITLEMENT_RELAY__SERVER__PORT", "8081")]).unwrap();
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_database_optional_outside_production() {
        let config = load_with(&[]).unwrap();
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_database() {
        let config = load_with(&[("ENTITLEMENT_RELAY__SERVER__ENVIRONMENT", "production")])
            .unwrap();

        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE__URL"))
        );
    }

    #[test]
    fn test_missing_payment_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        assert!(AppConfig::load().is_err());
    }
}
