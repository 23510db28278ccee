//! Connection pool setup and embedded migrations.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::DomainError;

/// Opens a pool and verifies one connection can be acquired.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::database(format!("Failed to connect: {}", e)))
}

/// Applies the migrations embedded from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database(format!("Migration failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[tokio::test]
    async fn unparseable_url_is_database_error() {
        let config = DatabaseConfig {
            url: "postgresql://user@[not-a-host/relay".to_string(),
            ..Default::default()
        };

        let err = connect_pool(&config).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message().starts_with("Failed to connect"));
    }
}
