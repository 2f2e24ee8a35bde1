use crate::config::AppConfig;
use metrics::{counter, gauge};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
    /// Log every statement through sqlx
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
            sqlx_logging: false,
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            sqlx_logging: cfg.is_development(),
            ..Default::default()
        }
    }
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns the underlying `DbErr` if the pool cannot be created
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, DbErr> {
    debug!(max = config.max_connections, "configuring database pool");

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(config.sqlx_logging);

    gauge!("mes_db.max_connections", config.max_connections as f64);

    let pool = Database::connect(opt).await.map_err(|e| {
        error!(error = %e, "database connection failed");
        counter!("mes_db.connection_failures", 1);
        e
    })?;

    info!(
        max_connections = config.max_connections,
        "database connection pool established"
    );
    Ok(pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, DbErr> {
    establish_connection_with_config(&DbConfig::from(cfg)).await
}

/// Applies every pending migration
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = crate::migrator::Migrator::up(pool, None).await;

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!("Database migrations completed in {:?}", elapsed),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }
    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<Duration, DbErr> {
    let start = std::time::Instant::now();
    pool.ping().await.map_err(|e| {
        error!(error = %e, "database ping failed");
        counter!("mes_db.connection_failures", 1);
        e
    })?;
    let elapsed = start.elapsed();
    gauge!("mes_db.connection_latency_ms", elapsed.as_millis() as f64);
    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_config_follows_app_config() {
        let mut app = AppConfig::new(
            "sqlite::memory:".into(),
            "0123456789abcdef0123456789abcdef".into(),
            "test".into(),
        );
        app.db_max_connections = 3;
        let cfg = DbConfig::from(&app);
        assert_eq!(cfg.url, "sqlite::memory:");
        assert_eq!(cfg.max_connections, 3);
        assert!(!cfg.sqlx_logging);
    }

    #[tokio::test]
    async fn migrations_apply_to_fresh_sqlite() {
        let pool = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();
        assert!(check_connection(&pool).await.is_ok());
    }
}
