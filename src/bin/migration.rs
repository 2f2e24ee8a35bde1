use mes_api::migrator::Migrator;
use sea_orm::{ConnectOptions, Database, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{error, info};

/// Usage: `migration [up|down|status|fresh]` (default `up`).
/// Reads `DATABASE_URL`, falling back to `APP__DATABASE_URL`.
#[tokio::main]
async fn main() -> Result<(), DbErr> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("APP__DATABASE_URL"))
        .map_err(|_| DbErr::Custom("DATABASE_URL is not set".to_string()))?;

    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(2)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(options).await?;

    match command.as_str() {
        "up" => Migrator::up(&db, None).await?,
        "down" => Migrator::down(&db, Some(1)).await?,
        "status" => Migrator::status(&db).await?,
        "fresh" => Migrator::fresh(&db).await?,
        other => {
            error!(command = other, "unknown migration command");
            return Err(DbErr::Custom(format!(
                "unknown command '{other}', expected up, down, status or fresh"
            )));
        }
    }

    info!(command = %command, "migration finished");
    Ok(())
}
