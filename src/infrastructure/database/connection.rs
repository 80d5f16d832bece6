use crate::shared::error::AppError;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub type DbPool = Pool<Sqlite>;

/// Embedded schema migrations, applied on every startup.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (creating if necessary) the database at `url` and bring the
    /// schema up to date.
    pub async fn initialize(url: &str, max_connections: u32) -> Result<Self, AppError> {
        if let Some(path) = url.strip_prefix("sqlite://") {
            ensure_parent_dir(path)?;
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|err| AppError::Configuration(format!("invalid database url: {err}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;
        info!("database ready at {}", url);

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn ensure_parent_dir(path: &str) -> Result<(), AppError> {
    if path.starts_with(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| {
                AppError::Configuration(format!(
                    "cannot create database directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}
