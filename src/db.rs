use anyhow::{Context, bail};
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use std::time::Duration;
use tracing::info;

/// The relational backends the service knows how to create tables for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Determines the backend from a connection string's scheme
    pub fn from_url(db_url: &str) -> Result<Self, anyhow::Error> {
        let Some((scheme, _)) = db_url.split_once(':') else {
            bail!("database URL has no scheme");
        };

        match scheme {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("unsupported database scheme \"{other}\""),
        }
    }

    fn schema(self) -> &'static [&'static str] {
        match self {
            Self::Postgres => &[
                "CREATE TABLE IF NOT EXISTS todo_user (
                    id BIGSERIAL PRIMARY KEY,
                    username VARCHAR(80) NOT NULL UNIQUE
                )",
                "CREATE TABLE IF NOT EXISTS todo_item (
                    id BIGSERIAL PRIMARY KEY,
                    label VARCHAR(255) NOT NULL,
                    done BOOLEAN NOT NULL,
                    user_id BIGINT NOT NULL REFERENCES todo_user(id)
                )",
            ],
            Self::Sqlite => &[
                "CREATE TABLE IF NOT EXISTS todo_user (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username VARCHAR(80) NOT NULL UNIQUE
                )",
                "CREATE TABLE IF NOT EXISTS todo_item (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    label VARCHAR(255) NOT NULL,
                    done BOOLEAN NOT NULL,
                    user_id INTEGER NOT NULL REFERENCES todo_user(id)
                )",
            ],
        }
    }
}

/// Connects to the database at the given URL. Works for any backend listed in [Backend].
pub async fn connect_sqlx(db_url: &str) -> Result<AnyPool, anyhow::Error> {
    sqlx::any::install_default_drivers();

    let max_connections = match Backend::from_url(db_url)? {
        Backend::Postgres => 20,
        // Each in-memory sqlite connection is its own database
        Backend::Sqlite if db_url.contains(":memory:") => 1,
        Backend::Sqlite => 5,
    };

    AnyPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(db_url)
        .await
        .context("connecting to the database")
}

/// Creates the user and todo tables if they aren't already there
pub async fn ensure_schema(pool: &AnyPool, backend: Backend) -> Result<(), anyhow::Error> {
    for statement in backend.schema() {
        sqlx::query(*statement)
            .execute(pool)
            .await
            .context("creating database tables")?;
    }
    info!(?backend, "Database schema ready");

    Ok(())
}
