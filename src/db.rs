use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

/// Schema files applied in order on every open. Statements are idempotent,
/// so re-applying against an existing database is a no-op.
static SCHEMA: &[(&str, &str)] = &[(
    "0001_trips.sql",
    include_str!("../migrations/0001_trips.sql"),
)];

/// Opens (creating if missing) the trip database at `db_path` and brings
/// the schema up to date. Called once at startup; the returned pool is
/// handed down to everything that reads or writes.
pub async fn open_pool(db_path: &Path) -> AnyResult<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            tracing::error!(
                target: "triplog",
                event = "data_dir_create_failed",
                path = %parent.display(),
                error = %e
            );
            e
        })?;
    }

    let opts = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .after_connect(|conn, _| {
            Box::pin(async move {
                sqlx::query("PRAGMA busy_timeout = 5000;")
                    .execute(&mut *conn)
                    .await?;
                Ok::<_, sqlx::Error>(())
            })
        })
        .connect_with(opts)
        .await
        .with_context(|| format!("open trip database at {}", db_path.display()))?;

    apply_schema(&pool).await?;
    log_effective_pragmas(&pool).await;

    Ok(pool)
}

/// In-memory variant for tests and scratch sessions. Uses a single
/// connection: each sqlite `:memory:` connection is its own database.
pub async fn open_memory_pool() -> AnyResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("open in-memory trip database")?;
    sqlx::query("PRAGMA foreign_keys=ON;").execute(&pool).await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

pub async fn apply_schema(pool: &SqlitePool) -> AnyResult<()> {
    for (file, raw_sql) in SCHEMA {
        let cleaned = raw_sql
            .lines()
            .filter(|line| {
                let t = line.trim_start();
                !(t.is_empty() || t.starts_with("--"))
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut tx = pool.begin().await?;
        for stmt in cleaned.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            if let Err(e) = sqlx::query(s).execute(&mut *tx).await {
                tracing::error!(
                    target: "triplog",
                    event = "schema_stmt_error",
                    file = %file,
                    error = %e
                );
                return Err(e.into());
            }
        }
        tx.commit().await?;
        tracing::debug!(target: "triplog", event = "schema_applied", file = %file);
    }
    Ok(())
}

/// Directory holding the database and settings files. `TRIPLOG_DATA_DIR`
/// overrides the platform default, which tests and portable installs use.
pub fn data_dir() -> AnyResult<PathBuf> {
    if let Ok(dir) = std::env::var("TRIPLOG_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir().unwrap_or(std::env::current_dir()?);
    Ok(base.join("triplog"))
}

pub fn default_db_path() -> AnyResult<PathBuf> {
    Ok(data_dir()?.join("triplog.sqlite3"))
}

async fn log_effective_pragmas(pool: &SqlitePool) {
    use tracing::{info, warn};

    let (sqlite_ver,): (String,) = sqlx::query_as("select sqlite_version()")
        .fetch_one(pool)
        .await
        .unwrap_or((String::from("unknown"),));

    let jm: (String,) = sqlx::query_as("PRAGMA journal_mode;")
        .fetch_one(pool)
        .await
        .unwrap_or((String::from("unknown"),));

    let sync: (i64,) = sqlx::query_as("PRAGMA synchronous;")
        .fetch_one(pool)
        .await
        .unwrap_or((i64::MIN,));

    info!(
        target: "triplog",
        event = "db_open",
        sqlite_version = %sqlite_ver,
        journal_mode = %jm.0,
        synchronous = %sync.0
    );

    if !jm.0.eq_ignore_ascii_case("wal") {
        warn!(
            target: "triplog",
            event = "db_open_warning",
            msg = "journal_mode != WAL; running with reduced crash safety"
        );
    }
}
