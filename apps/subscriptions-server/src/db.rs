use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use runtime::DatabaseConfig;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use url::Url;

const MEMORY_DSN: &str = "sqlite::memory:";
const DEFAULT_MAX_CONNS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

/// Detect DB backend from URL scheme.
pub fn detect_from_dsn(dsn: &str) -> Result<Backend> {
    let raw = dsn.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
        "postgres" | "postgresql" => Ok(Backend::Postgres),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// DSN safe for logs: any password in the userinfo is masked.
pub fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_err() {
                return "<unprintable dsn>".to_string();
            }
            url.to_string()
        }
        Ok(_) => dsn.to_string(),
        Err(_) => "<unparseable dsn>".to_string(),
    }
}

fn is_memory_dsn(dsn: &str) -> bool {
    dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:")
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_memory_dsn(dsn) {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create database dir {}", dir.display()))?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// The DSN the process will actually use; `--mock` forces in-memory SQLite.
pub fn effective_dsn(cfg: &DatabaseConfig, base_dir: &Path, mock: bool) -> Result<String> {
    if mock {
        return Ok(MEMORY_DSN.to_string());
    }
    let dsn = cfg.url.trim();
    match detect_from_dsn(dsn)? {
        Backend::Sqlite => absolutize_sqlite_dsn(dsn, base_dir, true),
        Backend::Postgres => Ok(dsn.to_string()),
    }
}

/// Open a pooled SeaORM connection for `dsn`.
pub async fn connect(dsn: &str, cfg: Option<&DatabaseConfig>) -> Result<DatabaseConnection> {
    let max_conns = cfg.and_then(|c| c.max_conns).unwrap_or(DEFAULT_MAX_CONNS);

    match detect_from_dsn(dsn)? {
        Backend::Sqlite => {
            let mut opts = SqliteConnectOptions::from_str(dsn)
                .with_context(|| format!("Invalid SQLite DSN '{dsn}'"))?
                .create_if_missing(true);
            if let Some(ms) = cfg.and_then(|c| c.busy_timeout_ms) {
                opts = opts.busy_timeout(Duration::from_millis(u64::from(ms)));
            }

            let pool = if is_memory_dsn(dsn) {
                // every connection to :memory: is its own database; keep exactly one alive
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(opts)
                    .await
            } else {
                SqlitePoolOptions::new()
                    .max_connections(max_conns)
                    .acquire_timeout(ACQUIRE_TIMEOUT)
                    .connect_with(opts.journal_mode(SqliteJournalMode::Wal))
                    .await
            }
            .context("Failed to open SQLite pool")?;

            Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
        }
        Backend::Postgres => {
            let mut opts = ConnectOptions::new(dsn.to_owned());
            opts.max_connections(max_conns)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .sqlx_logging(false);
            Database::connect(opts)
                .await
                .context("Failed to connect to Postgres")
        }
    }
}
