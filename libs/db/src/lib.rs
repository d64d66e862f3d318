//! Database abstraction crate providing a backend-agnostic `DbHandle` over SeaORM.
//!
//! Supports SQLite (file or in-memory) and PostgreSQL DSNs.
//!
//! # Example
//! ```rust,no_run
//! # async fn demo() -> db::Result<()> {
//! use db::{ConnectOpts, DbHandle};
//!
//! let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//! let conn = db.sea();
//! # let _ = conn;
//! db.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;

use std::path::{Path, PathBuf};
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Invalid SQLite DSN: {0}")]
    InvalidSqliteDsn(String),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Connection options; each knob maps onto the SeaORM/sqlx pool setting of the same name.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime for a connection.
    pub max_lifetime: Option<Duration>,
    /// Emit every SQL statement through sqlx's own logger.
    pub sqlx_logging: bool,
    /// SQLite: how long a writer waits on a locked database.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            sqlx_logging: false,
            sqlite_busy_timeout: Some(Duration::from_millis(5_000)),
            create_sqlite_dirs: true,
        }
    }
}

/// Main handle: the engine plus a cheaply cloneable SeaORM connection.
#[derive(Clone, Debug)]
pub struct DbHandle {
    engine: DbEngine,
    conn: DatabaseConnection,
    dsn: String,
}

impl DbHandle {
    /// Detect engine by DSN.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        let dsn = dsn.trim().to_string();

        let mut o = ConnectOptions::new(dsn.clone());
        if engine == DbEngine::Sqlite && is_memory_dsn(&dsn) {
            // Every pooled connection would otherwise open its own empty database.
            o.max_connections(1).min_connections(1);
        } else {
            if let Some(n) = opts.max_conns {
                o.max_connections(n);
            }
            if let Some(n) = opts.min_conns {
                o.min_connections(n);
            }
            if let Some(t) = opts.idle_timeout {
                o.idle_timeout(t);
            }
            if let Some(t) = opts.max_lifetime {
                o.max_lifetime(t);
            }
        }
        if let Some(t) = opts.acquire_timeout {
            o.acquire_timeout(t);
        }
        o.sqlx_logging(opts.sqlx_logging);
        if let (DbEngine::Sqlite, Some(busy)) = (engine, opts.sqlite_busy_timeout) {
            o.map_sqlx_sqlite_opts(move |sqlite| sqlite.busy_timeout(busy));
        }

        if engine == DbEngine::Sqlite && opts.create_sqlite_dirs {
            if let Some(parent) = sqlite_file_path(&dsn).and_then(|p| p.parent().map(Path::to_path_buf)) {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(&parent)?;
                }
            }
        }

        tracing::debug!(engine = ?engine, "opening database connection pool");
        let conn = Database::connect(o).await?;
        Ok(Self { engine, conn, dsn })
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// SeaORM connection (cheap cloneable handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.conn.clone()
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

/// True for the in-memory SQLite DSN spellings.
pub fn is_memory_dsn(dsn: &str) -> bool {
    let d = dsn.trim();
    d.eq_ignore_ascii_case("sqlite::memory:")
        || d.eq_ignore_ascii_case("sqlite://:memory:")
        || d.contains("mode=memory")
}

fn sqlite_file_path(dsn: &str) -> Option<PathBuf> {
    if is_memory_dsn(dsn) {
        return None;
    }
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    let path = rest.split_once('?').map_or(rest, |(p, _)| p);
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
/// - Adds `mode=rwc` when no query is given so the file gets created.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_memory_dsn(dsn) {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| DbError::InvalidSqliteDsn(format!("must start with sqlite:// (got: {dsn})")))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(DbError::InvalidSqliteDsn("empty SQLite path".to_string()));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_engines() {
        assert_eq!(
            DbHandle::detect("postgres://u:p@localhost/app").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(
            DbHandle::detect("postgresql://localhost/app").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(DbHandle::detect("sqlite::memory:").unwrap(), DbEngine::Sqlite);
        assert_eq!(
            DbHandle::detect("  sqlite://data/app.db").unwrap(),
            DbEngine::Sqlite
        );
        assert!(matches!(
            DbHandle::detect("mysql://localhost/app"),
            Err(DbError::UnknownDsn(_))
        ));
    }

    #[test]
    fn memory_dsn_spellings() {
        assert!(is_memory_dsn("sqlite::memory:"));
        assert!(is_memory_dsn("SQLITE://:memory:"));
        assert!(is_memory_dsn("sqlite://file:test?mode=memory&cache=shared"));
        assert!(!is_memory_dsn("sqlite://data/app.db"));
    }

    #[test]
    fn sqlite_file_path_strips_scheme_and_query() {
        assert_eq!(
            sqlite_file_path("sqlite:///tmp/x/app.db?mode=rwc"),
            Some(PathBuf::from("/tmp/x/app.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
    }

    #[test]
    fn absolutize_relative_sqlite_dsn() {
        let tmp = tempfile::tempdir().unwrap();
        let out = absolutize_sqlite_dsn("sqlite://db/app.db", tmp.path(), true).unwrap();
        assert!(out.starts_with("sqlite://"));
        assert!(out.ends_with("db/app.db?mode=rwc"));
        assert!(tmp.path().join("db").exists());
    }

    #[test]
    fn absolutize_keeps_query_and_memory() {
        let tmp = tempfile::tempdir().unwrap();
        let out =
            absolutize_sqlite_dsn("sqlite://app.db?mode=ro", tmp.path(), false).unwrap();
        assert!(out.ends_with("app.db?mode=ro"));
        assert_eq!(
            absolutize_sqlite_dsn("sqlite://:memory:", tmp.path(), false).unwrap(),
            "sqlite::memory:"
        );
        assert!(absolutize_sqlite_dsn("postgres://x", tmp.path(), false).is_err());
    }
}
