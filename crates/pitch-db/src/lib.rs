pub mod migrations;
pub mod models;
pub mod queries;

pub use queries::{NewProposal, RepoError};

use anyhow::{Context, Result};
use rusqlite::{Connection, Params, Row};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// Where the backing SQLite file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Throwaway store, used for build-only invocations and tests.
    Memory,
    File(PathBuf),
}

/// The single store handle. Opened once at startup and shared by reference;
/// schema migration runs inside `open`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(location: &StoreLocation) -> Result<Self> {
        let mut conn = match location {
            StoreLocation::Memory => Connection::open_in_memory()?,
            StoreLocation::File(path) => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    // create_dir_all treats an existing directory as success
                    std::fs::create_dir_all(dir).with_context(|| {
                        format!("cannot create store directory {}", dir.display())
                    })?;
                }
                let conn = Connection::open(path)
                    .with_context(|| format!("cannot open store at {}", path.display()))?;

                // WAL mode for concurrent reads
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn
            }
        };

        migrations::run(&mut conn)?;

        match location {
            StoreLocation::Memory => info!("Database opened in memory"),
            StoreLocation::File(path) => info!("Database opened at {}", path.display()),
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(&StoreLocation::Memory)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&mut conn)
    }

    /// Fetch at most one row.
    pub fn get<T, P, F>(&self, sql: &str, params: P, decode: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_conn(|conn| conn.query_row(sql, params, decode).optional())
    }

    /// Fetch every matching row, in query order.
    pub fn list<T, P, F>(&self, sql: &str, params: P, decode: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params, decode)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Execute a mutation and return the number of rows it changed.
    pub fn run<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute(sql, params)?))
    }
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("data").join("proposals.db");

        let db = Database::open(&StoreLocation::File(path.clone())).unwrap();
        assert!(path.exists());
        drop(db);

        // Directory and file already exist: still fine
        Database::open(&StoreLocation::File(path)).unwrap();
    }

    #[test]
    fn open_fails_when_directory_cannot_be_created() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let result = Database::open(&StoreLocation::File(blocker.join("proposals.db")));
        assert!(result.is_err());
    }

    #[test]
    fn primitives_get_list_run() {
        let db = Database::open_in_memory().unwrap();

        let changed = db
            .run(
                "INSERT INTO proposals (id, title, createdAt) VALUES (?1, ?2, ?3)",
                ("abc12345", "T", "2024-01-01T00:00:00.000Z"),
            )
            .unwrap();
        assert_eq!(changed, 1);

        let title: Option<String> = db
            .get("SELECT title FROM proposals WHERE id = ?1", ["abc12345"], |r| r.get(0))
            .unwrap();
        assert_eq!(title.as_deref(), Some("T"));

        let missing: Option<String> = db
            .get("SELECT title FROM proposals WHERE id = ?1", ["nope"], |r| r.get(0))
            .unwrap();
        assert!(missing.is_none());

        let ids: Vec<String> = db.list("SELECT id FROM proposals", [], |r| r.get(0)).unwrap();
        assert_eq!(ids, vec!["abc12345".to_string()]);

        assert_eq!(db.run("DELETE FROM proposals WHERE id = ?1", ["nope"]).unwrap(), 0);
    }

    #[test]
    fn query_errors_surface() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<Option<String>> =
            db.get("SELECT nope FROM missing_table", [], |r| r.get(0));
        assert!(result.is_err());
    }
}
