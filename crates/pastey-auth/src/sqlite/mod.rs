//! SQLite persistence backend
//!
//! One connection serves both [`IdentityStore`](crate::IdentityStore) and
//! [`PasteStore`](crate::PasteStore).

mod identity;
mod paste;
mod schema;

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::{AuthError, AuthResult};

pub use schema::{SCHEMA_VERSION, check_version, init_schema};

/// SQLite-backed identity, paste and grant store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path
    ///
    /// Fails with `InvalidConfig` if the file was written by a newer schema.
    pub fn open(path: &str) -> AuthResult<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;

        let version = check_version(&conn)?;
        if version > SCHEMA_VERSION {
            return Err(AuthError::InvalidConfig(format!(
                "database schema {version} is newer than supported {SCHEMA_VERSION}"
            )));
        }
        tracing::info!(path, version, "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> AuthResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> AuthResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AuthError::LookupFailed("sqlite connection lock poisoned".into()))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn corrupt(what: &str, value: &str) -> AuthError {
    AuthError::LookupFailed(format!("corrupt {what} in database: {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pastey.db");
        let path = path.to_str().unwrap();

        drop(SqliteStore::open(path).unwrap());

        let conn = Connection::open(path).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [SCHEMA_VERSION + 1],
        )
        .unwrap();
        drop(conn);

        assert!(matches!(
            SqliteStore::open(path),
            Err(AuthError::InvalidConfig(_))
        ));
    }
}
