//! SQLite schema definitions

use crate::error::AuthResult;
use rusqlite::Connection;

pub const SCHEMA_VERSION: u32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> AuthResult<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        -- Registered users
        CREATE TABLE IF NOT EXISTS identities (
            id TEXT PRIMARY KEY,                   -- UUID
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,           -- PHC string
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Paste metadata (content lives in blob storage)
        CREATE TABLE IF NOT EXISTS pastes (
            id TEXT PRIMARY KEY,                   -- base58 key
            title TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            visibility INTEGER NOT NULL CHECK (visibility IN (0, 1)),  -- 0 public, 1 private
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_pastes_owner
            ON pastes(owner_id);

        -- Read grants
        CREATE TABLE IF NOT EXISTS grants (
            id TEXT PRIMARY KEY,                   -- UUID
            paste_id TEXT NOT NULL,
            identity_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(paste_id, identity_id)
        );

        CREATE INDEX IF NOT EXISTS idx_grants_paste
            ON grants(paste_id);
        CREATE INDEX IF NOT EXISTS idx_grants_identity
            ON grants(identity_id);
    "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_version (version) VALUES (?)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Check schema version
pub fn check_version(conn: &Connection) -> AuthResult<u32> {
    let version: u32 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<u32>>(0)
        })?
        .unwrap_or(0);
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let version = check_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_init_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(check_version(&conn).unwrap(), SCHEMA_VERSION);
    }
}
