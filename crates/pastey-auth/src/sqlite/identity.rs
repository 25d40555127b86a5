//! SQLite identity store

use async_trait::async_trait;
use rusqlite::OptionalExtension;

use super::{SqliteStore, corrupt, is_unique_violation};
use crate::error::{AuthError, AuthResult};
use crate::identity::{Identity, IdentityId};
use crate::store::IdentityStore;

type IdentityRow = (String, String, String, i64, i64);

const SELECT_IDENTITY: &str =
    "SELECT id, email, password_hash, created_at, updated_at FROM identities";

fn identity_from_row(
    (id, email, password_hash, created_at, updated_at): IdentityRow,
) -> AuthResult<Identity> {
    Ok(Identity {
        id: IdentityId::parse(&id).ok_or_else(|| corrupt("identity id", &id))?,
        email,
        password_hash,
        created_at: created_at as u64,
        updated_at: updated_at as u64,
    })
}

impl SqliteStore {
    fn find_identity_where(&self, column: &str, value: &str) -> AuthResult<Option<Identity>> {
        let conn = self.conn()?;

        let row: Option<IdentityRow> = conn
            .query_row(
                &format!("{SELECT_IDENTITY} WHERE {column} = ?"),
                [value],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?;

        row.map(identity_from_row).transpose()
    }
}

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn create_identity(&self, identity: Identity) -> AuthResult<()> {
        let conn = self.conn()?;

        let result = conn.execute(
            "INSERT INTO identities (id, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                identity.id.to_string(),
                &identity.email,
                &identity.password_hash,
                identity.created_at as i64,
                identity.updated_at as i64,
            ),
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AuthError::AlreadyExists(format!(
                "identity with email {}",
                identity.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_identity_by_email(&self, email: &str) -> AuthResult<Option<Identity>> {
        self.find_identity_where("email", email)
    }

    async fn find_identity_by_id(&self, id: &IdentityId) -> AuthResult<Option<Identity>> {
        self.find_identity_where("id", &id.to_string())
    }
}
