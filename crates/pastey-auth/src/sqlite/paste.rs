//! SQLite paste and grant store

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use super::{SqliteStore, corrupt, is_unique_violation};
use crate::clock::unix_now;
use crate::error::{AuthError, AuthResult};
use crate::grant::Grant;
use crate::identity::IdentityId;
use crate::paste::{Paste, PasteKey, Visibility};
use crate::store::PasteStore;

type PasteRow = (String, String, String, i64, i64, i64);
type GrantRow = (String, String, String, i64);

fn paste_from_row(
    (id, title, owner_id, visibility, created_at, updated_at): PasteRow,
) -> AuthResult<Paste> {
    Ok(Paste {
        key: PasteKey::parse(&id).ok_or_else(|| corrupt("paste key", &id))?,
        title,
        owner: IdentityId::parse(&owner_id).ok_or_else(|| corrupt("owner id", &owner_id))?,
        visibility: Visibility::from_code(visibility)
            .ok_or_else(|| corrupt("visibility", &visibility.to_string()))?,
        created_at: created_at as u64,
        updated_at: updated_at as u64,
    })
}

fn grant_from_row((id, paste_id, identity_id, created_at): GrantRow) -> AuthResult<Grant> {
    Ok(Grant {
        id: uuid::Uuid::parse_str(&id).map_err(|_| corrupt("grant id", &id))?,
        paste: PasteKey::parse(&paste_id).ok_or_else(|| corrupt("paste key", &paste_id))?,
        grantee: IdentityId::parse(&identity_id)
            .ok_or_else(|| corrupt("identity id", &identity_id))?,
        created_at: created_at as u64,
    })
}

fn select_grant(
    conn: &Connection,
    grantee: &IdentityId,
    paste: &PasteKey,
) -> AuthResult<Option<Grant>> {
    let row: Option<GrantRow> = conn
        .query_row(
            "SELECT id, paste_id, identity_id, created_at FROM grants
             WHERE paste_id = ? AND identity_id = ?",
            (paste.as_str(), grantee.to_string()),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    row.map(grant_from_row).transpose()
}

#[async_trait]
impl PasteStore for SqliteStore {
    async fn create_paste(&self, paste: Paste) -> AuthResult<()> {
        let conn = self.conn()?;

        let result = conn.execute(
            "INSERT INTO pastes (id, title, owner_id, visibility, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                paste.key.as_str(),
                &paste.title,
                paste.owner.to_string(),
                paste.visibility.code(),
                paste.created_at as i64,
                paste.updated_at as i64,
            ),
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(AuthError::AlreadyExists(format!("paste {}", paste.key)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_paste_by_id(&self, key: &PasteKey) -> AuthResult<Option<Paste>> {
        let conn = self.conn()?;

        let row: Option<PasteRow> = conn
            .query_row(
                "SELECT id, title, owner_id, visibility, created_at, updated_at
                 FROM pastes WHERE id = ?",
                [key.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(paste_from_row).transpose()
    }

    async fn update_paste(&self, paste: &Paste) -> AuthResult<()> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE pastes SET title = ?, visibility = ?, updated_at = ? WHERE id = ?",
            (
                &paste.title,
                paste.visibility.code(),
                unix_now() as i64,
                paste.key.as_str(),
            ),
        )?;

        if changed == 0 {
            return Err(AuthError::NotFound(format!("paste {}", paste.key)));
        }
        Ok(())
    }

    async fn delete_paste(&self, key: &PasteKey) -> AuthResult<()> {
        let conn = self.conn()?;

        let grants: i64 = conn.query_row(
            "SELECT COUNT(*) FROM grants WHERE paste_id = ?",
            [key.as_str()],
            |row| row.get(0),
        )?;
        if grants > 0 {
            return Err(AuthError::Conflict(format!(
                "paste {key} still has {grants} grant(s)"
            )));
        }

        let deleted = conn.execute("DELETE FROM pastes WHERE id = ?", [key.as_str()])?;
        if deleted == 0 {
            return Err(AuthError::NotFound(format!("paste {key}")));
        }
        Ok(())
    }

    async fn list_accessible_pastes(&self, identity: &IdentityId) -> AuthResult<Vec<Paste>> {
        let conn = self.conn()?;
        let identity = identity.to_string();

        let mut stmt = conn.prepare(
            "SELECT p.id, p.title, p.owner_id, p.visibility, p.created_at, p.updated_at
             FROM pastes p
             WHERE p.owner_id = ?1
                OR EXISTS (
                    SELECT 1 FROM grants g
                    WHERE g.paste_id = p.id AND g.identity_id = ?1
                )
             ORDER BY p.created_at, p.id",
        )?;

        let rows = stmt.query_map([&identity], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;

        let mut pastes = Vec::new();
        for row in rows {
            pastes.push(paste_from_row(row?)?);
        }
        Ok(pastes)
    }

    async fn find_grant(
        &self,
        grantee: &IdentityId,
        paste: &PasteKey,
    ) -> AuthResult<Option<Grant>> {
        let conn = self.conn()?;
        select_grant(&conn, grantee, paste)
    }

    async fn create_grant(&self, grantee: &IdentityId, paste: &PasteKey) -> AuthResult<Grant> {
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pastes WHERE id = ?)",
            [paste.as_str()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(AuthError::NotFound(format!("paste {paste}")));
        }

        if let Some(existing) = select_grant(&conn, grantee, paste)? {
            return Ok(existing);
        }

        let grant = Grant::new(paste.clone(), *grantee);
        conn.execute(
            "INSERT INTO grants (id, paste_id, identity_id, created_at) VALUES (?, ?, ?, ?)",
            (
                grant.id.to_string(),
                grant.paste.as_str(),
                grant.grantee.to_string(),
                grant.created_at as i64,
            ),
        )?;

        Ok(grant)
    }

    async fn delete_grant(&self, grant: &Grant) -> AuthResult<()> {
        let conn = self.conn()?;

        let deleted = conn.execute(
            "DELETE FROM grants WHERE paste_id = ? AND identity_id = ?",
            (grant.paste.as_str(), grant.grantee.to_string()),
        )?;
        if deleted == 0 {
            return Err(AuthError::NotFound(format!("grant {}", grant.id)));
        }
        Ok(())
    }

    async fn list_grants_for_paste(&self, paste: &PasteKey) -> AuthResult<Vec<Grant>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, paste_id, identity_id, created_at FROM grants
             WHERE paste_id = ? ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([paste.as_str()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;

        let mut grants = Vec::new();
        for row in rows {
            grants.push(grant_from_row(row?)?);
        }
        Ok(grants)
    }
}
