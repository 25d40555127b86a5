//! In-memory paste and grant store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{read, write};
use crate::clock::unix_now;
use crate::error::{AuthError, AuthResult};
use crate::grant::Grant;
use crate::identity::IdentityId;
use crate::paste::{Paste, PasteKey};
use crate::store::PasteStore;

/// In-memory paste store
#[derive(Default)]
pub struct InMemoryPasteStore {
    /// paste key -> paste
    pastes: RwLock<HashMap<PasteKey, Paste>>,
    /// (paste key, grantee) -> grant
    grants: RwLock<HashMap<(PasteKey, IdentityId), Grant>>,
}

impl InMemoryPasteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live grants
    pub fn grant_count(&self) -> usize {
        self.grants.read().map(|m| m.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PasteStore for InMemoryPasteStore {
    async fn create_paste(&self, paste: Paste) -> AuthResult<()> {
        let mut pastes = write(&self.pastes)?;

        if pastes.contains_key(&paste.key) {
            return Err(AuthError::AlreadyExists(format!("paste {}", paste.key)));
        }

        pastes.insert(paste.key.clone(), paste);
        Ok(())
    }

    async fn find_paste_by_id(&self, key: &PasteKey) -> AuthResult<Option<Paste>> {
        Ok(read(&self.pastes)?.get(key).cloned())
    }

    async fn update_paste(&self, paste: &Paste) -> AuthResult<()> {
        let mut pastes = write(&self.pastes)?;

        let existing = pastes
            .get_mut(&paste.key)
            .ok_or_else(|| AuthError::NotFound(format!("paste {}", paste.key)))?;

        existing.title = paste.title.clone();
        existing.visibility = paste.visibility;
        existing.updated_at = unix_now();
        Ok(())
    }

    // Lock order is always pastes then grants.
    async fn delete_paste(&self, key: &PasteKey) -> AuthResult<()> {
        let mut pastes = write(&self.pastes)?;
        let grants = read(&self.grants)?;

        if !pastes.contains_key(key) {
            return Err(AuthError::NotFound(format!("paste {key}")));
        }
        if grants.keys().any(|(paste, _)| paste == key) {
            return Err(AuthError::Conflict(format!(
                "paste {key} still has grants"
            )));
        }

        pastes.remove(key);
        Ok(())
    }

    async fn list_accessible_pastes(&self, identity: &IdentityId) -> AuthResult<Vec<Paste>> {
        let pastes = read(&self.pastes)?;
        let grants = read(&self.grants)?;

        let mut accessible: Vec<Paste> = pastes
            .values()
            .filter(|p| {
                p.is_owned_by(identity) || grants.contains_key(&(p.key.clone(), *identity))
            })
            .cloned()
            .collect();
        accessible.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.key.cmp(&b.key)));

        Ok(accessible)
    }

    async fn find_grant(
        &self,
        grantee: &IdentityId,
        paste: &PasteKey,
    ) -> AuthResult<Option<Grant>> {
        Ok(read(&self.grants)?.get(&(paste.clone(), *grantee)).cloned())
    }

    async fn create_grant(&self, grantee: &IdentityId, paste: &PasteKey) -> AuthResult<Grant> {
        let pastes = read(&self.pastes)?;
        let mut grants = write(&self.grants)?;

        if !pastes.contains_key(paste) {
            return Err(AuthError::NotFound(format!("paste {paste}")));
        }

        let grant = grants
            .entry((paste.clone(), *grantee))
            .or_insert_with(|| Grant::new(paste.clone(), *grantee))
            .clone();
        Ok(grant)
    }

    async fn delete_grant(&self, grant: &Grant) -> AuthResult<()> {
        write(&self.grants)?
            .remove(&(grant.paste.clone(), grant.grantee))
            .map(|_| ())
            .ok_or_else(|| AuthError::NotFound(format!("grant {}", grant.id)))
    }

    async fn list_grants_for_paste(&self, paste: &PasteKey) -> AuthResult<Vec<Grant>> {
        Ok(read(&self.grants)?
            .iter()
            .filter(|((key, _), _)| key == paste)
            .map(|(_, grant)| grant.clone())
            .collect())
    }
}
