//! In-memory identity store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{read, write};
use crate::error::{AuthError, AuthResult};
use crate::identity::{Identity, IdentityId};
use crate::store::IdentityStore;

/// In-memory identity store
#[derive(Default)]
pub struct InMemoryIdentityStore {
    /// id -> identity
    identities: RwLock<HashMap<IdentityId, Identity>>,
    /// email -> id
    by_email: RwLock<HashMap<String, IdentityId>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered identities
    pub fn len(&self) -> usize {
        self.identities.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn create_identity(&self, identity: Identity) -> AuthResult<()> {
        let mut by_email = write(&self.by_email)?;

        if by_email.contains_key(&identity.email) {
            return Err(AuthError::AlreadyExists(format!(
                "identity with email {}",
                identity.email
            )));
        }

        by_email.insert(identity.email.clone(), identity.id);
        write(&self.identities)?.insert(identity.id, identity);
        Ok(())
    }

    async fn find_identity_by_email(&self, email: &str) -> AuthResult<Option<Identity>> {
        let Some(id) = read(&self.by_email)?.get(email).copied() else {
            return Ok(None);
        };
        Ok(read(&self.identities)?.get(&id).cloned())
    }

    async fn find_identity_by_id(&self, id: &IdentityId) -> AuthResult<Option<Identity>> {
        Ok(read(&self.identities)?.get(id).cloned())
    }
}
