//! Grants: read access delegated by a paste owner

use crate::clock::unix_now;
use crate::identity::IdentityId;
use crate::paste::PasteKey;

/// Grant id (UUID v4)
pub type GrantId = uuid::Uuid;

/// A record of read access granted to a non-owner
///
/// Grants confer read only; writing, deleting and sharing stay with the
/// owner regardless of how many grants exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grant {
    pub id: GrantId,
    /// Paste being shared
    pub paste: PasteKey,
    /// Who has been granted access
    pub grantee: IdentityId,
    /// When the grant was created (Unix timestamp)
    pub created_at: u64,
}

impl Grant {
    pub fn new(paste: PasteKey, grantee: IdentityId) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            paste,
            grantee,
            created_at: unix_now(),
        }
    }
}
