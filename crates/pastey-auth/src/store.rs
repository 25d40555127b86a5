//! Persistence contracts consumed by the access gate and the handlers
//!
//! Lookups return `Ok(None)` when a record is absent and
//! `Err(AuthError::LookupFailed)` when the backend itself failed. The two
//! are never merged: the gate maps the first to `NotFound` and propagates
//! the second unchanged.

use async_trait::async_trait;

use crate::error::AuthResult;
use crate::grant::Grant;
use crate::identity::{Identity, IdentityId};
use crate::paste::{Paste, PasteKey};

/// Registered users
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Persist a new identity
    ///
    /// Returns `AlreadyExists` if the email is taken.
    async fn create_identity(&self, identity: Identity) -> AuthResult<()>;

    async fn find_identity_by_email(&self, email: &str) -> AuthResult<Option<Identity>>;

    async fn find_identity_by_id(&self, id: &IdentityId) -> AuthResult<Option<Identity>>;
}

/// Paste metadata and the grants attached to it
#[async_trait]
pub trait PasteStore: Send + Sync {
    /// Persist a new paste
    async fn create_paste(&self, paste: Paste) -> AuthResult<()>;

    async fn find_paste_by_id(&self, key: &PasteKey) -> AuthResult<Option<Paste>>;

    /// Overwrite title, visibility and `updated_at` of an existing paste
    ///
    /// Returns `NotFound` if the paste does not exist.
    async fn update_paste(&self, paste: &Paste) -> AuthResult<()>;

    /// Remove a paste record
    ///
    /// Grants are never removed implicitly: if any still reference the
    /// paste this returns `Conflict` and nothing is deleted.
    async fn delete_paste(&self, key: &PasteKey) -> AuthResult<()>;

    /// Pastes owned by, or shared with, an identity
    async fn list_accessible_pastes(&self, identity: &IdentityId) -> AuthResult<Vec<Paste>>;

    async fn find_grant(&self, grantee: &IdentityId, paste: &PasteKey)
    -> AuthResult<Option<Grant>>;

    /// Record a grant
    ///
    /// Returns `NotFound` if the paste does not exist. If the same
    /// (grantee, paste) pair is already granted, the existing grant is
    /// returned and nothing is written.
    async fn create_grant(&self, grantee: &IdentityId, paste: &PasteKey) -> AuthResult<Grant>;

    /// Remove a grant; returns `NotFound` if it does not exist
    async fn delete_grant(&self, grant: &Grant) -> AuthResult<()>;

    async fn list_grants_for_paste(&self, paste: &PasteKey) -> AuthResult<Vec<Grant>>;
}
