//! pastey-auth: Authentication and authorization for pastey
//!
//! Issues and validates bearer tokens, and decides per request whether a
//! caller may read, write, delete or share a paste.
//!
//! ## Features
//!
//! | Feature  | Description                    |
//! |----------|--------------------------------|
//! | (none)   | In-memory backends only        |
//! | `sqlite` | SQLite persistence             |
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pastey_auth::{
//!     AccessGate, InMemoryIdentityStore, InMemoryPasteStore, Operation,
//!     TokenConfig, TokenService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokens = Arc::new(TokenService::new(b"a long shared secret", TokenConfig::default())?);
//!     let gate = AccessGate::new(
//!         tokens.clone(),
//!         Arc::new(InMemoryIdentityStore::new()),
//!         Arc::new(InMemoryPasteStore::new()),
//!     );
//!
//!     let token = tokens.issue_access_token("alice@example.com")?;
//!     let header = format!("Bearer {token}");
//!     let admission = gate.admit(Some(&header), &paste_key, Operation::Read).await?;
//!
//!     Ok(())
//! }
//! ```

mod clock;
mod credential;
mod error;
mod gate;
mod grant;
mod identity;
mod operation;
mod paste;
mod store;
mod token;

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-exports
pub use clock::{Clock, FixedClock, SystemClock, unix_now};
pub use credential::{BEARER_SCHEME, bearer_token};
pub use error::{AuthError, AuthResult, TokenError, TokenResult};
pub use gate::{AccessGate, Admission, Decision, DenyReason, decide};
pub use grant::{Grant, GrantId};
pub use identity::{Identity, IdentityId};
pub use operation::{ALL_OPERATIONS, Operation};
pub use paste::{Paste, PasteKey, Visibility};
pub use store::{IdentityStore, PasteStore};
pub use token::{
    MIN_SECRET_LEN, NoRevocation, RevocationCheck, TokenClaims, TokenConfig, TokenKind,
    TokenService,
};

pub use memory::{InMemoryIdentityStore, InMemoryPasteStore};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
