//! Auth service error types

use thiserror::Error;

use crate::token::TokenKind;

pub type AuthResult<T> = Result<T, AuthError>;
pub type TokenResult<T> = Result<T, TokenError>;

/// Outcomes a caller must be able to tell apart.
///
/// Variants are never folded into one another on the way out.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No credential presented")]
    Unauthenticated,

    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(#[from] TokenError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a presented token was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature invalid")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("expected {expected} token, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("token revoked")]
    Revoked,

    #[error("token subject does not match any identity")]
    UnknownSubject,
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        AuthError::LookupFailed(err.to_string())
    }
}
