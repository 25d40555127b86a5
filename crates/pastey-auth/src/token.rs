//! Bearer tokens: signed, time-limited assertions of an identity's email
//!
//! Wire format is two base64url segments joined by a dot:
//!
//! ```text
//! base64url(claims_json) "." base64url(keyed_blake3(key, first_segment))
//! ```
//!
//! The MAC key is derived from the service secret once, at construction.
//! Tokens are stateless; the only way to reject a live token before its
//! expiry is the optional [`RevocationCheck`] hook.

use std::fmt;
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, AuthResult, TokenError, TokenResult};

/// Domain separation for deriving the MAC key from the configured secret
const KEY_CONTEXT: &str = "pastey 2024-06-01 bearer token signing key v1";

/// Shortest secret accepted at startup
pub const MIN_SECRET_LEN: usize = 16;

/// Which flow a token was issued for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, presented on every API request
    Access,
    /// Long-lived, only exchanged for a fresh access token
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim set carried by every token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Email of the identity the token was issued to
    pub email: String,
    /// Issuer name
    pub iss: String,
    /// Expiry (Unix seconds); the token is valid while `now < exp`
    pub exp: u64,
    /// Issued at (Unix seconds)
    pub iat: u64,
    pub kind: TokenKind,
    /// Unique token id, usable as a revocation handle
    pub jti: String,
}

/// Hook for rejecting tokens before their natural expiry
///
/// The service ships with [`NoRevocation`]; a deployment that keeps a
/// deny-list installs its own implementation with
/// [`TokenService::with_revocation`].
pub trait RevocationCheck: Send + Sync {
    fn is_revoked(&self, claims: &TokenClaims) -> bool;
}

/// Revokes nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRevocation;

impl RevocationCheck for NoRevocation {
    fn is_revoked(&self, _claims: &TokenClaims) -> bool {
        false
    }
}

/// Issuer name and lifetimes
#[derive(Clone, Debug)]
pub struct TokenConfig {
    pub issuer: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "AuthService".into(),
            access_ttl_secs: 60 * 60,
            refresh_ttl_secs: 12 * 60 * 60,
        }
    }
}

impl TokenConfig {
    fn validate(&self) -> AuthResult<()> {
        if self.issuer.trim().is_empty() {
            return Err(AuthError::InvalidConfig("issuer must not be empty".into()));
        }
        if self.access_ttl_secs == 0 {
            return Err(AuthError::InvalidConfig(
                "access token TTL must be positive".into(),
            ));
        }
        if self.refresh_ttl_secs <= self.access_ttl_secs {
            return Err(AuthError::InvalidConfig(
                "refresh token TTL must be longer than access token TTL".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct MacKey([u8; 32]);

/// Issues and validates bearer tokens
///
/// Holds only immutable state, so a single instance is shared behind an
/// `Arc` by every request.
pub struct TokenService {
    key: MacKey,
    config: TokenConfig,
    clock: Arc<dyn Clock>,
    revocation: Arc<dyn RevocationCheck>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .field("refresh_ttl_secs", &self.config.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a service from the shared secret
    ///
    /// Fails on a short secret or inconsistent lifetimes. Callers treat this
    /// as fatal at startup.
    pub fn new(secret: &[u8], config: TokenConfig) -> AuthResult<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidConfig(format!(
                "token secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        config.validate()?;

        Ok(Self {
            key: MacKey(blake3::derive_key(KEY_CONTEXT, secret)),
            config,
            clock: Arc::new(SystemClock),
            revocation: Arc::new(NoRevocation),
        })
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Install a revocation hook
    pub fn with_revocation(mut self, revocation: Arc<dyn RevocationCheck>) -> Self {
        self.revocation = revocation;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    pub fn access_ttl_secs(&self) -> u64 {
        self.config.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> u64 {
        self.config.refresh_ttl_secs
    }

    pub fn issue_access_token(&self, email: &str) -> AuthResult<String> {
        self.issue(email, TokenKind::Access)
    }

    pub fn issue_refresh_token(&self, email: &str) -> AuthResult<String> {
        self.issue(email, TokenKind::Refresh)
    }

    fn issue(&self, email: &str, kind: TokenKind) -> AuthResult<String> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl_secs,
            TokenKind::Refresh => self.config.refresh_ttl_secs,
        };
        let now = self.clock.now();

        let claims = TokenClaims {
            email: email.to_string(),
            iss: self.config.issuer.clone(),
            exp: now.saturating_add(ttl),
            iat: now,
            kind,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let json = serde_json::to_vec(&claims)
            .map_err(|e| AuthError::InvalidConfig(format!("cannot encode token claims: {e}")))?;
        let payload = B64.encode(json);
        let mac = self.mac(&payload);

        tracing::debug!(kind = %kind, exp = claims.exp, "issued token");
        Ok(format!("{payload}.{}", B64.encode(mac.as_bytes())))
    }

    /// Verify signature and expiry, regardless of token kind
    pub fn validate_token(&self, token: &str) -> TokenResult<TokenClaims> {
        self.decode(token, None)
    }

    /// Verify an access token; refresh tokens are rejected
    pub fn validate_access_token(&self, token: &str) -> TokenResult<TokenClaims> {
        self.decode(token, Some(TokenKind::Access))
    }

    /// Verify a refresh token; access tokens are rejected
    pub fn validate_refresh_token(&self, token: &str) -> TokenResult<TokenClaims> {
        self.decode(token, Some(TokenKind::Refresh))
    }

    fn decode(&self, token: &str, expected: Option<TokenKind>) -> TokenResult<TokenClaims> {
        let (payload, signature) = token
            .split_once('.')
            .ok_or_else(|| TokenError::Malformed("expected two segments".into()))?;
        if payload.is_empty() || signature.contains('.') {
            return Err(TokenError::Malformed("expected two segments".into()));
        }

        // Anything wrong with the signature segment is a signature failure
        let signature: [u8; blake3::OUT_LEN] = B64
            .decode(signature)
            .map_err(|_| TokenError::InvalidSignature)?
            .try_into()
            .map_err(|_| TokenError::InvalidSignature)?;
        // blake3::Hash equality is constant-time
        if blake3::Hash::from(signature) != self.mac(payload) {
            return Err(TokenError::InvalidSignature);
        }

        let json = B64
            .decode(payload)
            .map_err(|e| TokenError::Malformed(format!("claims encoding: {e}")))?;
        let claims: TokenClaims = serde_json::from_slice(&json)
            .map_err(|e| TokenError::Malformed(format!("claims: {e}")))?;

        if claims.exp <= self.clock.now() {
            return Err(TokenError::Expired);
        }

        if let Some(expected) = expected {
            if claims.kind != expected {
                return Err(TokenError::WrongKind {
                    expected,
                    actual: claims.kind,
                });
            }
        }

        if self.revocation.is_revoked(&claims) {
            return Err(TokenError::Revoked);
        }

        Ok(claims)
    }

    fn mac(&self, payload: &str) -> blake3::Hash {
        blake3::keyed_hash(&self.key.0, payload.as_bytes())
    }
}
