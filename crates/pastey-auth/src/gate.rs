//! Access gate: the single place where requests are admitted or denied
//!
//! Every handler that reads or mutates a paste goes through
//! [`AccessGate::admit`] (or [`AccessGate::authenticate`] for routes that
//! are not about one paste). The decision itself is the pure function
//! [`decide`]; the gate only adds the lookups it needs.

use std::sync::Arc;

use crate::credential::bearer_token;
use crate::error::{AuthError, AuthResult, TokenError};
use crate::identity::{Identity, IdentityId};
use crate::operation::Operation;
use crate::paste::{Paste, PasteKey};
use crate::store::{IdentityStore, PasteStore};
use crate::token::TokenService;

/// Outcome of an access decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Deny(DenyReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// No authenticated identity, and the request needs one
    Unauthenticated,
    /// Authenticated, but neither owner nor (for reads) grantee
    Forbidden,
}

impl Decision {
    pub fn is_admit(&self) -> bool {
        matches!(self, Decision::Admit)
    }
}

/// Decide whether `caller` may perform `operation` on `paste`
///
/// `granted` says whether a grant exists for (caller, paste); it is only
/// consulted for reads. Rules, first match wins:
///
/// 1. read of a public paste: admit, no identity needed
/// 2. no caller: deny, unauthenticated
/// 3. read by the owner or a grantee: admit
/// 4. write, delete or share by the owner: admit
/// 5. otherwise: deny, forbidden
pub fn decide(
    caller: Option<&IdentityId>,
    paste: &Paste,
    operation: Operation,
    granted: bool,
) -> Decision {
    if operation.is_read_only() && paste.is_public() {
        return Decision::Admit;
    }

    let Some(caller) = caller else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    let is_owner = paste.is_owned_by(caller);
    let admitted = match operation {
        Operation::Read => is_owner || granted,
        Operation::Write | Operation::Delete | Operation::Share => is_owner,
    };

    if admitted {
        Decision::Admit
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}

/// A request that passed the gate
#[derive(Clone, Debug)]
pub struct Admission {
    pub paste: Paste,
    /// Authenticated caller; `None` for public reads, which skip
    /// authentication entirely
    pub caller: Option<Identity>,
}

/// Authenticates callers and authorizes them against pastes
#[derive(Clone)]
pub struct AccessGate {
    tokens: Arc<TokenService>,
    identities: Arc<dyn IdentityStore>,
    pastes: Arc<dyn PasteStore>,
}

impl AccessGate {
    pub fn new(
        tokens: Arc<TokenService>,
        identities: Arc<dyn IdentityStore>,
        pastes: Arc<dyn PasteStore>,
    ) -> Self {
        Self {
            tokens,
            identities,
            pastes,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Resolve an `Authorization` header value to an identity
    ///
    /// Missing header: `Unauthenticated`. Wrong shape: `MalformedCredential`.
    /// Bad, expired or non-access token, or an email that no longer maps to
    /// an identity: `InvalidCredential`.
    pub async fn authenticate(&self, header: Option<&str>) -> AuthResult<Identity> {
        let token = bearer_token(header)?;

        let claims = self.tokens.validate_access_token(token).map_err(|e| {
            tracing::warn!(error = %e, "rejected bearer token");
            AuthError::InvalidCredential(e)
        })?;

        self.identities
            .find_identity_by_email(&claims.email)
            .await?
            .ok_or_else(|| {
                tracing::warn!("token subject has no identity");
                AuthError::InvalidCredential(TokenError::UnknownSubject)
            })
    }

    /// Decide for an already-resolved caller and paste
    ///
    /// The grant lookup only happens when the decision depends on it.
    pub async fn authorize(
        &self,
        caller: Option<&Identity>,
        paste: &Paste,
        operation: Operation,
    ) -> AuthResult<Decision> {
        let caller_id = caller.map(|c| c.id);

        let needs_grant = operation.is_read_only()
            && !paste.is_public()
            && caller_id.is_some_and(|id| !paste.is_owned_by(&id));

        let granted = match caller_id {
            Some(id) if needs_grant => self.pastes.find_grant(&id, &paste.key).await?.is_some(),
            _ => false,
        };

        let decision = decide(caller_id.as_ref(), paste, operation, granted);
        tracing::debug!(
            paste = %paste.key,
            operation = %operation,
            caller = ?caller_id,
            ?decision,
            "access decision"
        );
        Ok(decision)
    }

    /// Full request path: load the paste, authenticate if needed, decide
    ///
    /// Denials come back as `Unauthenticated` or `Forbidden`; a missing
    /// paste as `NotFound`; backend failures as `LookupFailed`.
    pub async fn admit(
        &self,
        header: Option<&str>,
        key: &PasteKey,
        operation: Operation,
    ) -> AuthResult<Admission> {
        let paste = self
            .pastes
            .find_paste_by_id(key)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("paste {key}")))?;

        let caller = if operation.is_read_only() && paste.is_public() {
            None
        } else {
            Some(self.authenticate(header).await?)
        };

        match self.authorize(caller.as_ref(), &paste, operation).await? {
            Decision::Admit => Ok(Admission { paste, caller }),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AuthError::Unauthenticated),
            Decision::Deny(DenyReason::Forbidden) => {
                tracing::warn!(paste = %key, operation = %operation, "access denied");
                Err(AuthError::Forbidden(format!(
                    "not allowed to {operation} paste {key}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::grant::Grant;
    use crate::memory::{InMemoryIdentityStore, InMemoryPasteStore};
    use crate::operation::ALL_OPERATIONS;
    use crate::paste::Visibility;
    use crate::token::TokenConfig;
    use async_trait::async_trait;

    const T0: u64 = 1_700_000_000;

    struct Fixture {
        gate: AccessGate,
        clock: Arc<FixedClock>,
        pastes: Arc<InMemoryPasteStore>,
        alice: Identity,
        bob: Identity,
    }

    impl Fixture {
        async fn new() -> Self {
            let clock = Arc::new(FixedClock::new(T0));
            let tokens = TokenService::new(b"gate-test-secret-0123456789", TokenConfig::default())
                .unwrap()
                .with_clock(clock.clone());
            let identities = Arc::new(InMemoryIdentityStore::new());
            let pastes = Arc::new(InMemoryPasteStore::new());

            let alice = Identity::new("alice@example.com", "x");
            let bob = Identity::new("bob@example.com", "x");
            identities.create_identity(alice.clone()).await.unwrap();
            identities.create_identity(bob.clone()).await.unwrap();

            let gate = AccessGate::new(Arc::new(tokens), identities, pastes.clone());
            Self {
                gate,
                clock,
                pastes,
                alice,
                bob,
            }
        }

        fn bearer(&self, who: &Identity) -> String {
            let token = self.gate.tokens().issue_access_token(&who.email).unwrap();
            format!("Bearer {token}")
        }

        async fn paste(&self, visibility: Visibility) -> PasteKey {
            let paste = Paste::new("p", self.alice.id, visibility);
            let key = paste.key.clone();
            self.pastes.create_paste(paste).await.unwrap();
            key
        }
    }

    fn paste_owned_by(owner: IdentityId, visibility: Visibility) -> Paste {
        Paste::new("p", owner, visibility)
    }

    #[test]
    fn test_public_read_needs_no_identity() {
        let paste = paste_owned_by(IdentityId::new(), Visibility::Public);
        assert_eq!(decide(None, &paste, Operation::Read, false), Decision::Admit);
    }

    #[test]
    fn test_non_owner_never_mutates() {
        let owner = IdentityId::new();
        let other = IdentityId::new();

        for visibility in [Visibility::Public, Visibility::Private] {
            let paste = paste_owned_by(owner, visibility);
            for op in [Operation::Write, Operation::Delete, Operation::Share] {
                for granted in [false, true] {
                    assert_eq!(
                        decide(Some(&other), &paste, op, granted),
                        Decision::Deny(DenyReason::Forbidden)
                    );
                }
                assert_eq!(
                    decide(None, &paste, op, false),
                    Decision::Deny(DenyReason::Unauthenticated)
                );
            }
        }
    }

    #[test]
    fn test_owner_has_all_access() {
        let owner = IdentityId::new();
        let paste = paste_owned_by(owner, Visibility::Private);

        for op in ALL_OPERATIONS {
            assert!(decide(Some(&owner), &paste, *op, false).is_admit());
        }
    }

    #[test]
    fn test_grant_confers_read_only() {
        let paste = paste_owned_by(IdentityId::new(), Visibility::Private);
        let grantee = IdentityId::new();

        assert!(decide(Some(&grantee), &paste, Operation::Read, true).is_admit());
        assert_eq!(
            decide(Some(&grantee), &paste, Operation::Read, false),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(
            decide(Some(&grantee), &paste, Operation::Delete, true),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_authenticate_outcomes_are_distinct() {
        let fx = Fixture::new().await;

        assert!(matches!(
            fx.gate.authenticate(None).await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            fx.gate.authenticate(Some("Token xyz")).await,
            Err(AuthError::MalformedCredential(_))
        ));

        let header = fx.bearer(&fx.alice);
        fx.clock.advance(fx.gate.tokens().access_ttl_secs());
        assert!(matches!(
            fx.gate.authenticate(Some(&header)).await,
            Err(AuthError::InvalidCredential(TokenError::Expired))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_refresh_token() {
        let fx = Fixture::new().await;
        let refresh = fx
            .gate
            .tokens()
            .issue_refresh_token(&fx.alice.email)
            .unwrap();

        let result = fx.gate.authenticate(Some(&format!("Bearer {refresh}"))).await;
        assert!(matches!(
            result,
            Err(AuthError::InvalidCredential(TokenError::WrongKind { .. }))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_subject() {
        let fx = Fixture::new().await;
        let token = fx
            .gate
            .tokens()
            .issue_access_token("ghost@example.com")
            .unwrap();

        let result = fx.gate.authenticate(Some(&format!("Bearer {token}"))).await;
        assert!(matches!(
            result,
            Err(AuthError::InvalidCredential(TokenError::UnknownSubject))
        ));
    }

    #[tokio::test]
    async fn test_admit_public_read_ignores_header() {
        let fx = Fixture::new().await;
        let key = fx.paste(Visibility::Public).await;

        let admission = fx.gate.admit(None, &key, Operation::Read).await.unwrap();
        assert!(admission.caller.is_none());

        // Even a broken header does not matter for a public read
        assert!(
            fx.gate
                .admit(Some("Token xyz"), &key, Operation::Read)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_admit_missing_paste() {
        let fx = Fixture::new().await;
        let header = fx.bearer(&fx.alice);

        let result = fx
            .gate
            .admit(Some(&header), &PasteKey::generate(), Operation::Read)
            .await;
        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_admit_write_public_by_non_owner() {
        let fx = Fixture::new().await;
        let key = fx.paste(Visibility::Public).await;
        let bob = fx.bearer(&fx.bob);

        let result = fx.gate.admit(Some(&bob), &key, Operation::Write).await;
        assert!(matches!(result, Err(AuthError::Forbidden(_))));
    }

    struct FailingPastes;

    #[async_trait]
    impl PasteStore for FailingPastes {
        async fn create_paste(&self, _: Paste) -> AuthResult<()> {
            Err(AuthError::LookupFailed("down".into()))
        }
        async fn find_paste_by_id(&self, _: &PasteKey) -> AuthResult<Option<Paste>> {
            Err(AuthError::LookupFailed("down".into()))
        }
        async fn update_paste(&self, _: &Paste) -> AuthResult<()> {
            Err(AuthError::LookupFailed("down".into()))
        }
        async fn delete_paste(&self, _: &PasteKey) -> AuthResult<()> {
            Err(AuthError::LookupFailed("down".into()))
        }
        async fn list_accessible_pastes(&self, _: &IdentityId) -> AuthResult<Vec<Paste>> {
            Err(AuthError::LookupFailed("down".into()))
        }
        async fn find_grant(&self, _: &IdentityId, _: &PasteKey) -> AuthResult<Option<Grant>> {
            Err(AuthError::LookupFailed("down".into()))
        }
        async fn create_grant(&self, _: &IdentityId, _: &PasteKey) -> AuthResult<Grant> {
            Err(AuthError::LookupFailed("down".into()))
        }
        async fn delete_grant(&self, _: &Grant) -> AuthResult<()> {
            Err(AuthError::LookupFailed("down".into()))
        }
        async fn list_grants_for_paste(&self, _: &PasteKey) -> AuthResult<Vec<Grant>> {
            Err(AuthError::LookupFailed("down".into()))
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_surfaces() {
        let fx = Fixture::new().await;
        let gate = AccessGate::new(
            fx.gate.tokens.clone(),
            fx.gate.identities.clone(),
            Arc::new(FailingPastes),
        );

        let header = fx.bearer(&fx.alice);
        let result = gate
            .admit(Some(&header), &PasteKey::generate(), Operation::Read)
            .await;
        assert!(matches!(result, Err(AuthError::LookupFailed(_))));

        // A failing grant lookup is not a denial either
        let private = paste_owned_by(fx.alice.id, Visibility::Private);
        let result = gate
            .authorize(Some(&fx.bob), &private, Operation::Read)
            .await;
        assert!(matches!(result, Err(AuthError::LookupFailed(_))));
    }
}
