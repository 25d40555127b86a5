use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use pastey_auth::{AuthError, BEARER_SCHEME, Identity, TokenError};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub id: String,
    pub email: String,
    pub created_at: u64,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

fn invalid_login() -> ServerError {
    ServerError::Unauthorized("Invalid email or password".into())
}

/// POST /auth/v1/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> ServerResult<(StatusCode, Json<SignupResponse>)> {
    let email = body.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ServerError::BadRequest("A valid email is required".into()));
    }
    if body.password.is_empty() {
        return Err(ServerError::BadRequest("A password is required".into()));
    }

    let hash = state.passwords.hash_blocking(body.password).await?;
    let identity = Identity::new(email, hash);
    state.identities.create_identity(identity.clone()).await?;

    tracing::info!(id = %identity.id, "registered identity");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: identity.id.to_string(),
            email: identity.email,
            created_at: identity.created_at,
        }),
    ))
}

/// POST /auth/v1/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> ServerResult<Json<LoginResponse>> {
    let identity = state
        .identities
        .find_identity_by_email(body.email.trim())
        .await?
        .ok_or_else(invalid_login)?;

    let valid = state
        .passwords
        .verify_blocking(body.password, identity.password_hash.clone())
        .await?;
    if !valid {
        tracing::warn!(id = %identity.id, "login with wrong password");
        return Err(invalid_login());
    }

    let token = state.tokens.issue_access_token(&identity.email)?;
    let refresh_token = state.tokens.issue_refresh_token(&identity.email)?;

    Ok(Json(LoginResponse {
        token,
        refresh_token,
        token_type: BEARER_SCHEME,
        expires_in: state.tokens.access_ttl_secs(),
    }))
}

/// POST /auth/v1/refresh
///
/// Trades a refresh token for a fresh access token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> ServerResult<Json<RefreshResponse>> {
    let claims = state
        .tokens
        .validate_refresh_token(&body.refresh_token)
        .map_err(|e| {
            tracing::warn!(error = %e, "rejected refresh token");
            AuthError::InvalidCredential(e)
        })?;

    let identity = state
        .identities
        .find_identity_by_email(&claims.email)
        .await?
        .ok_or(AuthError::InvalidCredential(TokenError::UnknownSubject))?;

    Ok(Json(RefreshResponse {
        token: state.tokens.issue_access_token(&identity.email)?,
        token_type: BEARER_SCHEME,
        expires_in: state.tokens.access_ttl_secs(),
    }))
}
