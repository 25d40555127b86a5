use crate::error::{ServerError, ServerResult};
use crate::middleware::authorization;
use crate::routes::pastes::paste_key;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
};
use pastey_auth::{Identity, Operation};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ShareParams {
    pub paste_id: String,
    pub user_email: String,
}

#[derive(Serialize)]
pub struct GrantResponse {
    pub id: String,
    pub paste_id: String,
    pub user_id: String,
    pub user_email: String,
    pub created_at: u64,
}

async fn grantee(state: &AppState, email: &str) -> ServerResult<Identity> {
    state
        .identities
        .find_identity_by_email(email.trim())
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("User {email}")))
}

/// POST /api/v1/share?paste_id=&user_email=
/// Grant read access to another user
pub async fn create_share(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ShareParams>, QueryRejection>,
) -> ServerResult<(StatusCode, Json<GrantResponse>)> {
    let Query(params) = params?;
    let key = paste_key(&params.paste_id)?;
    let admission = state
        .gate
        .admit(authorization(&headers), &key, Operation::Share)
        .await?;

    let user = grantee(&state, &params.user_email).await?;
    if admission.paste.is_owned_by(&user.id) {
        return Err(ServerError::BadRequest(
            "The owner already has full access".into(),
        ));
    }

    let grant = state.pastes.create_grant(&user.id, &key).await?;

    tracing::info!(paste = %key, grantee = %user.id, "read access granted");
    Ok((
        StatusCode::CREATED,
        Json(GrantResponse {
            id: grant.id.to_string(),
            paste_id: grant.paste.to_string(),
            user_id: grant.grantee.to_string(),
            user_email: user.email,
            created_at: grant.created_at,
        }),
    ))
}

/// DELETE /api/v1/share?paste_id=&user_email=
/// Revoke a previously granted read access
pub async fn delete_share(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ShareParams>, QueryRejection>,
) -> ServerResult<StatusCode> {
    let Query(params) = params?;
    let key = paste_key(&params.paste_id)?;
    state
        .gate
        .admit(authorization(&headers), &key, Operation::Share)
        .await?;

    let user = grantee(&state, &params.user_email).await?;
    let grant = state
        .pastes
        .find_grant(&user.id, &key)
        .await?
        .ok_or_else(|| {
            ServerError::NotFound(format!("No grant for {} on paste {key}", user.email))
        })?;

    state.pastes.delete_grant(&grant).await?;

    tracing::info!(paste = %key, grantee = %user.id, "read access revoked");
    Ok(StatusCode::NO_CONTENT)
}
