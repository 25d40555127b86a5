use crate::error::{ServerError, ServerResult};
use crate::middleware::{authorization, caller};
use crate::state::AppState;
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header},
    response::Response,
};
use pastey_auth::{AuthError, Operation, Paste, PasteKey, Visibility};
use pastey_storage::content_hash;
use serde::{Deserialize, Serialize};

pub const TITLE_HEADER: &str = "Pastey-Title";
pub const VISIBILITY_HEADER: &str = "Pastey-Visibility";

#[derive(Serialize)]
pub struct PasteResponse {
    pub id: String,
    pub title: String,
    /// 0 public, 1 private
    pub visibility: i64,
    pub user_id: String,
    pub created_at: u64,
    pub updated_at: u64,
}

impl From<&Paste> for PasteResponse {
    fn from(paste: &Paste) -> Self {
        Self {
            id: paste.key.to_string(),
            title: paste.title.clone(),
            visibility: paste.visibility.code(),
            user_id: paste.owner.to_string(),
            created_at: paste.created_at,
            updated_at: paste.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateParams {
    /// Any value other than `false` (including none) means metadata only
    pub metadata: Option<String>,
}

impl UpdateParams {
    pub fn metadata_only(&self) -> bool {
        matches!(self.metadata.as_deref(), Some(v) if v != "false")
    }
}

pub(crate) fn paste_key(id: &str) -> ServerResult<PasteKey> {
    PasteKey::parse(id).ok_or_else(|| ServerError::BadRequest(format!("Invalid paste id {id:?}")))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> ServerResult<Option<&'a str>> {
    match headers.get(name) {
        None => Ok(None),
        Some(v) => {
            let v = v
                .to_str()
                .map_err(|_| ServerError::BadRequest(format!("{name} header is not ASCII")))?
                .trim();
            Ok((!v.is_empty()).then_some(v))
        }
    }
}

fn title(headers: &HeaderMap) -> ServerResult<Option<String>> {
    Ok(header_value(headers, TITLE_HEADER)?.map(str::to_string))
}

fn visibility(headers: &HeaderMap) -> ServerResult<Option<Visibility>> {
    header_value(headers, VISIBILITY_HEADER)?
        .map(|v| {
            Visibility::parse(v)
                .ok_or_else(|| ServerError::BadRequest(format!("Invalid visibility value {v:?}")))
        })
        .transpose()
}

/// POST /api/v1/paste
/// Create a paste (body is the raw content)
pub async fn create_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<PasteResponse>)> {
    let owner = caller(&state, &headers).await?;

    let title = title(&headers)?
        .ok_or_else(|| ServerError::BadRequest(format!("Missing {TITLE_HEADER} header")))?;
    let visibility = visibility(&headers)?
        .ok_or_else(|| ServerError::BadRequest(format!("Missing {VISIBILITY_HEADER} header")))?;
    if body.is_empty() {
        return Err(ServerError::BadRequest("Paste content is empty".into()));
    }

    let paste = Paste::new(title, owner.id, visibility);
    state.blobs.put(paste.key.as_str(), &body).await?;

    if let Err(e) = state.pastes.create_paste(paste.clone()).await {
        // Don't leave content behind without a record
        if let Err(cleanup) = state.blobs.delete(paste.key.as_str()).await {
            tracing::warn!(paste = %paste.key, error = %cleanup, "orphaned paste content");
        }
        return Err(e.into());
    }

    tracing::info!(
        paste = %paste.key,
        owner = %owner.id,
        size = body.len(),
        visibility = paste.visibility.as_str(),
        "paste created"
    );
    Ok((StatusCode::CREATED, Json(PasteResponse::from(&paste))))
}

/// GET /api/v1/paste
/// Pastes owned by, or shared with, the caller
pub async fn list_pastes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ServerResult<Json<Vec<PasteResponse>>> {
    let identity = caller(&state, &headers).await?;

    let pastes = state.pastes.list_accessible_pastes(&identity.id).await?;
    Ok(Json(pastes.iter().map(PasteResponse::from).collect()))
}

/// GET /api/v1/paste/{id}
pub async fn get_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ServerResult<Json<PasteResponse>> {
    let key = paste_key(&id)?;
    let admission = state
        .gate
        .admit(authorization(&headers), &key, Operation::Read)
        .await?;

    Ok(Json(PasteResponse::from(&admission.paste)))
}

/// GET /api/v1/paste/{id}/file
pub async fn get_paste_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ServerResult<Response> {
    let key = paste_key(&id)?;
    state
        .gate
        .admit(authorization(&headers), &key, Operation::Read)
        .await?;

    let data = state.blobs.get(key.as_str()).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, data.len())
        .header("X-Content-Hash", content_hash(&data))
        .body(Body::from(data))
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(response)
}

/// PUT /api/v1/paste/{id}
///
/// Replaces the content with the body unless `?metadata` is given with any
/// value but `false`. The title and visibility headers are optional here and
/// update only when present.
pub async fn update_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    params: Result<Query<UpdateParams>, QueryRejection>,
    body: Bytes,
) -> ServerResult<Json<PasteResponse>> {
    let Query(params) = params?;
    let metadata_only = params.metadata_only();
    let key = paste_key(&id)?;
    let admission = state
        .gate
        .admit(authorization(&headers), &key, Operation::Write)
        .await?;

    let new_title = title(&headers)?;
    let new_visibility = visibility(&headers)?;
    if !metadata_only && body.is_empty() {
        return Err(ServerError::BadRequest("Paste content is empty".into()));
    }

    // Record before content
    let mut paste = admission.paste;
    if let Some(title) = new_title {
        paste.title = title;
    }
    if let Some(visibility) = new_visibility {
        paste.visibility = visibility;
    }
    state.pastes.update_paste(&paste).await?;

    if !metadata_only {
        state.blobs.put(key.as_str(), &body).await?;
    }

    let updated = state
        .pastes
        .find_paste_by_id(&key)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("paste {key}")))?;

    tracing::info!(paste = %key, metadata_only, "paste updated");
    Ok(Json(PasteResponse::from(&updated)))
}

/// DELETE /api/v1/paste/{id}
///
/// Grants go first, then the record, then the content. Content left behind
/// by a failed blob delete is logged and the delete still succeeds.
pub async fn delete_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    let key = paste_key(&id)?;
    state
        .gate
        .admit(authorization(&headers), &key, Operation::Delete)
        .await?;

    for grant in state.pastes.list_grants_for_paste(&key).await? {
        match state.pastes.delete_grant(&grant).await {
            Ok(()) | Err(AuthError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    state.pastes.delete_paste(&key).await?;

    if let Err(e) = state.blobs.delete(key.as_str()).await {
        tracing::warn!(paste = %key, error = %e, "orphaned paste content");
    }

    tracing::info!(paste = %key, "paste deleted");
    Ok(StatusCode::NO_CONTENT)
}
