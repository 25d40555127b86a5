use axum::http::header::{AUTHORIZATION, HeaderMap};
use pastey_auth::Identity;

use crate::error::ServerResult;
use crate::state::AppState;

/// Stands in for a header value that is not visible ASCII; never a valid
/// `Bearer <token>` form
const UNREADABLE_HEADER: &str = "<non-ascii>";

/// Raw `Authorization` header value, if one was sent
///
/// An unreadable value is passed on as a malformed credential, so the gate
/// only rejects it when the request actually needs a caller.
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or(UNREADABLE_HEADER))
}

/// Authenticate the caller of a route that is not about a single paste
pub async fn caller(state: &AppState, headers: &HeaderMap) -> ServerResult<Identity> {
    Ok(state.gate.authenticate(authorization(headers)).await?)
}
