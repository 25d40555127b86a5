use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use pastey_auth::AuthError;
use pastey_storage::StorageError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => {
                ServerError::Unauthorized("Authentication required".into())
            }
            AuthError::MalformedCredential(msg) => {
                ServerError::BadRequest(format!("Malformed Authorization header: {msg}"))
            }
            AuthError::InvalidCredential(e) => {
                ServerError::Unauthorized(format!("Invalid credential: {e}"))
            }
            AuthError::NotFound(msg) => ServerError::NotFound(msg),
            AuthError::Forbidden(msg) => ServerError::Forbidden(msg),
            AuthError::AlreadyExists(msg) | AuthError::Conflict(msg) => {
                ServerError::Conflict(msg)
            }
            AuthError::LookupFailed(msg) | AuthError::InvalidConfig(msg) => {
                ServerError::Internal(msg)
            }
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => ServerError::NotFound(format!("Content of paste {key}")),
            StorageError::InvalidKey(key) => ServerError::BadRequest(format!("Invalid key {key:?}")),
            other => ServerError::Internal(format!("Storage error: {other}")),
        }
    }
}

impl From<QueryRejection> for ServerError {
    fn from(err: QueryRejection) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pastey_auth::TokenError;

    fn status(err: impl Into<ServerError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(status(AuthError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(AuthError::MalformedCredential("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AuthError::InvalidCredential(TokenError::Expired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status(AuthError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status(AuthError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(AuthError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status(AuthError::AlreadyExists("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(AuthError::LookupFailed("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_advertises_bearer() {
        let response = ServerError::from(AuthError::Unauthenticated).into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_query_rejection_is_json_bad_request() {
        use axum::extract::Query;
        use axum::http::Uri;

        #[derive(serde::Deserialize, Debug)]
        struct Params {
            #[allow(dead_code)]
            paste_id: String,
        }

        let uri: Uri = "/api/v1/share?user_email=bob@example.com".parse().unwrap();
        let rejection = Query::<Params>::try_from_uri(&uri).unwrap_err();

        let response = ServerError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_storage_error_statuses() {
        assert_eq!(
            status(StorageError::NotFound("k".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(StorageError::InvalidKey("../k".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(StorageError::Unavailable("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
