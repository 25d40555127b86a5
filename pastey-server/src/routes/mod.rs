use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

mod auth;
mod health;
mod pastes;
mod shares;

pub fn router(state: AppState) -> Router {
    let auth = Router::new()
        .route("/auth/v1/signup", post(auth::signup))
        .route("/auth/v1/login", post(auth::login))
        .route("/auth/v1/refresh", post(auth::refresh));

    // Every handler below goes through the access gate itself
    let api = Router::new()
        .route(
            "/api/v1/paste",
            post(pastes::create_paste).get(pastes::list_pastes),
        )
        .route(
            "/api/v1/paste/{id}",
            get(pastes::get_paste)
                .put(pastes::update_paste)
                .delete(pastes::delete_paste),
        )
        .route("/api/v1/paste/{id}/file", get(pastes::get_paste_file))
        .route(
            "/api/v1/share",
            post(shares::create_share).delete(shares::delete_share),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
