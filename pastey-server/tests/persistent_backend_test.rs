//! Server running on SQLite and local blob storage

#![cfg(feature = "sqlite")]

use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;

mod common;

fn persistent_config(dir: &TempDir) -> pastey_server::config::Config {
    let mut config = common::test_config();
    config.storage.backend = "local".into();
    config.storage.local_path = Some(dir.path().join("blobs").to_string_lossy().into_owned());
    config.database.backend = "sqlite".into();
    config.database.path = Some(dir.path().join("pastey.db").to_string_lossy().into_owned());
    config
}

#[tokio::test]
async fn test_data_survives_restart() {
    let dir = TempDir::new().unwrap();

    let id = {
        let server = common::TestServer::start_with(persistent_config(&dir)).await;
        let alice = server.bearer("alice@example.com").await;
        server.create_paste(&alice, "0", "kept on disk").await
    };

    // Same files, new server instance
    let server = common::TestServer::start_with(persistent_config(&dir)).await;

    let response = server
        .get(&format!("/api/v1/paste/{id}/file"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "kept on disk");

    // The account survived as well
    let response = server
        .post("/auth/v1/login")
        .json(&serde_json::json!({
            "email": "alice@example.com",
            "password": common::PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_unknown_backend_fails_startup() {
    let mut config = common::test_config();
    config.database.backend = "postgres".into();
    assert!(pastey_server::state::AppState::new(&config).await.is_err());

    let mut config = common::test_config();
    config.storage.backend = "ftp".into();
    assert!(pastey_server::state::AppState::new(&config).await.is_err());

    // s3 without a bucket is refused whether or not the feature is built in
    let mut config = common::test_config();
    config.storage.backend = "s3".into();
    assert!(pastey_server::state::AppState::new(&config).await.is_err());

    let mut config = common::test_config();
    config.storage.backend = "local".into();
    assert!(pastey_server::state::AppState::new(&config).await.is_err());
}

#[tokio::test]
async fn test_weak_secret_fails_startup() {
    let mut config = common::test_config();
    config.auth.secret = pastey_server::config::AuthConfig::new("short").secret;
    assert!(pastey_server::state::AppState::new(&config).await.is_err());
}
