use std::net::SocketAddr;
use tokio::net::TcpListener;

use pastey_server::config::{Argon2Config, AuthConfig, Config};
use pastey_server::state::AppState;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};

pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestServer {
    pub url: String,
    #[allow(dead_code)]
    pub addr: SocketAddr,
    pub client: Client,
}

/// Memory backends and a cheap password hash
pub fn test_config() -> Config {
    let mut auth = AuthConfig::new("integration-test-secret-0123456789");
    // Keep signups fast
    auth.argon2 = Argon2Config {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };

    Config {
        host: "127.0.0.1".into(),
        port: 0, // OS assigns port
        storage: Default::default(),
        database: Default::default(),
        auth,
    }
}

impl TestServer {
    #[allow(dead_code)]
    pub async fn start() -> Self {
        Self::start_with(test_config()).await
    }

    #[allow(dead_code)]
    pub async fn start_with(config: Config) -> Self {
        let state = AppState::new(&config).await.unwrap();
        Self::start_with_state(state).await
    }

    /// Serve a state assembled by the test itself
    pub async fn start_with_state(state: AppState) -> Self {
        let app = pastey_server::routes::router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            url: format!("http://{addr}"),
            addr,
            client: Client::new(),
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{}{path}", self.url))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(format!("{}{path}", self.url))
    }

    #[allow(dead_code)]
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(format!("{}{path}", self.url))
    }

    #[allow(dead_code)]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(format!("{}{path}", self.url))
    }

    /// Sign up and log in; returns the login response body
    #[allow(dead_code)]
    pub async fn register(&self, email: &str) -> Value {
        let response = self
            .post("/auth/v1/signup")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = self
            .post("/auth/v1/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::OK);

        response.json().await.expect("Failed to parse JSON")
    }

    /// Sign up, log in and return an `Authorization` header value
    #[allow(dead_code)]
    pub async fn bearer(&self, email: &str) -> String {
        let login = self.register(email).await;
        format!("Bearer {}", login["token"].as_str().unwrap())
    }

    /// Create a paste and return its id
    #[allow(dead_code)]
    pub async fn create_paste(&self, bearer: &str, visibility: &str, content: &str) -> String {
        let response = self
            .post("/api/v1/paste")
            .header("Authorization", bearer)
            .header("Pastey-Title", "notes")
            .header("Pastey-Visibility", visibility)
            .body(content.to_string())
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["id"].as_str().unwrap().to_string()
    }
}
