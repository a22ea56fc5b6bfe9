#![allow(dead_code)]

use relay_frontend::config::{
    AuthSettings, InferenceSettings, LoggingSettings, ServerSettings, SessionSettings, Settings,
};
use relay_frontend::startup::Application;
use reqwest::{redirect, Client, Response};
use secrecy::Secret;
use serde_json::Value;

pub const TEST_USERNAME: &str = "operator";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: Client,
}

pub fn test_settings(upstream_base_url: &str, timeout_secs: Option<u64>) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
            static_dir: format!("{}/static", env!("CARGO_MANIFEST_DIR")),
            max_body_bytes: 20 * 1024 * 1024,
            cors_allowed_origins: vec!["*".to_string()],
        },
        session: SessionSettings {
            secret: Secret::new("test-session-secret-that-is-long-enough".to_string()),
            secure: false,
            expiry_hours: 1,
        },
        auth: AuthSettings {
            username: TEST_USERNAME.to_string(),
            password: Secret::new(TEST_PASSWORD.to_string()),
        },
        inference: InferenceSettings {
            base_url: upstream_base_url.to_string(),
            timeout_secs,
        },
        logging: LoggingSettings::default(),
    }
}

impl TestApp {
    pub async fn spawn(upstream_base_url: &str) -> Self {
        Self::spawn_with_settings(test_settings(upstream_base_url, None)).await
    }

    pub async fn spawn_with_settings(settings: Settings) -> Self {
        let app = Application::build(settings)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Keep redirects visible so the login guard can be asserted on.
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to build test client");

        Self {
            address,
            port,
            client,
        }
    }

    /// Spawn and log in as the configured operator.
    pub async fn spawn_logged_in(upstream_base_url: &str) -> Self {
        Self::spawn_logged_in_with_settings(test_settings(upstream_base_url, None)).await
    }

    pub async fn spawn_logged_in_with_settings(settings: Settings) -> Self {
        let app = Self::spawn_with_settings(settings).await;
        let response = app.login(TEST_USERNAME, TEST_PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
        app
    }

    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/login", self.address))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to execute login request")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// An address nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
