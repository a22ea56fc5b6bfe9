use crate::config::Settings;
use crate::error::panic_response;
use crate::handlers::{
    app::{health_check, index, recording},
    auth::{login_handler, login_page, logout_handler},
    metrics::metrics,
    relay::{transcribe, upload_image},
};
use crate::middleware::{metrics_middleware, require_api_session};
use crate::services::{InferenceClient, RelayService};
use crate::utils::credentials::session_key_material;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use relay_core::middleware::{request_id_middleware, security_headers_middleware};
use relay_core::observability::REQUEST_ID_HEADER;
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}

pub fn build_router(state: AppState, settings: &Settings) -> Router {
    let key = Key::from(&session_key_material(&settings.session.secret));

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(settings.session.secure)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            settings.session.expiry_hours,
        )))
        .with_signed(key);

    let api = Router::new()
        .route("/upload_image", post(upload_image))
        .route("/transcribe", post(transcribe))
        .route_layer(from_fn(require_api_session))
        .layer(DefaultBodyLimit::max(settings.server.max_body_bytes));

    Router::new()
        .route("/", get(index))
        .route("/recording", get(recording))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", get(logout_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .merge(api)
        .nest_service("/static", ServeDir::new(&settings.server.static_dir))
        .layer(session_layer)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(metrics_middleware))
        .layer(cors_layer(&settings.server.cors_allowed_origins))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let client = InferenceClient::new(settings.inference.clone())?;
        tracing::info!(
            base_url = %client.base_url(),
            timeout_secs = ?settings.inference.timeout_secs,
            "Inference client configured"
        );

        let relay = RelayService::new(Arc::new(client));
        let state = AppState::new(relay, settings.auth.clone());
        let router = build_router(state, &settings);

        // Port 0 picks a random free port, used by the tests.
        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("Server error: {}", e);
                anyhow::anyhow!("Server error: {}", e)
            })
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
