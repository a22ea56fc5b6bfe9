use crate::error::RelayError;
use crate::models::user::{AuthUser, SESSION_USER_KEY};
use crate::utils::credentials::password_matches;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn session_error(e: tower_sessions::session::Error) -> RelayError {
    RelayError::Unhandled(anyhow::anyhow!("Session store error: {}", e))
}

pub async fn login_page(session: Session) -> Response {
    if AuthUser::from_session(&session).await.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate { error: None }.into_response()
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginRequest>,
) -> Result<Response, RelayError> {
    let username_ok: bool = payload
        .username
        .as_bytes()
        .ct_eq(state.auth.username.as_bytes())
        .into();
    let password_ok = password_matches(&state.auth.password, &payload.password);

    if !(username_ok && password_ok) {
        tracing::warn!(username = %payload.username, "Failed login attempt");
        return Ok((
            StatusCode::UNAUTHORIZED,
            LoginTemplate {
                error: Some("Invalid username or password".to_string()),
            },
        )
            .into_response());
    }

    // New session ID on privilege change.
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(SESSION_USER_KEY, &payload.username)
        .await
        .map_err(session_error)?;

    tracing::info!(username = %payload.username, "User logged in successfully");
    Ok(Redirect::to("/").into_response())
}

pub async fn logout_handler(session: Session) -> Result<Response, RelayError> {
    if let Some(user) = AuthUser::from_session(&session).await {
        tracing::info!(username = %user.username, "User logged out");
    }

    session.flush().await.map_err(session_error)?;
    Ok(Redirect::to("/login").into_response())
}
