use crate::error::RelayError;
use crate::models::user::AuthUser;
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tower_sessions::Session;

/// Guard for the JSON relay endpoints. Unlike pages, API callers get a 401
/// body instead of a redirect, and the handler never runs.
pub async fn require_api_session(
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Result<Response, RelayError> {
    if AuthUser::from_session(&session).await.is_none() {
        return Err(RelayError::Unauthenticated);
    }

    Ok(next.run(request).await)
}
