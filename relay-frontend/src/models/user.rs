use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key holding the logged-in operator's name.
pub const SESSION_USER_KEY: &str = "user";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}

impl AuthUser {
    /// Reads the logged-in marker from the session, if any.
    pub async fn from_session(session: &Session) -> Option<Self> {
        match session.get::<String>(SESSION_USER_KEY).await {
            Ok(Some(username)) => Some(Self { username }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read session: {}", e);
                None
            }
        }
    }

    pub fn initials(&self) -> String {
        let initials: String = self.username.chars().take(2).collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials.to_uppercase()
        }
    }
}

/// Page guard: anonymous visitors are sent to the login form.
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        match AuthUser::from_session(&session).await {
            Some(user) => Ok(user),
            None => Err(Redirect::to("/login").into_response()),
        }
    }
}
