pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use crate::config::AuthSettings;
use crate::services::RelayService;
use std::sync::Arc;

/// Shared application state: the relay pipeline and the operator login.
#[derive(Clone)]
pub struct AppState {
    pub relay: RelayService,
    pub auth: Arc<AuthSettings>,
}

impl AppState {
    pub fn new(relay: RelayService, auth: AuthSettings) -> Self {
        Self {
            relay,
            auth: Arc::new(auth),
        }
    }
}
