use crate::app::MovieService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MovieService>,
}

impl AppState {
    pub fn new(service: MovieService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Body of every error response and of delete confirmations.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `unhealthy`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
