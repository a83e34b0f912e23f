//! Client-side access to the post store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::Post;
use crate::domain::schema::ValidationError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("server responded with status {status}: {body}")]
    Server { status: u16, body: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("post not found")]
    NotFound,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

/// Typed queries against the post store.
///
/// Implementations hand back data that already passed the schema validator;
/// a payload that fails validation surfaces as [`GatewayError::Validation`].
#[async_trait]
pub trait PostGateway: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Post>, GatewayError>;

    /// Posts in `name`. The store compares categories case-insensitively.
    async fn fetch_by_category(&self, name: &str) -> Result<Vec<Post>, GatewayError>;

    async fn fetch_featured(&self) -> Result<Vec<Post>, GatewayError>;

    async fn fetch_by_id(&self, id: u64) -> Result<Post, GatewayError>;

    async fn fetch_categories(&self) -> Result<Vec<String>, GatewayError>;
}
