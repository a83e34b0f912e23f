//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::{Post, PostDraft, PostFilter};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError>;

    async fn find_post(&self, id: u64) -> Result<Option<Post>, RepoError>;

    /// Distinct categories across every stored post.
    async fn list_categories(&self) -> Result<Vec<String>, RepoError>;

    /// Store a new post. The repository picks the id; `publish_date` is stamped as given.
    async fn create_post(&self, draft: PostDraft, publish_date: String)
    -> Result<Post, RepoError>;
}
