//! Post store service: the operations behind the `/api` surface.

use std::sync::Arc;

use blogfront_api_types::BlogStats;
use metrics::counter;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::error::DomainError;
use crate::domain::posts::{Post, PostDraft, PostFilter, format_publish_date};

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("post `{0}` not found")]
    NotFound(u64),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostsRepo>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostsRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, PostServiceError> {
        let posts = self.repo.list_posts(filter).await?;
        debug!(
            target = "blogfront::posts",
            category = filter.category.as_deref().unwrap_or(""),
            featured = ?filter.featured,
            count = posts.len(),
            "listed posts"
        );
        Ok(posts)
    }

    pub async fn featured(&self) -> Result<Vec<Post>, PostServiceError> {
        self.list(&PostFilter::featured_only()).await
    }

    pub async fn by_category(&self, name: &str) -> Result<Vec<Post>, PostServiceError> {
        self.list(&PostFilter::category(name)).await
    }

    pub async fn find(&self, id: u64) -> Result<Post, PostServiceError> {
        self.repo
            .find_post(id)
            .await?
            .ok_or(PostServiceError::NotFound(id))
    }

    pub async fn categories(&self) -> Result<Vec<String>, PostServiceError> {
        Ok(self.repo.list_categories().await?)
    }

    pub async fn stats(&self) -> Result<BlogStats, PostServiceError> {
        let posts = self.repo.list_posts(&PostFilter::all()).await?;
        let categories = self.repo.list_categories().await?;
        Ok(BlogStats {
            total_posts: posts.len(),
            featured_posts: posts.iter().filter(|post| post.featured).count(),
            categories: categories.len(),
        })
    }

    /// Validate the required fields, stamp today's date and let the store assign the id.
    pub async fn create(&self, draft: PostDraft) -> Result<Post, PostServiceError> {
        draft.ensure_complete()?;

        let publish_date = format_publish_date(OffsetDateTime::now_utc().date())?;
        let post = self.repo.create_post(draft, publish_date).await?;

        counter!("blogfront_posts_created_total").increment(1);
        info!(
            target = "blogfront::posts",
            post_id = post.id,
            category = %post.category,
            "post created"
        );
        Ok(post)
    }
}
