//! In-memory post store. Contents live for the process lifetime only.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::posts::{self, Post, PostDraft, PostFilter};
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "infra::memory";

#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostStore {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.posts, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PostsRepo for InMemoryPostStore {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let guard = rw_read(&self.posts, SOURCE, "list_posts");
        Ok(posts::filter_posts(guard.iter(), filter))
    }

    async fn find_post(&self, id: u64) -> Result<Option<Post>, RepoError> {
        let guard = rw_read(&self.posts, SOURCE, "find_post");
        Ok(guard.iter().find(|post| post.id == id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<String>, RepoError> {
        let guard = rw_read(&self.posts, SOURCE, "list_categories");
        Ok(posts::distinct_categories(guard.iter()))
    }

    async fn create_post(
        &self,
        draft: PostDraft,
        publish_date: String,
    ) -> Result<Post, RepoError> {
        // Id selection and insertion share one write guard, so concurrent
        // creates never observe the same maximum.
        let mut guard = rw_write(&self.posts, SOURCE, "create_post");
        let id = posts::next_id(&guard);
        let post = draft
            .into_post(id, publish_date)
            .map_err(|err| RepoError::InvalidInput {
                message: err.to_string(),
            })?;
        guard.push(post.clone());
        Ok(post)
    }
}
