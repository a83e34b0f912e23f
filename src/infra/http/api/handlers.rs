use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use blogfront_api_types::PostCreateRequest;
use serde::Deserialize;

use crate::domain::posts::{PostDraft, PostFilter};

use super::error::ApiError;
use super::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
}

impl PostListQuery {
    /// Empty values mean "no filter". `featured=true` (any case) keeps featured
    /// posts; any other non-empty value keeps the rest.
    pub fn into_filter(self) -> PostFilter {
        let category = self.category.filter(|value| !value.is_empty());
        let featured = self
            .featured
            .filter(|value| !value.is_empty())
            .map(|value| value.eq_ignore_ascii_case("true"));
        PostFilter { category, featured }
    }
}

pub async fn list_posts(
    State(state): State<ApiState>,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list(&query.into_filter()).await?;
    Ok(Json(posts))
}

pub async fn featured_posts(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.posts.featured().await?))
}

pub async fn posts_by_category(
    State(state): State<ApiState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.posts.by_category(&category).await?))
}

/// Ids that do not parse as a number are reported like unknown ids.
pub async fn get_post(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: u64 = id.parse().map_err(|_| ApiError::post_not_found())?;
    Ok(Json(state.posts.find(id).await?))
}

pub async fn create_post(
    State(state): State<ApiState>,
    payload: Result<Json<PostCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let draft = PostDraft {
        title: payload.title,
        content: payload.content,
        author: payload.author,
        category: payload.category,
        tags: payload.tags.unwrap_or_default(),
        featured: payload.featured.unwrap_or(false),
        image_url: payload.image_url,
    };

    let post = state.posts.create(draft).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_categories(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.posts.categories().await?))
}

pub async fn stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.posts.stats().await?))
}
