//! Wire types shared by the blogfront server and its clients.
//!
//! Field names follow the JSON contract of the post API (camelCase).

use serde::{Deserialize, Serialize};

/// A blog post as served by `/api/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub publish_date: String,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub image_url: String,
}

/// Body accepted by `POST /api/posts`.
///
/// The four text fields are required by the server; they are optional here so
/// that a missing field surfaces as a descriptive 400 instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Error body returned with every non-2xx API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Aggregate counts served by `/api/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogStats {
    pub total_posts: usize,
    pub featured_posts: usize,
    pub categories: usize,
}
