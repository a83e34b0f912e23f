pub mod error;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::infra::http::middleware::{log_responses, set_request_context};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route("/api/posts/featured", get(handlers::featured_posts))
        .route(
            "/api/posts/category/{category}",
            get(handlers::posts_by_category),
        )
        .route("/api/posts/{id}", get(handlers::get_post))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/stats", get(handlers::stats))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
