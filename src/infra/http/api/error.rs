use std::error::Error as StdError;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blogfront_api_types::ErrorBody;

use crate::application::error::ErrorReport;
use crate::application::posts::PostServiceError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

const SOURCE: &str = "infra::http::api";
const POST_NOT_FOUND: &str = "Post not found";
const INTERNAL: &str = "Internal server error";

/// Error answered as `{"error": message}`. The diagnostic detail only
/// reaches the logs through the attached [`ErrorReport`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            report: ErrorReport::from_message(SOURCE, status, message.clone()),
            message,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn post_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, POST_NOT_FOUND)
    }

    /// 500 with a generic body; the full source chain of `error` goes to the report.
    pub fn internal(source: &'static str, error: &dyn StdError) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self {
            status,
            message: INTERNAL.to_string(),
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PostServiceError> for ApiError {
    fn from(err: PostServiceError) -> Self {
        match err {
            PostServiceError::NotFound(_) => Self::post_not_found(),
            PostServiceError::Domain(err @ DomainError::MissingFields { .. }) => {
                Self::bad_request(err.to_string())
            }
            PostServiceError::Domain(err @ DomainError::Invariant { .. }) => {
                Self::internal("infra::http::api::domain", &err)
            }
            PostServiceError::Repo(RepoError::InvalidInput { message }) => {
                Self::bad_request(message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = StatusCode::BAD_REQUEST;
        Self {
            status,
            message: format!("Invalid JSON body: {}", rejection.body_text()),
            report: ErrorReport::from_error("infra::http::api::json", status, &rejection),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response();
        self.report.attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_become_bad_requests() {
        let err: ApiError =
            PostServiceError::from(DomainError::missing_fields(vec!["title", "author"])).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Missing required fields: title, author");
    }

    #[test]
    fn unknown_posts_use_the_fixed_message() {
        let err: ApiError = PostServiceError::NotFound(42).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Post not found");
    }

    #[test]
    fn invariant_failures_hide_their_detail() {
        let err: ApiError =
            PostServiceError::from(DomainError::invariant("publish date out of range")).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");

        let response = err.into_response();
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.source, "infra::http::api::domain");
        assert!(report.messages[0].contains("publish date out of range"));
    }
}
