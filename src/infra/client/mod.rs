//! [`PostGateway`] over the `/api` surface of a running post store.

mod correlation;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

pub use correlation::{
    CORRELATION_ID_HEADER, REQUEST_TIMESTAMP_HEADER, RequestMeta, correlation_id_at,
    is_correlation_id,
};

use crate::application::gateway::{GatewayError, PostGateway};
use crate::domain::posts::Post;
use crate::domain::schema::{screen_posts, validate_categories, validate_post};

#[derive(Clone, Debug)]
pub struct HttpPostGateway {
    client: Client,
    base: Url,
}

impl HttpPostGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base = Url::parse(base_url)
            .and_then(|url| url.join("/"))
            .map_err(|err| GatewayError::InvalidRequest(format!("invalid base URL: {err}")))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::network(err.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("blogfront/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| GatewayError::InvalidRequest(err.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// GET `url` and decode a successful body as JSON. Non-2xx answers come
    /// back as [`GatewayError::Server`] with the raw body.
    async fn get_json(&self, operation: &'static str, url: Url) -> Result<Value, GatewayError> {
        let meta = RequestMeta::now();
        let started = Instant::now();

        counter!("blogfront_gateway_requests_total", "operation" => operation).increment(1);
        debug!(
            target = "blogfront::gateway",
            correlation_id = %meta.correlation_id,
            operation,
            url = %url,
            "request started"
        );

        let outcome = self.send(url, &meta).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(_) => debug!(
                target = "blogfront::gateway",
                correlation_id = %meta.correlation_id,
                operation,
                elapsed_ms,
                "request completed"
            ),
            Err(err) => {
                counter!("blogfront_gateway_failures_total", "operation" => operation)
                    .increment(1);
                warn!(
                    target = "blogfront::gateway",
                    correlation_id = %meta.correlation_id,
                    operation,
                    elapsed_ms,
                    error = %err,
                    "request failed"
                );
            }
        }
        outcome
    }

    async fn send(&self, url: Url, meta: &RequestMeta) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(url)
            .header(CORRELATION_ID_HEADER, meta.correlation_id.as_str())
            .header(REQUEST_TIMESTAMP_HEADER, meta.timestamp.as_str())
            .send()
            .await
            .map_err(|err| GatewayError::network(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| GatewayError::network(err.to_string()))?;
        debug!(
            target = "blogfront::gateway",
            correlation_id = %meta.correlation_id,
            status = status.as_u16(),
            "response received"
        );

        if !status.is_success() {
            return Err(GatewayError::Server {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| GatewayError::Server {
            status: status.as_u16(),
            body: format!("response body is not JSON: {err}"),
        })
    }

    async fn get_posts(
        &self,
        operation: &'static str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Post>, GatewayError> {
        let url = self.url("api/posts", query)?;
        let body = self.get_json(operation, url).await?;
        let list = screen_posts(&body)?;

        if !list.rejected.is_empty() {
            counter!("blogfront_gateway_rejected_posts_total", "operation" => operation)
                .increment(list.rejected.len() as u64);
        }
        for (index, error) in &list.rejected {
            warn!(
                target = "blogfront::gateway",
                operation,
                index,
                error = %error,
                "dropped post that failed validation"
            );
        }
        Ok(list.posts)
    }
}

#[async_trait]
impl PostGateway for HttpPostGateway {
    async fn fetch_all(&self) -> Result<Vec<Post>, GatewayError> {
        self.get_posts("fetch_all", &[]).await
    }

    async fn fetch_by_category(&self, name: &str) -> Result<Vec<Post>, GatewayError> {
        if name.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "category name must not be empty".to_string(),
            ));
        }
        self.get_posts("fetch_by_category", &[("category", name)]).await
    }

    async fn fetch_featured(&self) -> Result<Vec<Post>, GatewayError> {
        self.get_posts("fetch_featured", &[("featured", "true")]).await
    }

    async fn fetch_by_id(&self, id: u64) -> Result<Post, GatewayError> {
        if id == 0 {
            return Err(GatewayError::InvalidRequest(
                "post id must be a positive integer".to_string(),
            ));
        }
        let url = self.url(&format!("api/posts/{id}"), &[])?;
        match self.get_json("fetch_by_id", url).await {
            Ok(body) => Ok(validate_post(&body)?),
            Err(GatewayError::Server { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(GatewayError::NotFound)
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, GatewayError> {
        let url = self.url("api/categories", &[])?;
        let body = self.get_json("fetch_categories", url).await?;
        Ok(validate_categories(&body)?)
    }
}
