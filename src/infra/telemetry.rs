use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber writing to stderr. Standard output is
/// left to the terminal overview.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "blogfront_overview_cycles_total",
            Unit::Count,
            "Total number of overview fetch cycles started."
        );
        describe_counter!(
            "blogfront_overview_cycles_superseded_total",
            Unit::Count,
            "Total number of overview cycles discarded because the filters changed."
        );
        describe_counter!(
            "blogfront_gateway_requests_total",
            Unit::Count,
            "Total number of requests sent to the post API."
        );
        describe_counter!(
            "blogfront_gateway_failures_total",
            Unit::Count,
            "Total number of post API requests that failed."
        );
        describe_counter!(
            "blogfront_gateway_rejected_posts_total",
            Unit::Count,
            "Total number of listed posts dropped because they failed validation."
        );
        describe_counter!(
            "blogfront_posts_created_total",
            Unit::Count,
            "Total number of posts created through the API."
        );
    });
}
