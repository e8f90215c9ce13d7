use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
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

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "plaza_cache_hit_total",
            Unit::Count,
            "Cache hits, labelled by cache instance."
        );
        describe_counter!(
            "plaza_cache_miss_total",
            Unit::Count,
            "Cache misses, labelled by cache instance."
        );
        describe_counter!(
            "plaza_cache_expired_total",
            Unit::Count,
            "Entries dropped lazily after outliving their TTL."
        );
        describe_counter!(
            "plaza_cache_evict_total",
            Unit::Count,
            "Entries evicted by LRU capacity pressure."
        );
        describe_counter!(
            "plaza_client_fetch_issued_total",
            Unit::Count,
            "Underlying network fetches started by the client stats cache."
        );
        describe_counter!(
            "plaza_client_fetch_coalesced_total",
            Unit::Count,
            "Callers that attached to an already in-flight stats fetch."
        );
        describe_counter!(
            "plaza_auth_login_total",
            Unit::Count,
            "Successful logins."
        );
        describe_histogram!(
            "plaza_stats_batch_ms",
            Unit::Milliseconds,
            "Batch statistics aggregation latency in milliseconds."
        );
    });
}
