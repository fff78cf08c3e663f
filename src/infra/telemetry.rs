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
            "mortar_sign_in_total",
            Unit::Count,
            "Total number of successful admin sign-ins."
        );
        describe_counter!(
            "mortar_media_stored_total",
            Unit::Count,
            "Total number of image payloads written to media storage."
        );
        describe_counter!(
            "mortar_posts_created_total",
            Unit::Count,
            "Total number of posts created, labelled by kind."
        );
        describe_counter!(
            "mortar_posts_deleted_total",
            Unit::Count,
            "Total number of posts deleted, labelled by kind."
        );
        describe_counter!(
            "mortar_contact_messages_total",
            Unit::Count,
            "Total number of contact messages accepted."
        );
    });
}
