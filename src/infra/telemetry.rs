use std::{io::IsTerminal, sync::Once};

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{
    application::{
        catalog::{METRIC_CATALOG_ITEMS, METRIC_CATALOG_WARNINGS},
        contact::{METRIC_CONTACT_FAILED, METRIC_CONTACT_SENT},
        session::METRIC_SESSIONS_EVICTED,
    },
    config::{LogFormat, LoggingSettings},
    infra::http::METRIC_HTTP_REQUEST_MS,
};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

const COUNTERS: &[(&str, &str)] = &[
    (
        METRIC_CATALOG_WARNINGS,
        "Content entries skipped or degraded while loading the catalog.",
    ),
    (
        METRIC_CONTACT_SENT,
        "Contact messages handed to the email transport.",
    ),
    (
        METRIC_CONTACT_FAILED,
        "Contact messages the transport rejected or timed out on.",
    ),
    (
        METRIC_SESSIONS_EVICTED,
        "Visitor sessions evicted because the store was full.",
    ),
];

/// Install the global tracing subscriber and describe folio's metrics.
///
/// Fails when a subscriber is already installed in this process.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(std::io::stdout().is_terminal())
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| InfraError::telemetry(format!("tracing subscriber already set: {err}")))?;

    debug!(
        target: "folio::telemetry",
        level = %logging.level,
        format = ?logging.format,
        "logging initialised"
    );
    Ok(())
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        for (name, description) in COUNTERS {
            describe_counter!(*name, Unit::Count, *description);
        }
        describe_gauge!(
            METRIC_CATALOG_ITEMS,
            Unit::Count,
            "Content items held by the loaded catalog."
        );
        describe_histogram!(
            METRIC_HTTP_REQUEST_MS,
            Unit::Milliseconds,
            "Time to answer one visitor request."
        );
    });
}
