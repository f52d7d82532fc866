use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging. JSON output with span context so metric
/// queries and ingestion passes can be correlated downstream.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    if !config.tracing_enabled {
        return Ok(());
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(filter)
        .init();

    tracing::info!("fourkeys telemetry initialized with structured logging");
    Ok(())
}

/// Generate a correlation ID for linking an ingestion pass with the metric
/// queries that read its output.
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with common metric-query attributes.
pub fn create_metric_span(
    metric: &str,
    dataflow: Option<&str>,
    correlation_id: Option<&str>,
) -> tracing::Span {
    tracing::info_span!(
        "metric_query",
        metric = metric,
        dataflow = dataflow,
        correlation.id = correlation_id,
    )
}
