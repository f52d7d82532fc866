// fourkeys - DORA metrics engine
// Turns raw commit/pipeline/monitoring event streams into the four DORA
// metrics via daily aggregation and windowed moving averages.

pub mod config;
pub mod engine;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{FourkeysConfig, IngestConfig, ObservabilityConfig, StoreConfig};
pub use engine::{
    bucket_daily, extract_incidents, fill_gaps, moving_average, moving_average_ratio,
    reconstruct_changes, EngineError, FilledDaily, Relation, ZeroDenominator,
};
pub use ingest::{IngestPipeline, IngestSummary};
pub use metrics::{MetricsError, MetricsService};
pub use model::{
    AggregateKind, Change, Commit, DailyAggregate, DailySeries, Dataflow, DateRange, Incident,
    MetricQuery, MetricReport, MonitoringSample, PipelineRun, RunStatus,
};
pub use store::{
    AggregateStore, DataflowResolver, EventReader, GitCommitSource, MemoryStore, StoreError,
};
pub use telemetry::{create_metric_span, generate_correlation_id, init_telemetry};
