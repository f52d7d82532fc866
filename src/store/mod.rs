//! Collaborator contracts for data access.
//!
//! The engine never talks to a database or a forge API directly; it reads
//! time-bucketed aggregates and raw events through these traits. Concrete
//! backends own their connection settings, retries and timeouts; a failed
//! call is propagated, never retried here, since a retry could recompute on
//! partial data.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    AggregateKind, Commit, DailyAggregate, Dataflow, DateRange, MonitoringSample, PipelineRun,
};

pub mod git;
pub mod memory;

pub use git::GitCommitSource;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The entity does not exist, as opposed to "exists but has no events
    /// in range", which is a valid empty list.
    #[error("dataflow not found: {name}")]
    DataflowNotFound { name: String },

    #[error("store call timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    #[error("store backend failure during {operation}: {source}")]
    Backend {
        operation: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Read/write access to stored per-day aggregates.
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Lists aggregates of one kind inside `range`, ascending by day, at
    /// most one row per day. `key: None` is the general form: rows are
    /// summed across all entities per day.
    async fn list_daily(
        &self,
        kind: AggregateKind,
        key: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<DailyAggregate>, StoreError>;

    /// Replaces the stored rows for (kind, key) on the days present in
    /// `rows`. Deduplication across ingestion passes is the backend's
    /// concern.
    async fn create_daily(
        &self,
        kind: AggregateKind,
        key: &str,
        rows: Vec<DailyAggregate>,
    ) -> Result<(), StoreError>;
}

/// Raw-event access, used only by ingestion.
#[async_trait]
pub trait EventReader: Send + Sync {
    /// Commits in `repository` created inside `range`, ascending by
    /// creation time, parents in first-parent order.
    async fn list_commits(
        &self,
        repository: &str,
        range: DateRange,
    ) -> Result<Vec<Commit>, StoreError>;

    /// All runs of `pipeline`, ascending by completion time.
    async fn list_pipeline_runs(&self, pipeline: &str) -> Result<Vec<PipelineRun>, StoreError>;

    /// Monitoring series for `deployment`, ascending by sample time.
    async fn list_monitoring_samples(
        &self,
        deployment: &str,
    ) -> Result<Vec<MonitoringSample>, StoreError>;
}

/// Maps a dataflow name to the repository/pipeline/deployment keys the
/// orchestrators filter by.
#[async_trait]
pub trait DataflowResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Dataflow, StoreError>;
}
