//! Ingestion: pull raw events for a dataflow, derive changes and
//! incidents, bucket everything into daily aggregates and write them back.
//!
//! The three sources are independent, so their reads fan out concurrently
//! and join fail-fast: if any read errors, nothing is aggregated, since
//! partial data would silently skew every metric downstream.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tokio::try_join;
use tracing::{debug, info};

use crate::config::IngestConfig;
use crate::engine::{bucket_daily, extract_incidents, reconstruct_changes};
use crate::metrics::MetricsError;
use crate::model::{AggregateKind, Change, DateRange, PipelineRun, RunStatus};
use crate::store::{AggregateStore, DataflowResolver, EventReader};

/// What one ingestion pass produced, per aggregate family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub dataflow: String,
    pub pipeline_run_days: usize,
    pub change_days: usize,
    pub incident_days: usize,
}

pub struct IngestPipeline {
    events: Arc<dyn EventReader>,
    aggregates: Arc<dyn AggregateStore>,
    dataflows: Arc<dyn DataflowResolver>,
    config: IngestConfig,
}

impl IngestPipeline {
    pub fn new(
        events: Arc<dyn EventReader>,
        aggregates: Arc<dyn AggregateStore>,
        dataflows: Arc<dyn DataflowResolver>,
        config: IngestConfig,
    ) -> Self {
        Self {
            events,
            aggregates,
            dataflows,
            config,
        }
    }

    /// Runs one ingestion pass for `name` over `range`.
    pub async fn sync_dataflow(
        &self,
        name: &str,
        range: DateRange,
    ) -> Result<IngestSummary, MetricsError> {
        let correlation_id = crate::telemetry::generate_correlation_id();
        let flow = self.dataflows.resolve(name).await?;

        let (commits, runs, samples) = try_join!(
            self.events.list_commits(&flow.repository, range),
            self.events.list_pipeline_runs(&flow.pipeline),
            self.events.list_monitoring_samples(&flow.deployment),
        )?;

        debug!(
            dataflow = name,
            correlation.id = %correlation_id,
            commits = commits.len(),
            runs = runs.len(),
            samples = samples.len(),
            "collected raw events"
        );

        // Runs come back unfiltered, so the range is applied here; the
        // commit read is already range-scoped.
        let deployed: Vec<PipelineRun> = runs
            .into_iter()
            .filter(|run| {
                run.status == RunStatus::Success && range.contains(run.updated_at.date_naive())
            })
            .collect();

        // An idle dataflow (nothing deployed in range) is normal. Deployed
        // runs with no commits in range are not: the reconstructor surfaces
        // the missing history instead of letting lead time read as zero.
        let changes: Vec<Change> = if deployed.is_empty() {
            Vec::new()
        } else {
            reconstruct_changes(&commits, &deployed)?
        };

        // Extraction needs the whole series so continuation gaps are judged
        // correctly; only incidents starting in range are aggregated.
        let mut incidents = extract_incidents(
            &samples,
            self.config.relation,
            self.config.threshold,
            Duration::seconds(self.config.sampling_step_seconds),
            &flow.deployment,
        )?;
        incidents.retain(|incident| range.contains(incident.started_at.date_naive()));

        let run_rows = bucket_daily(&deployed, |run| run.updated_at, |_| 0)?;
        let change_rows = bucket_daily(
            &changes,
            |change| change.deployed_at,
            |change| change.lead_time().num_seconds(),
        )?;
        let incident_rows = bucket_daily(
            &incidents,
            |incident| incident.started_at,
            |incident| incident.duration().num_seconds(),
        )?;

        let summary = IngestSummary {
            dataflow: name.to_string(),
            pipeline_run_days: run_rows.len(),
            change_days: change_rows.len(),
            incident_days: incident_rows.len(),
        };

        self.aggregates
            .create_daily(AggregateKind::PipelineRuns, &flow.pipeline, run_rows)
            .await?;
        self.aggregates
            .create_daily(AggregateKind::Changes, &flow.pipeline, change_rows)
            .await?;
        self.aggregates
            .create_daily(AggregateKind::Incidents, &flow.deployment, incident_rows)
            .await?;

        info!(
            dataflow = name,
            correlation.id = %correlation_id,
            pipeline_run_days = summary.pipeline_run_days,
            change_days = summary.change_days,
            incident_days = summary.incident_days,
            "ingestion pass complete"
        );

        Ok(summary)
    }
}
