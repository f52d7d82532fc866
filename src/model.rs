//! Core data model for the metrics engine.
//!
//! Raw events (commits, pipeline runs, monitoring samples) arrive from
//! ingestion collaborators and are immutable once ingested. Everything the
//! engine derives from them (changes, incidents, daily aggregates, reports)
//! lives here too.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single commit as seen by the reconstructor. `parent_shas` preserves
/// parent order so first-parent history can be followed through merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub parent_shas: Vec<String>,
    pub repository: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Success,
    Failed,
    Running,
}

/// One CI/CD pipeline execution. `updated_at` is the completion time and
/// doubles as the deployment time for successful runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: u64,
    pub commit_sha: String,
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: RunStatus,
}

/// A point from a monitoring time series (e.g. an error-rate scrape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSample {
    pub value: f64,
    pub sampled_at: DateTime<Utc>,
}

/// A reconstructed outage interval for one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub deployment: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl Incident {
    pub fn duration(&self) -> Duration {
        self.ended_at - self.started_at
    }
}

/// One unit of delivered value: the span from the first commit of a change
/// to the pipeline run that deployed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub repository: String,
    pub pipeline: String,
    pub first_commit_at: DateTime<Utc>,
    pub deployed_at: DateTime<Utc>,
}

impl Change {
    /// Deployment time minus first-commit time. Non-negative by
    /// construction; the reconstructor rejects inverted inputs.
    pub fn lead_time(&self) -> Duration {
        self.deployed_at - self.first_commit_at
    }
}

/// One row per (entity key, UTC calendar day). Days with no events are not
/// stored; densification is the engine's job, not storage's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub day: NaiveDate,
    pub count: i64,
    pub total_seconds: i64,
}

impl DailyAggregate {
    pub fn new(day: NaiveDate, count: i64, total_seconds: i64) -> Self {
        Self {
            day,
            count,
            total_seconds,
        }
    }
}

/// The three aggregate families the store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    PipelineRuns,
    Changes,
    Incidents,
}

/// The {repository, pipeline, deployment} triple tracked as one unit for
/// metrics purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataflow {
    pub name: String,
    pub repository: String,
    pub pipeline: String,
    pub deployment: String,
}

/// Inclusive date range, used for aggregate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Dense list of every day in the range, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut day = self.start;
        while day <= self.end {
            days.push(day);
            day = day + Duration::days(1);
        }
        days
    }
}

/// A metric request: date range plus trailing-window size in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub window: usize,
}

impl MetricQuery {
    pub fn new(start: NaiveDate, end: NaiveDate, window: usize) -> Self {
        Self { start, end, window }
    }

    /// Start of the padded range: `window - 1` extra days of history so the
    /// first reported day already has a fully populated window behind it.
    pub fn padded_start(&self) -> NaiveDate {
        self.start - Duration::days(self.window as i64 - 1)
    }

    pub fn padded_range(&self) -> DateRange {
        DateRange::new(self.padded_start(), self.end)
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

/// One named per-day series inside a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl DailySeries {
    pub fn new(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }
}

/// The answer to a metric query. All vectors are index-aligned with `dates`
/// and cover exactly the requested `[start, end]` range, padding removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    /// Dataflow name, or `None` for the general (all-entities) form.
    pub dataflow: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub window: usize,
    pub dates: Vec<NaiveDate>,
    pub daily: Vec<DailySeries>,
    pub moving_average: Vec<f64>,
}
