//! Metric orchestrators: one entry point per DORA metric, each following
//! the same template: validate the query, extend the range backward by
//! `window - 1` days, read aggregates, densify, run the moving-average
//! engine, then slice the padding back off so the report covers exactly the
//! requested range.

mod change_failure_rate;
mod deployment_frequency;
mod lead_time;
mod time_to_restore;

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::engine::{fill_gaps, EngineError, FilledDaily};
use crate::model::{AggregateKind, Dataflow, MetricQuery};
use crate::store::{AggregateStore, DataflowResolver, StoreError};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("window must be at least 1 day, got {window}")]
    InvalidWindow { window: usize },

    #[error("query start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Computes the four DORA metrics from stored daily aggregates. Stateless
/// apart from its collaborators; every call reads fresh data and returns a
/// freshly built report.
pub struct MetricsService {
    aggregates: Arc<dyn AggregateStore>,
    dataflows: Arc<dyn DataflowResolver>,
}

impl MetricsService {
    pub fn new(aggregates: Arc<dyn AggregateStore>, dataflows: Arc<dyn DataflowResolver>) -> Self {
        Self {
            aggregates,
            dataflows,
        }
    }

    /// Reads one aggregate family over the padded range and densifies it.
    /// The returned series are aligned with `query.padded_range().days()`.
    pub(crate) async fn fetch_filled(
        &self,
        kind: AggregateKind,
        key: Option<&str>,
        query: &MetricQuery,
    ) -> Result<FilledDaily, MetricsError> {
        let padded = query.padded_range();
        let rows = self.aggregates.list_daily(kind, key, padded).await?;
        let days = padded.days();
        Ok(fill_gaps(&days, &rows)?)
    }

    pub(crate) async fn resolve(&self, name: &str) -> Result<Dataflow, MetricsError> {
        Ok(self.dataflows.resolve(name).await?)
    }
}

pub(crate) fn validate_query(query: &MetricQuery) -> Result<(), MetricsError> {
    if query.window < 1 {
        return Err(MetricsError::InvalidWindow {
            window: query.window,
        });
    }
    if query.start > query.end {
        return Err(MetricsError::InvalidRange {
            start: query.start,
            end: query.end,
        });
    }
    Ok(())
}

/// Drops the `window - 1` lookback days from a padded per-day series so it
/// lines up with the requested range.
pub(crate) fn drop_padding(mut values: Vec<f64>, window: usize) -> Vec<f64> {
    values.split_off(window - 1)
}

/// Per-day mean of a (total, count) pair: `total / count`, 0.0 on days with
/// no events.
pub(crate) fn mean_series(totals: &[f64], counts: &[f64]) -> Vec<f64> {
    totals
        .iter()
        .zip(counts)
        .map(|(total, count)| if *count == 0.0 { 0.0 } else { total / count })
        .collect()
}
