//! Lead time for changes: trailing average of the per-day mean span from a
//! change's first commit to its deployment.

use tracing::{debug, Instrument};

use super::{drop_padding, mean_series, validate_query, MetricsError, MetricsService};
use crate::engine::moving_average;
use crate::model::{AggregateKind, DailySeries, MetricQuery, MetricReport};
use crate::telemetry::create_metric_span;

impl MetricsService {
    /// Lead time for one dataflow's repository/pipeline pair.
    pub async fn lead_time_for_changes(
        &self,
        dataflow: &str,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        validate_query(&query)?;
        let flow = self.resolve(dataflow).await?;
        self.lead_time_report(Some(flow.pipeline.as_str()), Some(dataflow), query)
            .instrument(create_metric_span("lead_time_for_changes", Some(dataflow), None))
            .await
    }

    /// Lead time across every tracked dataflow.
    pub async fn lead_time_for_changes_all(
        &self,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        validate_query(&query)?;
        self.lead_time_report(None, None, query)
            .instrument(create_metric_span("lead_time_for_changes", None, None))
            .await
    }

    async fn lead_time_report(
        &self,
        key: Option<&str>,
        dataflow: Option<&str>,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        let filled = self.fetch_filled(AggregateKind::Changes, key, &query).await?;

        // The averaged series is the per-day mean lead time in seconds, so
        // the trailing average keeps per-change units; both raw series are
        // reported alongside.
        let mean_lead = mean_series(&filled.totals, &filled.counts);
        let moving_average = moving_average(&mean_lead, query.window)?;

        let changes = drop_padding(filled.counts, query.window);
        let lead_seconds = drop_padding(filled.totals, query.window);

        debug!(
            dataflow,
            start = %query.start,
            end = %query.end,
            window = query.window,
            "computed lead time for changes"
        );

        Ok(MetricReport {
            dataflow: dataflow.map(str::to_string),
            start: query.start,
            end: query.end,
            window: query.window,
            dates: query.range().days(),
            daily: vec![
                DailySeries::new("changes", changes),
                DailySeries::new("lead_seconds", lead_seconds),
            ],
            moving_average,
        })
    }
}
