//! Mean time to restore: trailing average of the per-day mean incident
//! duration.

use tracing::{debug, Instrument};

use super::{drop_padding, mean_series, validate_query, MetricsError, MetricsService};
use crate::engine::moving_average;
use crate::model::{AggregateKind, DailySeries, MetricQuery, MetricReport};
use crate::telemetry::create_metric_span;

impl MetricsService {
    /// Time to restore for one dataflow's deployment.
    pub async fn time_to_restore(
        &self,
        dataflow: &str,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        validate_query(&query)?;
        let flow = self.resolve(dataflow).await?;
        self.time_to_restore_report(Some(flow.deployment.as_str()), Some(dataflow), query)
            .instrument(create_metric_span("time_to_restore", Some(dataflow), None))
            .await
    }

    /// Time to restore across every tracked deployment.
    pub async fn time_to_restore_all(
        &self,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        validate_query(&query)?;
        self.time_to_restore_report(None, None, query)
            .instrument(create_metric_span("time_to_restore", None, None))
            .await
    }

    async fn time_to_restore_report(
        &self,
        key: Option<&str>,
        dataflow: Option<&str>,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        let filled = self
            .fetch_filled(AggregateKind::Incidents, key, &query)
            .await?;

        let mean_downtime = mean_series(&filled.totals, &filled.counts);
        let moving_average = moving_average(&mean_downtime, query.window)?;

        let incidents = drop_padding(filled.counts, query.window);
        let downtime_seconds = drop_padding(filled.totals, query.window);

        debug!(
            dataflow,
            start = %query.start,
            end = %query.end,
            window = query.window,
            "computed time to restore"
        );

        Ok(MetricReport {
            dataflow: dataflow.map(str::to_string),
            start: query.start,
            end: query.end,
            window: query.window,
            dates: query.range().days(),
            daily: vec![
                DailySeries::new("incidents", incidents),
                DailySeries::new("downtime_seconds", downtime_seconds),
            ],
            moving_average,
        })
    }
}
