//! Change failure rate: trailing ratio of incidents to deployments,
//! reported as a percentage.

use tracing::{debug, Instrument};

use super::{drop_padding, validate_query, MetricsError, MetricsService};
use crate::engine::{moving_average_ratio, ZeroDenominator};
use crate::model::{AggregateKind, DailySeries, MetricQuery, MetricReport};
use crate::telemetry::create_metric_span;

impl MetricsService {
    /// Change failure rate for one dataflow: its deployment's incidents
    /// over its pipeline's runs.
    pub async fn change_failure_rate(
        &self,
        dataflow: &str,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        validate_query(&query)?;
        let flow = self.resolve(dataflow).await?;
        self.change_failure_rate_report(
            Some(flow.deployment.as_str()),
            Some(flow.pipeline.as_str()),
            Some(dataflow),
            query,
        )
        .instrument(create_metric_span("change_failure_rate", Some(dataflow), None))
        .await
    }

    /// Change failure rate across every tracked dataflow.
    pub async fn change_failure_rate_all(
        &self,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        validate_query(&query)?;
        self.change_failure_rate_report(None, None, None, query)
            .instrument(create_metric_span("change_failure_rate", None, None))
            .await
    }

    async fn change_failure_rate_report(
        &self,
        incident_key: Option<&str>,
        run_key: Option<&str>,
        dataflow: Option<&str>,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        let incidents = self
            .fetch_filled(AggregateKind::Incidents, incident_key, &query)
            .await?;
        let runs = self
            .fetch_filled(AggregateKind::PipelineRuns, run_key, &query)
            .await?;

        // Ratio of window totals, not an average of daily ratios. Windows
        // with no deployments read as 0% rather than failing the query.
        let moving_average: Vec<f64> = moving_average_ratio(
            &incidents.counts,
            &runs.counts,
            query.window,
            ZeroDenominator::AsZero,
        )?
        .into_iter()
        .map(|ratio| ratio * 100.0)
        .collect();

        let incident_counts = drop_padding(incidents.counts, query.window);
        let deployment_counts = drop_padding(runs.counts, query.window);

        debug!(
            dataflow,
            start = %query.start,
            end = %query.end,
            window = query.window,
            "computed change failure rate"
        );

        Ok(MetricReport {
            dataflow: dataflow.map(str::to_string),
            start: query.start,
            end: query.end,
            window: query.window,
            dates: query.range().days(),
            daily: vec![
                DailySeries::new("incidents", incident_counts),
                DailySeries::new("deployments", deployment_counts),
            ],
            moving_average,
        })
    }
}
