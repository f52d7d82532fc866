//! Deployment frequency: trailing average of successful pipeline runs per
//! day.

use tracing::{debug, Instrument};

use super::{drop_padding, validate_query, MetricsError, MetricsService};
use crate::engine::moving_average;
use crate::model::{AggregateKind, DailySeries, MetricQuery, MetricReport};
use crate::telemetry::create_metric_span;

impl MetricsService {
    /// Deployment frequency for one dataflow's pipeline.
    pub async fn deployment_frequency(
        &self,
        dataflow: &str,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        validate_query(&query)?;
        let flow = self.resolve(dataflow).await?;
        self.deployment_frequency_report(Some(flow.pipeline.as_str()), Some(dataflow), query)
            .instrument(create_metric_span("deployment_frequency", Some(dataflow), None))
            .await
    }

    /// Deployment frequency across every tracked pipeline.
    pub async fn deployment_frequency_all(
        &self,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        validate_query(&query)?;
        self.deployment_frequency_report(None, None, query)
            .instrument(create_metric_span("deployment_frequency", None, None))
            .await
    }

    async fn deployment_frequency_report(
        &self,
        key: Option<&str>,
        dataflow: Option<&str>,
        query: MetricQuery,
    ) -> Result<MetricReport, MetricsError> {
        let filled = self
            .fetch_filled(AggregateKind::PipelineRuns, key, &query)
            .await?;

        let moving_average = moving_average(&filled.counts, query.window)?;
        let deployments = drop_padding(filled.counts, query.window);

        debug!(
            dataflow,
            start = %query.start,
            end = %query.end,
            window = query.window,
            "computed deployment frequency"
        );

        Ok(MetricReport {
            dataflow: dataflow.map(str::to_string),
            start: query.start,
            end: query.end,
            window: query.window,
            dates: query.range().days(),
            daily: vec![DailySeries::new("deployments", deployments)],
            moving_average,
        })
    }
}
