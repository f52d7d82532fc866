//! End-to-end orchestrator tests against the in-memory store: seeded daily
//! aggregates in, metric reports out.

use std::sync::Arc;

use chrono::NaiveDate;
use fourkeys::{
    AggregateKind, DailyAggregate, Dataflow, MemoryStore, MetricQuery, MetricsError,
    MetricsService, StoreError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "series length differs");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() < 1e-9,
            "index {i}: expected {e}, got {a} (full series {actual:?})"
        );
    }
}

async fn service_with(store: Arc<MemoryStore>) -> MetricsService {
    store
        .insert_dataflow(Dataflow {
            name: "checkout".to_string(),
            repository: "checkout-api".to_string(),
            pipeline: "checkout-deploy".to_string(),
            deployment: "checkout-prod".to_string(),
        })
        .await;
    MetricsService::new(store.clone(), store)
}

#[tokio::test]
async fn deployment_frequency_smooths_sparse_run_totals() {
    let store = Arc::new(MemoryStore::new());
    // Daily totals [1,2,0,1,2,0] for Feb 4-9 plus the lookback history that
    // makes every 3-day window sum to 3. Feb 3, 6 and 9 are sparse holes.
    store
        .seed_daily(
            AggregateKind::PipelineRuns,
            "checkout-deploy",
            vec![
                DailyAggregate::new(date(2024, 2, 2), 2, 0),
                DailyAggregate::new(date(2024, 2, 4), 1, 0),
                DailyAggregate::new(date(2024, 2, 5), 2, 0),
                DailyAggregate::new(date(2024, 2, 7), 1, 0),
                DailyAggregate::new(date(2024, 2, 8), 2, 0),
            ],
        )
        .await;
    let service = service_with(store).await;

    let report = service
        .deployment_frequency(
            "checkout",
            MetricQuery::new(date(2024, 2, 4), date(2024, 2, 9), 3),
        )
        .await
        .unwrap();

    assert_eq!(report.dates.first(), Some(&date(2024, 2, 4)));
    assert_eq!(report.dates.last(), Some(&date(2024, 2, 9)));
    assert_close(&report.daily[0].values, &[1.0, 2.0, 0.0, 1.0, 2.0, 0.0]);
    assert_close(&report.moving_average, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
}

#[tokio::test]
async fn change_failure_rate_is_a_ratio_of_window_totals() {
    let store = Arc::new(MemoryStore::new());
    // Incidents [1,0,2,1,0,2,3] and deployments [5,4,6,2,8,5,10] across
    // Dec 24-30; zero-incident days are simply absent.
    let incidents = [(24, 1), (26, 2), (27, 1), (29, 2), (30, 3)];
    let deployments = [(24, 5), (25, 4), (26, 6), (27, 2), (28, 8), (29, 5), (30, 10)];
    store
        .seed_daily(
            AggregateKind::Incidents,
            "checkout-prod",
            incidents
                .iter()
                .map(|(d, n)| DailyAggregate::new(date(2023, 12, *d), *n, 0))
                .collect(),
        )
        .await;
    store
        .seed_daily(
            AggregateKind::PipelineRuns,
            "checkout-deploy",
            deployments
                .iter()
                .map(|(d, n)| DailyAggregate::new(date(2023, 12, *d), *n, 0))
                .collect(),
        )
        .await;
    let service = service_with(store).await;

    let report = service
        .change_failure_rate(
            "checkout",
            MetricQuery::new(date(2023, 12, 27), date(2023, 12, 29), 3),
        )
        .await
        .unwrap();

    assert_close(&report.daily[0].values, &[1.0, 0.0, 2.0]);
    assert_close(&report.daily[1].values, &[2.0, 8.0, 5.0]);
    assert_close(&report.moving_average, &[25.0, 18.75, 20.0]);
}

#[tokio::test]
async fn change_failure_rate_without_deployments_reads_zero() {
    let store = Arc::new(MemoryStore::new());
    store
        .seed_daily(
            AggregateKind::Incidents,
            "checkout-prod",
            vec![DailyAggregate::new(date(2024, 2, 5), 1, 0)],
        )
        .await;
    let service = service_with(store).await;

    let report = service
        .change_failure_rate(
            "checkout",
            MetricQuery::new(date(2024, 2, 4), date(2024, 2, 6), 2),
        )
        .await
        .unwrap();

    assert!(report.moving_average.iter().all(|v| v.is_finite()));
    assert_close(&report.moving_average, &[0.0, 0.0, 0.0]);
}

#[tokio::test]
async fn lead_time_averages_per_day_mean_lead() {
    let store = Arc::new(MemoryStore::new());
    // Feb 4: two changes totalling 400s of lead; Feb 5: none.
    store
        .seed_daily(
            AggregateKind::Changes,
            "checkout-deploy",
            vec![DailyAggregate::new(date(2024, 2, 4), 2, 400)],
        )
        .await;
    let service = service_with(store).await;

    let report = service
        .lead_time_for_changes(
            "checkout",
            MetricQuery::new(date(2024, 2, 4), date(2024, 2, 5), 1),
        )
        .await
        .unwrap();

    assert_close(&report.moving_average, &[200.0, 0.0]);
    assert_close(&report.daily[0].values, &[2.0, 0.0]);
    assert_close(&report.daily[1].values, &[400.0, 0.0]);
}

#[tokio::test]
async fn time_to_restore_averages_per_day_mean_downtime() {
    let store = Arc::new(MemoryStore::new());
    store
        .seed_daily(
            AggregateKind::Incidents,
            "checkout-prod",
            vec![
                DailyAggregate::new(date(2024, 2, 4), 2, 600),
                DailyAggregate::new(date(2024, 2, 5), 1, 900),
            ],
        )
        .await;
    let service = service_with(store).await;

    let report = service
        .time_to_restore(
            "checkout",
            MetricQuery::new(date(2024, 2, 4), date(2024, 2, 5), 2),
        )
        .await
        .unwrap();

    // Window of 2: mean of per-day means [0 (Feb 3), 300] then [300, 900].
    assert_close(&report.moving_average, &[150.0, 600.0]);
}

#[tokio::test]
async fn general_form_sums_across_pipelines() {
    let store = Arc::new(MemoryStore::new());
    store
        .seed_daily(
            AggregateKind::PipelineRuns,
            "checkout-deploy",
            vec![DailyAggregate::new(date(2024, 2, 4), 1, 0)],
        )
        .await;
    store
        .seed_daily(
            AggregateKind::PipelineRuns,
            "billing-deploy",
            vec![DailyAggregate::new(date(2024, 2, 4), 3, 0)],
        )
        .await;
    let service = service_with(store).await;

    let report = service
        .deployment_frequency_all(MetricQuery::new(date(2024, 2, 4), date(2024, 2, 4), 1))
        .await
        .unwrap();

    assert_eq!(report.dataflow, None);
    assert_close(&report.daily[0].values, &[4.0]);
    assert_close(&report.moving_average, &[4.0]);
}

#[tokio::test]
async fn report_range_matches_the_query_regardless_of_window() {
    let store = Arc::new(MemoryStore::new());
    let service = service_with(store).await;

    for window in [1usize, 2, 7, 30] {
        let query = MetricQuery::new(date(2024, 2, 4), date(2024, 2, 9), window);
        let report = service.deployment_frequency("checkout", query).await.unwrap();
        assert_eq!(report.dates.first(), Some(&date(2024, 2, 4)), "window {window}");
        assert_eq!(report.dates.last(), Some(&date(2024, 2, 9)), "window {window}");
        assert_eq!(report.dates.len(), 6);
        assert_eq!(report.moving_average.len(), 6);
        assert_eq!(report.daily[0].values.len(), 6);
    }
}

#[tokio::test]
async fn invalid_queries_fail_before_touching_the_store() {
    let store = Arc::new(MemoryStore::new());
    let service = service_with(store).await;

    let zero_window = service
        .deployment_frequency(
            "checkout",
            MetricQuery::new(date(2024, 2, 4), date(2024, 2, 9), 0),
        )
        .await;
    assert!(matches!(
        zero_window,
        Err(MetricsError::InvalidWindow { window: 0 })
    ));

    let inverted = service
        .time_to_restore(
            "checkout",
            MetricQuery::new(date(2024, 2, 9), date(2024, 2, 4), 3),
        )
        .await;
    assert!(matches!(inverted, Err(MetricsError::InvalidRange { .. })));
}

#[tokio::test]
async fn unknown_dataflow_is_a_typed_not_found() {
    let store = Arc::new(MemoryStore::new());
    let service = service_with(store).await;

    let result = service
        .lead_time_for_changes(
            "does-not-exist",
            MetricQuery::new(date(2024, 2, 4), date(2024, 2, 9), 3),
        )
        .await;
    assert!(matches!(
        result,
        Err(MetricsError::Store(StoreError::DataflowNotFound { .. }))
    ));
}
