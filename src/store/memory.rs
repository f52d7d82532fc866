//! In-memory store backend. Backs the test suites and small demos; every
//! trait the engine consumes is implemented over `tokio::sync::RwLock`
//! maps.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AggregateStore, DataflowResolver, EventReader, StoreError};
use crate::model::{
    AggregateKind, Commit, DailyAggregate, Dataflow, DateRange, MonitoringSample, PipelineRun,
};

#[derive(Default)]
pub struct MemoryStore {
    aggregates: RwLock<HashMap<(AggregateKind, String), Vec<DailyAggregate>>>,
    dataflows: RwLock<HashMap<String, Dataflow>>,
    commits: RwLock<HashMap<String, Vec<Commit>>>,
    runs: RwLock<HashMap<String, Vec<PipelineRun>>>,
    samples: RwLock<HashMap<String, Vec<MonitoringSample>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_dataflow(&self, dataflow: Dataflow) {
        self.dataflows
            .write()
            .await
            .insert(dataflow.name.clone(), dataflow);
    }

    pub async fn insert_commits(&self, repository: &str, commits: Vec<Commit>) {
        self.commits
            .write()
            .await
            .entry(repository.to_string())
            .or_default()
            .extend(commits);
    }

    pub async fn insert_pipeline_runs(&self, pipeline: &str, runs: Vec<PipelineRun>) {
        self.runs
            .write()
            .await
            .entry(pipeline.to_string())
            .or_default()
            .extend(runs);
    }

    pub async fn insert_monitoring_samples(&self, deployment: &str, series: Vec<MonitoringSample>) {
        self.samples
            .write()
            .await
            .entry(deployment.to_string())
            .or_default()
            .extend(series);
    }

    /// Seeds aggregate rows directly, bypassing ingestion. Rows are kept
    /// sorted by day.
    pub async fn seed_daily(&self, kind: AggregateKind, key: &str, rows: Vec<DailyAggregate>) {
        let mut aggregates = self.aggregates.write().await;
        let stored = aggregates.entry((kind, key.to_string())).or_default();
        stored.extend(rows);
        stored.sort_by_key(|row| row.day);
    }
}

#[async_trait]
impl AggregateStore for MemoryStore {
    async fn list_daily(
        &self,
        kind: AggregateKind,
        key: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<DailyAggregate>, StoreError> {
        let aggregates = self.aggregates.read().await;
        match key {
            Some(key) => Ok(aggregates
                .get(&(kind, key.to_string()))
                .map(|rows| {
                    rows.iter()
                        .filter(|row| range.contains(row.day))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()),
            None => {
                // General form: fold every entity of this kind into one row
                // per day.
                let mut merged: BTreeMap<chrono::NaiveDate, (i64, i64)> = BTreeMap::new();
                for ((stored_kind, _), rows) in aggregates.iter() {
                    if *stored_kind != kind {
                        continue;
                    }
                    for row in rows.iter().filter(|row| range.contains(row.day)) {
                        let entry = merged.entry(row.day).or_insert((0, 0));
                        entry.0 += row.count;
                        entry.1 += row.total_seconds;
                    }
                }
                Ok(merged
                    .into_iter()
                    .map(|(day, (count, total_seconds))| {
                        DailyAggregate::new(day, count, total_seconds)
                    })
                    .collect())
            }
        }
    }

    async fn create_daily(
        &self,
        kind: AggregateKind,
        key: &str,
        rows: Vec<DailyAggregate>,
    ) -> Result<(), StoreError> {
        let mut aggregates = self.aggregates.write().await;
        let stored = aggregates.entry((kind, key.to_string())).or_default();
        for row in rows {
            match stored.iter_mut().find(|existing| existing.day == row.day) {
                Some(existing) => *existing = row,
                None => stored.push(row),
            }
        }
        stored.sort_by_key(|row| row.day);
        Ok(())
    }
}

#[async_trait]
impl EventReader for MemoryStore {
    async fn list_commits(
        &self,
        repository: &str,
        range: DateRange,
    ) -> Result<Vec<Commit>, StoreError> {
        Ok(self
            .commits
            .read()
            .await
            .get(repository)
            .map(|commits| {
                commits
                    .iter()
                    .filter(|commit| range.contains(commit.created_at.date_naive()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_pipeline_runs(&self, pipeline: &str) -> Result<Vec<PipelineRun>, StoreError> {
        Ok(self
            .runs
            .read()
            .await
            .get(pipeline)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_monitoring_samples(
        &self,
        deployment: &str,
    ) -> Result<Vec<MonitoringSample>, StoreError> {
        Ok(self
            .samples
            .read()
            .await
            .get(deployment)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl DataflowResolver for MemoryStore {
    async fn resolve(&self, name: &str) -> Result<Dataflow, StoreError> {
        self.dataflows
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::DataflowNotFound {
                name: name.to_string(),
            })
    }
}
