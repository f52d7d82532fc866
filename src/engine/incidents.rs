//! Incident extraction: turn a monitoring time series plus a threshold
//! predicate into discrete outage intervals, tolerant of scrape jitter.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::EngineError;
use crate::model::{Incident, MonitoringSample};

/// How a sample value relates to the threshold to count as an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Breaching when value > threshold (error rates, latencies).
    Gt,
    /// Breaching when value < threshold (availability, success ratios).
    Lt,
}

impl Relation {
    fn breaching(&self, sample: &MonitoringSample, threshold: f64) -> bool {
        match self {
            Relation::Gt => sample.value > threshold,
            Relation::Lt => sample.value < threshold,
        }
    }
}

/// Extracts non-overlapping incident intervals from a chronologically
/// ordered sample series. `step` is the expected scrape interval;
/// consecutive breaching samples further apart than 1.5 × `step` belong to
/// separate incidents, which keeps upstream jitter from splitting one
/// incident without merging genuinely distinct ones.
///
/// When every sample breaches, the whole series is reported as one ongoing
/// incident. That conflates "always failing" with "one long incident" and
/// is a deliberate policy, kept from the original collection behavior.
pub fn extract_incidents(
    samples: &[MonitoringSample],
    relation: Relation,
    threshold: f64,
    step: Duration,
    deployment: &str,
) -> Result<Vec<Incident>, EngineError> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1].sampled_at < pair[0].sampled_at {
            return Err(EngineError::UnsortedInput {
                context: "incident extraction",
                index: index + 1,
            });
        }
    }

    let close = |from: usize, to: usize| Incident {
        deployment: deployment.to_string(),
        started_at: samples[from].sampled_at,
        ended_at: samples[to].sampled_at,
    };

    // No healthy sample at all: one incident spanning the whole series.
    let Some(first_healthy) = samples
        .iter()
        .position(|sample| !relation.breaching(sample, threshold))
    else {
        return Ok(vec![close(0, samples.len() - 1)]);
    };

    // An incident already active when observation begins is ignored; the
    // scan starts at the first healthy sample.
    let tolerance = step + step / 2;
    let mut incidents = Vec::new();
    let mut open: Option<usize> = None;

    for i in first_healthy..samples.len() {
        if relation.breaching(&samples[i], threshold) {
            match open {
                None => open = Some(i),
                Some(start) => {
                    let elapsed = samples[i].sampled_at - samples[i - 1].sampled_at;
                    if elapsed > tolerance {
                        // Gap too large for one scrape run: the previous
                        // incident ended, a new one begins here.
                        incidents.push(close(start, i - 1));
                        open = Some(i);
                    }
                }
            }
        } else if let Some(start) = open.take() {
            incidents.push(close(start, i - 1));
        }
    }

    if let Some(start) = open {
        incidents.push(close(start, samples.len() - 1));
    }

    debug!(
        deployment,
        samples = samples.len(),
        incidents = incidents.len(),
        "extracted incident intervals"
    );

    Ok(incidents)
}
