//! Change reconstruction: pair each successful pipeline run with the first
//! commit of the change it deployed, via a first-parent walk of the commit
//! graph, and derive per-deployment lead times.

use std::collections::HashMap;

use tracing::debug;

use super::error::EngineError;
use crate::model::{Change, Commit, PipelineRun, RunStatus};

/// Reconstructs one [`Change`] per successful run in `runs`.
///
/// `commits` must be the chronologically ordered commit list spanning the
/// runs' history, including each run's trigger commit and its first parent.
/// The first parent of a trigger commit is the last commit of the
/// *previous* change, so the commit right after it in the ordered list is
/// where the current change began.
///
/// Assumes linear first-parent history per pipeline target branch. A
/// rewritten history (rebase, force-push) desynchronizes the pairing; that
/// is detected and reported instead of producing wrong lead times.
pub fn reconstruct_changes(
    commits: &[Commit],
    runs: &[PipelineRun],
) -> Result<Vec<Change>, EngineError> {
    let deployed: Vec<&PipelineRun> = runs
        .iter()
        .filter(|run| run.status == RunStatus::Success)
        .collect();

    if commits.is_empty() || deployed.is_empty() {
        return Err(EngineError::NoEvents);
    }

    for (index, pair) in commits.windows(2).enumerate() {
        if pair[1].created_at < pair[0].created_at {
            return Err(EngineError::UnsortedInput {
                context: "change reconstruction",
                index: index + 1,
            });
        }
    }

    let by_sha: HashMap<&str, &Commit> = commits
        .iter()
        .map(|commit| (commit.sha.as_str(), commit))
        .collect();

    // Boundary markers, one per run in run order: the trigger commit's
    // first parent is the last commit of the previous change.
    let mut boundaries = Vec::with_capacity(deployed.len());
    for run in &deployed {
        let trigger = by_sha
            .get(run.commit_sha.as_str())
            .ok_or_else(|| EngineError::UnknownCommit {
                run_id: run.id,
                sha: run.commit_sha.clone(),
            })?;
        let parent = trigger
            .parent_shas
            .first()
            .ok_or_else(|| EngineError::ShallowHistory {
                sha: trigger.sha.clone(),
            })?;
        boundaries.push(parent.clone());
    }

    // Single forward walk: find each boundary, take the commit right after
    // it as the change's first commit, then advance past both so a SHA is
    // never matched twice.
    let mut changes = Vec::with_capacity(deployed.len());
    let mut cursor = 0usize;
    for (run, boundary) in deployed.iter().zip(&boundaries) {
        let found = commits[cursor..]
            .iter()
            .position(|commit| commit.sha == *boundary)
            .map(|offset| cursor + offset);
        let boundary_index = found.ok_or_else(|| EngineError::HistoryDesync {
            sha: boundary.clone(),
        })?;
        let first_commit =
            commits
                .get(boundary_index + 1)
                .ok_or_else(|| EngineError::HistoryDesync {
                    sha: boundary.clone(),
                })?;
        cursor = boundary_index + 2;

        if run.updated_at < first_commit.created_at {
            return Err(EngineError::NegativeLeadTime {
                first_commit_at: first_commit.created_at,
                deployed_at: run.updated_at,
            });
        }

        debug!(
            run_id = run.id,
            first_commit = %first_commit.sha,
            lead_seconds = (run.updated_at - first_commit.created_at).num_seconds(),
            "paired pipeline run with change start"
        );

        changes.push(Change {
            repository: first_commit.repository.clone(),
            pipeline: run.pipeline.clone(),
            first_commit_at: first_commit.created_at,
            deployed_at: run.updated_at,
        });
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn commit(sha: &str, parents: &[&str], created_at: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            parent_shas: parents.iter().map(|p| p.to_string()).collect(),
            repository: "api".to_string(),
            created_at: at(created_at),
        }
    }

    fn run(id: u64, sha: &str, updated_at: &str) -> PipelineRun {
        PipelineRun {
            id,
            commit_sha: sha.to_string(),
            pipeline: "api-deploy".to_string(),
            started_at: at(updated_at) - Duration::minutes(2),
            updated_at: at(updated_at),
            status: RunStatus::Success,
        }
    }

    /// Merge chain on main with two deployed merges; the commits between
    /// the merges are the feature work each change delivered.
    fn merge_history() -> Vec<Commit> {
        vec![
            commit("b9b4a4d0", &["deadbeef", "cafecafe"], "2024-03-01T10:00:00Z"),
            commit("f111f111", &["b9b4a4d0"], "2024-03-01T10:00:22Z"),
            commit("3d95e6c1", &["b9b4a4d0", "f111f111"], "2024-03-01T10:02:00Z"),
            commit("487d9b2e", &["3d95e6c1"], "2024-03-01T10:05:00Z"),
            commit("f222f222", &["487d9b2e"], "2024-03-01T10:05:19Z"),
            commit("1db2c3a7", &["487d9b2e", "f222f222"], "2024-03-01T10:07:00Z"),
        ]
    }

    #[test]
    fn pairs_runs_with_first_commits_across_merges() {
        let commits = merge_history();
        let runs = vec![
            run(1, "3d95e6c1", "2024-03-01T10:04:00Z"),
            run(2, "1db2c3a7", "2024-03-01T10:09:00Z"),
        ];

        let changes = reconstruct_changes(&commits, &runs).unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].first_commit_at, at("2024-03-01T10:00:22Z"));
        assert_eq!(changes[0].lead_time(), Duration::seconds(218));
        assert_eq!(changes[1].first_commit_at, at("2024-03-01T10:05:19Z"));
        assert_eq!(changes[1].lead_time(), Duration::seconds(221));
    }

    #[test]
    fn ignores_failed_and_running_runs() {
        let commits = merge_history();
        let mut failed = run(3, "3d95e6c1", "2024-03-01T10:03:00Z");
        failed.status = RunStatus::Failed;
        let runs = vec![failed, run(4, "1db2c3a7", "2024-03-01T10:09:00Z")];

        let changes = reconstruct_changes(&commits, &runs).unwrap();

        // The failed run contributes no boundary, so the walk starts at the
        // second run's boundary instead.
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].first_commit_at, at("2024-03-01T10:05:19Z"));
    }

    #[test]
    fn empty_inputs_are_an_error_not_a_panic() {
        let commits = merge_history();
        assert_eq!(
            reconstruct_changes(&[], &[run(1, "3d95e6c1", "2024-03-01T10:04:00Z")]),
            Err(EngineError::NoEvents)
        );
        assert_eq!(reconstruct_changes(&commits, &[]), Err(EngineError::NoEvents));
    }

    #[test]
    fn unknown_trigger_commit_is_reported_with_the_run() {
        let commits = merge_history();
        let runs = vec![run(9, "0000aaaa", "2024-03-01T10:04:00Z")];
        assert_eq!(
            reconstruct_changes(&commits, &runs),
            Err(EngineError::UnknownCommit {
                run_id: 9,
                sha: "0000aaaa".to_string()
            })
        );
    }

    #[test]
    fn rewritten_history_is_detected() {
        // Second run's boundary precedes the walk cursor after the first
        // pairing, as happens after a force-push rewrites the chain.
        let commits = merge_history();
        let runs = vec![
            run(1, "1db2c3a7", "2024-03-01T10:09:00Z"),
            run(2, "3d95e6c1", "2024-03-01T10:10:00Z"),
        ];
        assert_eq!(
            reconstruct_changes(&commits, &runs),
            Err(EngineError::HistoryDesync {
                sha: "b9b4a4d0".to_string()
            })
        );
    }

    #[test]
    fn root_trigger_commit_is_a_shallow_history_error() {
        let commits = vec![
            commit("aaaa0000", &[], "2024-03-01T10:00:00Z"),
            commit("bbbb1111", &["aaaa0000"], "2024-03-01T10:01:00Z"),
        ];
        let runs = vec![run(1, "aaaa0000", "2024-03-01T10:05:00Z")];
        assert_eq!(
            reconstruct_changes(&commits, &runs),
            Err(EngineError::ShallowHistory {
                sha: "aaaa0000".to_string()
            })
        );
    }

    #[test]
    fn deployment_before_first_commit_fails_fast() {
        let commits = merge_history();
        let runs = vec![run(1, "3d95e6c1", "2024-03-01T10:00:10Z")];
        let err = reconstruct_changes(&commits, &runs).unwrap_err();
        assert!(matches!(err, EngineError::NegativeLeadTime { .. }));
    }
}
