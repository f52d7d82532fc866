//! Local-clone commit source.
//!
//! Reads commit history straight out of a git repository on disk, producing
//! the time-ordered, first-parent-preserving [`Commit`] records the change
//! reconstructor needs, useful for feeding ingestion without a forge API.
//! git2 repositories are not `Send`, so this stays a synchronous helper
//! rather than an [`super::EventReader`] implementation; callers hand its
//! output to ingestion themselves.

use anyhow::{Context, Result};
use chrono::DateTime;
use git2::{Repository, Sort};
use std::path::Path;

use crate::model::{Commit, DateRange};

pub struct GitCommitSource {
    repo: Repository,
    repository: String,
}

impl GitCommitSource {
    /// Opens the clone at `path`; `repository` is the key stamped onto the
    /// produced commits.
    pub fn open<P: AsRef<Path>>(path: P, repository: &str) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        Ok(Self {
            repo,
            repository: repository.to_string(),
        })
    }

    /// Commits reachable from HEAD whose commit time falls inside `range`,
    /// oldest first. Parent order is preserved, so index 0 of
    /// `parent_shas` is the first parent.
    pub fn commits_in(&self, range: DateRange) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk().context("Failed to start revwalk")?;
        revwalk.push_head().context("Repository has no HEAD")?;
        revwalk
            .set_sorting(Sort::TIME | Sort::REVERSE)
            .context("Failed to set revwalk sorting")?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid.context("Revwalk failed")?;
            let commit = self
                .repo
                .find_commit(oid)
                .with_context(|| format!("Commit {oid} disappeared during walk"))?;
            let created_at = DateTime::from_timestamp(commit.time().seconds(), 0)
                .with_context(|| format!("Commit {oid} has an out-of-range timestamp"))?;

            if !range.contains(created_at.date_naive()) {
                continue;
            }

            commits.push(Commit {
                sha: oid.to_string(),
                parent_shas: commit.parent_ids().map(|id| id.to_string()).collect(),
                repository: self.repository.clone(),
                created_at,
            });
        }

        Ok(commits)
    }
}
