//! Collaborator interfaces the evaluation core consumes.
//!
//! The core never talks to the hosting platform directly: a [`SourceControl`]
//! supplies the policy file and a [`PullRequest`] supplies the changed files
//! and approvals and accepts the posted statuses. [`Snapshot`] implements both
//! from in-memory data.

use std::sync::Mutex;

use serde::Serialize;

use crate::error::Result;
use crate::eval::StatusResult;

/// Identifies the pull request a batch of controls is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRef {
    /// Repository full name, e.g. `calendly/mission-control`.
    pub repository: String,
    pub number: u64,
    /// Branch the pull request merges into; the policy file is read from here.
    pub base_ref: String,
    pub head_sha: String,
}

/// Read access to repository contents.
pub trait SourceControl: Send + Sync {
    /// Fetch a file at a ref. `Ok(None)` when the file does not exist there.
    fn fetch_file(&self, repository: &str, path: &str, git_ref: &str) -> Result<Option<Vec<u8>>>;
}

/// The pull request being evaluated.
///
/// Every call reads the same snapshot; the core never mutates it.
pub trait PullRequest: Send + Sync {
    fn pull_request(&self) -> &PullRequestRef;

    /// Paths touched by the pull request, with a leading `/`.
    fn changed_files(&self) -> Result<Vec<String>>;

    /// Identifiers of approving reviewers, in the order approvals were recorded.
    fn approvals(&self) -> Result<Vec<String>>;

    /// Report a control's status to the hosting platform.
    fn post_status(&self, status: &StatusResult) -> Result<()>;
}

/// In-memory pull request and repository contents.
///
/// Posted statuses are recorded and can be read back with [`Snapshot::posted`].
#[derive(Debug)]
pub struct Snapshot {
    pull_request: PullRequestRef,
    changed_files: Vec<String>,
    approvals: Vec<String>,
    /// `(path, contents)` available at the base ref.
    files: Vec<(String, Vec<u8>)>,
    posted: Mutex<Vec<StatusResult>>,
}

impl Snapshot {
    pub fn new(pull_request: PullRequestRef) -> Self {
        Self {
            pull_request,
            changed_files: Vec::new(),
            approvals: Vec::new(),
            files: Vec::new(),
            posted: Mutex::new(Vec::new()),
        }
    }

    /// Set the changed files. Paths without a leading `/` get one.
    pub fn with_changed_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed_files = files
            .into_iter()
            .map(|f| {
                let f = f.into();
                if f.starts_with('/') { f } else { format!("/{f}") }
            })
            .collect();
        self
    }

    pub fn with_approvals<I, S>(mut self, approvals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.approvals = approvals.into_iter().map(Into::into).collect();
        self
    }

    /// Make a file available at the pull request's base ref.
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.into(), contents.into()));
        self
    }

    /// Statuses posted so far, in posting order.
    pub fn posted(&self) -> Vec<StatusResult> {
        self.posted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SourceControl for Snapshot {
    fn fetch_file(&self, repository: &str, path: &str, git_ref: &str) -> Result<Option<Vec<u8>>> {
        if repository != self.pull_request.repository || git_ref != self.pull_request.base_ref {
            return Ok(None);
        }
        Ok(self
            .files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, contents)| contents.clone()))
    }
}

impl PullRequest for Snapshot {
    fn pull_request(&self) -> &PullRequestRef {
        &self.pull_request
    }

    fn changed_files(&self) -> Result<Vec<String>> {
        Ok(self.changed_files.clone())
    }

    fn approvals(&self) -> Result<Vec<String>> {
        Ok(self.approvals.clone())
    }

    fn post_status(&self, status: &StatusResult) -> Result<()> {
        self.posted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(status.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::State;

    fn pr() -> PullRequestRef {
        PullRequestRef {
            repository: "calendly/mission-control".into(),
            number: 23,
            base_ref: "base_branch".into(),
            head_sha: "abc123".into(),
        }
    }

    #[test]
    fn file_is_served_only_at_base_ref() {
        let snap = Snapshot::new(pr()).with_file(".mission-control.yml", "a: {}");
        let hit = snap
            .fetch_file("calendly/mission-control", ".mission-control.yml", "base_branch")
            .unwrap();
        assert_eq!(hit.as_deref(), Some(b"a: {}".as_slice()));
        let miss = snap
            .fetch_file("calendly/mission-control", ".mission-control.yml", "branch")
            .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn changed_files_are_rooted() {
        let snap = Snapshot::new(pr()).with_changed_files(["README.md", "/lib/a.rb"]);
        assert_eq!(snap.changed_files().unwrap(), vec!["/README.md", "/lib/a.rb"]);
    }

    #[test]
    fn posted_statuses_are_recorded() {
        let snap = Snapshot::new(pr());
        snap.post_status(&StatusResult::not_required("QA")).unwrap();
        let posted = snap.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].state, State::Success);
    }
}
