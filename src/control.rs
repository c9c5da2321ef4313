//! Controls: named review policies evaluated against a pull request.

use crate::error::{Error, Result};
use crate::eval::{self, StatusResult, UserSpec, Verdict};
use crate::paths::{self, PathSpec};
use crate::platform::{PullRequest, PullRequestRef, SourceControl};
use crate::policy::{self, ControlConfig};

/// A single review policy row. Built fresh for each evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub name: String,
    pub users: UserSpec,
    pub paths: PathSpec,
    pub count: u32,
}

/// Where a control ended up after looking at the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// No changed file is in the control's scope.
    Inactive,
    /// The control applies; the verdict says whether it is satisfied.
    Active(Verdict),
}

/// A control whose evaluation or status post failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFailure {
    pub name: String,
    pub error: Error,
}

/// Outcome of evaluating every control of a policy file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Posted statuses, in policy-file order.
    pub results: Vec<StatusResult>,
    /// Controls that could not be evaluated or posted. No status was posted for them.
    pub failures: Vec<ControlFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl From<ControlConfig> for Control {
    fn from(config: ControlConfig) -> Self {
        Self {
            name: config.name,
            users: config.users,
            paths: config.paths,
            count: config.count,
        }
    }
}

impl Control {
    pub fn new(name: impl Into<String>, users: UserSpec, paths: PathSpec, count: u32) -> Self {
        Self {
            name: name.into(),
            users,
            paths,
            count,
        }
    }

    /// Whether any changed file is in this control's scope.
    pub fn is_active(&self, pull_request: &dyn PullRequest) -> Result<bool> {
        let files = pull_request.changed_files()?;
        Ok(paths::is_active(&self.paths, files.as_slice()))
    }

    /// Evaluate without posting. Approvals are only fetched for active controls.
    pub fn evaluate(&self, pull_request: &dyn PullRequest) -> Result<Evaluation> {
        if !self.is_active(pull_request)? {
            return Ok(Evaluation::Inactive);
        }
        let approvals = pull_request.approvals()?;
        Ok(Evaluation::Active(eval::evaluate(
            &self.users,
            self.count,
            approvals.as_slice(),
        )))
    }

    /// The status this control would post.
    pub fn status(&self, pull_request: &dyn PullRequest) -> Result<StatusResult> {
        Ok(match self.evaluate(pull_request)? {
            Evaluation::Inactive => StatusResult::not_required(&self.name),
            Evaluation::Active(verdict) => StatusResult {
                state: verdict.state,
                name: self.name.clone(),
                description: verdict.description,
            },
        })
    }

    /// Evaluate, post the status, and return what was posted.
    pub fn execute(&self, pull_request: &dyn PullRequest) -> Result<StatusResult> {
        let result = self.status(pull_request)?;
        pull_request.post_status(&result)?;
        log::info!(
            "{}#{} [{}] -> {}: {}",
            pull_request.pull_request().repository,
            pull_request.pull_request().number,
            result.name,
            result.state.label(),
            result.description
        );
        Ok(result)
    }

    /// Load the controls defined in the policy file at the pull request's base ref.
    ///
    /// A missing policy file yields no controls.
    pub fn fetch(
        source: &dyn SourceControl,
        pull_request: &PullRequestRef,
        policy_path: &str,
    ) -> Result<Vec<Control>> {
        let Some(contents) = source.fetch_file(
            &pull_request.repository,
            policy_path,
            &pull_request.base_ref,
        )?
        else {
            log::debug!(
                "{}: no {policy_path} at {}",
                pull_request.repository,
                pull_request.base_ref
            );
            return Ok(Vec::new());
        };
        let controls: Vec<Control> = policy::parse(&contents)?
            .into_iter()
            .map(Control::from)
            .collect();
        log::debug!(
            "{}: loaded {} control(s) from {policy_path}",
            pull_request.repository,
            controls.len()
        );
        Ok(controls)
    }

    /// Fetch and execute every control.
    ///
    /// Loading errors abort the batch. A failing control is recorded in the
    /// report and does not stop the others.
    pub fn execute_all(
        source: &dyn SourceControl,
        pull_request: &dyn PullRequest,
        policy_path: &str,
    ) -> Result<BatchReport> {
        let controls = Self::fetch(source, pull_request.pull_request(), policy_path)?;
        let mut report = BatchReport::default();
        for control in &controls {
            match control.execute(pull_request) {
                Ok(result) => report.results.push(result),
                Err(error) => {
                    log::warn!("control {:?} failed: {error}", control.name);
                    report.failures.push(ControlFailure {
                        name: control.name.clone(),
                        error,
                    });
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::State;
    use crate::platform::Snapshot;
    use crate::policy::DEFAULT_POLICY_PATH;

    fn snapshot() -> Snapshot {
        Snapshot::new(PullRequestRef {
            repository: "calendly/mission-control".into(),
            number: 23,
            base_ref: "base_branch".into(),
            head_sha: "abc123".into(),
        })
    }

    fn code_review(paths: &[&str], count: u32) -> Control {
        Control::new(
            "Code Review",
            UserSpec::from_users(["aterris"]),
            PathSpec::from_patterns(paths),
            count,
        )
    }

    #[test]
    fn inactive_is_not_required() {
        let snap = snapshot()
            .with_changed_files(["/README.md"])
            .with_approvals(["jperalta"]);
        let result = code_review(&["*", "!README.md"], 1).execute(&snap).unwrap();
        assert_eq!(result, StatusResult::not_required("Code Review"));
        assert_eq!(snap.posted(), vec![result]);
    }

    #[test]
    fn active_and_approved() {
        let snap = snapshot()
            .with_changed_files(["/lib/mission_control.rb"])
            .with_approvals(["aterris"]);
        let result = code_review(&["*"], 1).execute(&snap).unwrap();
        assert_eq!(result.state, State::Success);
        assert_eq!(result.description, "Required: 1 | Approved by: aterris");
    }

    #[test]
    fn no_changed_files_is_inactive() {
        let snap = snapshot();
        assert_eq!(
            code_review(&["*"], 1).evaluate(&snap).unwrap(),
            Evaluation::Inactive
        );
    }

    #[test]
    fn fetch_without_policy_file() {
        let snap = snapshot();
        let controls = Control::fetch(&snap, snap.pull_request(), DEFAULT_POLICY_PATH).unwrap();
        assert!(controls.is_empty());
    }

    #[test]
    fn fetch_propagates_malformed_policy() {
        let snap = snapshot().with_file(DEFAULT_POLICY_PATH, "- not\n- a mapping\n");
        let err = Control::fetch(&snap, snap.pull_request(), DEFAULT_POLICY_PATH).unwrap_err();
        assert!(matches!(err, Error::ConfigMalformed(_)));
    }
}
