//! mission-control: evaluates repository review policies against pull requests.
//!
//! A repository declares *controls* in a YAML policy file. Each control names
//! the approvers that count, the number of approvals required, and the file
//! paths it covers. For every pull request event, each control reports a
//! status: `success` with "Not Required" when none of the changed files fall
//! in its scope, otherwise `success` or `pending` depending on whether enough
//! relevant approvals were given.
//!
//! # Architecture
//!
//! - **[`paths`]** — Glob scope matching with `!` exclusions.
//! - **[`eval`]** — Approval sufficiency and the posted status types.
//! - **[`control`]** — Orchestration: fetch controls, evaluate, post statuses.
//! - **[`policy`]** — Policy file decoding into typed rows.
//! - **[`platform`]** — Collaborator traits for source control and the pull request.
//! - **[`event`]** — Webhook payload decoding.
//! - **[`config`]** — Tool settings: embedded defaults + user overlay merge.
//! - **[`logging`]** — stderr logger setup and the status log file.

/// Settings types, loading, and overlay merge logic.
pub mod config;
/// Control orchestration and batch execution.
pub mod control;
/// Crate error type.
pub mod error;
/// Approval evaluation and status types.
pub mod eval;
/// Webhook event decoding.
pub mod event;
/// Logger setup and status log records.
pub mod logging;
/// File-path scope matching.
pub mod paths;
/// Collaborator interfaces and the in-memory snapshot.
pub mod platform;
/// Policy file decoding.
pub mod policy;

pub use control::{BatchReport, Control, ControlFailure, Evaluation};
pub use error::{Error, Result};
pub use eval::{State, StatusResult};
pub use platform::{PullRequest, PullRequestRef, Snapshot, SourceControl};

/// Evaluate every control of the default policy file against a pull request.
///
/// This is the main entry point for tests and simple usage.
/// For a custom policy path, call [`Control::execute_all`] directly.
pub fn evaluate<P>(platform: &P) -> Result<BatchReport>
where
    P: SourceControl + PullRequest,
{
    Control::execute_all(platform, platform, policy::DEFAULT_POLICY_PATH)
}
