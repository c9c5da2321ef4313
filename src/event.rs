//! Webhook event decoding.
//!
//! Turns a `pull_request` or `pull_request_review` payload into the
//! [`PullRequestRef`] the controls are evaluated against, and decides whether
//! the action warrants a re-evaluation.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::platform::PullRequestRef;

/// Webhook event types that carry a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    PullRequestReview,
}

impl EventKind {
    pub fn parse(event_type: &str) -> Result<Self> {
        match event_type {
            "pull_request" => Ok(EventKind::PullRequest),
            "pull_request_review" => Ok(EventKind::PullRequestReview),
            other => Err(Error::UnsupportedEvent(other.to_string())),
        }
    }

    /// Actions after which statuses may have changed.
    fn triggering_actions(self) -> &'static [&'static str] {
        match self {
            EventKind::PullRequest => &["opened", "reopened", "synchronize", "edited"],
            EventKind::PullRequestReview => &["submitted", "dismissed", "edited"],
        }
    }
}

#[derive(Debug, Deserialize)]
struct Payload {
    action: Option<String>,
    pull_request: Option<PullRequestPayload>,
    repository: Option<RepositoryPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: Option<PrNumber>,
    head: Option<RefPayload>,
    base: Option<RefPayload>,
}

/// Some senders stringify the pull request number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PrNumber {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RefPayload {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    full_name: Option<String>,
}

/// A decoded pull-request event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub kind: EventKind,
    pub action: String,
    pub pull_request: PullRequestRef,
}

impl PullRequestEvent {
    pub fn from_payload(event_type: &str, payload: serde_json::Value) -> Result<Self> {
        let kind = EventKind::parse(event_type)?;
        let payload: Payload =
            serde_json::from_value(payload).map_err(|e| Error::InvalidEvent(e.to_string()))?;

        let pr = payload
            .pull_request
            .ok_or_else(|| missing("pull_request"))?;
        let number = match pr.number.ok_or_else(|| missing("pull_request.number"))? {
            PrNumber::Number(n) => n,
            PrNumber::Text(s) => s.trim().parse().map_err(|_| {
                Error::InvalidEvent(format!("pull_request.number is not a number: {s:?}"))
            })?,
        };
        let base_ref = pr
            .base
            .and_then(|b| b.git_ref)
            .ok_or_else(|| missing("pull_request.base.ref"))?;
        let head_sha = pr
            .head
            .and_then(|h| h.sha)
            .ok_or_else(|| missing("pull_request.head.sha"))?;
        let repository = payload
            .repository
            .and_then(|r| r.full_name)
            .ok_or_else(|| missing("repository.full_name"))?;

        Ok(Self {
            kind,
            action: payload.action.unwrap_or_default(),
            pull_request: PullRequestRef {
                repository,
                number,
                base_ref,
                head_sha,
            },
        })
    }

    /// Whether this event should trigger a control evaluation.
    pub fn should_evaluate(&self) -> bool {
        self.kind
            .triggering_actions()
            .contains(&self.action.as_str())
    }
}

fn missing(field: &str) -> Error {
    Error::InvalidEvent(format!("missing {field}"))
}
