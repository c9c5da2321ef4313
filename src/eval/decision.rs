use serde::Serialize;

/// Coarse outcome reported to the hosting platform for one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Success,
    Pending,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Success => "success",
            State::Pending => "pending",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            State::Success => "SUCCESS",
            State::Pending => "PENDING",
        }
    }
}

/// Description posted for a control whose paths did not match the pull request.
pub const NOT_REQUIRED: &str = "Not Required";

/// The status posted for one control. Recomputed on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    pub state: State,
    /// Status check name; equals the control name.
    pub name: String,
    pub description: String,
}

impl StatusResult {
    /// The fixed result for a control that does not apply.
    pub fn not_required(name: &str) -> Self {
        Self {
            state: State::Success,
            name: name.to_string(),
            description: NOT_REQUIRED.to_string(),
        }
    }
}
