use thiserror::Error;

/// Errors surfaced by policy loading, event decoding and collaborator calls.
///
/// A missing policy file is not an error: it yields zero controls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The policy file exists but does not have the expected shape.
    #[error("malformed policy file: {0}")]
    ConfigMalformed(String),
    /// A call into the source-control or pull-request collaborator failed.
    #[error("{operation} failed: {message}")]
    Collaborator {
        operation: &'static str,
        message: String,
    },
    /// The webhook payload is missing a field the evaluation needs.
    #[error("invalid event payload: {0}")]
    InvalidEvent(String),
    /// The webhook event type does not carry a pull request.
    #[error("unsupported event type: {0}")]
    UnsupportedEvent(String),
    /// Tool settings could not be parsed.
    #[error("settings error: {0}")]
    Settings(String),
}

impl Error {
    /// Shorthand for a failed collaborator call.
    pub fn collaborator(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Collaborator {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
