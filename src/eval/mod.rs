//! Approval evaluation and the status types reported per control.

pub mod approvals;
pub mod decision;

pub use approvals::{UserSpec, Verdict, evaluate};
pub use decision::{NOT_REQUIRED, State, StatusResult};
