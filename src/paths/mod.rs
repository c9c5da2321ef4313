//! File-path scoping: decides whether a control applies to a pull request.

pub mod matcher;
pub mod types;

pub use matcher::{PathMatcher, is_active};
pub use types::{PathPattern, PathSpec};
