#![forbid(unsafe_code)]

//! Error types for state access.
//!
//! The data path surfaces errors directly to the immediate caller with no
//! wrapping or retry: a failed write never notifies. Registration errors are
//! the one exception — `subscribe` absorbs them (see [`crate::StateCell`]).

use std::fmt;

/// Error returned by fallible state operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The value handed to `from_value` was not a JSON object.
    NotAnObject,
    /// Sequence access named a field that is not present.
    MissingField(String),
    /// Sequence access named a field whose current value is not an array.
    NotASequence(String),
    /// The working copy was already mutably borrowed when a write was
    /// attempted. The write did not happen and nothing was notified.
    StateBusy,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "initial value is not a JSON object"),
            Self::MissingField(key) => write!(f, "field `{key}` is not present"),
            Self::NotASequence(key) => write!(f, "field `{key}` is not a sequence"),
            Self::StateBusy => write!(f, "working copy is already mutably borrowed"),
        }
    }
}

impl std::error::Error for StateError {}
