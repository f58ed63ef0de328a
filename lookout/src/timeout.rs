use std::fmt::Display;

/// Occurs when an operation has timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout;

impl Display for Timeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation timed out")
    }
}

impl std::error::Error for Timeout {}
