//! Faults raised by dynamically invoked method and constructor bodies.
//!
//! A fault is the dynamic-world equivalent of an exception thrown by the callee. The driver never inspects
//! the kind beyond reporting it; it exists so hosts and tests can tell argument problems from failures the
//! callee raised on purpose.

use std::fmt;

use thiserror::Error;

/// Broad category of a [`Fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// The callee received arguments it cannot work with (wrong count or shape).
    InvalidArgument,
    /// The callee is in a state where the operation is not allowed.
    InvalidOperation,
    /// A test assertion failed inside a test body.
    Assertion,
    /// The operation was cancelled by a stop request.
    Cancelled,
    /// Anything else the callee reports.
    Internal,
}

impl FaultKind {
    /// Return the canonical spelling used in fault messages.
    pub fn as_str(self) -> &'static str {
        match self {
            FaultKind::InvalidArgument => "InvalidArgument",
            FaultKind::InvalidOperation => "InvalidOperation",
            FaultKind::Assertion => "AssertionFailed",
            FaultKind::Cancelled => "Cancelled",
            FaultKind::Internal => "InternalError",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure raised by a dynamically invoked body, formatted as `Kind: message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FaultKind::InvalidArgument, message)
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(FaultKind::InvalidOperation, message)
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Assertion, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_display_is_kind_prefixed() {
        let fault = Fault::invalid_argument("expected 2 arguments, got 1");
        assert_eq!(fault.to_string(), "InvalidArgument: expected 2 arguments, got 1");
    }
}
