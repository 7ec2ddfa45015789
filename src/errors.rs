//! Error taxonomy for the bridge.
//!
//! Every failure of a dynamic lookup or invocation is translated into one of these variants at the
//! operation boundary. Nothing is retried.

use miette::Diagnostic;
use testbridge_core::Fault;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BridgeError {
    /// The framework module does not expose the controller type.
    #[error("framework module `{framework}` is not supported: {detail}")]
    #[diagnostic(
        code(testbridge::framework_incompatible),
        help("the framework module is not a supported version; load it with a framework that defines the controller type")
    )]
    FrameworkIncompatible { framework: String, detail: String },

    /// No public instance operation on the controller accepts the supplied arguments.
    #[error("operation `{operation}` is not available on `{controller}`")]
    #[diagnostic(
        code(testbridge::operation_unavailable),
        help("the framework version may be missing this operation, or the argument shapes do not match")
    )]
    OperationUnavailable { operation: String, controller: String },

    #[error("no test modules are loaded")]
    #[diagnostic(code(testbridge::not_loaded), help("call `load` at least once before counting, exploring or running"))]
    NotLoaded,

    /// An exact-signature call was given arguments that do not fit the signature.
    #[error("arguments for `{operation}` do not match ({expected})")]
    #[diagnostic(code(testbridge::argument_mismatch))]
    ArgumentMismatch { operation: String, expected: String },

    #[error("constructing `{type_name}` failed")]
    #[diagnostic(code(testbridge::construction))]
    Construction {
        type_name: String,
        #[source]
        source: Fault,
    },

    /// The controller raised a fault while executing an operation.
    #[error("`{operation}` failed")]
    #[diagnostic(code(testbridge::invocation))]
    Invocation {
        operation: String,
        #[source]
        source: Fault,
    },

    #[error("`{operation}` returned {found}, expected a result fragment")]
    #[diagnostic(code(testbridge::unexpected_result))]
    UnexpectedResult { operation: String, found: String },

    #[error("run worker for `{session}` panicked")]
    #[diagnostic(code(testbridge::worker_panicked))]
    WorkerPanicked { session: String },

    #[error("could not dispatch a run for `{session}`")]
    #[diagnostic(code(testbridge::dispatch))]
    Dispatch {
        session: String,
        #[source]
        source: std::io::Error,
    },
}

impl BridgeError {
    /// Whether this error means "unsupported framework version": the controller type is missing or one of
    /// its operations cannot be resolved.
    pub fn is_framework_incompatible(&self) -> bool {
        matches!(
            self,
            BridgeError::FrameworkIncompatible { .. } | BridgeError::OperationUnavailable { .. }
        )
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
