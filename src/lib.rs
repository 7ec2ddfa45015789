#![forbid(unsafe_code)]
//! testbridge: a version-agnostic bridge between a test host and externally supplied test modules
//!
//! The host hands the bridge a framework module and one or more test modules at runtime. The bridge finds
//! the framework's controller type by name, creates one controller per test module and drives every
//! interaction through name- and shape-directed dispatch, so no compile-time dependency on a particular
//! framework version exists.
//!
//! - [`session`]: one test module bound to one controller; the only place dynamic lookup happens.
//! - [`driver`]: the ordered session list and the aggregate load/count/explore/run/stop operations.
//! - [`summary`]: combination of per-session fragments into one result document.
//! - [`errors`]: the error taxonomy.
//!
//! Type compatibility and the dynamic object model live in `testbridge_core`.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The crate and the `cli`
//!   module enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a bridge bug (logic error), use `.expect("INVARIANT: reason")`
//!   with a clear explanation.

#![deny(clippy::unwrap_used)]

pub mod cli;
pub mod driver;
pub mod errors;
pub mod session;
pub mod summary;

pub use driver::{Driver, RunHandle, SessionRun};
pub use errors::{BridgeError, BridgeResult};
pub use session::{AssemblySession, BoundOperation, CONTROLLER_TYPE, Settings};
pub use summary::{ResultDocument, ResultSummary};
