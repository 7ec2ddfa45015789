//! The driver: an ordered, append-only list of sessions and the aggregate operations over it.
//!
//! ## Operations
//!
//! - [`Driver::load`] appends a session and returns its load fragment.
//! - [`Driver::count_test_cases`] sums the per-session counts.
//! - [`Driver::explore`] and [`Driver::run`] combine per-session fragments into a [`ResultDocument`].
//! - [`Driver::run_async`] dispatches one worker per session and returns a [`RunHandle`].
//! - [`Driver::stop_run`] forwards a stop request to every session.
//!
//! Sessions are visited strictly in load order. The driver never deduplicates modules: loading the same
//! module twice yields two independent sessions.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use testbridge_core::{Action, Module, PrimitiveKind, Type, Value};

use crate::errors::{BridgeError, BridgeResult};
use crate::session::{AssemblySession, Settings};
use crate::summary::{ResultDocument, ResultSummary};

const LOAD_TESTS: &str = "LoadTests";
const COUNT_TESTS: &str = "CountTests";
const EXPLORE_TESTS: &str = "ExploreTests";
const RUN_TESTS: &str = "RunTests";
const STOP_RUN: &str = "StopRun";

/// Exact parameter list of `RunTests`: a progress callback and a filter.
fn run_signature() -> [Type; 2] {
    [Type::string_action(), Type::String]
}

fn run_args(callback: Option<&Action>, filter: &str) -> [Value; 2] {
    let callback = callback.map_or(Value::Null, |cb| Value::Action(cb.clone()));
    [callback, Value::from(filter)]
}

/// Extract the result fragment returned by `operation`.
fn fragment(operation: &str, value: Value) -> BridgeResult<String> {
    match value {
        Value::String(text) => Ok(text.to_string()),
        other => Err(BridgeError::UnexpectedResult {
            operation: operation.to_string(),
            found: other.runtime_type().to_string(),
        }),
    }
}

#[derive(Debug, Default)]
pub struct Driver {
    id: Option<String>,
    sessions: Vec<AssemblySession>,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose controllers prefix every test id with `"<id>-"`.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            sessions: Vec::new(),
        }
    }

    /// Set the id used for sessions loaded from now on.
    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The prefix handed to new controllers: `"<id>-"`, or empty when no id is set.
    pub fn id_prefix(&self) -> String {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => format!("{id}-"),
            _ => String::new(),
        }
    }

    pub fn sessions(&self) -> &[AssemblySession] {
        &self.sessions
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn check_loaded(&self) -> BridgeResult<()> {
        if self.sessions.is_empty() {
            Err(BridgeError::NotLoaded)
        } else {
            Ok(())
        }
    }

    /// Create a session for `module` and return the fragment produced by its `LoadTests` operation.
    ///
    /// The session is appended once the controller is constructed, before `LoadTests` runs; a failure to
    /// construct it leaves the session list untouched.
    #[tracing::instrument(skip_all, fields(module = %module.name, sessions = self.sessions.len()))]
    pub fn load(&mut self, framework: &Module, module: Arc<Module>, settings: &Settings) -> BridgeResult<String> {
        tracing::info!("Loading {}", module.full_name());
        let session = AssemblySession::create(framework, module, &self.id_prefix(), settings)?;
        self.sessions.push(session.clone());
        fragment(LOAD_TESTS, session.invoke(LOAD_TESTS, &[])?)
    }

    /// Total number of test cases selected by `filter` across every session.
    ///
    /// Sessions whose controller cannot count, or returns something other than an integer, contribute zero.
    /// The total saturates at the bounds of `i64` rather than overflowing.
    #[tracing::instrument(skip_all, fields(sessions = self.sessions.len()))]
    pub fn count_test_cases(&self, filter: &str) -> BridgeResult<i64> {
        self.check_loaded()?;

        let mut total = 0i64;
        for session in &self.sessions {
            match session.invoke(COUNT_TESTS, &[Value::from(filter)]) {
                Ok(value) => match value.as_integer() {
                    Some(count) => {
                        total = total.checked_add(count).unwrap_or_else(|| {
                            tracing::warn!(session = session.display_name(), count, "test case count saturated");
                            if count < 0 { i64::MIN } else { i64::MAX }
                        });
                    }
                    None => {
                        tracing::debug!(session = session.display_name(), found = %value.runtime_type(), "ignoring non-integer count");
                    }
                },
                Err(err @ BridgeError::OperationUnavailable { .. }) => {
                    tracing::debug!(session = session.display_name(), %err, "counting unsupported");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(total)
    }

    #[tracing::instrument(skip_all, fields(sessions = self.sessions.len()))]
    pub fn explore(&self, filter: &str) -> BridgeResult<ResultDocument> {
        self.check_loaded()?;

        let mut summary = ResultSummary::new();
        for session in &self.sessions {
            tracing::info!("Exploring {}", session.display_name());
            let value = session.invoke(EXPLORE_TESTS, &[Value::from(filter)])?;
            summary.add_result(fragment(EXPLORE_TESTS, value)?);
        }
        Ok(summary.into_document())
    }

    /// Run every session in order, waiting for each before starting the next.
    #[tracing::instrument(skip_all, fields(sessions = self.sessions.len()))]
    pub fn run(&self, callback: Option<&Action>, filter: &str) -> BridgeResult<ResultDocument> {
        self.check_loaded()?;

        let signature = run_signature();
        let args = run_args(callback, filter);
        let mut summary = ResultSummary::new();
        for session in &self.sessions {
            tracing::info!("Running {}", session.display_name());
            let value = session.invoke_exact(RUN_TESTS, &signature, &args)?;
            summary.add_result(fragment(RUN_TESTS, value)?);
        }
        Ok(summary.into_document())
    }

    /// Start every session's run on its own worker thread and return without waiting.
    ///
    /// Every session's `RunTests` is resolved before the first worker starts, so resolution failures are
    /// reported here. Faults raised while running only surface through [`RunHandle::wait`]. Dropping the
    /// handle detaches the workers.
    ///
    /// A controller may discard a [`Driver::stop_run`] issued before its worker has started running; wait for
    /// a progress notice before stopping.
    #[tracing::instrument(skip_all, fields(sessions = self.sessions.len()))]
    pub fn run_async(&self, callback: Option<Action>, filter: &str) -> BridgeResult<RunHandle> {
        self.check_loaded()?;

        let signature = run_signature();
        let args = run_args(callback.as_ref(), filter);
        let operations = self
            .sessions
            .iter()
            .map(|session| session.bind_exact(RUN_TESTS, &signature, &args))
            .collect::<BridgeResult<Vec<_>>>()?;

        let mut runs = Vec::with_capacity(operations.len());
        for (index, (session, op)) in self.sessions.iter().zip(operations).enumerate() {
            let name = session.display_name().to_string();
            tracing::info!(operation = op.name(), "Dispatching run of {name}");
            let args = args.clone();
            let handle = thread::Builder::new()
                .name(format!("testbridge-run-{index}"))
                .spawn(move || op.call(&args))
                .map_err(|source| BridgeError::Dispatch {
                    session: name.clone(),
                    source,
                })?;
            runs.push(SessionRun { session: name, handle });
        }
        Ok(RunHandle { runs })
    }

    /// Ask every session to stop its current run. `force` requests a harder interruption.
    ///
    /// Does nothing when no sessions are loaded. Whether the run actually stops is up to the controller.
    #[tracing::instrument(skip_all, fields(sessions = self.sessions.len(), force = force))]
    pub fn stop_run(&self, force: bool) -> BridgeResult<()> {
        for session in &self.sessions {
            session.invoke_exact(
                STOP_RUN,
                &[Type::primitive(PrimitiveKind::Boolean)],
                &[Value::Bool(force)],
            )?;
        }
        Ok(())
    }
}

/// A run dispatched to a worker thread for one session.
#[derive(Debug)]
pub struct SessionRun {
    session: String,
    handle: JoinHandle<BridgeResult<Value>>,
}

impl SessionRun {
    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Handle to the workers started by [`Driver::run_async`], in session order.
#[derive(Debug)]
#[must_use = "dropping a RunHandle detaches the runs; call `wait` to collect their results"]
pub struct RunHandle {
    runs: Vec<SessionRun>,
}

impl RunHandle {
    pub fn runs(&self) -> &[SessionRun] {
        &self.runs
    }

    pub fn is_finished(&self) -> bool {
        self.runs.iter().all(SessionRun::is_finished)
    }

    /// Wait for every worker and combine their fragments, in session order.
    ///
    /// The first failure is returned after all workers have been joined.
    pub fn wait(self) -> BridgeResult<ResultDocument> {
        let mut summary = ResultSummary::new();
        let mut first_error = None;
        for run in self.runs {
            let outcome = match run.handle.join() {
                Ok(result) => result.and_then(|value| fragment(RUN_TESTS, value)),
                Err(_) => Err(BridgeError::WorkerPanicked { session: run.session }),
            };
            match outcome {
                Ok(text) => summary.add_result(text),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(summary.into_document()),
        }
    }
}
