//! Run Session - the stateful holder of the most recent compile.
//!
//! A session owns the runner configuration and the working directory, and
//! sequences one compile request through Runner → Classifier → Loader. The
//! loader always runs, even when the classifier reports errors: the external
//! tool may emit partial artifacts before failing, and those are worth
//! showing.
//!
//! Two states: **Idle** (nothing compiled yet, or after [`RunSession::reset`])
//! and **HasResult** (a finished run is held). An execution error (the tool
//! could not be launched or its output could not be read) leaves the state
//! exactly as it was: a failed relaunch never erases a previously held
//! result, and a session that was Idle stays Idle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;

use quill_artifact::{ArtifactError, ArtifactSet};
use quill_classify::{ClassificationResult, Classifier};
use quill_export::Bundle;
use quill_process::{CompileRequest, CompilerRunner, ProcessOutcome, RunnerError};

/// Why a compile attempt produced no new result.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The external tool could not run or its output could not be captured.
    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// An artifact file was present but unreadable.
    #[error(transparent)]
    Artifacts(#[from] ArtifactError),

    /// Another compile already holds the working directory.
    #[error("a compile is already in flight for this session")]
    CompileInFlight,
}

/// One finished compile: request, raw outcome, classified diagnostics, and
/// the artifact snapshot, aggregated.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub request: CompileRequest,
    pub outcome: ProcessOutcome,
    pub diagnostics: ClassificationResult,
    pub artifacts: ArtifactSet,
}

impl RunRecord {
    /// The exportable view of this run.
    pub fn bundle(&self) -> Bundle<'_> {
        Bundle {
            source: self.request.source(),
            diagnostics: &self.diagnostics,
            artifacts: &self.artifacts,
        }
    }
}

enum SessionState {
    Idle,
    HasResult(Box<RunRecord>),
}

/// The per-interaction-context compile session.
pub struct RunSession {
    runner: CompilerRunner,
    classifier: Classifier,
    working_dir: PathBuf,
    state: SessionState,
}

impl RunSession {
    /// A fresh session in the Idle state.
    pub fn new(runner: CompilerRunner, working_dir: impl Into<PathBuf>) -> Self {
        RunSession {
            runner,
            classifier: Classifier::new(),
            working_dir: working_dir.into(),
            state: SessionState::Idle,
        }
    }

    /// Use a custom marker vocabulary.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Point the session at a different compiler binary. The held result, if
    /// any, is untouched: it came from a real run and stays visible until a
    /// new outcome replaces it.
    pub fn set_runner(&mut self, runner: CompilerRunner) {
        self.runner = runner;
    }

    /// The directory the compiler runs in and writes artifacts to.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Whether no result is held.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    /// The most recent finished run, if any.
    pub fn last_run(&self) -> Option<&RunRecord> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::HasResult(record) => Some(record),
        }
    }

    /// Compile one source text: Runner → Classifier → Loader, in that order.
    ///
    /// Any [`SessionError`] leaves the previously held result untouched. A
    /// run that produced only errors is still a *successful* compile in the
    /// session's eyes (the tool ran and said something) and replaces the
    /// held result wholesale.
    pub fn compile(&mut self, source: impl Into<String>) -> Result<&RunRecord, SessionError> {
        let request = CompileRequest::new(source, &self.working_dir);

        let outcome = self.runner.run(&request)?;
        let diagnostics = self.classifier.classify(&outcome);
        // Loader runs regardless of diagnostics: partial artifacts from a
        // failed run are still part of the result.
        let artifacts = ArtifactSet::load(&self.working_dir)?;

        tracing::debug!(
            status = %outcome.status,
            diagnostics = diagnostics.total(),
            artifacts = artifacts.present_count(),
            "compile finished"
        );

        self.state = SessionState::HasResult(Box::new(RunRecord {
            request,
            outcome,
            diagnostics,
            artifacts,
        }));
        match &self.state {
            SessionState::HasResult(record) => Ok(record),
            SessionState::Idle => unreachable!("state was just set to HasResult"),
        }
    }

    /// Drop everything: any state → Idle.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }
}

/// Thread-safe session handle that serializes compiles.
///
/// The working directory and its well-known files are the only shared
/// mutable resource in the pipeline, so exactly one in-flight compile may
/// hold them: a second concurrent [`SharedSession::compile`] is rejected
/// with [`SessionError::CompileInFlight`] rather than queued behind a
/// possibly slow external tool.
#[derive(Clone)]
pub struct SharedSession(Arc<Mutex<RunSession>>);

impl SharedSession {
    pub fn new(session: RunSession) -> Self {
        SharedSession(Arc::new(Mutex::new(session)))
    }

    /// Compile, rejecting the call if another compile is in flight.
    pub fn compile(&self, source: &str) -> Result<RunRecord, SessionError> {
        let Some(mut session) = self.0.try_lock() else {
            return Err(SessionError::CompileInFlight);
        };
        session.compile(source).map(Clone::clone)
    }

    /// Reset once any in-flight compile has finished.
    pub fn reset(&self) {
        self.0.lock().reset();
    }

    /// Clone of the most recent finished run, if any.
    pub fn last_run(&self) -> Option<RunRecord> {
        self.0.lock().last_run().cloned()
    }

    /// Whether no result is held.
    pub fn is_idle(&self) -> bool {
        self.0.lock().is_idle()
    }

    /// Direct access for shells that need more than the convenience methods.
    pub fn lock(&self) -> MutexGuard<'_, RunSession> {
        self.0.lock()
    }
}

/// Create a shared session from an owned session.
pub fn shared_session(session: RunSession) -> SharedSession {
    SharedSession::new(session)
}
