//! Value types produced by one compiler invocation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One compile request: the source text and the directory the compiler runs
/// in. Created per invocation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    source: String,
    working_dir: PathBuf,
}

impl CompileRequest {
    pub fn new(source: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        CompileRequest {
            source: source.into(),
            working_dir: working_dir.into(),
        }
    }

    /// The source text delivered to the compiler on stdin.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The directory the compiler runs in and writes its artifacts to.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// Which captured stream a line or failure belongs to.
///
/// The external tool's convention: stdout carries structured diagnostics,
/// stderr carries crashes and failures the tool did not anticipate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

/// How the compiler process ended.
///
/// Launch failures are *not* represented here: a compiler that never started
/// produces a [`RunnerError`](crate::RunnerError), not an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Exited with code zero.
    Success,
    /// Exited with a non-zero code. Still a normal outcome: error runs may
    /// carry diagnostics and partial artifacts worth showing.
    Failed(i32),
    /// Terminated by a signal before producing an exit code.
    Killed,
    /// Killed by the runner after exceeding the configured deadline.
    TimedOut,
}

impl ExitStatus {
    /// Whether the process exited with code zero.
    pub fn is_success(self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    /// Whether the runner had to terminate the process itself.
    pub fn timed_out(self) -> bool {
        matches!(self, ExitStatus::TimedOut)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Success => write!(f, "exit code 0"),
            ExitStatus::Failed(code) => write!(f, "exit code {code}"),
            ExitStatus::Killed => write!(f, "killed by signal"),
            ExitStatus::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Everything one finished compiler run said: the two raw streams, how the
/// process ended, and how long it took. Immutable once produced; owned by the
/// runner and passed by value to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ProcessOutcome {
    /// Whether the compiler printed nothing on either stream.
    pub fn is_silent(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}
