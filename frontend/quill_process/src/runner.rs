//! Spawning the external compiler and collecting its output.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::outcome::{CompileRequest, ExitStatus, ProcessOutcome, StreamKind};

/// Well-known name of the source file written into the working directory
/// before each run. Part of the working-directory contract with the external
/// compiler, alongside the artifact files it writes back.
pub const INPUT_FILE: &str = "input.txt";

/// How often the deadline wait polls for process exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A runner-level failure: the compiler could not be launched or its output
/// could not be collected. These abort the compile step entirely and are
/// reported to the caller as execution errors, never mixed into the
/// compiler's own diagnostics.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The configured binary is missing or not executable.
    #[error("cannot launch compiler '{program}': {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source text could not be written into the working directory.
    #[error("cannot write input file '{path}': {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delivering the source text on the child's stdin failed.
    #[error("failed to deliver source text on stdin: {0}")]
    StdinDelivery(#[source] std::io::Error),

    /// Draining one of the child's output streams failed.
    #[error("failed to capture compiler {stream}: {source}")]
    Capture {
        stream: StreamKind,
        #[source]
        source: std::io::Error,
    },

    /// A captured stream was not valid UTF-8.
    #[error("compiler {stream} is not valid UTF-8")]
    NonUtf8Output { stream: StreamKind },

    /// Waiting on the child process failed.
    #[error("failed waiting for the compiler to exit: {0}")]
    Wait(#[source] std::io::Error),

    /// An internal I/O worker thread panicked.
    #[error("compiler I/O worker thread panicked")]
    WorkerPanic,
}

/// Runs the external compiler: one configured binary, invoked once per
/// [`CompileRequest`].
///
/// The contract with the tool: source text on stdin, stdout and stderr
/// captured as two independent UTF-8 streams (conflating them would break
/// classification precedence downstream), exit status observed but not
/// authoritative. An optional deadline bounds the wait; on expiry the child
/// is killed and the outcome carries [`ExitStatus::TimedOut`].
#[derive(Debug, Clone)]
pub struct CompilerRunner {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl CompilerRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        CompilerRunner {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Bound the wait for the compiler. Without a deadline the runner waits
    /// for the process to run to completion.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured compiler binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run the compiler to completion on one request.
    ///
    /// Writes the source to [`INPUT_FILE`] in the working directory, spawns
    /// the binary with that directory as its cwd, feeds the source on stdin,
    /// and drains both output streams. Input is delivered from a separate
    /// thread so arbitrarily large sources cannot deadlock against a child
    /// that fills its output pipes before reading.
    pub fn run(&self, request: &CompileRequest) -> Result<ProcessOutcome, RunnerError> {
        let input_path = request.working_dir().join(INPUT_FILE);
        std::fs::write(&input_path, request.source()).map_err(|source| {
            RunnerError::InputFile {
                path: input_path,
                source,
            }
        })?;

        let start = Instant::now();
        let mut child = Command::new(&self.binary)
            .current_dir(request.working_dir())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Launch {
                program: self.binary.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let source_text = request.source().to_owned();
        let writer = thread::spawn(move || feed_stdin(stdin, &source_text));

        let stdout_pipe = child.stdout.take();
        let stdout_reader = thread::spawn(move || drain(stdout_pipe));
        let stderr_pipe = child.stderr.take();
        let stderr_reader = thread::spawn(move || drain(stderr_pipe));

        let status = self.wait(&mut child)?;

        writer
            .join()
            .map_err(|_| RunnerError::WorkerPanic)?
            .map_err(RunnerError::StdinDelivery)?;
        let stdout = collect_stream(stdout_reader, StreamKind::Stdout)?;
        let stderr = collect_stream(stderr_reader, StreamKind::Stderr)?;

        let duration = start.elapsed();
        tracing::debug!(
            status = %status,
            elapsed_ms = duration.as_secs_f64() * 1000.0,
            "compiler run finished"
        );

        Ok(ProcessOutcome {
            status,
            stdout,
            stderr,
            duration,
        })
    }

    /// Wait for the child, honoring the configured deadline.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, RunnerError> {
        let Some(limit) = self.timeout else {
            let status = child.wait().map_err(RunnerError::Wait)?;
            return Ok(convert_status(status));
        };

        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait().map_err(RunnerError::Wait)? {
                return Ok(convert_status(status));
            }
            if Instant::now() >= deadline {
                // Deadline expired: terminate and reap. Kill can race a
                // natural exit; either way the child is gone.
                let _ = child.kill();
                let _ = child.wait();
                return Ok(ExitStatus::TimedOut);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn convert_status(status: std::process::ExitStatus) -> ExitStatus {
    if status.success() {
        ExitStatus::Success
    } else if let Some(code) = status.code() {
        ExitStatus::Failed(code)
    } else {
        ExitStatus::Killed
    }
}

/// Write the source to the child's stdin and close it.
///
/// A child that exits without reading its input surfaces as a broken pipe;
/// that is the tool rejecting input, not a delivery failure.
fn feed_stdin(stdin: Option<std::process::ChildStdin>, source: &str) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(source.as_bytes()) {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn drain<R: Read>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

fn collect_stream(
    reader: thread::JoinHandle<std::io::Result<Vec<u8>>>,
    stream: StreamKind,
) -> Result<String, RunnerError> {
    let bytes = reader
        .join()
        .map_err(|_| RunnerError::WorkerPanic)?
        .map_err(|source| RunnerError::Capture { stream, source })?;
    String::from_utf8(bytes).map_err(|_| RunnerError::NonUtf8Output { stream })
}
