//! Quill - a front end for an external compiler
//!
//! Quill drives a black-box compiler subprocess and turns its unstructured
//! output into something a shell can render and export.
//!
//! # Architecture
//!
//! ```text
//! RunSession::compile(source)
//!     │
//!     ▼
//! quill_process ──► ProcessOutcome
//!     │
//!     ▼
//! quill_classify ──► ClassificationResult
//!     │
//!     ▼
//! quill_artifact ──► ArtifactSet
//!     │
//!     ▼
//! RunRecord (held by the session; exportable via quill_export)
//! ```
//!
//! The session is the only stateful piece: it serializes compiles against
//! the shared working directory and holds the most recent run for display
//! and export. Everything below it is a pure pipeline stage.

pub mod commands;
pub mod session;

pub use session::{shared_session, RunRecord, RunSession, SessionError, SharedSession};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=quillc=debug` or `RUST_LOG=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
