//! Diagnostic Classifier - structuring the compiler's raw output
//!
//! The external compiler reports everything as unstructured lines: structured
//! self-diagnosis on stdout, crashes and unanticipated failures on stderr.
//! This crate partitions that feed into four ordered buckets (syntax errors,
//! semantic errors, semantic warnings, unclassified) without dropping a
//! single line.
//!
//! # Architecture
//!
//! ```text
//! ProcessOutcome
//!     │
//!     ▼
//! Classifier::classify ── MarkerTable (ordered rules, first match wins)
//!     │
//!     ▼
//! ClassificationResult (one Vec<Diagnostic> per kind)
//! ```
//!
//! The marker → kind mapping lives in [`MarkerTable`] as plain data. The
//! external tool owns the wording of its diagnostics, so when that wording
//! shifts, the table changes and the pipeline does not.

mod classifier;
mod diagnostic;
mod markers;

pub use classifier::{ClassificationResult, Classifier};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use markers::{MarkerRule, MarkerTable};
