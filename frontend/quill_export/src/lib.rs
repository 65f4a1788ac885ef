//! Export Bundler - materializing a run on disk
//!
//! Snapshots one compile's inputs and outputs into a self-contained
//! `outputs/` directory: the original source, the present artifacts under
//! their well-known names, and one dump per diagnostic category. The bundle
//! is a pure, deterministic function of the run (fixed names, full
//! overwrite, stale well-known files removed), so re-exporting the same run
//! to the same destination yields byte-identical files.
//!
//! Failures are isolated per file: one unwritable target never stops the
//! rest, and the caller gets a report of what succeeded and what did not.
//! Only a destination that cannot be created at all aborts the export.

mod bundle;
mod reveal;

pub use bundle::{
    export, Bundle, ExportError, ExportFailure, ExportOptions, ExportReport, ARCHIVE_FILE,
    BUNDLE_DIR, SEMANTIC_DUMP, SOURCE_FILE, SYNTAX_DUMP, WARNING_DUMP,
};
pub use reveal::reveal;
