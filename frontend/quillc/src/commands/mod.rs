//! Command handlers for the Quill CLI.
//!
//! Each submodule implements a specific CLI command. Shared utilities like
//! `read_file` live here in the module root.

mod compile;
mod markers;

pub use compile::{compile_file, parse_compile_options, CompileOptions};
pub use markers::list_markers;

/// Read a source file from disk, exiting with a user-friendly error message
/// on failure.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}
