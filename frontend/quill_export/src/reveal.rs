//! Opening an exported bundle in the platform file browser.

use std::path::Path;
use std::process::Command;

/// Ask the platform file browser to show `path`.
///
/// Purely a convenience side effect of exporting: failure is logged and
/// ignored, never surfaced as an export failure.
pub fn reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let opener = "xdg-open";

    match Command::new(opener).arg(path).spawn() {
        Ok(_) => tracing::debug!(path = %path.display(), "opened bundle in file browser"),
        Err(e) => tracing::debug!(
            path = %path.display(),
            error = %e,
            "could not open bundle in file browser"
        ),
    }
}
