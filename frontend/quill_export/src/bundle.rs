//! Writing the bundle directory and its optional archive.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

use quill_artifact::ArtifactSet;
use quill_classify::{ClassificationResult, DiagnosticKind};

/// Name of the bundle directory created under the destination.
pub const BUNDLE_DIR: &str = "outputs";
/// Name of the exported source text inside the bundle.
pub const SOURCE_FILE: &str = "input_code.txt";
/// Syntax-error dump file.
pub const SYNTAX_DUMP: &str = "syntax_errors.txt";
/// Semantic-error dump file (includes everything the compiler said on stderr).
pub const SEMANTIC_DUMP: &str = "semantic_errors.txt";
/// Warning dump file.
pub const WARNING_DUMP: &str = "warnings.txt";
/// Name of the optional archive written beside the bundle directory.
pub const ARCHIVE_FILE: &str = "outputs.tar.gz";

/// What gets exported: the pieces of one run the bundle is a pure function
/// of. Borrowed from the session that holds them.
#[derive(Debug, Clone, Copy)]
pub struct Bundle<'a> {
    pub source: &'a str,
    pub diagnostics: &'a ClassificationResult,
    pub artifacts: &'a ArtifactSet,
}

/// Export configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Also produce `outputs.tar.gz` beside the bundle directory.
    pub archive: bool,
}

/// The export could not start: no bundle directory to write into.
#[derive(Debug, Error)]
#[error("cannot create bundle directory '{path}': {source}")]
pub struct ExportError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// One file that could not be written. The rest of the bundle is unaffected.
#[derive(Debug, Error)]
#[error("cannot write '{path}': {source}")]
pub struct ExportFailure {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Summary of one export: which files were written, which failed, and where
/// the archive landed if one was requested and succeeded.
#[derive(Debug)]
pub struct ExportReport {
    /// The bundle directory all files were written into.
    pub bundle_dir: PathBuf,
    /// Successfully written files, in write order.
    pub written: Vec<PathBuf>,
    /// Per-file failures, in write order.
    pub failures: Vec<ExportFailure>,
    /// Path of the archive, when requested and written.
    pub archive: Option<PathBuf>,
}

impl ExportReport {
    /// Whether every requested file (and the archive, if requested) landed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Materialize the bundle under `destination`, creating parents as needed.
///
/// Writes into `destination/outputs/`; a failure writing one file is
/// recorded and the remaining files are still written. Stale well-known
/// files from an earlier export are removed so the directory never shows an
/// artifact the current run did not produce.
pub fn export(
    bundle: Bundle<'_>,
    destination: &Path,
    options: ExportOptions,
) -> Result<ExportReport, ExportError> {
    let bundle_dir = destination.join(BUNDLE_DIR);
    std::fs::create_dir_all(&bundle_dir).map_err(|source| ExportError {
        path: bundle_dir.clone(),
        source,
    })?;

    let entries = bundle_entries(bundle);
    let mut report = ExportReport {
        bundle_dir: bundle_dir.clone(),
        written: Vec::new(),
        failures: Vec::new(),
        archive: None,
    };

    for (name, content) in &entries {
        let path = bundle_dir.join(name);
        match std::fs::write(&path, content) {
            Ok(()) => report.written.push(path),
            Err(source) => report.failures.push(ExportFailure { path, source }),
        }
    }

    remove_stale_artifacts(&bundle_dir, bundle.artifacts);

    if options.archive {
        let archive_path = destination.join(ARCHIVE_FILE);
        match write_archive(&archive_path, &entries) {
            Ok(()) => report.archive = Some(archive_path),
            Err(source) => report.failures.push(ExportFailure {
                path: archive_path,
                source,
            }),
        }
    }

    tracing::debug!(
        written = report.written.len(),
        failed = report.failures.len(),
        "export finished"
    );
    Ok(report)
}

/// The bundle's files in fixed order: source, present artifacts, dumps.
///
/// Both the directory writes and the archive entries are driven off this
/// one list, so the two views of the bundle cannot drift.
fn bundle_entries(bundle: Bundle<'_>) -> Vec<(&'static str, String)> {
    let mut entries: Vec<(&'static str, String)> =
        vec![(SOURCE_FILE, bundle.source.to_owned())];

    for artifact in bundle.artifacts.iter() {
        if let Some(content) = &artifact.content {
            entries.push((artifact.id.file_name(), content.clone()));
        }
    }

    entries.push((SYNTAX_DUMP, dump(bundle.diagnostics, DiagnosticKind::SyntaxError)));
    entries.push((
        SEMANTIC_DUMP,
        dump(bundle.diagnostics, DiagnosticKind::SemanticError),
    ));
    entries.push((
        WARNING_DUMP,
        dump(bundle.diagnostics, DiagnosticKind::SemanticWarning),
    ));

    entries
}

/// One line per diagnostic, classification order, newline-terminated when
/// non-empty.
fn dump(diagnostics: &ClassificationResult, kind: DiagnosticKind) -> String {
    let mut text = diagnostics.joined(kind);
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

/// Delete well-known artifact files the current run did not produce.
///
/// Removal failures are ignored: a stale file we cannot delete will be
/// overwritten or reported by the next write that touches it.
fn remove_stale_artifacts(bundle_dir: &Path, artifacts: &ArtifactSet) {
    for artifact in artifacts.iter() {
        if !artifact.present() {
            let _ = std::fs::remove_file(bundle_dir.join(artifact.id.file_name()));
        }
    }
}

/// Write a gzip tarball of the bundle entries.
///
/// Entries are archived from the in-memory contents with zeroed metadata,
/// in the same fixed order as the directory writes, so the archive bytes
/// are a deterministic function of the run.
fn write_archive(archive_path: &Path, entries: &[(&str, String)]) -> std::io::Result<()> {
    let file = std::fs::File::create(archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_cksum();
        let entry_name = Path::new(BUNDLE_DIR).join(name);
        builder.append_data(&mut header, entry_name, content.as_bytes())?;
    }

    let encoder = builder.into_inner()?;
    let mut file = encoder.finish()?;
    file.flush()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use pretty_assertions::assert_eq;
    use quill_artifact::{Artifact, ArtifactId};
    use quill_classify::Classifier;
    use quill_process::{ExitStatus, ProcessOutcome};
    use std::time::Duration;

    fn classified(stdout: &str, stderr: &str) -> ClassificationResult {
        Classifier::new().classify(&ProcessOutcome {
            status: ExitStatus::Success,
            stdout: stdout.to_owned(),
            stderr: stderr.to_owned(),
            duration: Duration::ZERO,
        })
    }

    fn artifacts_with_assembly() -> ArtifactSet {
        let mut set = ArtifactSet::absent();
        set.assembly = Artifact {
            id: ArtifactId::Assembly,
            content: Some("section .text\n".to_owned()),
        };
        set
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(BUNDLE_DIR).join(name)).unwrap()
    }

    #[test]
    fn bundle_layout_on_disk() {
        let dest = tempfile::tempdir().unwrap();
        let diagnostics = classified(
            "Syntax Error: bad token\nSemantic Warning: unused x",
            "crashed",
        );
        let artifacts = artifacts_with_assembly();
        let report = export(
            Bundle {
                source: "int x;",
                diagnostics: &diagnostics,
                artifacts: &artifacts,
            },
            dest.path(),
            ExportOptions::default(),
        )
        .unwrap();

        assert!(report.is_complete());
        assert_eq!(read(dest.path(), SOURCE_FILE), "int x;");
        assert_eq!(read(dest.path(), SYNTAX_DUMP), "Syntax Error: bad token\n");
        assert_eq!(read(dest.path(), SEMANTIC_DUMP), "crashed\n");
        assert_eq!(read(dest.path(), WARNING_DUMP), "Semantic Warning: unused x\n");
        assert_eq!(read(dest.path(), "output.asm"), "section .text\n");
    }

    #[test]
    fn absent_artifacts_are_not_written() {
        let dest = tempfile::tempdir().unwrap();
        let diagnostics = classified("", "");
        let artifacts = artifacts_with_assembly();
        export(
            Bundle {
                source: "",
                diagnostics: &diagnostics,
                artifacts: &artifacts,
            },
            dest.path(),
            ExportOptions::default(),
        )
        .unwrap();

        let bundle_dir = dest.path().join(BUNDLE_DIR);
        assert!(bundle_dir.join("output.asm").exists());
        assert!(!bundle_dir.join("symbol_table.txt").exists());
        assert!(!bundle_dir.join("quadruples.txt").exists());
    }

    #[test]
    fn export_is_idempotent() {
        let dest = tempfile::tempdir().unwrap();
        let diagnostics = classified("Syntax Error: x\nchatter", "boom");
        let artifacts = artifacts_with_assembly();
        let bundle = Bundle {
            source: "source text",
            diagnostics: &diagnostics,
            artifacts: &artifacts,
        };

        export(bundle, dest.path(), ExportOptions::default()).unwrap();
        let first: Vec<String> = [SOURCE_FILE, SYNTAX_DUMP, SEMANTIC_DUMP, WARNING_DUMP, "output.asm"]
            .iter()
            .map(|n| read(dest.path(), n))
            .collect();

        export(bundle, dest.path(), ExportOptions::default()).unwrap();
        let second: Vec<String> = [SOURCE_FILE, SYNTAX_DUMP, SEMANTIC_DUMP, WARNING_DUMP, "output.asm"]
            .iter()
            .map(|n| read(dest.path(), n))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn stale_artifact_files_are_removed() {
        let dest = tempfile::tempdir().unwrap();
        let diagnostics = classified("", "");

        let mut full = ArtifactSet::absent();
        full.symbol_table = Artifact {
            id: ArtifactId::SymbolTable,
            content: Some("x : int\n".to_owned()),
        };
        export(
            Bundle {
                source: "a",
                diagnostics: &diagnostics,
                artifacts: &full,
            },
            dest.path(),
            ExportOptions::default(),
        )
        .unwrap();
        assert!(dest.path().join(BUNDLE_DIR).join("symbol_table.txt").exists());

        // A later run that produced nothing must not leave the old file
        // behind: the bundle is a pure function of the current run.
        let empty = ArtifactSet::absent();
        export(
            Bundle {
                source: "a",
                diagnostics: &diagnostics,
                artifacts: &empty,
            },
            dest.path(),
            ExportOptions::default(),
        )
        .unwrap();
        assert!(!dest.path().join(BUNDLE_DIR).join("symbol_table.txt").exists());
    }

    #[test]
    fn one_unwritable_file_does_not_stop_the_rest() {
        let dest = tempfile::tempdir().unwrap();
        // Pre-create the source target as a directory so its write fails.
        std::fs::create_dir_all(dest.path().join(BUNDLE_DIR).join(SOURCE_FILE)).unwrap();

        let diagnostics = classified("Syntax Error: x", "");
        let artifacts = ArtifactSet::absent();
        let report = export(
            Bundle {
                source: "text",
                diagnostics: &diagnostics,
                artifacts: &artifacts,
            },
            dest.path(),
            ExportOptions::default(),
        )
        .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with(SOURCE_FILE));
        assert_eq!(read(dest.path(), SYNTAX_DUMP), "Syntax Error: x\n");
    }

    #[test]
    fn archive_is_deterministic() {
        let dest_a = tempfile::tempdir().unwrap();
        let dest_b = tempfile::tempdir().unwrap();
        let diagnostics = classified("Semantic Error: y", "");
        let artifacts = artifacts_with_assembly();
        let bundle = Bundle {
            source: "same input",
            diagnostics: &diagnostics,
            artifacts: &artifacts,
        };
        let options = ExportOptions { archive: true };

        let report_a = export(bundle, dest_a.path(), options).unwrap();
        let report_b = export(bundle, dest_b.path(), options).unwrap();

        let bytes_a = std::fs::read(report_a.archive.unwrap()).unwrap();
        let bytes_b = std::fs::read(report_b.archive.unwrap()).unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn archive_contains_the_bundle_entries() {
        let dest = tempfile::tempdir().unwrap();
        let diagnostics = classified("", "");
        let artifacts = artifacts_with_assembly();
        let report = export(
            Bundle {
                source: "src",
                diagnostics: &diagnostics,
                artifacts: &artifacts,
            },
            dest.path(),
            ExportOptions { archive: true },
        )
        .unwrap();

        let file = std::fs::File::open(report.archive.unwrap()).unwrap();
        let decoder = flate2::read::GzDecoder::new(file);
        let mut archive = tar::Archive::new(decoder);
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().display().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                format!("{BUNDLE_DIR}/{SOURCE_FILE}"),
                format!("{BUNDLE_DIR}/output.asm"),
                format!("{BUNDLE_DIR}/{SYNTAX_DUMP}"),
                format!("{BUNDLE_DIR}/{SEMANTIC_DUMP}"),
                format!("{BUNDLE_DIR}/{WARNING_DUMP}"),
            ]
        );
    }

    #[test]
    fn nested_destination_is_created() {
        let dest = tempfile::tempdir().unwrap();
        let nested = dest.path().join("a").join("b");
        let diagnostics = classified("", "");
        let artifacts = ArtifactSet::absent();
        let report = export(
            Bundle {
                source: "",
                diagnostics: &diagnostics,
                artifacts: &artifacts,
            },
            &nested,
            ExportOptions::default(),
        )
        .unwrap();

        assert!(report.is_complete());
        assert!(nested.join(BUNDLE_DIR).join(SOURCE_FILE).exists());
    }
}
