//! The `compile` command: run the external compiler on one source file and
//! render the classified result.

use std::path::PathBuf;
use std::time::Duration;

use quill_classify::DiagnosticKind;
use quill_export::{export, ExportOptions};
use quill_process::CompilerRunner;

use crate::session::{RunRecord, RunSession};

use super::read_file;

/// Default compiler binary, resolved relative to the working directory.
const DEFAULT_COMPILER: &str = "./compiler";

/// Compile options parsed from command line arguments.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Compiler binary to invoke (--compiler=<path>)
    pub compiler: Option<PathBuf>,
    /// Working directory for the run (--workdir=<dir>)
    pub workdir: Option<PathBuf>,
    /// Kill the compiler after this many seconds (--timeout=<secs>)
    pub timeout_secs: Option<u64>,
    /// Export the run to this destination after compiling (--export=<dir>)
    pub export: Option<PathBuf>,
    /// Also write outputs.tar.gz beside the bundle (--archive)
    pub archive: bool,
    /// Open the bundle in the file browser after exporting (--open)
    pub open: bool,
    /// Verbose output (-v, --verbose)
    pub verbose: bool,
}

impl CompileOptions {
    /// Merge another `CompileOptions` into this one.
    ///
    /// For boolean flags, uses OR (true wins). For Option fields, takes the
    /// new value if present.
    pub fn merge(&mut self, other: &Self) {
        if other.compiler.is_some() {
            self.compiler.clone_from(&other.compiler);
        }
        if other.workdir.is_some() {
            self.workdir.clone_from(&other.workdir);
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.export.is_some() {
            self.export.clone_from(&other.export);
        }

        self.archive |= other.archive;
        self.open |= other.open;
        self.verbose |= other.verbose;
    }
}

/// Parse compile options from command line arguments.
pub fn parse_compile_options(args: &[String]) -> CompileOptions {
    let mut options = CompileOptions::default();

    for arg in args {
        if let Some(path) = arg.strip_prefix("--compiler=") {
            options.compiler = Some(PathBuf::from(path));
        } else if let Some(dir) = arg.strip_prefix("--workdir=") {
            options.workdir = Some(PathBuf::from(dir));
        } else if let Some(secs) = arg.strip_prefix("--timeout=") {
            if let Ok(n) = secs.parse() {
                options.timeout_secs = Some(n);
            } else {
                eprintln!("warning: invalid timeout '{secs}', expected seconds");
            }
        } else if let Some(dest) = arg.strip_prefix("--export=") {
            options.export = Some(PathBuf::from(dest));
        } else if arg == "--archive" {
            options.archive = true;
        } else if arg == "--open" {
            options.open = true;
        } else if arg == "-v" || arg == "--verbose" {
            options.verbose = true;
        } else {
            eprintln!("warning: unknown option '{arg}'");
        }
    }

    options
}

/// Compile one source file and print the classified report.
///
/// Exit code 0 means the compiler ran to completion, even a run full of
/// diagnostics. Exit code 1 is reserved for execution errors (the tool could
/// not run) and incomplete exports.
pub fn compile_file(path: &str, options: &CompileOptions) {
    let source = read_file(path);

    let workdir = options
        .workdir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let binary = options
        .compiler
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPILER));

    let mut runner = CompilerRunner::new(binary);
    if let Some(secs) = options.timeout_secs {
        runner = runner.with_timeout(Duration::from_secs(secs));
    }

    let mut session = RunSession::new(runner, workdir);
    let record = match session.compile(source) {
        Ok(record) => record.clone(),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    print_report(&record, options.verbose);

    if let Some(dest) = &options.export {
        run_export(&record, dest, options);
    }
}

fn print_report(record: &RunRecord, verbose: bool) {
    println!(
        "compiler finished: {} in {:.2}s",
        record.outcome.status,
        record.outcome.duration.as_secs_f64()
    );

    let sections = [
        ("Syntax Errors", DiagnosticKind::SyntaxError),
        ("Semantic Errors", DiagnosticKind::SemanticError),
        ("Warnings", DiagnosticKind::SemanticWarning),
    ];
    for (title, kind) in sections {
        let sequence = record.diagnostics.sequence(kind);
        if sequence.is_empty() {
            continue;
        }
        println!();
        println!("{title} ({}):", sequence.len());
        for diagnostic in sequence {
            println!("  {}", diagnostic.text);
        }
    }

    if verbose && !record.diagnostics.unclassified.is_empty() {
        println!();
        println!("Unclassified ({}):", record.diagnostics.unclassified.len());
        for diagnostic in &record.diagnostics.unclassified {
            println!("  {}", diagnostic.text);
        }
    }

    println!();
    for artifact in record.artifacts.iter() {
        if artifact.present() {
            println!("{}: {}", artifact.id, artifact.id.file_name());
            if verbose {
                for line in artifact.content_or_sentinel().lines() {
                    println!("  {line}");
                }
            }
        } else {
            println!("{}: {}", artifact.id, artifact.content_or_sentinel());
        }
    }

    if record.diagnostics.is_empty() {
        println!();
        println!("no diagnostics reported");
    }
}

fn run_export(record: &RunRecord, dest: &std::path::Path, options: &CompileOptions) {
    let export_options = ExportOptions {
        archive: options.archive,
    };
    let report = match export(record.bundle(), dest, export_options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    println!();
    println!(
        "exported {} file(s) to {}",
        report.written.len(),
        report.bundle_dir.display()
    );
    if let Some(archive) = &report.archive {
        println!("archive: {}", archive.display());
    }
    for failure in &report.failures {
        eprintln!("export error: {failure}");
    }

    if options.open {
        quill_export::reveal(&report.bundle_dir);
    }

    if !report.is_complete() {
        std::process::exit(1);
    }
}
