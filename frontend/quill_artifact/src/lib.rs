//! Artifact Loader - the compiler's well-known output files
//!
//! After a run, the external compiler may leave up to three listings in the
//! working directory: a symbol table, a quadruple (intermediate code)
//! listing, and generated assembly. Their names are a fixed external
//! contract dictated by the compiler. This crate reads them fresh after
//! every compile (never cached across runs) and treats absence as a
//! normal state, not an error. Content is an opaque pass-through;
//! interpreting symbol-table or assembly syntax is the compiler's business.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Sentinel rendered for an artifact the compiler did not produce.
pub const NOT_PRODUCED: &str = "(not produced)";

/// The three artifact files the external compiler may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactId {
    SymbolTable,
    Quadruples,
    Assembly,
}

impl ArtifactId {
    /// All artifact identifiers, in rendering order.
    pub const ALL: [ArtifactId; 3] = [
        ArtifactId::SymbolTable,
        ArtifactId::Quadruples,
        ArtifactId::Assembly,
    ];

    /// The well-known file name inside the working directory. Fixed by the
    /// external compiler, not negotiable by this system.
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactId::SymbolTable => "symbol_table.txt",
            ArtifactId::Quadruples => "quadruples.txt",
            ArtifactId::Assembly => "output.asm",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            ArtifactId::SymbolTable => "symbol table",
            ArtifactId::Quadruples => "quadruples",
            ArtifactId::Assembly => "assembly",
        }
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reading an artifact file failed for a reason other than absence.
///
/// A missing file is not an error, but a present-yet-unreadable one
/// (permissions, invalid encoding) points at a broken working directory and
/// must not be silently rendered as "not produced".
#[derive(Debug, Error)]
#[error("cannot read {id} file '{file}': {source}")]
pub struct ArtifactError {
    pub id: ArtifactId,
    pub file: String,
    #[source]
    pub source: std::io::Error,
}

/// One named output blob: present with content, or absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: ArtifactId,
    pub content: Option<String>,
}

impl Artifact {
    /// Whether the compiler produced this artifact on the last run.
    pub fn present(&self) -> bool {
        self.content.is_some()
    }

    /// The content, or the [`NOT_PRODUCED`] sentinel for display.
    pub fn content_or_sentinel(&self) -> &str {
        self.content.as_deref().unwrap_or(NOT_PRODUCED)
    }
}

/// Snapshot of all three artifacts from one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub symbol_table: Artifact,
    pub quadruples: Artifact,
    pub assembly: Artifact,
}

impl ArtifactSet {
    /// A snapshot with nothing produced, the state before any compile.
    pub fn absent() -> Self {
        ArtifactSet {
            symbol_table: Artifact {
                id: ArtifactId::SymbolTable,
                content: None,
            },
            quadruples: Artifact {
                id: ArtifactId::Quadruples,
                content: None,
            },
            assembly: Artifact {
                id: ArtifactId::Assembly,
                content: None,
            },
        }
    }

    /// Read all three well-known files from the working directory.
    ///
    /// Each artifact is independently present-or-absent; one missing file
    /// never affects the others.
    pub fn load(working_dir: &Path) -> Result<ArtifactSet, ArtifactError> {
        Ok(ArtifactSet {
            symbol_table: load_one(working_dir, ArtifactId::SymbolTable)?,
            quadruples: load_one(working_dir, ArtifactId::Quadruples)?,
            assembly: load_one(working_dir, ArtifactId::Assembly)?,
        })
    }

    /// The artifact for one identifier.
    pub fn get(&self, id: ArtifactId) -> &Artifact {
        match id {
            ArtifactId::SymbolTable => &self.symbol_table,
            ArtifactId::Quadruples => &self.quadruples,
            ArtifactId::Assembly => &self.assembly,
        }
    }

    /// Iterate over the artifacts in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        ArtifactId::ALL.iter().map(|id| self.get(*id))
    }

    /// How many of the three artifacts are present.
    pub fn present_count(&self) -> usize {
        self.iter().filter(|a| a.present()).count()
    }
}

fn load_one(working_dir: &Path, id: ArtifactId) -> Result<Artifact, ArtifactError> {
    let path = working_dir.join(id.file_name());
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            tracing::debug!(artifact = %id, bytes = content.len(), "loaded artifact");
            Ok(Artifact {
                id,
                content: Some(content),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Artifact { id, content: None }),
        Err(source) => Err(ArtifactError {
            id,
            file: path.display().to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_directory_loads_all_absent() {
        let dir = tempfile::tempdir().unwrap();
        let set = ArtifactSet::load(dir.path()).unwrap();

        assert_eq!(set.present_count(), 0);
        for artifact in set.iter() {
            assert!(!artifact.present());
            assert_eq!(artifact.content_or_sentinel(), NOT_PRODUCED);
        }
    }

    #[test]
    fn partial_production_is_normal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("output.asm"), "section .text\n").unwrap();

        let set = ArtifactSet::load(dir.path()).unwrap();
        assert!(set.assembly.present());
        assert_eq!(set.assembly.content.as_deref(), Some("section .text\n"));
        assert!(!set.symbol_table.present());
        assert!(!set.quadruples.present());
        assert_eq!(set.present_count(), 1);
    }

    #[test]
    fn full_production() {
        let dir = tempfile::tempdir().unwrap();
        for id in ArtifactId::ALL {
            std::fs::write(dir.path().join(id.file_name()), id.label()).unwrap();
        }

        let set = ArtifactSet::load(dir.path()).unwrap();
        assert_eq!(set.present_count(), 3);
        assert_eq!(set.get(ArtifactId::Quadruples).content.as_deref(), Some("quadruples"));
    }

    #[test]
    fn reload_sees_fresh_content() {
        // Never cached across runs: a second load reflects what is on disk
        // now, including files that vanished.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbol_table.txt");
        std::fs::write(&path, "x : int\n").unwrap();
        let first = ArtifactSet::load(dir.path()).unwrap();
        assert!(first.symbol_table.present());

        std::fs::remove_file(&path).unwrap();
        let second = ArtifactSet::load(dir.path()).unwrap();
        assert!(!second.symbol_table.present());
    }

    #[test]
    #[cfg(unix)]
    fn unreadable_file_is_an_error_not_absence() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quadruples.txt");
        std::fs::write(&path, "hidden").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();

        match ArtifactSet::load(dir.path()) {
            Err(err) => assert_eq!(err.id, ArtifactId::Quadruples),
            // Privileged runs (root in CI) bypass permission bits; the file
            // is then simply readable and must load as present.
            Ok(set) => assert!(set.quadruples.present()),
        }

        // restore so the tempdir can be cleaned up
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn well_known_names_are_fixed() {
        assert_eq!(ArtifactId::SymbolTable.file_name(), "symbol_table.txt");
        assert_eq!(ArtifactId::Quadruples.file_name(), "quadruples.txt");
        assert_eq!(ArtifactId::Assembly.file_name(), "output.asm");
    }
}
