//! Line-by-line classification of a finished run.

use quill_process::{ProcessOutcome, StreamKind};

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::markers::MarkerTable;

/// Four ordered diagnostic sequences produced from one [`ProcessOutcome`].
///
/// Invariant: every line of stdout and stderr is accounted for in exactly one
/// sequence; the total diagnostic count equals the total input line count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    pub syntax_errors: Vec<Diagnostic>,
    pub semantic_errors: Vec<Diagnostic>,
    pub semantic_warnings: Vec<Diagnostic>,
    pub unclassified: Vec<Diagnostic>,
}

impl ClassificationResult {
    fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::SyntaxError => self.syntax_errors.push(diagnostic),
            DiagnosticKind::SemanticError => self.semantic_errors.push(diagnostic),
            DiagnosticKind::SemanticWarning => self.semantic_warnings.push(diagnostic),
            DiagnosticKind::Unclassified => self.unclassified.push(diagnostic),
        }
    }

    /// The sequence for one kind, in classification order.
    pub fn sequence(&self, kind: DiagnosticKind) -> &[Diagnostic] {
        match kind {
            DiagnosticKind::SyntaxError => &self.syntax_errors,
            DiagnosticKind::SemanticError => &self.semantic_errors,
            DiagnosticKind::SemanticWarning => &self.semantic_warnings,
            DiagnosticKind::Unclassified => &self.unclassified,
        }
    }

    /// Total number of classified lines across all four sequences.
    pub fn total(&self) -> usize {
        self.syntax_errors.len()
            + self.semantic_errors.len()
            + self.semantic_warnings.len()
            + self.unclassified.len()
    }

    /// Whether any error-kind sequence is non-empty.
    pub fn has_errors(&self) -> bool {
        !self.syntax_errors.is_empty() || !self.semantic_errors.is_empty()
    }

    /// Whether the run produced no classified lines at all.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// The literal line text of one sequence, newline-joined, in
    /// classification order. This is the shape the export bundle writes.
    pub fn joined(&self, kind: DiagnosticKind) -> String {
        let lines: Vec<&str> = self
            .sequence(kind)
            .iter()
            .map(|d| d.text.as_str())
            .collect();
        lines.join("\n")
    }
}

/// Classifies a run's raw streams against a [`MarkerTable`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: MarkerTable,
}

impl Classifier {
    /// A classifier carrying the external compiler's default vocabulary.
    pub fn new() -> Self {
        Classifier::default()
    }

    /// A classifier with a custom marker table.
    pub fn with_table(table: MarkerTable) -> Self {
        Classifier { table }
    }

    /// The active marker table.
    pub fn table(&self) -> &MarkerTable {
        &self.table
    }

    /// Partition one outcome into the four diagnostic sequences.
    ///
    /// Stdout is classified line-by-line against the marker table; a line
    /// matching no rule is retained as unclassified. Every stderr line is
    /// then appended, in order, to the semantic-error sequence: stderr is
    /// reserved for failures the tool did not anticipate, which are
    /// conservatively the most severe category. An empty outcome yields four
    /// empty sequences, not an error.
    pub fn classify(&self, outcome: &ProcessOutcome) -> ClassificationResult {
        let mut result = ClassificationResult::default();

        for (ordinal, line) in outcome.stdout.lines().enumerate() {
            let kind = self
                .table
                .kind_for(line)
                .unwrap_or(DiagnosticKind::Unclassified);
            result.push(Diagnostic {
                kind,
                stream: StreamKind::Stdout,
                text: line.to_owned(),
                ordinal,
            });
        }

        for (ordinal, line) in outcome.stderr.lines().enumerate() {
            result.push(Diagnostic {
                kind: DiagnosticKind::SemanticError,
                stream: StreamKind::Stderr,
                text: line.to_owned(),
                ordinal,
            });
        }

        result
    }
}
