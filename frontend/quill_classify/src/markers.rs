//! The marker vocabulary as data.
//!
//! Substring matching against a tool's exact wording is inherently fragile,
//! so the rules live in an ordered table instead of scattered conditionals.
//! Precedence is table order; the first rule whose marker occurs in the line
//! wins.

use std::fmt;

use crate::diagnostic::DiagnosticKind;

/// One literal, case-sensitive marker substring and the bucket it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRule {
    pub marker: String,
    pub kind: DiagnosticKind,
}

impl MarkerRule {
    pub fn new(marker: impl Into<String>, kind: DiagnosticKind) -> Self {
        MarkerRule {
            marker: marker.into(),
            kind,
        }
    }

    /// Whether this rule matches the given line.
    pub fn matches(&self, line: &str) -> bool {
        line.contains(&self.marker)
    }
}

/// Ordered list of marker rules.
///
/// The default table carries the external compiler's current vocabulary:
/// specific semantic markers first, then the syntax marker, then the generic
/// warning fallback. A line matching both a semantic and a syntax marker is
/// therefore filed as semantic, and `"Semantic Warning"` outranks the bare
/// `"Warning"` rule, so no line is ever filed twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTable {
    rules: Vec<MarkerRule>,
}

impl MarkerTable {
    /// An empty table; every line classifies as unclassified.
    pub fn empty() -> Self {
        MarkerTable { rules: Vec::new() }
    }

    /// Append a rule at the lowest precedence position.
    #[must_use]
    pub fn with_rule(mut self, marker: impl Into<String>, kind: DiagnosticKind) -> Self {
        self.rules.push(MarkerRule::new(marker, kind));
        self
    }

    /// The rules in precedence order.
    pub fn rules(&self) -> &[MarkerRule] {
        &self.rules
    }

    /// Classify one line: first matching rule wins, no match means no kind.
    pub fn kind_for(&self, line: &str) -> Option<DiagnosticKind> {
        self.rules
            .iter()
            .find(|rule| rule.matches(line))
            .map(|rule| rule.kind)
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        MarkerTable::empty()
            .with_rule("Semantic Error", DiagnosticKind::SemanticError)
            .with_rule("Semantic Warning", DiagnosticKind::SemanticWarning)
            .with_rule("Syntax Error", DiagnosticKind::SyntaxError)
            .with_rule("Warning", DiagnosticKind::SemanticWarning)
    }
}

impl fmt::Display for MarkerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            writeln!(f, "{:>2}. \"{}\" -> {}", i + 1, rule.marker, rule.kind)?;
        }
        Ok(())
    }
}
