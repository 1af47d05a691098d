//! Diagnostics, the per-traversal aggregator, and the finalized report.

use crate::node::{NodeId, Span};
use miette::SourceSpan;
use serde::{Deserialize, Serialize};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding, does not fail analysis.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single finding emitted by a rule during one traversal.
///
/// Immutable once emitted; owned by the [`Aggregator`] and then the
/// [`Report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable rule identifier (e.g. "definition-in-namespace").
    pub rule: String,
    /// Severity of this finding.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Source span of the offending node.
    pub span: Span,
    /// The node this diagnostic targets.
    pub node: NodeId,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        span: Span,
        node: NodeId,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            span,
            node,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{}: {} [{}] {}",
            self.span.start, self.span.end, self.severity, self.rule, self.message
        )
    }
}

/// Converts a [`Diagnostic`] to a miette diagnostic for rich display.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
pub struct RenderedDiagnostic {
    message: String,
    #[label("{rule}")]
    span: SourceSpan,
    rule: String,
}

impl From<&Diagnostic> for RenderedDiagnostic {
    fn from(d: &Diagnostic) -> Self {
        Self {
            message: format!("{}: {}", d.severity, d.message),
            span: SourceSpan::from((d.span.start, d.span.len())),
            rule: d.rule.clone(),
        }
    }
}

/// Emit was called on an aggregator that has already been finalized.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("aggregator is sealed: emit after finalize")]
pub struct AggregatorSealed;

/// Collects diagnostics during one traversal.
///
/// `finalize` sorts, de-duplicates, and seals the aggregator; emitting after
/// that is a programming error surfaced as [`AggregatorSealed`].
#[derive(Debug, Default)]
pub struct Aggregator {
    diagnostics: Vec<Diagnostic>,
    sealed: bool,
}

impl Aggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic to the in-progress collection.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorSealed`] if `finalize` has already run.
    pub fn emit(&mut self, diagnostic: Diagnostic) -> Result<(), AggregatorSealed> {
        if self.sealed {
            return Err(AggregatorSealed);
        }
        self.diagnostics.push(diagnostic);
        Ok(())
    }

    /// Infallible emit for the engine's own walk, which always finishes
    /// before finalizing.
    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        debug_assert!(!self.sealed, "engine emitted into a sealed aggregator");
        if !self.sealed {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Number of diagnostics collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether no diagnostics have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sorts by (span start, rule id), removes exact duplicates
    /// (same rule + same span), seals the aggregator, and produces the report.
    ///
    /// Terminal: the report of the first call is definitive; later calls
    /// yield an empty report and `emit` keeps failing.
    pub fn finalize(&mut self) -> Report {
        self.sealed = true;
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then_with(|| a.rule.cmp(&b.rule))
                // Tie-break on span end so exact duplicates are adjacent for
                // dedup even when one rule emits several spans sharing a start.
                .then_with(|| a.span.end.cmp(&b.span.end))
        });
        diagnostics.dedup_by(|a, b| a.rule == b.rule && a.span == b.span);
        Report { diagnostics }
    }
}

/// The finalized, ordered, de-duplicated findings of one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// The diagnostics, sorted by (span start, rule id).
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether the report holds no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Whether any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Whether any diagnostic meets or exceeds `severity`.
    #[must_use]
    pub fn has_diagnostics_at(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= severity)
    }

    /// Counts diagnostics as (errors, warnings, infos).
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.diagnostics.iter().filter(|d| d.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Formats the report for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        for d in &self.diagnostics {
            let _ = writeln!(out, "{d}");
        }
        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            out,
            "Found {errors} error(s), {warnings} warning(s), {infos} info(s)"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(rule: &str, start: usize, severity: Severity) -> Diagnostic {
        Diagnostic::new(
            rule,
            severity,
            "message",
            Span::new(start, start + 5),
            NodeId::default(),
        )
    }

    #[test]
    fn finalize_sorts_by_span_then_rule() {
        let mut agg = Aggregator::new();
        agg.emit(diag("zeta", 10, Severity::Warning)).unwrap();
        agg.emit(diag("alpha", 10, Severity::Warning)).unwrap();
        agg.emit(diag("mid", 3, Severity::Warning)).unwrap();

        let report = agg.finalize();
        let order: Vec<(&str, usize)> = report
            .diagnostics()
            .iter()
            .map(|d| (d.rule.as_str(), d.span.start))
            .collect();
        assert_eq!(order, vec![("mid", 3), ("alpha", 10), ("zeta", 10)]);
    }

    #[test]
    fn non_adjacent_exact_duplicates_collapse() {
        let at = |span: Span| {
            Diagnostic::new("r", Severity::Warning, "message", span, NodeId::default())
        };
        let mut agg = Aggregator::new();
        agg.emit(at(Span::new(0, 5))).unwrap();
        // Same rule and start, different end: sorts between the duplicates
        // unless the end offset is part of the sort key.
        agg.emit(at(Span::new(0, 9))).unwrap();
        agg.emit(at(Span::new(0, 5))).unwrap();

        let report = agg.finalize();
        assert_eq!(report.len(), 2);
        let ends: Vec<usize> = report.diagnostics().iter().map(|d| d.span.end).collect();
        assert_eq!(ends, vec![5, 9]);
    }

    #[test]
    fn finalize_removes_exact_duplicates() {
        let mut agg = Aggregator::new();
        agg.emit(diag("dup", 10, Severity::Warning)).unwrap();
        agg.emit(diag("dup", 10, Severity::Warning)).unwrap();
        agg.emit(diag("dup", 20, Severity::Warning)).unwrap();

        let report = agg.finalize();
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn emit_after_finalize_fails_and_report_is_stable() {
        let mut agg = Aggregator::new();
        agg.emit(diag("a", 1, Severity::Error)).unwrap();
        let report = agg.finalize();
        assert_eq!(report.len(), 1);

        assert_eq!(
            agg.emit(diag("b", 2, Severity::Error)),
            Err(AggregatorSealed)
        );
        // The already-produced report is untouched.
        assert_eq!(report.len(), 1);
        assert_eq!(report.diagnostics()[0].rule, "a");
    }

    #[test]
    fn severity_ordering_and_queries() {
        let mut agg = Aggregator::new();
        agg.emit(diag("w", 1, Severity::Warning)).unwrap();
        agg.emit(diag("i", 2, Severity::Info)).unwrap();
        let report = agg.finalize();

        assert!(!report.has_errors());
        assert!(report.has_diagnostics_at(Severity::Warning));
        assert!(!report.has_diagnostics_at(Severity::Error));
        assert_eq!(report.count_by_severity(), (0, 1, 1));
    }

    #[test]
    fn rendered_diagnostic_carries_span() {
        let d = diag("r", 7, Severity::Error);
        let rendered = RenderedDiagnostic::from(&d);
        assert_eq!(rendered.span.offset(), 7);
        assert_eq!(rendered.span.len(), 5);
    }
}
