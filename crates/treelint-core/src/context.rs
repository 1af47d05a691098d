//! Per-invocation context handed to rule callbacks.

use crate::node::{NodeKind, NodeRef, Span};
use crate::pattern::{self, Pattern};
use crate::report::{Aggregator, Diagnostic, Severity};

/// Context for one rule invocation on one node.
///
/// Routes [`report`](Self::report) to the traversal's aggregator with the
/// rule's identity and effective severity, and exposes the pattern matcher's
/// ancestor queries so rules declare shapes instead of walking by hand.
#[derive(Debug)]
pub struct RuleContext<'a> {
    rule: &'static str,
    severity: Severity,
    sink: &'a mut Aggregator,
    prune: bool,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(rule: &'static str, severity: Severity, sink: &'a mut Aggregator) -> Self {
        Self {
            rule,
            severity,
            sink,
            prune: false,
        }
    }

    /// The effective severity diagnostics from this invocation will carry.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Emits a diagnostic targeting `node`, spanning the node itself.
    pub fn report(&mut self, message: impl Into<String>, node: NodeRef<'_>) {
        self.report_at(message, node.span(), node);
    }

    /// Emits a diagnostic targeting `node` with an explicit span.
    pub fn report_at(&mut self, message: impl Into<String>, span: Span, node: NodeRef<'_>) {
        self.sink.record(Diagnostic::new(
            self.rule,
            self.severity,
            message,
            span,
            node.id(),
        ));
    }

    /// Requests that the engine not descend into the current node's children.
    ///
    /// Needed when a rule handles a whole construct at once (e.g. nested
    /// namespaces) and a second visit inside would double-report.
    pub fn prune(&mut self) {
        self.prune = true;
    }

    pub(crate) fn prune_requested(&self) -> bool {
        self.prune
    }

    /// Finds the closest ancestor of `node` matching `pattern`, stopping at
    /// any `stop_at` kind. See [`pattern::nearest_ancestor`].
    #[must_use]
    pub fn nearest_ancestor<'t>(
        &self,
        node: NodeRef<'t>,
        pattern: &Pattern,
        stop_at: &[NodeKind],
    ) -> Option<NodeRef<'t>> {
        pattern::nearest_ancestor(node, pattern, stop_at)
    }

    /// Whether any ancestor of `node` matches `pattern`.
    #[must_use]
    pub fn any_ancestor(&self, node: NodeRef<'_>, pattern: &Pattern) -> bool {
        pattern::any_ancestor(node, pattern)
    }
}
