//! Single-pass depth-first traversal dispatching to registered rules.

use crate::context::RuleContext;
use crate::node::{NodeId, Tree, TreeError};
use crate::registry::Registry;
use crate::report::{Aggregator, Diagnostic, Report, Severity};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors aborting a whole traversal. Rule faults are not among them: they
/// are isolated per rule and converted into diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A node handle failed to resolve.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The caller cancelled the traversal. The partial report is discarded.
    #[error("traversal cancelled")]
    Cancelled,
}

/// Cooperative cancellation handle checked at every visit boundary.
///
/// Clone the token, hand one clone to the analyzing worker, and call
/// [`cancel`](Self::cancel) from anywhere else.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Walks `tree` once, depth-first pre-order, dispatching each node to the
/// rules interested in its kind, and returns the finalized report.
///
/// Rules fire synchronously in registration order, so two rules firing on
/// the same node always report in the same order. Each enabled rule's
/// [`reset`](crate::Rule::reset) runs before the walk, keeping scratch state
/// scoped to one tree.
///
/// # Errors
///
/// Returns [`EngineError::Tree`] if a node handle fails to resolve.
pub fn analyze(tree: &Tree, registry: &mut Registry) -> Result<Report, EngineError> {
    walk(tree, registry, None)
}

/// Like [`analyze`], but checks `cancel` between node visits.
///
/// # Errors
///
/// Returns [`EngineError::Cancelled`] if the token fires; diagnostics
/// collected up to that point are discarded, never surfaced as a report.
pub fn analyze_with_cancel(
    tree: &Tree,
    registry: &mut Registry,
    cancel: &CancelToken,
) -> Result<Report, EngineError> {
    walk(tree, registry, Some(cancel))
}

fn walk(
    tree: &Tree,
    registry: &mut Registry,
    cancel: Option<&CancelToken>,
) -> Result<Report, EngineError> {
    info!("starting traversal over {} node(s)", tree.len());

    for entry in &mut registry.rules {
        if entry.enabled {
            entry.rule.reset();
        }
    }

    // A rule that faulted is sidelined for the remainder of this walk only.
    let mut faulted = vec![false; registry.rules.len()];
    let mut aggregator = Aggregator::new();
    let mut stack: Vec<NodeId> = vec![tree.root().id()];

    while let Some(id) = stack.pop() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            info!("traversal cancelled, discarding partial report");
            return Err(EngineError::Cancelled);
        }

        let node = tree.get(id)?;
        let mut prune = false;

        if let Some(indices) = registry.by_kind.get(&node.kind()) {
            for &i in indices {
                let entry = &mut registry.rules[i];
                if !entry.enabled || faulted[i] {
                    continue;
                }

                let name = entry.rule.name();
                let severity = entry.effective_severity();
                let mut ctx = RuleContext::new(name, severity, &mut aggregator);
                let outcome =
                    catch_unwind(AssertUnwindSafe(|| entry.rule.on_node(node, &mut ctx)));
                prune |= ctx.prune_requested();

                if let Err(payload) = outcome {
                    faulted[i] = true;
                    let reason = panic_message(payload.as_ref());
                    warn!("rule {name} faulted, sidelining for this file: {reason}");
                    aggregator.record(Diagnostic::new(
                        name,
                        Severity::Error,
                        format!("internal rule error: {reason}"),
                        node.span(),
                        node.id(),
                    ));
                }
            }
        }

        if prune {
            debug!("pruning subtree below node {:?}", node.id());
        } else {
            // Reverse push keeps pre-order left-to-right on the LIFO stack.
            let children: Vec<NodeId> = node.children().map(|c| c.id()).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    let report = aggregator.finalize();
    info!("traversal complete: {} diagnostic(s)", report.len());
    Ok(report)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, NodeRef, Span, TreeBuilder};
    use crate::rule::Rule;

    struct CountVisits {
        seen: usize,
    }

    impl Rule for CountVisits {
        fn name(&self) -> &'static str {
            "count-visits"
        }
        fn interested_kinds(&self) -> &'static [NodeKind] {
            &[NodeKind::Identifier]
        }
        fn reset(&mut self) {
            self.seen = 0;
        }
        fn on_node(&mut self, node: NodeRef<'_>, ctx: &mut RuleContext<'_>) {
            self.seen += 1;
            ctx.report(format!("visit {}", self.seen), node);
        }
    }

    fn flat_tree(idents: usize) -> Tree {
        let mut b = TreeBuilder::new();
        let root = b.root(NodeKind::Root, Span::new(0, 100)).unwrap();
        for i in 0..idents {
            b.child_of(root, NodeKind::Identifier, Span::new(i * 10, i * 10 + 5))
                .unwrap();
        }
        b.finish().unwrap()
    }

    #[test]
    fn visits_each_interested_node_once() {
        let tree = flat_tree(3);
        let mut registry = Registry::new();
        registry.register(Box::new(CountVisits { seen: 0 })).unwrap();

        let report = analyze(&tree, &mut registry).unwrap();
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn reset_runs_before_each_walk() {
        let tree = flat_tree(2);
        let mut registry = Registry::new();
        registry.register(Box::new(CountVisits { seen: 100 })).unwrap();

        let first = analyze(&tree, &mut registry).unwrap();
        let second = analyze(&tree, &mut registry).unwrap();
        // Scratch state did not leak: both walks start counting at 1.
        assert_eq!(first, second);
        assert_eq!(first.diagnostics()[0].message, "visit 1");
    }

    #[test]
    fn disabled_rule_does_not_fire() {
        let tree = flat_tree(2);
        let mut registry = Registry::new();
        registry.register(Box::new(CountVisits { seen: 0 })).unwrap();
        registry.disable("count-visits").unwrap();

        let report = analyze(&tree, &mut registry).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn pre_cancelled_token_aborts_immediately() {
        let tree = flat_tree(2);
        let mut registry = Registry::new();
        registry.register(Box::new(CountVisits { seen: 0 })).unwrap();

        let token = CancelToken::new();
        token.cancel();
        let err = analyze_with_cancel(&tree, &mut registry, &token).unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }
}
