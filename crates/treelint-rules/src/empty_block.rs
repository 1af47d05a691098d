//! Rule flagging blocks with no body.

use treelint_core::{NodeKind, NodeRef, Rule, RuleContext, Severity};

/// Rule id for empty-block.
pub const NAME: &str = "empty-block";

/// Flags `Block` nodes with no children.
#[derive(Debug, Clone, Default)]
pub struct EmptyBlock;

impl EmptyBlock {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for EmptyBlock {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags blocks with an empty body"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn interested_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Block]
    }

    fn on_node(&mut self, node: NodeRef<'_>, ctx: &mut RuleContext<'_>) {
        if node.child_count() == 0 {
            ctx.report("Empty block.", node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treelint_core::{analyze, Registry, Severity, Span, TreeBuilder};

    #[test]
    fn empty_block_is_flagged_as_info() {
        let mut b = TreeBuilder::new();
        let root = b.root(NodeKind::Root, Span::new(0, 100)).unwrap();
        let call = b
            .named_child_of(root, NodeKind::MethodCall, "task", Span::new(0, 90))
            .unwrap();
        b.child_of(call, NodeKind::Block, Span::new(10, 12)).unwrap();
        let tree = b.finish().unwrap();

        let mut registry = Registry::new();
        registry.register(Box::new(EmptyBlock::new())).unwrap();
        let report = analyze(&tree, &mut registry).unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.diagnostics()[0].severity, Severity::Info);
    }

    #[test]
    fn populated_block_is_accepted() {
        let mut b = TreeBuilder::new();
        let root = b.root(NodeKind::Root, Span::new(0, 100)).unwrap();
        let block = b.child_of(root, NodeKind::Block, Span::new(0, 90)).unwrap();
        b.child_of(block, NodeKind::Identifier, Span::new(10, 14))
            .unwrap();
        let tree = b.finish().unwrap();

        let mut registry = Registry::new();
        registry.register(Box::new(EmptyBlock::new())).unwrap();
        assert!(analyze(&tree, &mut registry).unwrap().is_empty());
    }
}
