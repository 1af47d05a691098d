//! Rule flagging repeated class/module definitions in one file.

use std::collections::HashSet;
use treelint_core::{render_template, NodeKind, NodeRef, Rule, RuleContext};

/// Rule id for duplicate-definition.
pub const NAME: &str = "duplicate-definition";

const MSG: &str = "Duplicate definition of %{type} `%{name}` in this file.";

/// Flags a second class or module definition with the same kind and name
/// within a single tree.
///
/// Carries per-traversal scratch state (the names already seen); the engine
/// clears it through `reset` at every walk start.
#[derive(Debug, Default)]
pub struct DuplicateDefinition {
    seen: HashSet<(NodeKind, String)>,
}

impl DuplicateDefinition {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rule for DuplicateDefinition {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags repeated class/module definitions with the same name in one file"
    }

    fn interested_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::ClassDef, NodeKind::ModuleDef]
    }

    fn reset(&mut self) {
        self.seen.clear();
    }

    fn on_node(&mut self, node: NodeRef<'_>, ctx: &mut RuleContext<'_>) {
        let Some(name) = node.name() else {
            return;
        };
        if !self.seen.insert((node.kind(), name.to_string())) {
            let kind = node.kind().to_string();
            ctx.report(
                render_template(MSG, &[("type", &kind), ("name", name)]),
                node,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treelint_core::{analyze, Registry, Span, Tree, TreeBuilder};

    fn tree_with_classes(names: &[&str]) -> Tree {
        let mut b = TreeBuilder::new();
        let root = b.root(NodeKind::Root, Span::new(0, 1000)).unwrap();
        for (i, name) in names.iter().enumerate() {
            b.named_child_of(
                root,
                NodeKind::ClassDef,
                *name,
                Span::new(i * 100, i * 100 + 50),
            )
            .unwrap();
        }
        b.finish().unwrap()
    }

    fn run(tree: &Tree) -> usize {
        let mut registry = Registry::new();
        registry
            .register(Box::new(DuplicateDefinition::new()))
            .unwrap();
        analyze(tree, &mut registry).unwrap().len()
    }

    #[test]
    fn distinct_names_are_accepted() {
        assert_eq!(run(&tree_with_classes(&["A", "B", "C"])), 0);
    }

    #[test]
    fn repeated_name_offends_once_per_repeat() {
        assert_eq!(run(&tree_with_classes(&["A", "A", "A"])), 2);
    }

    #[test]
    fn class_and_module_with_same_name_are_distinct() {
        let mut b = TreeBuilder::new();
        let root = b.root(NodeKind::Root, Span::new(0, 100)).unwrap();
        b.named_child_of(root, NodeKind::ClassDef, "X", Span::new(0, 40))
            .unwrap();
        b.named_child_of(root, NodeKind::ModuleDef, "X", Span::new(50, 90))
            .unwrap();
        assert_eq!(run(&b.finish().unwrap()), 0);
    }

    #[test]
    fn scratch_state_does_not_leak_between_trees() {
        let tree = tree_with_classes(&["A"]);
        let mut registry = Registry::new();
        registry
            .register(Box::new(DuplicateDefinition::new()))
            .unwrap();
        // Two files each defining `A` once: no duplicates in either.
        assert!(analyze(&tree, &mut registry).unwrap().is_empty());
        assert!(analyze(&tree, &mut registry).unwrap().is_empty());
    }
}
