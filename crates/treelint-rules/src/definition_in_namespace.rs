//! Rule flagging class/module definitions inside namespace-like blocks.
//!
//! # Rationale
//!
//! In languages where a `namespace "x" do ... end` block does not open a
//! lexical scope, a class or module defined inside it lands at the top level.
//! The code reads as if the definition were scoped, which is misleading.
//! Defining inside a task-like block is accepted: the definition still lands
//! at the top level, but that is the expected behavior there.
//!
//! # Configuration
//!
//! - `namespace_methods`: callee names treated as namespace definers
//!   (default: `["namespace"]`)
//! - `task_methods`: callee names treated as task definers
//!   (default: `["task"]`)
//!
//! The vocabulary is configurable because the engine is domain-agnostic;
//! nothing in the matcher hardcodes these names.

use treelint_core::{
    render_template, NodeKind, NodeRef, Pattern, Rule, RuleContext, Severity,
};

/// Rule id for definition-in-namespace.
pub const NAME: &str = "definition-in-namespace";

const MSG: &str =
    "Do not define a %{type} in a namespace, because it will be defined to the top level.";

/// Flags class and module definitions whose nearest enclosing definer block
/// is a namespace.
///
/// The query is "nearest enclosing call to a definer method, stopping at any
/// class/module boundary": a definition nested inside another definition is
/// that definition's business, and a definition whose nearest definer is a
/// task is accepted.
#[derive(Debug, Clone)]
pub struct DefinitionInNamespace {
    namespace_methods: Vec<String>,
    task_methods: Vec<String>,
    severity: Severity,
}

impl Default for DefinitionInNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionInNamespace {
    /// Creates the rule with the default `namespace`/`task` vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespace_methods: vec!["namespace".to_string()],
            task_methods: vec!["task".to_string()],
            severity: Severity::Warning,
        }
    }

    /// Sets the callee names treated as namespace definers.
    #[must_use]
    pub fn namespace_methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespace_methods = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the callee names treated as task definers.
    #[must_use]
    pub fn task_methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.task_methods = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn is_namespace(&self, node: NodeRef<'_>) -> bool {
        node.name()
            .is_some_and(|n| self.namespace_methods.iter().any(|m| m == n))
    }
}

impl Rule for DefinitionInNamespace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags class/module definitions inside namespace blocks, where they are defined to the top level"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn interested_kinds(&self) -> &'static [NodeKind] {
        // One handler for both definition kinds.
        &[NodeKind::ClassDef, NodeKind::ModuleDef]
    }

    fn on_node(&mut self, node: NodeRef<'_>, ctx: &mut RuleContext<'_>) {
        let definer = Pattern::kind(NodeKind::MethodCall).named_one_of(
            self.namespace_methods
                .iter()
                .chain(self.task_methods.iter())
                .cloned(),
        );

        let boundary = &[NodeKind::ClassDef, NodeKind::ModuleDef];
        let Some(enclosing) = ctx.nearest_ancestor(node, &definer, boundary) else {
            return;
        };

        if self.is_namespace(enclosing) {
            let kind = node.kind().to_string();
            ctx.report(render_template(MSG, &[("type", &kind)]), node);
        }
    }
}
