//! The rule authoring interface.

use crate::context::RuleContext;
use crate::node::{NodeKind, NodeRef};
use crate::report::Severity;

/// A unit of analysis dispatched for specific node kinds.
///
/// Rules are stateless across files: any scratch state carried in the
/// implementing type (e.g. "names already seen in this tree") must be cleared
/// in [`Rule::reset`], which the engine calls at the start of every
/// traversal. A rule instance is owned by exactly one [`Registry`] and never
/// shared across concurrent traversals; run parallel files with one registry
/// per worker.
///
/// [`Registry`]: crate::Registry
///
/// # Example
///
/// ```
/// use treelint_core::{NodeKind, NodeRef, Rule, RuleContext};
///
/// struct EmptyClass;
///
/// impl Rule for EmptyClass {
///     fn name(&self) -> &'static str {
///         "empty-class"
///     }
///
///     fn interested_kinds(&self) -> &'static [NodeKind] {
///         &[NodeKind::ClassDef]
///     }
///
///     fn on_node(&mut self, node: NodeRef<'_>, ctx: &mut RuleContext<'_>) {
///         if node.child_count() == 0 {
///             ctx.report("class has no body", node);
///         }
///     }
/// }
/// ```
pub trait Rule: Send {
    /// Stable kebab-case identifier of this rule (e.g. "definition-in-namespace").
    fn name(&self) -> &'static str;

    /// Brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Default severity for diagnostics from this rule, absent any override.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// The node kinds this rule wants to be notified about.
    ///
    /// Registering the same handler for several kinds (e.g. both `ClassDef`
    /// and `ModuleDef`) is simply returning both kinds here.
    fn interested_kinds(&self) -> &'static [NodeKind];

    /// Clears per-traversal scratch state. Called by the engine at the start
    /// of every walk so state cannot leak between files.
    fn reset(&mut self) {}

    /// Visits one node the rule subscribed to.
    ///
    /// `ctx` exposes the ancestor-query primitives and routes
    /// [`RuleContext::report`] to the traversal's aggregator.
    fn on_node(&mut self, node: NodeRef<'_>, ctx: &mut RuleContext<'_>);
}

/// Type alias for boxed [`Rule`] trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Substitutes `%{name}` placeholders in a message template.
///
/// Placeholders with no matching entry are left verbatim.
///
/// ```
/// use treelint_core::render_template;
///
/// let msg = render_template("Do not define a %{type} here.", &[("type", "class")]);
/// assert_eq!(msg, "Do not define a class here.");
/// ```
#[must_use]
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut message = template.to_string();
    for (key, value) in values {
        message = message.replace(&format!("%{{{key}}}"), value);
    }
    message
}
