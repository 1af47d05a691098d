//! # treelint-core
//!
//! Framework-independent rule engine for tree-based static analysis.
//!
//! The engine consumes a syntax tree built by an external parser and runs a
//! set of registered rules over it in a single depth-first pass:
//!
//! - [`Tree`] / [`TreeBuilder`] — arena-backed immutable node model
//! - [`Pattern`] — declarative structural queries over nodes and ancestors
//! - [`Rule`] — the capability interface rules implement
//! - [`Registry`] — kind-indexed rule registration and dispatch
//! - [`analyze`] — the traversal producing a sorted, de-duplicated [`Report`]
//!
//! ## Example
//!
//! ```
//! use treelint_core::{analyze, NodeKind, Registry, Span, TreeBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = TreeBuilder::new();
//! let root = builder.root(NodeKind::Root, Span::new(0, 10))?;
//! builder.child_of(root, NodeKind::Block, Span::new(2, 8))?;
//! let tree = builder.finish()?;
//!
//! let mut registry = Registry::new();
//! let report = analyze(&tree, &mut registry)?;
//! assert!(report.is_empty());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod engine;
mod node;
mod pattern;
mod registry;
mod report;
mod rule;

pub use config::{Config, ConfigError, RuleConfig};
pub use context::RuleContext;
pub use engine::{analyze, analyze_with_cancel, CancelToken, EngineError};
pub use node::{Ancestors, NodeId, NodeKind, NodeRef, Span, Tree, TreeBuilder, TreeError};
pub use pattern::{any_ancestor, nearest_ancestor, Pattern};
pub use registry::{Registry, RegistryError};
pub use report::{
    Aggregator, AggregatorSealed, Diagnostic, RenderedDiagnostic, Report, Severity,
};
pub use rule::{render_template, Rule, RuleBox};
