//! # treelint-rules
//!
//! Built-in structural rules for the treelint engine.
//!
//! ## Available Rules
//!
//! | Name | Description |
//! |------|-------------|
//! | `definition-in-namespace` | Flags class/module definitions inside namespace blocks |
//! | `duplicate-definition` | Flags repeated definitions with the same name in one file |
//! | `empty-block` | Flags blocks with an empty body |
//!
//! ## Usage
//!
//! ```
//! use treelint_core::{analyze, NodeKind, Registry, Span, TreeBuilder};
//! use treelint_rules::recommended_rules;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = TreeBuilder::new();
//! builder.root(NodeKind::Root, Span::new(0, 0))?;
//! let tree = builder.finish()?;
//!
//! let mut registry = Registry::new();
//! registry.register_all(recommended_rules())?;
//! let report = analyze(&tree, &mut registry)?;
//! assert!(report.is_empty());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod definition_in_namespace;
mod duplicate_definition;
mod empty_block;
mod presets;

pub use definition_in_namespace::DefinitionInNamespace;
pub use duplicate_definition::DuplicateDefinition;
pub use empty_block::EmptyBlock;
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};

/// Re-export core types for convenience.
pub use treelint_core::{Rule, RuleBox, Severity};
