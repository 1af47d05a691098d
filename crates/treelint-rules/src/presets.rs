//! Rule presets for common configurations.

use crate::{DefinitionInNamespace, DuplicateDefinition, EmptyBlock};
use treelint_core::{RuleBox, Severity};

/// Preset configurations for treelint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended rules with sensible defaults.
    Recommended,
    /// All rules, with namespace misuse escalated to an error.
    Strict,
    /// Minimal rules for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
        }
    }
}

/// Returns the recommended set of rules.
///
/// Includes:
/// - `definition-in-namespace` - definitions inside namespace blocks
/// - `duplicate-definition` - repeated definitions in one file
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    vec![
        Box::new(DefinitionInNamespace::new()),
        Box::new(DuplicateDefinition::new()),
    ]
}

/// Returns the strict set of rules.
///
/// All rules, with `definition-in-namespace` raised to error severity.
#[must_use]
pub fn strict_rules() -> Vec<RuleBox> {
    vec![
        Box::new(DefinitionInNamespace::new().severity(Severity::Error)),
        Box::new(DuplicateDefinition::new()),
        Box::new(EmptyBlock::new()),
    ]
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only includes `definition-in-namespace`.
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    vec![Box::new(DefinitionInNamespace::new())]
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(DefinitionInNamespace::new()),
        Box::new(DuplicateDefinition::new()),
        Box::new(EmptyBlock::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use treelint_core::Registry;

    #[test]
    fn presets_are_non_empty() {
        assert!(!Preset::Recommended.rules().is_empty());
        assert!(!Preset::Strict.rules().is_empty());
        assert!(!Preset::Minimal.rules().is_empty());
    }

    #[test]
    fn every_preset_registers_cleanly() {
        for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal] {
            let mut registry = Registry::new();
            registry.register_all(preset.rules()).unwrap();
            assert_eq!(registry.len(), preset.rules().len());
        }
    }
}
