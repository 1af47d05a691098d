//! Rule registration and kind-indexed dispatch.

use crate::config::Config;
use crate::node::NodeKind;
use crate::report::Severity;
use crate::rule::RuleBox;

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Registration-time errors. All of these are misconfigurations surfaced
/// before any tree is analyzed.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A rule with the same id is already registered.
    #[error("duplicate rule id: {id}")]
    DuplicateRuleId {
        /// The conflicting rule id.
        id: String,
    },

    /// The rule declared an empty interest set and could never fire.
    #[error("rule {id} declares no interested node kinds")]
    NoInterestedKinds {
        /// The offending rule id.
        id: String,
    },

    /// Enable/disable/severity referenced an unregistered rule.
    #[error("unknown rule: {id}")]
    UnknownRule {
        /// The unknown rule id.
        id: String,
    },
}

pub(crate) struct RuleEntry {
    pub(crate) rule: RuleBox,
    pub(crate) enabled: bool,
    pub(crate) severity_override: Option<Severity>,
}

impl RuleEntry {
    pub(crate) fn effective_severity(&self) -> Severity {
        self.severity_override
            .unwrap_or_else(|| self.rule.default_severity())
    }
}

/// Holds registered rules and a precomputed `NodeKind -> rules` dispatch map.
///
/// The map is built at registration time so the traversal does an O(1) lookup
/// plus O(interested rules) invocation per node instead of asking every rule
/// about every node. Enable/disable toggles keep the registration alive for
/// the life of the registry.
///
/// A registry is configured once and then handed mutably to the engine per
/// traversal; concurrent workers each get their own registry.
#[derive(Default)]
pub struct Registry {
    pub(crate) rules: Vec<RuleEntry>,
    pub(crate) by_kind: HashMap<NodeKind, Vec<usize>>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule, enabled, with its default severity.
    ///
    /// Dispatch order on a shared node kind is registration order, which
    /// makes diagnostic ordering reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRuleId`] if the id is taken, or
    /// [`RegistryError::NoInterestedKinds`] if the rule subscribes to nothing.
    pub fn register(&mut self, rule: RuleBox) -> Result<(), RegistryError> {
        let id = rule.name();
        if self.by_name.contains_key(id) {
            return Err(RegistryError::DuplicateRuleId { id: id.to_string() });
        }
        let kinds = rule.interested_kinds();
        if kinds.is_empty() {
            return Err(RegistryError::NoInterestedKinds { id: id.to_string() });
        }

        let index = self.rules.len();
        for &kind in kinds {
            let subscribers = self.by_kind.entry(kind).or_default();
            // A rule listing a kind twice still dispatches once.
            if !subscribers.contains(&index) {
                subscribers.push(index);
            }
        }
        self.by_name.insert(id.to_string(), index);
        self.rules.push(RuleEntry {
            rule,
            enabled: true,
            severity_override: None,
        });
        Ok(())
    }

    /// Registers every rule in `rules`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the first [`RegistryError`] encountered.
    pub fn register_all(
        &mut self,
        rules: impl IntoIterator<Item = RuleBox>,
    ) -> Result<(), RegistryError> {
        for rule in rules {
            self.register(rule)?;
        }
        Ok(())
    }

    /// Enables a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownRule`] if no such rule is registered.
    pub fn enable(&mut self, id: &str) -> Result<(), RegistryError> {
        self.entry_mut(id)?.enabled = true;
        Ok(())
    }

    /// Disables a rule without removing its registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownRule`] if no such rule is registered.
    pub fn disable(&mut self, id: &str) -> Result<(), RegistryError> {
        self.entry_mut(id)?.enabled = false;
        Ok(())
    }

    /// Overrides the severity of every diagnostic the rule emits.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownRule`] if no such rule is registered.
    pub fn set_severity(&mut self, id: &str, severity: Severity) -> Result<(), RegistryError> {
        self.entry_mut(id)?.severity_override = Some(severity);
        Ok(())
    }

    /// Whether a rule is registered and enabled.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.by_name
            .get(id)
            .is_some_and(|&i| self.rules[i].enabled)
    }

    /// Number of registered rules (enabled or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Ids of all registered rules, in registration order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|e| e.rule.name())
    }

    /// Applies enable/disable and severity overrides from a resolved
    /// [`Config`]. Config entries naming unregistered rules are ignored, so
    /// one config file can serve several rule sets.
    pub fn apply_config(&mut self, config: &Config) {
        for (id, rule_config) in &config.rules {
            let Some(&index) = self.by_name.get(id.as_str()) else {
                debug!("config references unregistered rule: {id}");
                continue;
            };
            let entry = &mut self.rules[index];
            if let Some(enabled) = rule_config.enabled {
                entry.enabled = enabled;
            }
            if let Some(severity) = rule_config.severity {
                entry.severity_override = Some(severity);
            }
        }
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut RuleEntry, RegistryError> {
        let index = *self
            .by_name
            .get(id)
            .ok_or_else(|| RegistryError::UnknownRule { id: id.to_string() })?;
        Ok(&mut self.rules[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RuleContext;
    use crate::node::NodeRef;
    use crate::rule::Rule;

    struct Probe {
        name: &'static str,
        kinds: &'static [NodeKind],
    }

    impl Rule for Probe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn interested_kinds(&self) -> &'static [NodeKind] {
            self.kinds
        }
        fn on_node(&mut self, _node: NodeRef<'_>, _ctx: &mut RuleContext<'_>) {}
    }

    fn probe(name: &'static str, kinds: &'static [NodeKind]) -> RuleBox {
        Box::new(Probe { name, kinds })
    }

    #[test]
    fn register_builds_dispatch_map() {
        let mut registry = Registry::new();
        registry
            .register(probe("a", &[NodeKind::ClassDef, NodeKind::ModuleDef]))
            .unwrap();
        registry.register(probe("b", &[NodeKind::ClassDef])).unwrap();

        assert_eq!(registry.by_kind[&NodeKind::ClassDef], vec![0, 1]);
        assert_eq!(registry.by_kind[&NodeKind::ModuleDef], vec![0]);
        assert!(!registry.by_kind.contains_key(&NodeKind::Block));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = Registry::new();
        registry.register(probe("dup", &[NodeKind::Block])).unwrap();
        let err = registry
            .register(probe("dup", &[NodeKind::ClassDef]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRuleId { id } if id == "dup"));
        // The original registration survives.
        assert_eq!(registry.len(), 1);
        assert!(registry.is_enabled("dup"));
    }

    #[test]
    fn empty_interest_set_is_rejected() {
        let mut registry = Registry::new();
        let err = registry.register(probe("idle", &[])).unwrap_err();
        assert!(matches!(err, RegistryError::NoInterestedKinds { id } if id == "idle"));
    }

    #[test]
    fn enable_disable_persists_registration() {
        let mut registry = Registry::new();
        registry.register(probe("r", &[NodeKind::Block])).unwrap();

        registry.disable("r").unwrap();
        assert!(!registry.is_enabled("r"));
        assert_eq!(registry.len(), 1);

        registry.enable("r").unwrap();
        assert!(registry.is_enabled("r"));
    }

    #[test]
    fn toggling_unknown_rule_fails() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.disable("ghost"),
            Err(RegistryError::UnknownRule { .. })
        ));
    }

    #[test]
    fn severity_override_applies() {
        let mut registry = Registry::new();
        registry.register(probe("r", &[NodeKind::Block])).unwrap();
        registry.set_severity("r", Severity::Info).unwrap();
        assert_eq!(registry.rules[0].effective_severity(), Severity::Info);
    }

    #[test]
    fn config_toggles_and_overrides() {
        let toml = r#"
[rules.tuned]
enabled = false
severity = "error"

[rules.unknown-elsewhere]
enabled = false
"#;
        let config = Config::parse(toml).unwrap();

        let mut registry = Registry::new();
        registry.register(probe("tuned", &[NodeKind::Block])).unwrap();
        registry.apply_config(&config);

        assert!(!registry.is_enabled("tuned"));
        assert_eq!(registry.rules[0].effective_severity(), Severity::Error);
    }
}
