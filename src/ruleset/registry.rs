//! Registry of available rulesets.

use super::{ManiaRuleset, Ruleset};
use crate::models::settings::ManiaSettings;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry holding all available rulesets.
#[derive(Debug)]
pub struct RulesetRegistry {
    rulesets: HashMap<String, Arc<dyn Ruleset>>,
    default_ruleset: String,
}

impl Default for RulesetRegistry {
    fn default() -> Self {
        Self::new(ManiaSettings::default())
    }
}

impl RulesetRegistry {
    /// Creates a new registry with the built-in rulesets.
    pub fn new(mania: ManiaSettings) -> Self {
        let mut registry = Self {
            rulesets: HashMap::new(),
            default_ruleset: ManiaRuleset::ID.to_string(),
        };

        registry.register(Arc::new(ManiaRuleset::new(mania)));

        registry
    }

    /// Registers a ruleset, replacing one with the same id.
    pub fn register(&mut self, ruleset: Arc<dyn Ruleset>) {
        let id = ruleset.id().to_string();
        if self.rulesets.insert(id.clone(), ruleset).is_some() {
            log::warn!("RULESET: Replaced existing ruleset '{}'", id);
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Ruleset>> {
        self.rulesets.get(id).cloned()
    }

    pub fn default_ruleset(&self) -> Option<Arc<dyn Ruleset>> {
        self.get(&self.default_ruleset)
    }

    /// Sets the default ruleset ID. Unknown ids are ignored.
    pub fn set_default(&mut self, id: &str) {
        if self.rulesets.contains_key(id) {
            self.default_ruleset = id.to_string();
        }
    }

    /// Returns all registered ruleset IDs, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rulesets.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_mania_is_default() {
        let mut registry = RulesetRegistry::default();
        assert_eq!(registry.ids(), vec!["mania"]);
        assert_eq!(registry.default_ruleset().unwrap().id(), "mania");

        registry.set_default("taiko");
        assert_eq!(registry.default_ruleset().unwrap().id(), "mania");
        assert!(registry.get("taiko").is_none());
    }
}
