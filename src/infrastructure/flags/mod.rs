//! Feature flags backed by the config file

use std::collections::BTreeMap;

use crate::domain::entities::RoleSet;
use crate::domain::traits::FeatureFlags;
use crate::infrastructure::config::FlagRule;

/// Evaluates flags from static targeting rules
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    rules: BTreeMap<String, FlagRule>,
}

impl ConfigFlags {
    pub fn new(rules: BTreeMap<String, FlagRule>) -> Self {
        Self { rules }
    }
}

impl FeatureFlags for ConfigFlags {
    fn evaluate(&self, flag_key: &str, user_id: &str, roles: &RoleSet) -> bool {
        let Some(rule) = self.rules.get(flag_key) else {
            tracing::debug!("Unknown flag {}, denying", flag_key);
            return false;
        };

        if !rule.enabled {
            return false;
        }

        if rule.users.iter().any(|u| u == user_id) {
            return true;
        }

        if rule.roles.iter().any(|r| roles.contains(r)) {
            return true;
        }

        rule.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> ConfigFlags {
        let mut rules = BTreeMap::new();
        rules.insert(
            "mc-commands".to_string(),
            FlagRule {
                enabled: true,
                default: false,
                users: vec!["42".to_string()],
                roles: vec!["ops".to_string()],
            },
        );
        rules.insert(
            "everyone".to_string(),
            FlagRule {
                enabled: true,
                default: true,
                ..FlagRule::default()
            },
        );
        rules.insert(
            "off".to_string(),
            FlagRule {
                enabled: false,
                default: true,
                users: vec!["42".to_string()],
                roles: Vec::new(),
            },
        );
        ConfigFlags::new(rules)
    }

    fn roles(names: &[&str]) -> RoleSet {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn user_and_role_targeting() {
        let flags = flags();
        assert!(flags.evaluate("mc-commands", "42", &RoleSet::empty()));
        assert!(flags.evaluate("mc-commands", "7", &roles(&["members", "ops"])));
        assert!(!flags.evaluate("mc-commands", "7", &roles(&["Ops"])));
        assert!(!flags.evaluate("mc-commands", "7", &RoleSet::empty()));
    }

    #[test]
    fn default_applies_to_everyone_else() {
        assert!(flags().evaluate("everyone", "7", &RoleSet::empty()));
    }

    #[test]
    fn disabled_and_unknown_flags_deny() {
        let flags = flags();
        assert!(!flags.evaluate("off", "42", &RoleSet::empty()));
        assert!(!flags.evaluate("catfact-command", "42", &roles(&["ops"])));
    }
}
