use super::definition::RoleDefinition;
use std::collections::BTreeSet;

/// Enabled and known role names, computed once per run and only read afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSets {
    enabled: BTreeSet<String>,
    known: BTreeSet<String>,
}

impl RoleSets {
    /// Resolve the sets from already parsed definitions
    pub fn resolve(definitions: &[RoleDefinition], used_variable_names: &BTreeSet<String>) -> Self {
        let mut sets = Self::default();

        for definition in definitions {
            // Duplicated names are not rejected; each definition contributes on its own
            sets.known.insert(definition.name.clone());
            if definition.is_enabled(used_variable_names) {
                sets.enabled.insert(definition.name.clone());
            }
        }

        sets
    }

    pub fn is_enabled(&self, role: &str) -> bool {
        self.enabled.contains(role)
    }

    pub fn is_known(&self, role: &str) -> bool {
        self.known.contains(role)
    }

    pub fn enabled(&self) -> &BTreeSet<String> {
        &self.enabled
    }

    pub fn known(&self) -> &BTreeSet<String> {
        &self.known
    }

    /// Known role names in sorted order, as shown in diagnostics
    pub fn known_sorted(&self) -> Vec<String> {
        self.known.iter().cloned().collect()
    }
}
