use super::definition::RoleDefinition;
use eyre::{Context, Result};
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Definitions whose own activation holds, in source order
pub fn enabled_definitions<'a>(
    definitions: &'a [RoleDefinition],
    used_variable_names: &BTreeSet<String>,
) -> Vec<&'a RoleDefinition> {
    definitions
        .iter()
        .filter(|definition| definition.is_enabled(used_variable_names))
        .collect()
}

/// Render definitions back to a YAML list, keeping every field in its original order
pub fn render_requirements(definitions: &[&RoleDefinition]) -> Result<String> {
    let list = Value::Sequence(
        definitions
            .iter()
            .map(|definition| Value::Mapping(definition.raw.clone()))
            .collect(),
    );

    serde_yaml::to_string(&list).context("Failed to serialize role definitions")
}

/// Write the enabled role definitions to `path`
pub fn write_requirements(definitions: &[&RoleDefinition], path: &Path) -> Result<()> {
    let content = render_requirements(definitions)?;
    fs::write(path, content).with_context(|| format!("Failed to write requirements file: {}", path.display()))
}
