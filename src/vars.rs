use crate::error::{self, ValidationError, describe_value};
use eyre::{Context, Result};
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level key names of one parsed vars document.
///
/// Only the first level is consumed; an empty document counts as an empty mapping.
pub fn variable_names_from_value(path: &Path, value: &Value) -> error::Result<Vec<String>> {
    let mapping = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ValidationError::VarsNotMapping {
                path: path.to_path_buf(),
                found: describe_value(other),
            }
            .into());
        }
    };

    mapping
        .keys()
        .map(|key| match key {
            Value::String(name) => Ok(name.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(error::Error::from(ValidationError::UnsupportedVariableKey {
                path: path.to_path_buf(),
                found: describe_value(other),
            })),
        })
        .collect()
}

/// Load and merge the variable names of every vars file
pub fn load_variable_names(paths: &[PathBuf]) -> Result<BTreeSet<String>> {
    let mut variable_names = BTreeSet::new();

    for path in paths {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read vars file: {}", path.display()))?;

        let value: Value = if content.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse vars file: {}", path.display()))?
        };

        let names = variable_names_from_value(path, &value)?;
        tracing::debug!(path = %path.display(), count = names.len(), "loaded variable names");
        variable_names.extend(names);
    }

    Ok(variable_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_top_level_keys_only() {
        let value: Value = serde_yaml::from_str("web_port: 80\nnested:\n  db_host: x\n").expect("Failed to parse");
        let names = variable_names_from_value(Path::new("vars.yml"), &value).expect("Failed to read names");
        assert_eq!(names, vec!["web_port", "nested"]);
    }

    #[test]
    fn test_empty_document_is_empty_mapping() {
        let names = variable_names_from_value(Path::new("vars.yml"), &Value::Null).expect("Failed to read names");
        assert!(names.is_empty());
    }

    #[test]
    fn test_scalar_keys_are_rendered() {
        let value: Value = serde_yaml::from_str("8080: port\ntrue: flag\n").expect("Failed to parse");
        let names = variable_names_from_value(Path::new("vars.yml"), &value).expect("Failed to read names");
        assert_eq!(names, vec!["8080", "true"]);
    }

    #[test]
    fn test_non_mapping_is_rejected() {
        let value: Value = serde_yaml::from_str("- a\n- b\n").expect("Failed to parse");
        let err = variable_names_from_value(Path::new("vars.yml"), &value).unwrap_err();
        assert_eq!(
            err,
            Error::Validation(ValidationError::VarsNotMapping {
                path: PathBuf::from("vars.yml"),
                found: "list".to_string()
            })
        );
    }

    #[test]
    fn test_load_merges_and_dedups() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let first = create_test_file(&temp_dir, "a.yml", "web_port: 80\nshared: 1\n");
        let second = create_test_file(&temp_dir, "b.yml", "shared: 2\ndb_host: db\n");
        let empty = create_test_file(&temp_dir, "c.yml", "");

        let names = load_variable_names(&[first, second, empty]).expect("Failed to load names");
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["db_host", "shared", "web_port"]);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("missing.yml");

        let err = load_variable_names(&[missing]).unwrap_err();
        assert!(err.to_string().contains("Failed to read vars file"));
    }

    #[test]
    fn test_load_non_mapping_is_validation_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = create_test_file(&temp_dir, "list.yml", "- web_port\n");

        let err = load_variable_names(&[path]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Validation(ValidationError::VarsNotMapping { .. }))
        ));
    }
}
