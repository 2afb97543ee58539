use crate::error::{Error, Result, ValidationError, describe_value};
use serde_yaml::{Mapping, Value};

const NAME_KEY: &str = "name";
const ACTIVATION_PREFIX_KEY: &str = "activation_prefix";

/// How a role decides whether it is enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// No `activation_prefix` key: never enabled automatically
    Never,
    /// `activation_prefix: ""`: enabled for every variable set
    Always,
    /// Enabled when some variable name starts with the prefix
    Prefix(String),
}

impl Activation {
    fn from_prefix(prefix: Option<String>) -> Self {
        match prefix {
            None => Activation::Never,
            Some(prefix) if prefix.is_empty() => Activation::Always,
            Some(prefix) => Activation::Prefix(prefix),
        }
    }

    /// Evaluate against the used variable names, stopping at the first match
    pub fn is_active<'a, I>(&self, used_variable_names: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        match self {
            Activation::Never => false,
            Activation::Always => true,
            Activation::Prefix(prefix) => used_variable_names
                .into_iter()
                .any(|name| name.starts_with(prefix.as_str())),
        }
    }
}

/// A single entry of the role definition source
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDefinition {
    pub name: String,
    pub activation: Activation,
    /// The record as written, extra fields and key order included
    pub raw: Mapping,
}

impl RoleDefinition {
    /// Build a definition from the record at `index` of the source list
    pub fn from_value(index: usize, value: &Value) -> std::result::Result<Self, ValidationError> {
        let raw = value.as_mapping().ok_or_else(|| ValidationError::NotARecord {
            index,
            found: describe_value(value),
        })?;

        let name = match raw.get(NAME_KEY) {
            None => {
                return Err(ValidationError::MissingName {
                    index,
                    definition: render_inline(value),
                });
            }
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(other) => {
                return Err(ValidationError::InvalidName {
                    index,
                    found: describe_value(other),
                });
            }
        };

        let prefix = match raw.get(ACTIVATION_PREFIX_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(prefix)) => Some(prefix.clone()),
            Some(other) => {
                return Err(ValidationError::InvalidActivationPrefix {
                    name,
                    found: describe_value(other),
                });
            }
        };

        Ok(Self {
            name,
            activation: Activation::from_prefix(prefix),
            raw: raw.clone(),
        })
    }

    /// Check whether this definition is in use for the given variable names
    pub fn is_enabled<'a, I>(&self, used_variable_names: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.activation.is_active(used_variable_names)
    }
}

/// Parse the whole role definition source.
///
/// `source_name` only labels diagnostics.
pub fn parse_definitions(source_name: &str, value: &Value) -> Result<Vec<RoleDefinition>> {
    let entries = value.as_sequence().ok_or_else(|| ValidationError::NotASequence {
        source_name: source_name.to_string(),
        found: describe_value(value),
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| RoleDefinition::from_value(index, entry).map_err(Error::from))
        .collect()
}

fn render_inline(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| describe_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(content: &str) -> Value {
        serde_yaml::from_str(content).expect("Failed to parse YAML")
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_activation_from_prefix() {
        assert_eq!(Activation::from_prefix(None), Activation::Never);
        assert_eq!(Activation::from_prefix(Some(String::new())), Activation::Always);
        assert_eq!(
            Activation::from_prefix(Some("db_".to_string())),
            Activation::Prefix("db_".to_string())
        );
    }

    #[test]
    fn test_always_enabled_for_empty_variable_set() {
        let empty: Vec<String> = Vec::new();
        assert!(Activation::Always.is_active(&empty));
        assert!(Activation::Always.is_active(&names(&["anything"])));
    }

    #[test]
    fn test_never_enabled() {
        let empty: Vec<String> = Vec::new();
        assert!(!Activation::Never.is_active(&empty));
        assert!(!Activation::Never.is_active(&names(&["web_port", ""])));
    }

    #[test]
    fn test_prefix_activation() {
        let used = names(&["db_host", "api_key"]);
        assert!(Activation::Prefix("db_".to_string()).is_active(&used));
        assert!(!Activation::Prefix("cache_".to_string()).is_active(&used));
    }

    #[test]
    fn test_prefix_activation_is_case_sensitive() {
        let used = names(&["DB_HOST"]);
        assert!(!Activation::Prefix("db_".to_string()).is_active(&used));
    }

    #[test]
    fn test_from_value_keeps_extra_fields() {
        let value = yaml("name: web\nsrc: git+https://example.com/web\nversion: v1\nactivation_prefix: web_\n");
        let definition = RoleDefinition::from_value(0, &value).expect("Failed to build definition");

        assert_eq!(definition.name, "web");
        assert_eq!(definition.activation, Activation::Prefix("web_".to_string()));
        assert_eq!(definition.raw.len(), 4);
        assert_eq!(
            definition.raw.get("version"),
            Some(&Value::String("v1".to_string()))
        );
    }

    #[test]
    fn test_from_value_null_prefix_is_absent() {
        let value = yaml("name: 'off'\nactivation_prefix: ~\n");
        let definition = RoleDefinition::from_value(0, &value).expect("Failed to build definition");
        assert_eq!(definition.activation, Activation::Never);
    }

    #[test]
    fn test_from_value_rejects_non_record() {
        let err = RoleDefinition::from_value(2, &yaml("- a\n- b\n")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotARecord {
                index: 2,
                found: "list".to_string()
            }
        );
    }

    #[test]
    fn test_from_value_rejects_missing_name() {
        let err = RoleDefinition::from_value(1, &yaml("activation_prefix: web_\n")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingName { index: 1, .. }));
        assert!(err.to_string().contains("activation_prefix"));
    }

    #[test]
    fn test_from_value_rejects_empty_or_non_string_name() {
        let err = RoleDefinition::from_value(0, &yaml("name: ''\n")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidName { .. }));

        let err = RoleDefinition::from_value(0, &yaml("name: 42\n")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidName { .. }));
    }

    #[test]
    fn test_from_value_rejects_non_string_prefix() {
        let err = RoleDefinition::from_value(0, &yaml("name: web\nactivation_prefix: 7\n")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidActivationPrefix { ref name, .. } if name == "web"));
    }

    #[test]
    fn test_parse_definitions_requires_sequence() {
        let err = parse_definitions("requirements.yml", &yaml("name: web\n")).unwrap_err();
        assert_eq!(
            err,
            Error::Validation(ValidationError::NotASequence {
                source_name: "requirements.yml".to_string(),
                found: "mapping".to_string()
            })
        );

        let err = parse_definitions("requirements.yml", &Value::Null).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::NotASequence { ref found, .. }) if found == "null"));
    }

    #[test]
    fn test_parse_definitions_reports_bad_record_as_validation() {
        let err = parse_definitions("requirements.yml", &yaml("- name: web\n- activation_prefix: db_\n")).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingName { index: 1, .. })));
    }

    #[test]
    fn test_parse_definitions_in_order() {
        let value = yaml(
            "- name: web\n  activation_prefix: web_\n- name: always\n  activation_prefix: ''\n- name: 'off'\n",
        );
        let definitions = parse_definitions("requirements.yml", &value).expect("Failed to parse definitions");

        let parsed: Vec<(&str, &Activation)> = definitions
            .iter()
            .map(|d| (d.name.as_str(), &d.activation))
            .collect();
        assert_eq!(
            parsed,
            vec![
                ("web", &Activation::Prefix("web_".to_string())),
                ("always", &Activation::Always),
                ("off", &Activation::Never),
            ]
        );
    }
}
