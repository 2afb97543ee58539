use std::path::PathBuf;
use thiserror::Error;

/// Which kind of marker line produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Start,
    End,
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerKind::Start => write!(f, "start"),
            MarkerKind::End => write!(f, "end"),
        }
    }
}

/// Structural problems in role definitions or variable sources
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("role definitions from {source_name} must be a YAML list, got {found}")]
    NotASequence { source_name: String, found: String },

    #[error("role definition #{index} must be a mapping, got {found}")]
    NotARecord { index: usize, found: String },

    #[error("role definition #{index} does not have a name and should be adjusted to have one: {definition}")]
    MissingName { index: usize, definition: String },

    #[error("role definition #{index} has a name that is not a non-empty string: {found}")]
    InvalidName { index: usize, found: String },

    #[error("role definition '{name}' has an activation_prefix that is not a string: {found}")]
    InvalidActivationPrefix { name: String, found: String },

    #[error("vars file {} did not parse to a YAML mapping, got {found}", .path.display())]
    VarsNotMapping { path: PathBuf, found: String },

    #[error(
        "vars file {} has a top-level key that cannot be used as a variable name: {found}",
        .path.display()
    )]
    UnsupportedVariableKey { path: PathBuf, found: String },
}

/// Every failure the role resolver and the line filter can report.
///
/// All of them are fatal for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "Found {marker} block for role {role} on line {line} in file {}, but it is not a known role name found among: {known:?}",
        .file.display()
    )]
    UnknownRole {
        file: PathBuf,
        line: usize,
        marker: MarkerKind,
        role: String,
        /// Sorted
        known: Vec<String>,
    },

    #[error(
        "Found end block for role {role} on line {line} in file {}, but {}",
        .file.display(),
        unbalanced_reason(.expected)
    )]
    UnbalancedBlock {
        file: PathBuf,
        line: usize,
        role: String,
        /// Innermost open role, `None` when nothing was open
        expected: Option<String>,
    },

    #[error(
        "Expected one or more closing block for role-specific tags in file {}: {open:?}",
        .file.display()
    )]
    UnclosedBlock {
        file: PathBuf,
        /// Outermost first
        open: Vec<String>,
    },
}

fn unbalanced_reason(expected: &Option<String>) -> String {
    match expected {
        Some(expected) => format!("the last starting block was for role {expected}"),
        None => "there is no opening statement for it".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Short human description of a YAML value's type for diagnostics
pub fn describe_value(value: &serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool ({b})"),
        Value::Number(n) => format!("number ({n})"),
        Value::String(s) => format!("string ({s:?})"),
        Value::Sequence(_) => "list".to_string(),
        Value::Mapping(_) => "mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value ({})", tagged.tag),
    }
}
