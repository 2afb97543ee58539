use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keyword shared by both marker forms
pub const MARKER_KEYWORD: &str = "role-specific:";

/// Which implementation classifies marker lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MatchEngine {
    /// Anchored regular expressions
    #[default]
    Regex,
    /// Hand-written scanner accepting exactly the same lines
    Literal,
}

impl std::fmt::Display for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchEngine::Regex => write!(f, "regex"),
            MatchEngine::Literal => write!(f, "literal"),
        }
    }
}

/// A line recognised as a block delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'a> {
    /// `# role-specific:NAME`
    Start(&'a str),
    /// `# /role-specific:NAME`
    End(&'a str),
}

/// Classifies a single line as a start marker, an end marker or neither
pub trait MarkerMatcher: Send + Sync {
    fn classify<'a>(&self, line: &'a str) -> Option<Marker<'a>>;
}

/// Get the matcher for the given engine
pub fn get_matcher(engine: MatchEngine) -> Box<dyn MarkerMatcher> {
    match engine {
        MatchEngine::Regex => Box::new(RegexMatcher::new()),
        MatchEngine::Literal => Box::new(LiteralMatcher),
    }
}

pub struct RegexMatcher {
    start_regex: Regex,
    end_regex: Regex,
}

impl RegexMatcher {
    pub fn new() -> Self {
        // Example: `# role-specific:playbook_help`
        let start_regex = Regex::new(r"^\s*#\s*role-specific:\s*(\S+)$").expect("Invalid start marker regex");

        // Example: `# /role-specific:playbook_help`
        let end_regex = Regex::new(r"^\s*#\s*/role-specific:\s*(\S+)$").expect("Invalid end marker regex");

        Self { start_regex, end_regex }
    }
}

impl MarkerMatcher for RegexMatcher {
    fn classify<'a>(&self, line: &'a str) -> Option<Marker<'a>> {
        if let Some(captures) = self.start_regex.captures(line) {
            return captures.get(1).map(|m| Marker::Start(m.as_str()));
        }

        self.end_regex
            .captures(line)
            .and_then(|captures| captures.get(1))
            .map(|m| Marker::End(m.as_str()))
    }
}

pub struct LiteralMatcher;

impl MarkerMatcher for LiteralMatcher {
    fn classify<'a>(&self, line: &'a str) -> Option<Marker<'a>> {
        let rest = line.trim_start().strip_prefix('#')?.trim_start();

        let (is_end, rest) = match rest.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };

        let name = rest.strip_prefix(MARKER_KEYWORD)?.trim_start();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }

        Some(if is_end { Marker::End(name) } else { Marker::Start(name) })
    }
}
