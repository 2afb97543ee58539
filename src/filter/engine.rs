use super::marker::{Marker, MarkerMatcher, MatchEngine, get_matcher};
use super::stack::{BlockStack, CloseError};
use crate::error::{Error, MarkerKind, Result};
use crate::roles::RoleSets;
use serde::Serialize;
use std::path::Path;

/// Longest run of retained blank lines that survives compaction
pub const MAX_SEQUENTIAL_BLANK_LINES: usize = 2;

/// Separator used to join the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Decided by the first line break of the text
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(index) if text[..index].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Line accounting for one filtered file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub input_lines: usize,
    pub output_lines: usize,
    pub marker_lines: usize,
    /// Regular lines inside a block of a disabled role
    pub dropped_lines: usize,
    /// Retained blank lines removed by compaction
    pub compacted_blank_lines: usize,
}

/// Result of filtering one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered {
    pub content: String,
    pub stats: FilterStats,
}

/// Block-scoped line filter.
///
/// Borrows the role sets read-only, so a single filter can be shared across files and threads.
pub struct LineFilter<'r> {
    roles: &'r RoleSets,
    matcher: Box<dyn MarkerMatcher>,
}

impl<'r> LineFilter<'r> {
    /// Create a new filter for the given role sets
    pub fn new(roles: &'r RoleSets, engine: MatchEngine) -> Self {
        Self {
            roles,
            matcher: get_matcher(engine),
        }
    }

    /// Filter `text`; `file` only labels diagnostics
    pub fn filter(&self, file: &Path, text: &str) -> Result<Filtered> {
        let ending = LineEnding::detect(text);
        let mut stack = BlockStack::new();
        let mut out_lines: Vec<&str> = Vec::new();
        let mut stats = FilterStats::default();
        let mut sequential_blank_lines = 0;

        // Both `\n` and `\r\n` end a line, whatever the detected ending
        let lines = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

        for (index, line) in lines.enumerate() {
            let line_number = index + 1;
            stats.input_lines += 1;

            match self.matcher.classify(line) {
                Some(Marker::Start(role)) => {
                    self.check_known(file, line_number, MarkerKind::Start, role)?;
                    stack.push(role);
                    stats.marker_lines += 1;
                    tracing::trace!(line = line_number, role, depth = stack.depth(), "block opened");
                }
                Some(Marker::End(role)) => {
                    self.check_known(file, line_number, MarkerKind::End, role)?;
                    stack.close(role).map_err(|err| Error::UnbalancedBlock {
                        file: file.to_path_buf(),
                        line: line_number,
                        role: role.to_string(),
                        expected: match err {
                            CloseError::Empty => None,
                            CloseError::Mismatch { expected } => Some(expected),
                        },
                    })?;
                    stats.marker_lines += 1;
                    tracing::trace!(line = line_number, role, depth = stack.depth(), "block closed");
                }
                None if !stack.retains(self.roles) => {
                    stats.dropped_lines += 1;
                }
                None if line.is_empty() => {
                    if sequential_blank_lines < MAX_SEQUENTIAL_BLANK_LINES {
                        out_lines.push(line);
                        sequential_blank_lines += 1;
                    } else {
                        stats.compacted_blank_lines += 1;
                    }
                }
                None => {
                    out_lines.push(line);
                    sequential_blank_lines = 0;
                }
            }
        }

        if !stack.is_empty() {
            return Err(Error::UnclosedBlock {
                file: file.to_path_buf(),
                open: stack.into_open(),
            });
        }

        stats.output_lines = out_lines.len();
        Ok(Filtered {
            content: out_lines.join(ending.as_str()),
            stats,
        })
    }

    fn check_known(&self, file: &Path, line: usize, marker: MarkerKind, role: &str) -> Result<()> {
        if self.roles.is_known(role) {
            return Ok(());
        }

        Err(Error::UnknownRole {
            file: file.to_path_buf(),
            line,
            marker,
            role: role.to_string(),
            known: self.roles.known_sorted(),
        })
    }
}
