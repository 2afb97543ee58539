use super::{OutputFormatter, RunStats};
use crate::filter::FilterStats;
use crate::pipeline::RunReport;
use serde::{Deserialize, Serialize};

/// JSON output formatter
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of a run
#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    stats: JsonStats,
    enabled_roles: Vec<String>,
    known_roles: Vec<String>,
    variable_count: usize,
    files: Vec<JsonFileResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requirements_written: Option<String>,
    dry_run: bool,
}

/// JSON representation of run totals
#[derive(Debug, Serialize, Deserialize)]
struct JsonStats {
    total_files: usize,
    input_lines: usize,
    output_lines: usize,
    removed_lines: usize,
}

impl From<&RunStats> for JsonStats {
    fn from(stats: &RunStats) -> Self {
        Self {
            total_files: stats.total_files,
            input_lines: stats.input_lines,
            output_lines: stats.output_lines,
            removed_lines: stats.removed_lines(),
        }
    }
}

/// JSON representation of one filtered file
#[derive(Debug, Serialize, Deserialize)]
struct JsonFileResult {
    src: String,
    dst: String,
    input_lines: usize,
    output_lines: usize,
    marker_lines: usize,
    dropped_lines: usize,
    compacted_blank_lines: usize,
}

impl JsonFileResult {
    fn new(src: &std::path::Path, dst: &std::path::Path, stats: &FilterStats) -> Self {
        Self {
            src: src.display().to_string(),
            dst: dst.display().to_string(),
            input_lines: stats.input_lines,
            output_lines: stats.output_lines,
            marker_lines: stats.marker_lines,
            dropped_lines: stats.dropped_lines,
            compacted_blank_lines: stats.compacted_blank_lines,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RunReport) -> String {
        let stats = RunStats::from_report(report);

        let json_output = JsonOutput {
            stats: JsonStats::from(&stats),
            enabled_roles: report.enabled_roles.clone(),
            known_roles: report.known_roles.clone(),
            variable_count: report.variable_count,
            files: report
                .files
                .iter()
                .map(|file| JsonFileResult::new(&file.src, &file.dst, &file.stats))
                .collect(),
            requirements_written: report
                .requirements_written
                .as_ref()
                .map(|path| path.display().to_string()),
            dry_run: report.dry_run,
        };

        serde_json::to_string_pretty(&json_output)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize JSON: {e}"}}"#))
    }
}
