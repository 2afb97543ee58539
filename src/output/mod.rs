pub mod human;
pub mod json;

use crate::pipeline::RunReport;

/// Trait for formatting run reports
pub trait OutputFormatter {
    /// Format the report of a completed run
    fn format_report(&self, report: &RunReport) -> String;
}

/// Get the appropriate formatter for the given format
pub fn get_formatter(format: &crate::cli::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        crate::cli::OutputFormat::Human => Box::new(human::HumanFormatter::new()),
        crate::cli::OutputFormat::Json => Box::new(json::JsonFormatter::new()),
    }
}

/// Totals across all filtered files
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total_files: usize,
    pub input_lines: usize,
    pub output_lines: usize,
    pub marker_lines: usize,
    pub dropped_lines: usize,
    pub compacted_blank_lines: usize,
}

impl RunStats {
    /// Calculate statistics from a run report
    pub fn from_report(report: &RunReport) -> Self {
        let mut stats = Self {
            total_files: report.files.len(),
            ..Self::default()
        };

        for file in &report.files {
            stats.input_lines += file.stats.input_lines;
            stats.output_lines += file.stats.output_lines;
            stats.marker_lines += file.stats.marker_lines;
            stats.dropped_lines += file.stats.dropped_lines;
            stats.compacted_blank_lines += file.stats.compacted_blank_lines;
        }

        stats
    }

    /// Lines removed for any reason
    pub fn removed_lines(&self) -> usize {
        self.input_lines - self.output_lines
    }
}
