use super::{OutputFormatter, RunStats};
use crate::pipeline::RunReport;
use std::io::IsTerminal;
use std::path::Path;

/// Human-readable output formatter
#[derive(Debug, Default)]
pub struct HumanFormatter {
    use_colors: bool,
}

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        Self {
            use_colors: Self::should_use_colors(),
        }
    }

    /// Create a new human formatter with explicit color setting
    #[cfg(test)]
    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn should_use_colors() -> bool {
        std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err()
    }

    /// Format a file path with appropriate color
    fn format_path(&self, path: &Path) -> String {
        if self.use_colors {
            format!("\x1b[1m{}\x1b[0m", path.display()) // Bold
        } else {
            path.display().to_string()
        }
    }

    /// Format a list of role names, enabled ones in green
    fn format_roles(&self, roles: &[String], enabled: &[String]) -> String {
        if roles.is_empty() {
            return "(none)".to_string();
        }

        roles
            .iter()
            .map(|role| {
                if self.use_colors && enabled.contains(role) {
                    format!("\x1b[32m{}\x1b[0m", role)
                } else {
                    role.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Format statistics summary
    fn format_stats(&self, stats: &RunStats, dry_run: bool) -> String {
        let verb = if dry_run { "Would filter" } else { "Filtered" };
        let summary = format!(
            "{} {} file{}: {} of {} lines removed",
            verb,
            stats.total_files,
            if stats.total_files == 1 { "" } else { "s" },
            stats.removed_lines(),
            stats.input_lines,
        );

        if self.use_colors {
            format!("\x1b[32m{}\x1b[0m", summary)
        } else {
            summary
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_report(&self, report: &RunReport) -> String {
        let mut output = Vec::new();
        let stats = RunStats::from_report(report);

        output.push(format!(
            "Enabled roles: {}",
            self.format_roles(&report.enabled_roles, &report.enabled_roles)
        ));
        output.push(format!(
            "Known roles: {}",
            self.format_roles(&report.known_roles, &report.enabled_roles)
        ));
        output.push(String::new());

        for file in &report.files {
            output.push(format!(
                "{} -> {}",
                self.format_path(&file.src),
                self.format_path(&file.dst)
            ));
            output.push(format!(
                "  {} lines in, {} out ({} markers, {} in disabled blocks, {} blank compacted)",
                file.stats.input_lines,
                file.stats.output_lines,
                file.stats.marker_lines,
                file.stats.dropped_lines,
                file.stats.compacted_blank_lines,
            ));
        }

        if let Some(path) = &report.requirements_written {
            let verb = if report.dry_run { "Would write" } else { "Wrote" };
            output.push(format!("{} enabled role definitions to {}", verb, self.format_path(path)));
        }

        if !report.files.is_empty() || report.requirements_written.is_some() {
            output.push(String::new());
        }

        output.push(self.format_stats(&stats, report.dry_run));

        output.join("\n")
    }
}
