use crate::config::{Config, ManagedFile};
use crate::filter::MatchEngine;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the run report
#[derive(Debug, Clone, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON format for machine processing
    Json,
}

/// Command-line interface for rolestrip
#[derive(Parser)]
#[command(
    name = "rolestrip",
    about = "Optimizes the playbook based on enabled components found in vars.yml files",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, conflicts_with = "config", help = "Do not load any configuration file")]
    pub no_config: bool,

    /// Vars files, whitespace-separated; may be repeated
    #[arg(long, help = "Path to vars.yml configuration files to process")]
    pub vars_paths: Vec<String>,

    #[arg(long, help = "Path to source requirements.yml file with all role definitions")]
    pub src_requirements_yml_path: Option<PathBuf>,

    #[arg(long, help = "Path to destination requirements.yml file, where role definitions will be saved")]
    pub dst_requirements_yml_path: Option<PathBuf>,

    #[arg(long, help = "Path to source setup.yml file")]
    pub src_setup_yml_path: Option<PathBuf>,

    #[arg(long, requires = "src_setup_yml_path", help = "Path to destination setup.yml file")]
    pub dst_setup_yml_path: Option<PathBuf>,

    #[arg(long, help = "Path to source group vars file")]
    pub src_group_vars_yml_path: Option<PathBuf>,

    #[arg(long, requires = "src_group_vars_yml_path", help = "Path to destination group vars file")]
    pub dst_group_vars_yml_path: Option<PathBuf>,

    /// Additional files to filter (format: SRC=DST)
    #[arg(long = "file", value_name = "SRC=DST", help = "Additional file to filter (format: SRC=DST)")]
    pub files: Vec<String>,

    /// Marker matching engine
    #[arg(long, value_enum, help = "Marker matching engine")]
    pub engine: Option<MatchEngine>,

    #[arg(
        long,
        overrides_with = "no_emit_requirements",
        help = "Write the enabled role definitions to the destination requirements file"
    )]
    pub emit_requirements: bool,

    #[arg(long, overrides_with = "emit_requirements", help = "Do not write role definitions")]
    pub no_emit_requirements: bool,

    #[arg(long, overrides_with = "no_parallel", help = "Filter files in parallel")]
    pub parallel: bool,

    #[arg(long, overrides_with = "parallel", help = "Filter files one after another")]
    pub no_parallel: bool,

    #[arg(long, help = "Show what would be written without writing anything")]
    pub dry_run: bool,

    /// List all known roles and exit
    #[arg(long, help = "List all known roles with their enabled state and exit")]
    pub list_roles: bool,

    /// Show configuration and exit
    #[arg(long, help = "Show effective configuration and exit")]
    pub show_config: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    /// Split every --vars-paths value on whitespace
    pub fn get_vars_paths(&self) -> Vec<PathBuf> {
        self.vars_paths
            .iter()
            .flat_map(|s| s.split_whitespace())
            .map(PathBuf::from)
            .collect()
    }

    /// Managed files from the named flags followed by every --file
    pub fn get_files(&self) -> eyre::Result<Vec<ManagedFile>> {
        let mut files = Vec::new();

        let named = [
            (&self.src_setup_yml_path, &self.dst_setup_yml_path),
            (&self.src_group_vars_yml_path, &self.dst_group_vars_yml_path),
        ];
        for (src, dst) in named {
            match (src, dst) {
                (Some(src), Some(dst)) => files.push(ManagedFile {
                    src: src.clone(),
                    dst: dst.clone(),
                }),
                (Some(src), None) => {
                    return Err(eyre::eyre!("No destination given for {}", src.display()));
                }
                _ => {}
            }
        }

        for entry in &self.files {
            let (src, dst) = entry
                .split_once('=')
                .filter(|(src, dst)| !src.trim().is_empty() && !dst.trim().is_empty())
                .ok_or_else(|| eyre::eyre!("Invalid --file value '{}'. Expected: SRC=DST", entry))?;

            files.push(ManagedFile {
                src: PathBuf::from(src.trim()),
                dst: PathBuf::from(dst.trim()),
            });
        }

        Ok(files)
    }

    /// Apply command-line values on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) -> eyre::Result<()> {
        let vars_paths = self.get_vars_paths();
        if !vars_paths.is_empty() {
            config.vars_paths = vars_paths;
        }

        if let Some(path) = &self.src_requirements_yml_path {
            config.requirements = Some(path.clone());
        }

        if let Some(path) = &self.dst_requirements_yml_path {
            config.dst_requirements = Some(path.clone());
        }

        let files = self.get_files()?;
        if !files.is_empty() {
            config.files = files;
        }

        if let Some(engine) = self.engine {
            config.engine = engine;
        }

        if let Some(emit) = flag_pair(self.emit_requirements, self.no_emit_requirements) {
            config.emit_requirements = emit;
        }

        if let Some(parallel) = flag_pair(self.parallel, self.no_parallel) {
            config.parallel = parallel;
        }

        Ok(())
    }

    /// Tracing filter directive, raised to info by --verbose
    pub fn log_directive(&self) -> &str {
        if self.verbose && self.log_level == "warn" {
            "info"
        } else {
            self.log_level.as_str()
        }
    }
}

/// `--x` / `--no-x`; `None` leaves the configured value alone
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}


// Provide a default implementation for testing
impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            no_config: false,
            vars_paths: Vec::new(),
            src_requirements_yml_path: None,
            dst_requirements_yml_path: None,
            src_setup_yml_path: None,
            dst_setup_yml_path: None,
            src_group_vars_yml_path: None,
            dst_group_vars_yml_path: None,
            files: Vec::new(),
            engine: None,
            emit_requirements: false,
            no_emit_requirements: false,
            parallel: false,
            no_parallel: false,
            dry_run: false,
            list_roles: false,
            show_config: false,
            format: OutputFormat::default(),
            log_level: "warn".to_string(),
            verbose: false,
        }
    }
}
