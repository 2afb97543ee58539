use crate::config::{Config, ManagedFile};
use crate::filter::{FilterStats, Filtered, LineFilter, MatchEngine};
use crate::roles::{RoleDefinition, RoleSets, enabled_definitions, parse_definitions, write_requirements};
use crate::vars::load_variable_names;
use eyre::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Behaviour switches for one run, passed in explicitly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub engine: MatchEngine,
    /// Write the enabled role definitions; off unless asked for
    pub emit_requirements: bool,
    pub parallel: bool,
    /// Compute everything, write nothing
    pub dry_run: bool,
}

/// Role definitions and the sets derived from them
#[derive(Debug)]
pub struct Resolved {
    pub definitions: Vec<RoleDefinition>,
    pub variable_names: BTreeSet<String>,
    pub roles: RoleSets,
}

impl Resolved {
    /// Each role name once, in first-definition order, with its resolved state
    pub fn listing(&self) -> Vec<(&str, bool)> {
        let mut seen = BTreeSet::new();

        self.definitions
            .iter()
            .map(|definition| definition.name.as_str())
            .filter(|name| seen.insert(*name))
            .map(|name| (name, self.roles.is_enabled(name)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub stats: FilterStats,
}

/// What a run did, for the output formatters
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub enabled_roles: Vec<String>,
    pub known_roles: Vec<String>,
    pub variable_count: usize,
    pub files: Vec<FileReport>,
    pub requirements_written: Option<PathBuf>,
    pub dry_run: bool,
}

/// Load the vars files and role definitions and resolve the role sets
pub fn resolve_roles(config: &Config) -> Result<Resolved> {
    let variable_names = load_variable_names(&config.vars_paths)?;

    let requirements = config
        .requirements
        .as_ref()
        .ok_or_else(|| eyre::eyre!("No role definition source configured"))?;
    let definitions = load_definitions(requirements)?;

    let roles = RoleSets::resolve(&definitions, &variable_names);
    tracing::debug!(
        enabled = ?roles.enabled(),
        known = ?roles.known(),
        variables = variable_names.len(),
        "resolved roles"
    );

    Ok(Resolved {
        definitions,
        variable_names,
        roles,
    })
}

fn load_definitions(path: &Path) -> Result<Vec<RoleDefinition>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read role definitions: {}", path.display()))?;

    let value: Value = if content.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse role definitions: {}", path.display()))?
    };

    Ok(parse_definitions(&path.display().to_string(), &value)?)
}

/// Resolve roles once, then filter every managed file.
///
/// Fails on the first error. In sequential mode outputs already written stay on disk.
pub fn run(config: &Config, options: &RunOptions) -> Result<RunReport> {
    let resolved = resolve_roles(config)?;

    let mut requirements_written = None;
    if options.emit_requirements {
        let dst = config
            .dst_requirements
            .as_ref()
            .ok_or_else(|| eyre::eyre!("No destination configured for role definitions"))?;
        let enabled = enabled_definitions(&resolved.definitions, &resolved.variable_names);

        if !options.dry_run {
            write_requirements(&enabled, dst)?;
            tracing::info!(path = %dst.display(), roles = enabled.len(), "wrote role definitions");
        }
        requirements_written = Some(dst.clone());
    }

    let filter = LineFilter::new(&resolved.roles, options.engine);

    let files = if options.parallel {
        run_parallel(&filter, &config.files, options.dry_run)?
    } else {
        config
            .files
            .iter()
            .map(|file| {
                let filtered = filter_file(&filter, &file.src)?;
                write_output(file, filtered, options.dry_run)
            })
            .collect::<Result<Vec<_>>>()?
    };

    Ok(RunReport {
        enabled_roles: resolved.roles.enabled().iter().cloned().collect(),
        known_roles: resolved.roles.known_sorted(),
        variable_count: resolved.variable_names.len(),
        files,
        requirements_written,
        dry_run: options.dry_run,
    })
}

/// Filter all files first, write only once every one of them succeeded
fn run_parallel(filter: &LineFilter<'_>, files: &[ManagedFile], dry_run: bool) -> Result<Vec<FileReport>> {
    let filtered: Vec<Filtered> = files
        .par_iter()
        .map(|file| filter_file(filter, &file.src))
        .collect::<Result<_>>()?;

    files
        .iter()
        .zip(filtered)
        .map(|(file, filtered)| write_output(file, filtered, dry_run))
        .collect()
}

fn filter_file(filter: &LineFilter<'_>, src: &Path) -> Result<Filtered> {
    let content = fs::read_to_string(src).with_context(|| format!("Failed to read file: {}", src.display()))?;
    Ok(filter.filter(src, &content)?)
}

fn write_output(file: &ManagedFile, filtered: Filtered, dry_run: bool) -> Result<FileReport> {
    if !dry_run {
        fs::write(&file.dst, &filtered.content)
            .with_context(|| format!("Failed to write file: {}", file.dst.display()))?;
    }

    tracing::info!(
        src = %file.src.display(),
        dst = %file.dst.display(),
        input_lines = filtered.stats.input_lines,
        output_lines = filtered.stats.output_lines,
        dry_run,
        "filtered file"
    );

    Ok(FileReport {
        src: file.src.clone(),
        dst: file.dst.clone(),
        stats: filtered.stats,
    })
}
