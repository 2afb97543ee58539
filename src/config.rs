use crate::filter::MatchEngine;
use crate::pipeline::RunOptions;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A template file to filter and where its output goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedFile {
    pub src: PathBuf,
    pub dst: PathBuf,
}

/// Run configuration, from a config file and/or the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Marker matching implementation
    pub engine: MatchEngine,
    /// Write the enabled role definitions to `dst-requirements`
    pub emit_requirements: bool,
    /// Filter managed files in parallel
    pub parallel: bool,
    /// Vars files whose top-level keys activate roles
    pub vars_paths: Vec<PathBuf>,
    /// Role definition source
    pub requirements: Option<PathBuf>,
    /// Destination for the enabled role definitions
    pub dst_requirements: Option<PathBuf>,
    /// Template files to filter
    pub files: Vec<ManagedFile>,
}

impl Config {
    /// Load configuration from a file path
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.clone(),
            None => Self::default_config_path()?,
        };

        if config_file.exists() {
            let content = fs::read_to_string(&config_file).with_context(|| {
                format!("Failed to read config file: {}", config_file.display())
            })?;

            let config: Config = if content.trim().is_empty() {
                Config::default()
            } else {
                serde_yaml::from_str(&content).with_context(|| {
                    format!("Failed to parse config file: {}", config_file.display())
                })?
            };

            tracing::debug!(path = %config_file.display(), "loaded config file");

            let base_dir = config_file.parent().unwrap_or_else(|| Path::new("."));
            Ok(config.relative_to(base_dir))
        } else if config_path.is_some() {
            Err(eyre::eyre!("Config file not found: {}", config_file.display()))
        } else {
            // No config file anywhere: everything comes from the command line
            Ok(Self::default())
        }
    }

    /// Resolve relative paths against the directory holding the config file
    fn relative_to(mut self, base_dir: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        };

        self.vars_paths.iter_mut().for_each(resolve);
        self.requirements.iter_mut().for_each(resolve);
        self.dst_requirements.iter_mut().for_each(resolve);
        for file in &mut self.files {
            resolve(&mut file.src);
            resolve(&mut file.dst);
        }

        self
    }

    /// Get the default configuration file path
    fn default_config_path() -> Result<PathBuf> {
        // Look for config files in order of preference
        let candidates = vec![
            PathBuf::from(".rolestrip.yaml"),
            PathBuf::from(".rolestrip.yml"),
            PathBuf::from("rolestrip.yaml"),
            PathBuf::from("rolestrip.yml"),
        ];

        for candidate in candidates {
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        // If no config file found, return default location
        let config_dir = dirs::config_local_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .ok_or_else(|| eyre::eyre!("Could not determine config directory"))?;

        Ok(config_dir.join("rolestrip").join("config.yaml"))
    }

    /// Check that the configuration describes a complete run
    pub fn validate(&self) -> Result<()> {
        if self.vars_paths.is_empty() {
            return Err(eyre::eyre!("No vars files given (use --vars-paths or `vars-paths`)"));
        }

        if self.requirements.is_none() {
            return Err(eyre::eyre!(
                "No role definition source given (use --src-requirements-yml-path or `requirements`)"
            ));
        }

        if self.emit_requirements && self.dst_requirements.is_none() {
            return Err(eyre::eyre!(
                "Emitting role definitions requires a destination (use --dst-requirements-yml-path or `dst-requirements`)"
            ));
        }

        if self.files.is_empty() {
            return Err(eyre::eyre!("No files to filter (use --file SRC=DST or `files`)"));
        }

        Ok(())
    }

    /// The behaviour switches handed to the pipeline
    pub fn run_options(&self, dry_run: bool) -> RunOptions {
        RunOptions {
            engine: self.engine,
            emit_requirements: self.emit_requirements,
            parallel: self.parallel,
            dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn complete() -> Config {
        Config {
            vars_paths: vec![PathBuf::from("vars.yml")],
            requirements: Some(PathBuf::from("requirements.yml")),
            files: vec![ManagedFile {
                src: PathBuf::from("setup.yml"),
                dst: PathBuf::from("out/setup.yml"),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine, MatchEngine::Regex);
        assert!(!config.emit_requirements);
        assert!(!config.parallel);
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("rolestrip.yaml");
        fs::write(
            &config_path,
            "engine: literal\nvars-paths: [vars.yml, /etc/vars.yml]\nrequirements: requirements.yml\nfiles:\n  - src: setup.yml\n    dst: out/setup.yml\n",
        )
        .expect("Failed to write config");

        let config = Config::load(Some(&config_path)).expect("Failed to load config");

        assert_eq!(config.engine, MatchEngine::Literal);
        assert_eq!(
            config.vars_paths,
            vec![temp_dir.path().join("vars.yml"), PathBuf::from("/etc/vars.yml")]
        );
        assert_eq!(config.requirements, Some(temp_dir.path().join("requirements.yml")));
        assert_eq!(config.files[0].dst, temp_dir.path().join("out/setup.yml"));
    }

    #[test]
    fn test_load_empty_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("rolestrip.yaml");
        fs::write(&config_path, "").expect("Failed to write config");

        let config = Config::load(Some(&config_path)).expect("Failed to load config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("missing.yaml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_engine() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("rolestrip.yaml");
        fs::write(&config_path, "engine: pcre\n").expect("Failed to write config");

        assert!(Config::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(complete().validate().is_ok());

        let mut config = complete();
        config.files.clear();
        assert!(config.validate().is_err());

        let mut config = complete();
        config.requirements = None;
        assert!(config.validate().is_err());

        let mut config = complete();
        config.emit_requirements = true;
        assert!(config.validate().is_err());
        config.dst_requirements = Some(PathBuf::from("out/requirements.yml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_run_options() {
        let mut config = complete();
        config.engine = MatchEngine::Literal;
        config.parallel = true;

        let options = config.run_options(true);
        assert_eq!(options.engine, MatchEngine::Literal);
        assert!(options.parallel);
        assert!(options.dry_run);
        assert!(!options.emit_requirements);
    }
}
