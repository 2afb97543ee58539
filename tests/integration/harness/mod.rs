use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Result of one rolestrip invocation
#[derive(Debug)]
pub struct RunResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for RunResult {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Scratch project directory plus a handle on the built binary
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Write a fixture file, creating parent directories
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).expect("Failed to read output")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Run the binary inside the workspace
    pub fn run(&self, args: &[&str]) -> RunResult {
        Command::new(env!("CARGO_BIN_EXE_rolestrip"))
            .current_dir(self.dir.path())
            .env("NO_COLOR", "1")
            // Keep the user's own config dir out of discovery
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env("HOME", self.dir.path())
            .args(args)
            .output()
            .expect("Failed to run rolestrip")
            .into()
    }
}
