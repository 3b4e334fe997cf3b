//! Shared context for running CLI commands.

use std::{
    env,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use esq_compile::QueryCompiler;
use esq_condition::Condition;
use esq_config::Config;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is
    /// invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Ensures at least one field is configured, printing an init hint otherwise.
    pub fn require_fields(&self) -> Result<(), ExitCode> {
        if self.config.fields.is_empty() {
            eprintln!("error: no fields defined in configuration");
            eprintln!("Run 'esq init' to create a configuration file, then add field mappings.");
            return Err(ExitCode::FAILURE);
        }
        Ok(())
    }

    /// Builds a compiler from the configuration with `overrides` applied.
    pub fn compiler(&self, overrides: &[(String, String)]) -> Result<QueryCompiler, ExitCode> {
        self.require_fields()?;
        self.config.compiler(overrides).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Reads a condition from a file, or from stdin when `path` is `-`.
    pub fn read_condition(&self, path: &Path) -> Result<Condition, ExitCode> {
        let result = if path == Path::new("-") {
            let mut json = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut json) {
                eprintln!("error: failed to read condition from stdin: {e}");
                return Err(ExitCode::FAILURE);
            }
            Condition::from_json(&json)
        } else {
            Condition::from_file(&self.cwd.join(path))
        };
        result.map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
