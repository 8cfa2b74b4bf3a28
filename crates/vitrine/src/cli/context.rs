//! Shared context for running CLI commands.

use std::{path::PathBuf, process::ExitCode};

use vitrine_config::Config;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Configuration files, highest precedence first.
    pub config_files: Vec<PathBuf>,
    /// Merged configuration.
    pub config: Config,
}

impl CommandContext {
    /// Loads and merges the given configuration files.
    pub fn load(config_files: Vec<PathBuf>) -> Result<Self, ExitCode> {
        if config_files.is_empty() {
            eprintln!("error: no configuration files given");
            eprintln!("Pass one or more files with --config, highest precedence first.");
            return Err(ExitCode::FAILURE);
        }

        let config = Config::load_from_files(&config_files).map_err(|e| {
            eprintln!("error: failed to load configuration: {e}");
            ExitCode::FAILURE
        })?;

        Ok(Self {
            config_files,
            config,
        })
    }
}
