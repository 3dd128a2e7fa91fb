//! Command handlers -- one module per subcommand

pub mod config;
pub mod convert;
pub mod pipelines;
pub mod rules;

use std::path::Path;

use sigmaforge_core::config::SigmaforgeConfig;
use sigmaforge_core::error::{ConfigError, SigmaforgeError};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

/// Dispatch the parsed CLI to its command handler.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Convert(args) => convert::execute(args, &cli.config).await,
        Commands::Rules(args) => rules::execute(args, &writer).await,
        Commands::Pipelines(args) => pipelines::execute(args, &writer),
        Commands::Config(args) => config::execute(args, &cli.config, &writer).await,
    }
}

/// Load settings from the config file, falling back to defaults when the
/// file does not exist (env overrides still apply).
///
/// `convert` and `rules` must work without a sigmaforge.toml present;
/// `config validate`/`config show` load the file strictly instead.
pub(crate) async fn load_settings(path: &Path) -> Result<SigmaforgeConfig, CliError> {
    match SigmaforgeConfig::load(path).await {
        Ok(config) => Ok(config),
        Err(SigmaforgeError::Config(ConfigError::FileNotFound { .. })) => {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            let mut config = SigmaforgeConfig::default();
            config.apply_env_overrides();
            config
                .validate()
                .map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        }
        Err(e) => Err(CliError::Config(e.to_string())),
    }
}
