//! `sigmaforge convert` command handler

use std::io::Write;
use std::path::Path;

use tracing::info;

use sigmaforge_convert::{ConvertConfig, ConvertRunner};

use crate::cli::ConvertArgs;
use crate::error::CliError;

/// Execute the `convert` command.
///
/// The final run report is always printed as pretty JSON on stdout (logs
/// go to stderr), so the report stays machine-readable regardless of the
/// global output format. Per-rule failures do not fail the command; only
/// a missing rules root or an output stream error does.
pub async fn execute(args: ConvertArgs, config_path: &Path) -> Result<(), CliError> {
    let settings = super::load_settings(config_path).await?;
    let config = apply_overrides(ConvertConfig::from_core(&settings.convert), args);

    info!(
        rules_dir = %config.rules_dir.display(),
        limit = config.limit,
        "starting conversion run"
    );

    let runner = ConvertRunner::new(config)?;
    let report = runner.run().await?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &report)?;
    writeln!(handle)?;

    Ok(())
}

/// CLI flags take priority over file/env settings.
fn apply_overrides(mut config: ConvertConfig, args: ConvertArgs) -> ConvertConfig {
    if let Some(rules_dir) = args.rules_dir {
        config.rules_dir = rules_dir;
    }
    if let Some(combined) = args.combined_output {
        config.combined_output = Some(combined);
    }
    if let Some(windows) = args.windows_output {
        config.windows_output = windows;
    }
    if let Some(linux) = args.linux_output {
        config.linux_output = linux;
    }
    if let Some(other) = args.other_output {
        config.other_output = other;
    }
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    if !args.index_patterns.is_empty() {
        config.index_patterns = args.index_patterns;
    }
    config
}
