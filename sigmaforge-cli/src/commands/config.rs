//! `sigmaforge config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use sigmaforge_core::config::SigmaforgeConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Validate the configuration file and report errors.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let result = SigmaforgeConfig::load(config_path).await;

    let report = match result {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = super::load_settings(config_path).await?;

    let value = toml::Value::try_from(&config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;

    let shown = match &section {
        Some(name) => value
            .get(name)
            .cloned()
            .ok_or_else(|| CliError::Config(format!("unknown config section '{name}'")))?,
        None => value,
    };

    let report = ConfigShowReport {
        source: config_path.display().to_string(),
        section,
        config: shown,
    };

    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Configuration: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  {}", "valid".green())?;
        } else {
            writeln!(w, "  {}", "invalid".red())?;
            for e in &self.errors {
                writeln!(w, "  {e}")?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct ConfigShowReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub config: toml::Value,
}

impl Render for ConfigShowReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => {
                writeln!(w, "[{}] from {}", section.bold(), self.source)?;
            }
            None => writeln!(w, "Effective configuration ({})", self.source)?,
        }
        let rendered = toml::to_string_pretty(&self.config)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        write!(w, "{rendered}")?;
        Ok(())
    }
}
