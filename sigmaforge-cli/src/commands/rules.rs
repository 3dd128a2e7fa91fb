//! `sigmaforge rules` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use sigmaforge_convert::loader;
use sigmaforge_sigma::rule::RuleCollection;

use crate::cli::{RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(args: RulesArgs, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        RulesAction::Validate { path } => execute_validate(&path, writer).await,
    }
}

/// Validate every rule file under `path` without writing any bundle.
///
/// Each file is read and parsed independently; one broken file never
/// hides the others. Returns an error (non-zero exit) when any file is
/// invalid, after the full report has been rendered.
async fn execute_validate(path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %path.display(), "validating detection rules");

    let files = loader::discover_rule_files(path, 0).await?;

    let mut valid = 0usize;
    let mut rules = 0usize;
    let mut errors = Vec::new();

    for file in &files {
        let display = file.display().to_string();
        let text = match loader::read_rule_file(file).await {
            Ok(text) => text,
            Err(e) => {
                errors.push(RuleError {
                    file: display,
                    error: format!("read failed: {e}"),
                });
                continue;
            }
        };

        match RuleCollection::from_yaml(&text, &display) {
            Ok(collection) => {
                valid += 1;
                rules += collection.len();
            }
            Err(e) => {
                errors.push(RuleError {
                    file: display,
                    error: e.to_string(),
                });
            }
        }
    }

    let report = RuleValidationReport {
        path: path.display().to_string(),
        total_files: files.len(),
        valid,
        invalid: errors.len(),
        rules,
        errors,
    };

    writer.render(&report)?;

    if report.invalid > 0 {
        return Err(CliError::Rule(format!(
            "{} invalid rule files",
            report.invalid
        )));
    }

    Ok(())
}

#[derive(Serialize)]
pub struct RuleValidationReport {
    pub path: String,
    pub total_files: usize,
    pub valid: usize,
    pub invalid: usize,
    pub rules: usize,
    pub errors: Vec<RuleError>,
}

#[derive(Serialize)]
pub struct RuleError {
    pub file: String,
    pub error: String,
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Validation: {}", self.path.bold())?;
        writeln!(
            w,
            "  Files: {} total, {} valid, {} invalid ({} rules)",
            self.total_files,
            self.valid.to_string().green(),
            if self.invalid > 0 {
                self.invalid.to_string().red()
            } else {
                self.invalid.to_string().normal()
            },
            self.rules,
        )?;

        if !self.errors.is_empty() {
            writeln!(w)?;
            writeln!(w, "Errors:")?;
            for e in &self.errors {
                writeln!(w, "  {}: {}", e.file.red(), e.error)?;
            }
        }

        Ok(())
    }
}
