//! `sigmaforge pipelines` command handler

use std::io::Write;

use serde::Serialize;

use sigmaforge_sigma::pipeline::builtin_pipelines;

use crate::cli::{PipelinesAction, PipelinesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `pipelines` command.
pub fn execute(args: PipelinesArgs, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        PipelinesAction::List => execute_list(writer),
    }
}

fn execute_list(writer: &OutputWriter) -> Result<(), CliError> {
    let pipelines: Vec<PipelineEntry> = builtin_pipelines()
        .iter()
        .map(|p| PipelineEntry {
            name: p.name().to_owned(),
            mappings: p.mapping_count(),
            identity: p.is_identity(),
        })
        .collect();

    let report = PipelineListReport {
        total: pipelines.len(),
        pipelines,
    };

    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct PipelineListReport {
    pub total: usize,
    pub pipelines: Vec<PipelineEntry>,
}

#[derive(Serialize)]
pub struct PipelineEntry {
    pub name: String,
    pub mappings: usize,
    pub identity: bool,
}

impl Render for PipelineListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Normalization Pipelines ({} total)",
            self.total.to_string().bold()
        )?;
        writeln!(w)?;
        writeln!(w, "{:<22} {:>8}", "Name", "Mappings")?;
        writeln!(w, "{}", "-".repeat(32))?;

        for p in &self.pipelines {
            let name = if p.identity {
                p.name.yellow()
            } else {
                p.name.normal()
            };
            writeln!(w, "{:<22} {:>8}", name, p.mappings)?;
        }

        Ok(())
    }
}
