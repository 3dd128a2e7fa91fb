//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sigmaforge -- Sigma rule to SIEM NDJSON conversion toolkit.
///
/// Use `sigmaforge <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "sigmaforge", version, about, long_about = None)]
pub struct Cli {
    /// Path to the sigmaforge.toml configuration file.
    #[arg(short, long, default_value = "sigmaforge.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format for informational subcommands.
    ///
    /// The `convert` report is always printed as JSON on stdout.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a Sigma rule directory into SIEM NDJSON bundles.
    Convert(ConvertArgs),

    /// Inspect and validate detection rule files.
    Rules(RulesArgs),

    /// Inspect the built-in field normalization pipelines.
    Pipelines(PipelinesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- convert ----

/// Run a full conversion over a rules directory.
///
/// Flags override `sigmaforge.toml` values, which override defaults.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Root directory containing Sigma rule files.
    #[arg(long)]
    pub rules_dir: Option<PathBuf>,

    /// Optional combined output NDJSON path (all domains).
    #[arg(long)]
    pub combined_output: Option<PathBuf>,

    /// Output path for Windows-domain rules.
    #[arg(long)]
    pub windows_output: Option<PathBuf>,

    /// Output path for Linux-domain rules.
    #[arg(long)]
    pub linux_output: Option<PathBuf>,

    /// Output path for remaining rules.
    #[arg(long)]
    pub other_output: Option<PathBuf>,

    /// Limit number of rule files processed (0 = unlimited, debug).
    #[arg(long)]
    pub limit: Option<usize>,

    /// Index pattern written into each document (repeatable).
    #[arg(long = "index")]
    pub index_patterns: Vec<String>,
}

// ---- rules ----

/// Inspect and validate detection rule files.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// Validate rule files without writing any output bundle.
    Validate {
        /// Directory containing Sigma YAML rule files.
        #[arg(default_value = "rules")]
        path: PathBuf,
    },
}

// ---- pipelines ----

/// Inspect the built-in field normalization pipelines.
#[derive(Args, Debug)]
pub struct PipelinesArgs {
    #[command(subcommand)]
    pub action: PipelinesAction,
}

#[derive(Subcommand, Debug)]
pub enum PipelinesAction {
    /// List built-in pipelines and their mapping counts.
    List,
}

// ---- config ----

/// Manage sigmaforge configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, convert).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_convert_defaults() {
        let cli = Cli::try_parse_from(["sigmaforge", "convert"]).expect("parse");
        match cli.command {
            Commands::Convert(args) => {
                assert!(args.rules_dir.is_none());
                assert!(args.combined_output.is_none());
                assert!(args.limit.is_none());
                assert!(args.index_patterns.is_empty());
            }
            _ => panic!("expected Convert command"),
        }
    }

    #[test]
    fn test_cli_parse_convert_flags() {
        let cli = Cli::try_parse_from([
            "sigmaforge",
            "convert",
            "--rules-dir",
            "/srv/sigma",
            "--combined-output",
            "out/all.ndjson",
            "--limit",
            "10",
            "--index",
            "logs-linux-*",
            "--index",
            "logs-endpoint-*",
        ])
        .expect("parse");

        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.rules_dir, Some(PathBuf::from("/srv/sigma")));
                assert_eq!(
                    args.combined_output,
                    Some(PathBuf::from("out/all.ndjson"))
                );
                assert_eq!(args.limit, Some(10));
                assert_eq!(args.index_patterns.len(), 2);
            }
            _ => panic!("expected Convert command"),
        }
    }

    #[test]
    fn test_cli_parse_rules_validate_default_path() {
        let cli = Cli::try_parse_from(["sigmaforge", "rules", "validate"]).expect("parse");
        match cli.command {
            Commands::Rules(args) => match args.action {
                RulesAction::Validate { path } => {
                    assert_eq!(path, PathBuf::from("rules"));
                }
            },
            _ => panic!("expected Rules command"),
        }
    }

    #[test]
    fn test_cli_parse_rules_validate_custom_path() {
        let cli = Cli::try_parse_from(["sigmaforge", "rules", "validate", "/custom/rules"])
            .expect("parse");
        match cli.command {
            Commands::Rules(args) => match args.action {
                RulesAction::Validate { path } => {
                    assert_eq!(path, PathBuf::from("/custom/rules"));
                }
            },
            _ => panic!("expected Rules command"),
        }
    }

    #[test]
    fn test_cli_parse_pipelines_list() {
        let cli = Cli::try_parse_from(["sigmaforge", "pipelines", "list"]).expect("parse");
        match cli.command {
            Commands::Pipelines(args) => match args.action {
                PipelinesAction::List => {}
            },
            _ => panic!("expected Pipelines command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["sigmaforge", "config", "show", "--section", "convert"])
            .expect("parse");
        match cli.command {
            Commands::Config(args) => match args.action {
                ConfigAction::Show { section } => {
                    assert_eq!(section, Some("convert".to_owned()));
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_custom_config_path() {
        let cli = Cli::try_parse_from(["sigmaforge", "-c", "/custom/config.toml", "convert"])
            .expect("parse");
        assert_eq!(cli.config, PathBuf::from("/custom/config.toml"));
    }

    #[test]
    fn test_cli_parse_log_level_and_output() {
        let cli = Cli::try_parse_from([
            "sigmaforge",
            "--log-level",
            "debug",
            "--output",
            "json",
            "pipelines",
            "list",
        ])
        .expect("parse");
        assert_eq!(cli.log_level, Some("debug".to_owned()));
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        assert!(Cli::try_parse_from(["sigmaforge"]).is_err());
    }

    #[test]
    fn test_cli_parse_invalid_command_fails() {
        assert!(Cli::try_parse_from(["sigmaforge", "frobnicate"]).is_err());
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "sigmaforge");

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        for expected in ["convert", "rules", "pipelines", "config"] {
            assert!(
                subcommands.contains(&expected),
                "should have '{expected}' subcommand"
            );
        }
    }
}
