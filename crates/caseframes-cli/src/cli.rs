use std::path::PathBuf;

use anyhow::{Context, Result};
use caseframes_core::LoadOptions;
use clap::{Parser, Subcommand, ValueEnum, ValueHint};

#[derive(Parser, Debug)]
#[command(name = "caseframes", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: tracing::Level,

    /// Load options from a TOML file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Keep fields outside the standard case format
    #[arg(long, global = true)]
    pub allow_any_keys: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Options from `--config`, with command line flags applied on top.
    pub fn load_options(&self) -> Result<LoadOptions> {
        let options = match &self.config {
            Some(path) => LoadOptions::from_path(path)
                .with_context(|| format!("loading config: {}", path.display()))?,
            None => LoadOptions::default(),
        };
        let any_keys = options.allow_any_keys || self.allow_any_keys;
        Ok(options.with_any_keys(any_keys))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the fields, tables and column labels of a case
    Inspect {
        /// Case file (.m or .json); a bare name is looked up as <name>.m
        #[arg(value_hint = ValueHint::FilePath)]
        case: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a case to a JSON field dictionary or a CSV directory
    Convert {
        #[arg(value_hint = ValueHint::FilePath)]
        case: PathBuf,
        /// Output format
        #[arg(long, value_enum)]
        to: ConvertFormat,
        /// Output file (json) or directory (csv)
        #[arg(short, long, value_hint = ValueHint::AnyPath)]
        output: PathBuf,
        /// Convert to per-unit before writing
        #[arg(long)]
        per_unit: bool,
        /// Renumber buses and row labels from 0 before writing
        #[arg(long)]
        reset_index: bool,
    },
    /// Print the standard column template of a field
    Columns {
        /// Field name, e.g. bus, gencost or reserves.req
        field: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertFormat {
    Json,
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "caseframes",
            "convert",
            "case9.m",
            "--to",
            "csv",
            "-o",
            "out",
            "--allow-any-keys",
            "--log-level",
            "debug",
        ]);
        assert!(cli.allow_any_keys);
        assert_eq!(cli.log_level, tracing::Level::DEBUG);
        assert!(matches!(
            cli.command,
            Commands::Convert { to: ConvertFormat::Csv, .. }
        ));
        assert!(cli.load_options().unwrap().allow_any_keys);
    }
}
