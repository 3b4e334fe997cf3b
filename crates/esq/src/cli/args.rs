//! Clap argument definitions for the `esq` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use esq_config::parse_param;

/// Parses a `key=value` parameter override.
fn parse_param_arg(s: &str) -> Result<(String, String), String> {
    parse_param(s).map_err(|e| e.to_string())
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "esq")]
#[command(about = "Compile search conditions into Elasticsearch queries")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity (-v for debug, -vv for trace); ESQ_LOG overrides it
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Template parameter overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Override a configured parameter (can be specified multiple times)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param_arg)]
    pub params: Vec<(String, String)>,
}

/// Arguments for `esq compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    /// Condition file (JSON), or `-` for stdin
    pub condition: PathBuf,

    #[command(flatten)]
    /// Parameter overrides.
    pub params: ParamArgs,

    /// Print the document on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for `esq fields`.
#[derive(Args, Debug, Clone)]
pub struct FieldsCommand {
    /// Condition file (JSON), or `-` for stdin
    pub condition: PathBuf,

    #[command(flatten)]
    /// Parameter overrides.
    pub params: ParamArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `esq init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.esq.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `esq` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Compile a condition into a query document
    #[command(after_help = "\
EXAMPLES:
  esq compile condition.json                 Pretty-print the query document
  esq compile condition.json -p locale=de    Override a configured parameter
  cat condition.json | esq compile - --compact")]
    Compile(CompileCommand),

    /// List the field mappings a condition selects on
    Fields(FieldsCommand),

    /// Validate configuration and diagnose issues
    Check,

    /// Initialize esq configuration in current directory
    Init(InitCommand),
}
