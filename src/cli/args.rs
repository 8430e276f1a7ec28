//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Report repeated expressions that can be hoisted into a variable
//! - `explain`: Tell whether one selected expression could be hoisted, and why not
//! - `init`: Initialize a `.hoistrc.json` configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::Explain(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by the analysis commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Source code root directory (default: current directory)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Maximum number of lines between the first and last occurrence of a
    /// repeated expression (overrides config file)
    #[arg(long, allow_negative_numbers = true)]
    pub max_line_span: Option<i64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Cargo-style diagnostics
    #[default]
    Text,
    /// Machine-readable candidate list
    Json,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ExplainCommand {
    /// Source file containing the selection
    pub file: PathBuf,

    /// Byte offset where the selection starts
    #[arg(long)]
    pub offset: usize,

    /// Length of the selection in bytes
    #[arg(long)]
    pub length: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report repeated expressions that can be hoisted into a local variable
    Check(CheckCommand),
    /// Explain whether a selected expression can be hoisted
    Explain(ExplainCommand),
    /// Initialize a new .hoistrc.json configuration file
    Init,
}
