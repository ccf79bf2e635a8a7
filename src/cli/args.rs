//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: List hard-coded strings grouped by text, with proposed keys
//! - `extract`: Move the strings into the string table and rewrite the sources
//! - `init`: Initialize strlift configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

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
            Some(Command::Scan(cmd)) => cmd.common.verbose,
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root directory (default: current directory)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// String table path relative to the project root (overrides config file)
    #[arg(long)]
    pub strings_file: Option<String>,

    /// Package that owns the `R` class (overrides config file)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print groups as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually write the table and rewrite sources (default is dry-run)
    #[arg(long)]
    pub apply: bool,

    /// Leave this text alone. Can be specified multiple times
    #[arg(long, value_name = "TEXT")]
    pub exclude: Vec<String>,

    /// Reference keys already in the table (the default)
    #[arg(long, conflicts_with = "always_new_key")]
    pub reuse_existing: bool,

    /// Rename existing keys to the generated ones
    #[arg(long)]
    pub always_new_key: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find hard-coded user-visible strings
    Scan(ScanCommand),
    /// Move hard-coded strings into string resources
    Extract(ExtractCommand),
    /// Initialize a new .strliftrc.json configuration file
    Init,
}
