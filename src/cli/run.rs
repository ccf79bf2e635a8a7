use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, extract::extract, init::init, scan::scan},
};

/// Dispatches to the command handler for the parsed arguments.
///
/// Returns `Err` only when a command cannot run at all (bad config, missing
/// source root, unwritable string table). Findings and per-occurrence
/// failures are carried in the [`CommandResult`].
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Scan(cmd)) => scan(cmd),
        Some(Command::Extract(cmd)) => extract(cmd),
        Some(Command::Init) => init(),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
