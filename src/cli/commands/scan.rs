use anyhow::Result;

use super::super::args::ScanCommand;
use super::{
    CommandResult, CommandSummary, ScanSummary,
    helper::{prepare, take_errors},
};

pub fn scan(cmd: ScanCommand) -> Result<CommandResult> {
    let mut prepared = prepare(&cmd.common)?;
    let scan_errors = take_errors(&mut prepared.outcome);
    let outcome = prepared.outcome;

    Ok(CommandResult {
        error_count: outcome.groups.len(),
        exit_on_errors: true,
        files_scanned: outcome.files_scanned,
        root: prepared.session.root().to_path_buf(),
        scan_errors,
        summary: CommandSummary::Scan(ScanSummary {
            groups: outcome.groups,
            json: cmd.json,
        }),
    })
}
