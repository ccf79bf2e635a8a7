use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;

use super::super::args::ExtractCommand;
use super::{
    CommandResult, CommandSummary, ExtractSummary,
    helper::{prepare, take_errors},
};
use crate::core::{
    group::Group,
    progress::{CommitPhase, ProgressSink},
};

/// Progress lines on stderr, shown with `--verbose`.
struct StderrProgress {
    verbose: bool,
}

impl ProgressSink for StderrProgress {
    fn on_phase(&mut self, phase: CommitPhase) {
        tracing::debug!(%phase, "commit phase");
        if self.verbose {
            let _ = writeln!(io::stderr(), "{} {}", "Running".cyan().bold(), phase);
        }
    }

    fn on_progress(&mut self, current: usize, total: usize, label: &str) {
        if self.verbose {
            let _ = writeln!(io::stderr(), "  [{}/{}] {}", current, total, label);
        }
    }
}

/// Apply `--exclude` and the key preference to freshly scanned groups.
/// Returns the number of excluded groups.
fn select(groups: &mut [Group], cmd: &ExtractCommand) -> usize {
    let mut excluded = 0;
    for group in groups.iter_mut() {
        if cmd.exclude.iter().any(|text| text.trim() == group.text.trim()) {
            group.deselect();
            excluded += 1;
        }
        if group.old_key.is_some() {
            group.prefer_new_key(cmd.always_new_key && !cmd.reuse_existing);
        }
    }
    excluded
}

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let mut prepared = prepare(&cmd.common)?;
    let scan_errors = take_errors(&mut prepared.outcome);
    let mut groups = prepared.outcome.groups;
    let excluded_count = select(&mut groups, &cmd);

    let report = if cmd.apply {
        let mut progress = StderrProgress {
            verbose: cmd.common.verbose,
        };
        Some(prepared.session.commit(&groups, &mut progress)?)
    } else {
        None
    };

    let error_count = report.as_ref().map(|r| r.failed_count).unwrap_or(0);
    groups.retain(|g| g.selected);

    Ok(CommandResult {
        error_count,
        exit_on_errors: cmd.apply,
        files_scanned: prepared.outcome.files_scanned,
        root: prepared.session.root().to_path_buf(),
        scan_errors,
        summary: CommandSummary::Extract(ExtractSummary {
            groups,
            excluded_count,
            is_apply: cmd.apply,
            report,
        }),
    })
}
