use std::path::PathBuf;

use crate::core::{group::Group, rewrite::ReplacementReport, scan::ScanError};

#[derive(Debug)]
pub enum CommandSummary {
    Scan(ScanSummary),
    Extract(ExtractSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ScanSummary {
    pub groups: Vec<Group>,
    pub json: bool,
}

#[derive(Debug)]
pub struct ExtractSummary {
    /// Groups that were (or would be) extracted.
    pub groups: Vec<Group>,
    pub excluded_count: usize,
    pub is_apply: bool,
    /// Present after `--apply`.
    pub report: Option<ReplacementReport>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// Result of running strlift commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Paths in output are shown relative to this directory.
    pub root: PathBuf,
    pub error_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    /// If false, always exit 0 (used for dry-run commands that report work to do).
    pub exit_on_errors: bool,
    /// Files that could not be read or parsed.
    pub scan_errors: Vec<ScanError>,
    pub files_scanned: usize,
}
