//! Report formatting and printing utilities.
//!
//! Groups are displayed in cargo-style format: the text and its key, then
//! the first occurrence with source context and the rest as locations.
//! Separate from core logic so strlift can be used as a library.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandResult, CommandSummary, ExtractSummary, InitSummary, ScanSummary,
};
use crate::{
    config::CONFIG_FILE_NAME,
    core::{
        group::Group,
        rewrite::ReplacementReport,
        scan::{Occurrence, ScanError},
        syntax::{column_number, line_text},
    },
    utils::{relative_display, truncate_chars},
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Maximum number of extra locations to display per group.
const MAX_LOCATIONS_DISPLAY: usize = 3;

/// Texts longer than this are cut in headers.
const MAX_TEXT_DISPLAY: usize = 60;

pub fn print(result: &CommandResult, verbose: bool) {
    let stdout = &mut io::stdout().lock();
    match &result.summary {
        CommandSummary::Scan(summary) => {
            print_scan_to(summary, &result.root, result.files_scanned, stdout)
        }
        CommandSummary::Extract(summary) => print_extract_to(summary, &result.root, stdout),
        CommandSummary::Init(summary) => print_init_to(summary, stdout),
    }

    print_scan_warnings_to(&result.scan_errors, verbose, &mut io::stderr().lock());
}

/// Print groups in cargo-style format.
pub fn report_to<W: Write>(groups: &[Group], root: &Path, writer: &mut W) {
    let mut sources = SourceCache::default();
    let max_line_width = groups
        .iter()
        .filter_map(|g| g.occurrences.first())
        .map(|o| o.line.to_string().len())
        .max()
        .unwrap_or(1);

    for group in groups {
        print_group(group, root, &mut sources, writer, max_line_width);
    }
}

// ============================================================
// Commands
// ============================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonScan<'a> {
    files_scanned: usize,
    groups: &'a [Group],
}

fn print_scan_to<W: Write>(summary: &ScanSummary, root: &Path, files: usize, writer: &mut W) {
    if summary.json {
        let json = JsonScan {
            files_scanned: files,
            groups: &summary.groups,
        };
        match serde_json::to_string_pretty(&json) {
            Ok(text) => {
                let _ = writeln!(writer, "{}", text);
            }
            Err(err) => eprintln!("Error: {}", err),
        }
        return;
    }

    if summary.groups.is_empty() {
        print_nothing_found_to(files, writer);
        return;
    }

    report_to(&summary.groups, root, writer);
    let occurrences = occurrence_count(&summary.groups);
    let _ = writeln!(
        writer,
        "{} {} hard-coded string(s) in {} group(s) ({} source file(s) scanned)",
        FAILURE_MARK.red(),
        occurrences,
        summary.groups.len(),
        files
    );
}

fn print_extract_to<W: Write>(summary: &ExtractSummary, root: &Path, writer: &mut W) {
    if summary.excluded_count > 0 {
        let _ = writeln!(
            writer,
            "Excluded {} group(s) by {}",
            summary.excluded_count,
            "--exclude".cyan()
        );
    }

    match &summary.report {
        None => {
            if summary.groups.is_empty() {
                let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), "Nothing to extract".green());
                return;
            }
            report_to(&summary.groups, root, writer);
            let _ = writeln!(
                writer,
                "{} {} string(s) in {} group(s).",
                "Would extract".yellow().bold(),
                occurrence_count(&summary.groups),
                summary.groups.len()
            );
            let _ = writeln!(
                writer,
                "Run with {} to write the string table and rewrite sources.",
                "--apply".cyan()
            );
        }
        Some(report) => print_replacement_to(report, summary.groups.len(), writer),
    }
}

fn print_replacement_to<W: Write>(report: &ReplacementReport, groups: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {} of {} string(s) in {} group(s).",
        "Extracted".green().bold(),
        report.success_count,
        report.total_locations,
        groups
    );
    if report.failed_count > 0 {
        let _ = writeln!(
            writer,
            "{} {} string(s) could not be rewritten:",
            FAILURE_MARK.red(),
            report.failed_count
        );
    }
    for error in &report.errors {
        let _ = writeln!(writer, "  - {}", error);
    }
}

fn print_init_to<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    }
}

fn print_nothing_found_to<W: Write>(files: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Scanned {} source {} - no hard-coded strings found",
            files,
            if files == 1 { "file" } else { "files" }
        )
        .green()
    );
}

/// Print a warning about files that could not be scanned.
fn print_scan_warnings_to<W: Write>(errors: &[ScanError], verbose: bool, writer: &mut W) {
    if errors.is_empty() {
        return;
    }
    if verbose {
        for error in errors {
            let _ = writeln!(writer, "{} {}", "warning:".bold().yellow(), error);
        }
    } else {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be scanned (use {} for details)",
            "warning:".bold().yellow(),
            errors.len(),
            "-v".cyan()
        );
    }
}

// ============================================================
// Internal Functions
// ============================================================

/// File contents for source context, read once per file.
#[derive(Default)]
struct SourceCache {
    files: HashMap<PathBuf, Option<String>>,
}

impl SourceCache {
    fn get(&mut self, path: &Path) -> Option<&str> {
        self.files
            .entry(path.to_path_buf())
            .or_insert_with(|| fs::read_to_string(path).ok())
            .as_deref()
    }
}

fn occurrence_count(groups: &[Group]) -> usize {
    groups.iter().map(|g| g.occurrences.len()).sum()
}

fn print_group<W: Write>(
    group: &Group,
    root: &Path,
    sources: &mut SourceCache,
    writer: &mut W,
    max_line_width: usize,
) {
    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        "string".bold().yellow(),
        truncate_chars(&group.text, MAX_TEXT_DISPLAY),
        group.effective_key().dimmed().cyan()
    );

    let Some((first, rest)) = group.occurrences.split_first() else {
        return;
    };

    let column = print_location(first, root, sources, writer, max_line_width);
    if let Some(source) = sources.get(&first.path) {
        print_source_context(first, source, column, writer, max_line_width);
    }

    if let Some(old_key) = &group.old_key {
        let note = if group.use_new_key {
            format!("renames existing key {}", old_key)
        } else {
            format!("reuses existing key {}", old_key)
        };
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            note,
            width = max_line_width
        );
    }

    let shown = rest.len().min(MAX_LOCATIONS_DISPLAY);
    for (i, occurrence) in rest.iter().take(shown).enumerate() {
        let remaining = rest.len() - shown;
        let suffix = if i == shown - 1 && remaining > 0 {
            format!(" (and {} more)", remaining)
        } else {
            String::new()
        };
        let column = sources
            .get(&occurrence.path)
            .map(|s| column_number(s, occurrence.range().start))
            .unwrap_or(1);
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}:{}:{}{}",
            "",
            "=".blue(),
            "also:".bold(),
            relative_display(&occurrence.path, root),
            occurrence.line,
            column,
            suffix,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

/// Print `--> path:line:col` and return the column.
fn print_location<W: Write>(
    occurrence: &Occurrence,
    root: &Path,
    sources: &mut SourceCache,
    writer: &mut W,
    max_line_width: usize,
) -> usize {
    let column = sources
        .get(&occurrence.path)
        .map(|s| column_number(s, occurrence.range().start))
        .unwrap_or(1);
    let _ = writeln!(
        writer,
        "{:>width$}{} {}:{}:{}",
        "",
        "-->".blue(),
        relative_display(&occurrence.path, root),
        occurrence.line,
        column,
        width = max_line_width
    );
    column
}

fn print_source_context<W: Write>(
    occurrence: &Occurrence,
    source: &str,
    column: usize,
    writer: &mut W,
    max_line_width: usize,
) {
    let source_line = line_text(source, occurrence.line);
    let prefix: String = source_line.chars().take(column - 1).collect();
    let padding = UnicodeWidthStr::width(prefix.as_str());
    let raw_first_line = occurrence.raw.lines().next().unwrap_or("");
    let carets = "^".repeat(UnicodeWidthStr::width(raw_first_line).max(1));

    let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
    let _ = writeln!(
        writer,
        "{:>width$} {} {}",
        occurrence.line.to_string().blue(),
        "|".blue(),
        source_line,
        width = max_line_width
    );
    let _ = writeln!(
        writer,
        "{:>width$} {} {:>padding$}{}",
        "",
        "|".blue(),
        "",
        carets.yellow(),
        width = max_line_width,
        padding = padding
    );
}

// ============================================================
// Tests
// ============================================================
