use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::super::args::CommonArgs;
use crate::{
    config::{Config, load_config},
    core::{
        scan::ScanError,
        session::{ScanOutcome, Session},
    },
};

/// A session over the project plus the result of scanning it.
pub struct Prepared {
    pub session: Session,
    pub outcome: ScanOutcome,
}

/// Load config, apply CLI overrides (CLI > config file > defaults), and scan.
pub fn prepare(common: &CommonArgs) -> Result<Prepared> {
    let start = common
        .source_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let config_result = load_config(&start)?;
    if common.verbose && !config_result.from_file {
        eprintln!("Note: No .strliftrc.json found, using default configuration");
    }
    let config = apply_overrides(config_result.config, common);

    // An explicit --source-root wins over the config's sourceRoot.
    let root = match &common.source_root {
        Some(root) => root.clone(),
        None => PathBuf::from(&config.source_root),
    };
    let root = canonical(&root)?;
    tracing::debug!(root = %root.display(), "project root");

    let session = Session::new(&root, config);
    let discovered = session.discover_files(common.verbose);
    if discovered.skipped_count > 0 && common.verbose {
        eprintln!(
            "Warning: {} path(s) skipped due to access errors",
            discovered.skipped_count
        );
    }

    let files: Vec<PathBuf> = discovered.files.into_iter().collect();
    let outcome = session.scan(&files);
    tracing::debug!(
        files = outcome.files_scanned,
        groups = outcome.groups.len(),
        "scan finished"
    );

    Ok(Prepared { session, outcome })
}

fn apply_overrides(mut config: Config, common: &CommonArgs) -> Config {
    if let Some(strings_file) = &common.strings_file {
        config.strings_file = Some(strings_file.clone());
    }
    if let Some(namespace) = &common.namespace {
        config.namespace = Some(namespace.clone());
    }
    config
}

fn canonical(root: &Path) -> Result<PathBuf> {
    fs::canonicalize(root).with_context(|| format!("Invalid source root: {:?}", root))
}

/// Scan errors are reported as warnings; they never fail a command on their own.
pub fn take_errors(outcome: &mut ScanOutcome) -> Vec<ScanError> {
    std::mem::take(&mut outcome.errors)
}
