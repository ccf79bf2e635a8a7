use std::{fs, path::Path};

use anyhow::{Context, Result};

use super::{CommandResult, CommandSummary, InitSummary};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

/// Write the default config to the current directory. An existing file is
/// left untouched and counts as an error.
pub fn init() -> Result<CommandResult> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    let created = if config_path.exists() {
        eprintln!("Error: {} already exists", CONFIG_FILE_NAME);
        false
    } else {
        fs::write(config_path, default_config_json()?)
            .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
        true
    };

    Ok(CommandResult {
        summary: CommandSummary::Init(InitSummary { created }),
        root: Path::new(".").to_path_buf(),
        error_count: usize::from(!created),
        exit_on_errors: true,
        scan_errors: Vec::new(),
        files_scanned: 0,
    })
}
