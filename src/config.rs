use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".strliftrc.json";

/// Directories never descended into while discovering source files.
pub const SKIPPED_DIR_NAMES: &[&str] = &["build", ".gradle", ".git", ".idea", "node_modules"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    /// Layout/manifest attributes whose values are user-facing text.
    #[serde(default = "default_text_attributes")]
    pub text_attributes: Vec<String>,
    /// Exact texts that are never extracted.
    #[serde(default)]
    pub ignore_texts: Vec<String>,
    /// Extra call names whose string arguments are technical (matched case-insensitively).
    #[serde(default)]
    pub technical_methods: Vec<String>,
    /// Skip files under `test`/`androidTest` source sets.
    #[serde(default = "default_true")]
    pub ignore_test_files: bool,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    /// Explicit `R` namespace; wins over manifests and build files.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Explicit string table location, relative to the source root.
    #[serde(default)]
    pub strings_file: Option<String>,
    /// Receiver used for `getString` when no context is reachable.
    #[serde(default = "default_fallback_context_prefix")]
    pub fallback_context_prefix: String,
}

fn default_text_attributes() -> Vec<String> {
    [
        "android:text",
        "android:label",
        "android:contentDescription",
        "android:hint",
        "android:title",
    ]
    .map(String::from)
    .to_vec()
}

fn default_true() -> bool {
    true
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_fallback_context_prefix() -> String {
    "App.instance.".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            includes: Vec::new(),
            text_attributes: default_text_attributes(),
            ignore_texts: Vec::new(),
            technical_methods: Vec::new(),
            ignore_test_files: true,
            source_root: default_source_root(),
            namespace: None,
            strings_file: None,
            fallback_context_prefix: default_fallback_context_prefix(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob patterns in `ignores` or `includes` are invalid,
    /// or if the fallback context prefix is not empty and does not end with `.`.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if !self.fallback_context_prefix.is_empty() && !self.fallback_context_prefix.ends_with('.')
        {
            anyhow::bail!(
                "Invalid 'fallbackContextPrefix': \"{}\" must end with '.'",
                self.fallback_context_prefix
            );
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
