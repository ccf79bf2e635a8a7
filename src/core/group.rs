use std::{collections::HashMap, path::PathBuf, sync::LazyLock};

use anyhow::{Result, bail};
use regex::Regex;
use serde::Serialize;

use crate::core::{keygen::KeyGenerator, resources::ResourceTable, scan::Occurrence};

static RESOURCE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());

/// All occurrences of one normalized text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub text: String,
    /// File of the first occurrence.
    pub path: PathBuf,
    pub new_key: String,
    /// Key already holding this text in the table.
    pub old_key: Option<String>,
    pub use_new_key: bool,
    pub selected: bool,
    pub occurrences: Vec<Occurrence>,
}

impl Group {
    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    /// Choose between the generated key and the existing one.
    pub fn prefer_new_key(&mut self, prefer: bool) {
        self.use_new_key = prefer;
    }

    /// Replace the generated key with a user-chosen one.
    pub fn set_new_key(&mut self, key: &str) -> Result<()> {
        if !RESOURCE_NAME_REGEX.is_match(key) {
            bail!("Invalid resource name: \"{}\"", key);
        }
        self.new_key = key.to_string();
        Ok(())
    }

    /// Key the occurrences will reference after commit.
    pub fn effective_key(&self) -> &str {
        match &self.old_key {
            Some(old) if !self.use_new_key => old,
            _ => &self.new_key,
        }
    }
}

/// Partition occurrences by text, in order of first appearance.
pub fn group(
    occurrences: Vec<Occurrence>,
    table: Option<&ResourceTable>,
    keygen: &mut KeyGenerator,
) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for occurrence in occurrences {
        if let Some(&i) = index.get(&occurrence.text) {
            groups[i].occurrences.push(occurrence);
            continue;
        }

        let text = occurrence.text.clone();
        let old_key = table
            .and_then(|t| t.find_key_by_value(&text))
            .map(str::to_string);
        let group = Group {
            new_key: keygen.generate(&text),
            use_new_key: old_key.is_none(),
            old_key,
            selected: true,
            path: occurrence.path.clone(),
            text: text.clone(),
            occurrences: vec![occurrence],
        };
        index.insert(text, groups.len());
        groups.push(group);
    }

    groups
}
