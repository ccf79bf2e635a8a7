use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;
use walkdir::WalkDir;

use super::{
    NamespaceOracle,
    gradle::{BUILD_FILE_NAMES, build_file_namespace, manifest_package},
};
use crate::{config::SKIPPED_DIR_NAMES, core::syntax::imports::ImportTable};

static STRING_CLASS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bclass\s+string\b").unwrap());

const RESOURCE_DIRS: &[&str] = &["src/main/res/values", "res/values"];

/// `R` holders found on disk: Gradle modules that own string resources,
/// and generated `R.java` files declaring a `string` class.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    holders: Vec<String>,
}

impl ProjectIndex {
    pub fn discover(root: &Path) -> Self {
        let mut holders = Vec::new();

        // Generated sources live under `build/`, so only the other skipped names apply.
        let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !(e.file_type().is_dir() && name != "build" && SKIPPED_DIR_NAMES.contains(&name.as_ref()))
        });

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();
            if entry.file_type().is_dir() {
                if let Some(holder) = module_holder(path) {
                    holders.push(holder);
                }
            } else if entry.file_name() == "R.java" {
                if let Some(holder) = generated_holder(path) {
                    holders.push(holder);
                }
            }
        }

        Self::from_holders(holders)
    }

    pub fn from_holders(mut holders: Vec<String>) -> Self {
        holders.sort();
        holders.dedup();
        Self { holders }
    }
}

fn module_holder(dir: &Path) -> Option<String> {
    let is_module = BUILD_FILE_NAMES.iter().any(|name| dir.join(name).is_file());
    let has_resources = RESOURCE_DIRS.iter().any(|relative| dir.join(relative).is_dir());
    if !is_module || !has_resources {
        return None;
    }
    build_file_namespace(dir).or_else(|| manifest_package(dir))
}

fn generated_holder(path: &Path) -> Option<String> {
    let source = fs::read_to_string(path).ok()?;
    if !STRING_CLASS_REGEX.is_match(&source) {
        return None;
    }
    ImportTable::parse(&source).package
}

impl NamespaceOracle for ProjectIndex {
    fn has_string_table(&self, package: &str) -> bool {
        self.holders.iter().any(|h| h == package)
    }

    fn string_table_holders(&self) -> Vec<String> {
        self.holders.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_discovers_modules_and_generated_holders() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        let app = root.join("app");
        fs::create_dir_all(app.join("src/main/res/values")).unwrap();
        fs::write(app.join("build.gradle.kts"), "android {\n    namespace = \"com.example.app\"\n}\n").unwrap();

        // Module without resources is not a holder.
        let core = root.join("core");
        fs::create_dir_all(&core).unwrap();
        fs::write(core.join("build.gradle"), "android {\n    namespace \"com.example.core\"\n}\n").unwrap();

        let generated = root.join("lib/build/generated/source/r/com/example/lib");
        fs::create_dir_all(&generated).unwrap();
        fs::write(
            generated.join("R.java"),
            "package com.example.lib;\n\npublic final class R {\n    public static final class string {\n    }\n}\n",
        )
        .unwrap();

        let index = ProjectIndex::discover(root);
        assert_eq!(
            index.string_table_holders(),
            vec!["com.example.app".to_string(), "com.example.lib".to_string()]
        );
        assert!(index.has_string_table("com.example.app"));
        assert!(!index.has_string_table("com.example.core"));
    }
}
