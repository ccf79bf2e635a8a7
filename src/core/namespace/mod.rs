//! Qualifier resolution.
//!
//! Generated references are written against the `R` class of the module that
//! owns a file. [`NamespaceResolver`] finds that module's package through a
//! fixed chain of sources and memoizes the answer per file until cleared.
//!
//! ## Resolution Order
//!
//! 1. the project model's declared namespace
//! 2. the nearest `AndroidManifest.xml` `package` attribute
//! 3. `namespace` / `applicationId` in the nearest build file
//! 4. the project model's application id
//! 5. the file's own package, truncated, confirmed by the oracle
//! 6. the shortest project-wide `R` holder with a string table

pub mod gradle;
pub mod index;

use std::{
    fs,
    path::{Path, PathBuf},
};

use dashmap::DashMap;

use crate::core::syntax::imports::ImportTable;

pub use gradle::GradleProject;
pub use index::ProjectIndex;

/// Placeholder some build setups use when namespacing is turned off.
pub const DISABLED: &str = "disabled";

/// Shortest package tried in step 5.
const MIN_PACKAGE_COMPONENTS: usize = 2;

/// The host's module and build model.
pub trait ProjectModel: Send + Sync {
    /// Resource namespace the build system declares for the file's module.
    fn declared_namespace(&self, file: &Path) -> Option<String>;

    /// Application id of the file's module.
    fn application_id(&self, file: &Path) -> Option<String>;
}

/// Confirms that generated references would resolve.
pub trait NamespaceOracle: Send + Sync {
    /// True when `<package>.R` exists and has a `string` member.
    fn has_string_table(&self, package: &str) -> bool;

    /// Packages of every `R` holder with a `string` member.
    fn string_table_holders(&self) -> Vec<String>;
}

pub struct NamespaceResolver {
    model: Box<dyn ProjectModel>,
    oracle: Box<dyn NamespaceOracle>,
    cache: DashMap<PathBuf, Option<String>>,
}

impl NamespaceResolver {
    pub fn new(model: Box<dyn ProjectModel>, oracle: Box<dyn NamespaceOracle>) -> Self {
        Self {
            model,
            oracle,
            cache: DashMap::new(),
        }
    }

    /// Qualifier for references written into `file`, computed once per path.
    pub fn resolve(&self, file: &Path) -> Option<String> {
        if let Some(cached) = self.cache.get(file) {
            return cached.clone();
        }
        let resolved = self.compute(file);
        tracing::debug!(
            path = %file.display(),
            namespace = resolved.as_deref().unwrap_or("<none>"),
            "resolved namespace"
        );
        self.cache
            .entry(file.to_path_buf())
            .or_insert(resolved)
            .clone()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    fn compute(&self, file: &Path) -> Option<String> {
        let module = gradle::module_dir(file);

        let found = real(self.model.declared_namespace(file))
            .or_else(|| real(module.as_deref().and_then(gradle::manifest_package)))
            .or_else(|| real(module.as_deref().and_then(gradle::build_file_namespace)))
            .or_else(|| real(self.model.application_id(file)));
        if found.is_some() {
            return found;
        }

        self.from_file_package(file)
            .or_else(|| self.shortest_holder())
    }

    /// Step 5: walk the file's package up to two components.
    fn from_file_package(&self, file: &Path) -> Option<String> {
        let source = fs::read_to_string(file).ok()?;
        let package = ImportTable::parse(&source).package?;
        let components: Vec<&str> = package.split('.').collect();
        (MIN_PACKAGE_COMPONENTS..=components.len())
            .rev()
            .map(|n| components[..n].join("."))
            .find(|candidate| is_real(candidate) && self.oracle.has_string_table(candidate))
    }

    fn shortest_holder(&self) -> Option<String> {
        self.oracle
            .string_table_holders()
            .into_iter()
            .filter(|q| is_real(q))
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
    }
}

fn real(qualifier: Option<String>) -> Option<String> {
    qualifier.filter(|q| is_real(q))
}

fn is_real(qualifier: &str) -> bool {
    !qualifier.is_empty() && qualifier != DISABLED
}
