//! Scan and commit orchestration.
//!
//! A [`Session`] owns everything that lives for one scan/commit cycle: the
//! loaded config, the skip policy, and the namespace resolver with its
//! cache. Commits are serialized by a lock inside the session and run in two
//! phases, table first, then source.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use thiserror::Error;

use crate::{
    config::Config,
    core::{
        file_scanner::{ScanResult, scan_files as discover},
        group::{Group, group},
        keygen::KeyGenerator,
        namespace::{GradleProject, NamespaceResolver, ProjectIndex},
        progress::{CommitPhase, ProgressSink},
        resources::{
            ResourceTable, TableError,
            index::{PendingTables, ResourceIndex, rename_references},
        },
        rewrite::{ReplacementReport, Rewriter, diagnostic},
        scan::{Occurrence, ScanError, scan_files},
        skip_policy::SkipPolicy,
        syntax::DocumentStore,
    },
    utils::display_file_name,
};

/// A commit that could not start rewriting.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error(transparent)]
    Table(#[from] TableError),
}

pub struct ScanOutcome {
    pub groups: Vec<Group>,
    pub files_scanned: usize,
    pub errors: Vec<ScanError>,
}

impl ScanOutcome {
    pub fn occurrence_count(&self) -> usize {
        self.groups.iter().map(|g| g.occurrences.len()).sum()
    }
}

pub struct Session {
    root: PathBuf,
    config: Config,
    policy: SkipPolicy,
    resolver: NamespaceResolver,
    commit_lock: Mutex<()>,
}

impl Session {
    /// Session over the project at `root`, using the Gradle model and an
    /// index of the project's `R` holders.
    pub fn new(root: &Path, config: Config) -> Self {
        let resolver = NamespaceResolver::new(
            Box::new(GradleProject::new(config.namespace.clone())),
            Box::new(ProjectIndex::discover(root)),
        );
        Self::with_resolver(root, config, resolver)
    }

    pub fn with_resolver(root: &Path, config: Config, resolver: NamespaceResolver) -> Self {
        Self {
            root: root.to_path_buf(),
            policy: SkipPolicy::new(&config),
            config,
            resolver,
            commit_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source files under the root, honouring `includes` and `ignores`.
    pub fn discover_files(&self, verbose: bool) -> ScanResult {
        discover(
            &self.root,
            &self.config.includes,
            &self.config.ignores,
            verbose,
        )
    }

    /// Detect and group occurrences in `paths`. Nothing is written.
    pub fn scan(&self, paths: &[PathBuf]) -> ScanOutcome {
        let batch = scan_files(paths, &self.config, &self.policy);

        let table = ResourceTable::locate(&self.root, self.config.strings_file.as_deref())
            .and_then(|path| match ResourceTable::open(&path) {
                Ok(table) => Some(table),
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring unreadable string table");
                    None
                }
            });

        let mut taken = ResourceIndex::discover(&self.root).keys();
        if let Some(table) = &table {
            taken.extend(table.keys().map(str::to_string));
        }
        let mut keygen = KeyGenerator::new(taken);

        ScanOutcome {
            groups: group(batch.occurrences, table.as_ref(), &mut keygen),
            files_scanned: paths.len(),
            errors: batch.errors,
        }
    }

    /// Write the table for every selected group, then rewrite its occurrences.
    ///
    /// Per-occurrence failures are collected in the report; only a table
    /// failure stops the commit, before any source is touched.
    pub fn commit(
        &self,
        groups: &[Group],
        progress: &mut dyn ProgressSink,
    ) -> Result<ReplacementReport, CommitError> {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let selected: Vec<&Group> = groups.iter().filter(|g| g.selected).collect();
        let mut report = ReplacementReport::default();
        let mut documents = DocumentStore::new();

        progress.on_phase(CommitPhase::WritingTable);
        let keys = self.sync_table(&selected, &mut documents, &mut report)?;

        progress.on_phase(CommitPhase::RewritingSource);
        let mut work: Vec<(&Occurrence, &str)> = selected
            .iter()
            .zip(&keys)
            .flat_map(|(group, key)| group.occurrences.iter().map(move |o| (o, key.as_str())))
            .collect();
        work.sort_by(|(a, _), (b, _)| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.range().start.cmp(&b.range().start))
        });

        let rewriter = Rewriter::new(&self.config, &self.resolver);
        let total = work.len();
        for (i, (occurrence, key)) in work.into_iter().enumerate() {
            progress.on_progress(i + 1, total, &display_file_name(&occurrence.path));
            let result = rewriter.apply(&mut documents, occurrence, key);
            if let Err(err) = &result {
                tracing::warn!(diagnostic = %diagnostic(occurrence, err), "replacement failed");
            }
            report.record(occurrence, &result);
        }

        report.errors.extend(documents.save_dirty());
        Ok(report)
    }

    /// Forget cached namespaces, e.g. after build files changed.
    pub fn clear_caches(&self) {
        self.resolver.clear();
    }

    /// Bring the table in line with the selected groups and return each
    /// group's final key.
    fn sync_table(
        &self,
        groups: &[&Group],
        documents: &mut DocumentStore,
        report: &mut ReplacementReport,
    ) -> Result<Vec<String>, CommitError> {
        let mut table =
            ResourceTable::locate_or_create(&self.root, self.config.strings_file.as_deref())?;
        let index = ResourceIndex::discover(&self.root);
        let mut taken = index.keys();
        taken.extend(table.keys().map(str::to_string));
        let mut files: Option<Vec<PathBuf>> = None;
        let mut translations = PendingTables::default();
        let mut keys: Vec<String> = Vec::with_capacity(groups.len());

        for group in groups {
            match &group.old_key {
                Some(old) if !group.use_new_key || *old == group.new_key => {
                    keys.push(old.clone())
                }
                Some(old) => {
                    let new = group.new_key.as_str();
                    claim_key(&table, &taken, &keys, new, &group.text)?;
                    if table.rename_key(old, new)? {
                        let files = files.get_or_insert_with(|| {
                            self.discover_files(false).files.into_iter().collect()
                        });
                        report.errors.extend(index.rename_in_translations(
                            table.path(),
                            old,
                            new,
                            &mut translations,
                        ));
                        if let Err(err) = rename_references(documents, files, old, new) {
                            report.errors.push(format!("{:#}", err));
                        }
                    } else {
                        table.upsert(new, &group.text)?;
                    }
                    keys.push(new.to_string());
                }
                None => {
                    claim_key(&table, &taken, &keys, &group.new_key, &group.text)?;
                    table.upsert(&group.new_key, &group.text)?;
                    keys.push(group.new_key.clone());
                }
            }
        }

        if table.is_dirty() {
            table.save()?;
        }
        report.errors.extend(translations.save());
        Ok(keys)
    }
}

/// Fail when `key` already names another resource or another group's string.
/// A table entry already holding `text` under `key` is accepted.
fn claim_key(
    table: &ResourceTable,
    taken: &HashSet<String>,
    assigned: &[String],
    key: &str,
    text: &str,
) -> Result<(), TableError> {
    let held = table.value(key) == Some(text);
    let clash = (!held && (taken.contains(key) || table.contains_key(key)))
        || assigned.iter().any(|k| k == key);
    if clash {
        return Err(TableError::KeyExists {
            path: table.path().to_path_buf(),
            key: key.to_string(),
        });
    }
    Ok(())
}
