//! Replacement synthesis and application.
//!
//! Each occurrence is rewritten on its own: a failure is reported as a
//! [`ReplaceError`] and never touches the other occurrences of a commit.

pub mod context_access;
pub mod declarative;
pub mod expression;
pub mod imports;

use serde::Serialize;
use thiserror::Error;

use crate::{
    config::Config,
    core::{
        namespace::NamespaceResolver,
        scan::{DialectHandler, LiteralDialect, Occurrence},
        syntax::{DocumentStore, Handle, imports::ImportTable},
    },
    utils::display_file_name,
};
use expression::{ExpressionRequest, shorten};
use imports::ensure_import;

#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("cannot resolve namespace")]
    NamespaceUnresolved,
    #[error("source changed since scan")]
    StaleHandle,
    #[error("cannot build replacement: {0}")]
    Synthesis(String),
    #[error("cannot edit file: {0}")]
    Document(String),
}

/// Per-commit totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementReport {
    pub total_locations: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<String>,
}

impl ReplacementReport {
    pub fn record(&mut self, occurrence: &Occurrence, result: &Result<Handle, ReplaceError>) {
        self.total_locations += 1;
        match result {
            Ok(_) => self.success_count += 1,
            Err(err) => {
                self.failed_count += 1;
                self.errors.push(diagnostic(occurrence, err));
            }
        }
    }
}

/// `Main.kt:12 - cannot resolve namespace`
pub fn diagnostic(occurrence: &Occurrence, error: &ReplaceError) -> String {
    format!(
        "{}:{} - {}",
        display_file_name(&occurrence.path),
        occurrence.line,
        error
    )
}

/// Rewrites occurrences through a shared document store.
pub struct Rewriter<'a> {
    config: &'a Config,
    resolver: &'a NamespaceResolver,
}

impl<'a> Rewriter<'a> {
    pub fn new(config: &'a Config, resolver: &'a NamespaceResolver) -> Self {
        Self { config, resolver }
    }

    /// Replace one occurrence with a reference to `key`.
    pub fn apply(
        &self,
        documents: &mut DocumentStore,
        occurrence: &Occurrence,
        key: &str,
    ) -> Result<Handle, ReplaceError> {
        let dialect = occurrence.dialect;
        let qualifier = if dialect.is_code() {
            Some(
                self.resolver
                    .resolve(&occurrence.path)
                    .ok_or(ReplaceError::NamespaceUnresolved)?,
            )
        } else {
            None
        };

        let document = documents
            .open(&occurrence.path)
            .map_err(|err| ReplaceError::Document(format!("{:#}", err)))?;
        let range = document
            .resolve(&occurrence.handle)
            .ok_or(ReplaceError::StaleHandle)?;

        let handler = DialectHandler::new(dialect, self.config);
        let access = handler
            .access(document, &range, &self.config.fallback_context_prefix)
            .map_err(|err| ReplaceError::Synthesis(format!("{:#}", err)))?;
        let request = ExpressionRequest {
            qualifier: qualifier.as_deref(),
            key,
            arguments: &occurrence.arguments,
            access: &access,
        };
        let expression = handler
            .build_expression(&request)
            .map_err(|err| ReplaceError::Synthesis(format!("{:#}", err)))?;

        for fq_name in request.required_imports() {
            if let Some(statement) = handler.import_statement(&fq_name) {
                ensure_import(document, &statement, &fq_name)
                    .map_err(|err| ReplaceError::Document(format!("{:#}", err)))?;
            }
        }

        // Imports may have shifted the node.
        let range = document
            .resolve(&occurrence.handle)
            .ok_or(ReplaceError::StaleHandle)?;
        let expression = if dialect.is_code() {
            shorten(&expression, &ImportTable::parse(document.text()), &request)
        } else {
            expression
        };

        tracing::debug!(
            path = %occurrence.path.display(),
            line = occurrence.line,
            replacement = %expression,
            "rewriting occurrence"
        );
        document
            .replace(range, &expression)
            .map_err(|err| ReplaceError::Document(format!("{:#}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        namespace::{GradleProject, ProjectIndex},
        scan::scan_file,
        skip_policy::SkipPolicy,
    };
    use pretty_assertions::assert_eq;
    use std::{fs, path::Path};
    use tempfile::tempdir;

    fn resolver(namespace: Option<&str>) -> NamespaceResolver {
        NamespaceResolver::new(
            Box::new(GradleProject::new(namespace.map(str::to_string))),
            Box::new(ProjectIndex::default()),
        )
    }

    fn scan(path: &Path) -> Vec<Occurrence> {
        scan_file(path, &Config::default(), &SkipPolicy::default()).unwrap()
    }

    #[test]
    fn test_rewrites_composable_and_imperative_sites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Screen.kt");
        fs::write(
            &path,
            "package com.example.ui\n\nimport androidx.compose.runtime.Composable\n\n@Composable\nfun Greeting(name: String) {\n    Text(\"Hello $name\")\n}\n\nfun notify() {\n    show(\"Saved it\")\n}\n",
        )
        .unwrap();
        let occurrences = scan(&path);
        assert_eq!(occurrences.len(), 2);

        let config = Config::default();
        let resolver = resolver(Some("com.example"));
        let rewriter = Rewriter::new(&config, &resolver);
        let mut documents = DocumentStore::new();
        rewriter.apply(&mut documents, &occurrences[0], "hello_a1").unwrap();
        rewriter.apply(&mut documents, &occurrences[1], "saved_b2").unwrap();

        assert_eq!(
            documents.get(&path).unwrap().text(),
            "package com.example.ui\n\nimport androidx.compose.runtime.Composable\nimport com.example.R\nimport androidx.compose.ui.res.stringResource\n\n@Composable\nfun Greeting(name: String) {\n    Text(stringResource(R.string.hello_a1, name))\n}\n\nfun notify() {\n    show(App.instance.getString(R.string.saved_b2))\n}\n"
        );
    }

    #[test]
    fn test_rewrites_java_activity_sites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("HomeScreen.java");
        fs::write(
            &path,
            "package com.example.ui;\n\nimport android.app.Activity;\n\npublic class HomeScreen extends Activity {\n    void render(int count) {\n        setTitle(\"Welcome back\");\n        show(\"Items: \" + count);\n    }\n}\n",
        )
        .unwrap();
        let occurrences = scan(&path);
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[1].arguments, vec!["count"]);

        let config = Config::default();
        let resolver = resolver(Some("com.example"));
        let rewriter = Rewriter::new(&config, &resolver);
        let mut documents = DocumentStore::new();
        rewriter.apply(&mut documents, &occurrences[0], "welcome_a1").unwrap();
        rewriter.apply(&mut documents, &occurrences[1], "items_b2").unwrap();

        assert_eq!(
            documents.get(&path).unwrap().text(),
            "package com.example.ui;\n\nimport android.app.Activity;\nimport com.example.R;\n\npublic class HomeScreen extends Activity {\n    void render(int count) {\n        setTitle(getString(R.string.welcome_a1));\n        show(getString(R.string.items_b2, count));\n    }\n}\n"
        );
    }

    #[test]
    fn test_java_import_follows_package_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Repo.java");
        fs::write(
            &path,
            "package com.example.data;\n\nclass Repo {\n    void label(int n) {\n        show(\"Found \" + n + \" items\");\n    }\n}\n",
        )
        .unwrap();
        let occurrences = scan(&path);
        assert_eq!(occurrences.len(), 1);

        let config = Config::default();
        let resolver = resolver(Some("com.example"));
        let mut documents = DocumentStore::new();
        Rewriter::new(&config, &resolver)
            .apply(&mut documents, &occurrences[0], "found_c3")
            .unwrap();

        assert_eq!(
            documents.get(&path).unwrap().text(),
            "package com.example.data;\n\nimport com.example.R;\n\nclass Repo {\n    void label(int n) {\n        show(App.instance.getString(R.string.found_c3, n));\n    }\n}\n"
        );
    }

    #[test]
    fn test_markup_needs_no_namespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main.xml");
        fs::write(&path, "<TextView android:text=\"Sign in\" />").unwrap();
        let occurrences = scan(&path);

        let config = Config::default();
        let resolver = resolver(None);
        let mut documents = DocumentStore::new();
        Rewriter::new(&config, &resolver)
            .apply(&mut documents, &occurrences[0], "sign_in_c3")
            .unwrap();

        assert_eq!(
            documents.get(&path).unwrap().text(),
            "<TextView android:text=\"@string/sign_in_c3\" />"
        );
    }

    #[test]
    fn test_unresolved_namespace_fails_every_code_site() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Main.kt");
        fs::write(&path, "fun f() { show(\"Hello there\") }\n").unwrap();
        let occurrences = scan(&path);

        let config = Config::default();
        let resolver = resolver(None);
        let mut documents = DocumentStore::new();
        let result = Rewriter::new(&config, &resolver).apply(&mut documents, &occurrences[0], "k_a1");

        assert!(matches!(result, Err(ReplaceError::NamespaceUnresolved)));
        let mut report = ReplacementReport::default();
        report.record(&occurrences[0], &result);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.errors, vec!["Main.kt:1 - cannot resolve namespace"]);
    }

    #[test]
    fn test_stale_handle_is_a_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Main.kt");
        fs::write(&path, "package com.example\n\nfun f() { show(\"Hello there\") }\n").unwrap();
        let occurrences = scan(&path);
        fs::write(&path, "package com.example\n\nfun f() { show(\"Goodbye now!\") }\n").unwrap();

        let config = Config::default();
        let resolver = resolver(Some("com.example"));
        let mut documents = DocumentStore::new();
        let result = Rewriter::new(&config, &resolver).apply(&mut documents, &occurrences[0], "k_a1");

        assert!(matches!(result, Err(ReplaceError::StaleHandle)));
    }
}
