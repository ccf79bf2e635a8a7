//! Package and import headers of Kotlin/Java files.
//!
//! Headers are read from the source text with line-anchored patterns, which
//! works the same for both dialects and for files that do not fully parse.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;

static PACKAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*package[ \t]+([\w.`]+)[ \t]*;?[ \t]*$").unwrap());

static IMPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+(static[ \t]+)?([\w.`]+?)(\.\*)?(?:[ \t]+as[ \t]+(\w+))?[ \t]*;?[ \t]*$")
        .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported path without the `.*` suffix.
    pub path: String,
    pub wildcard: bool,
    pub alias: Option<String>,
}

impl Import {
    /// Name the import brings into scope (`None` for wildcards).
    pub fn simple_name(&self) -> Option<&str> {
        if self.wildcard {
            return None;
        }
        self.alias
            .as_deref()
            .or_else(|| self.path.rsplit('.').next())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    pub package: Option<String>,
    /// Byte range of the package line.
    pub package_range: Option<Range<usize>>,
    pub imports: Vec<Import>,
    /// Byte range of the last import line.
    pub last_import_range: Option<Range<usize>>,
}

impl ImportTable {
    pub fn parse(source: &str) -> Self {
        let mut table = ImportTable::default();

        if let Some(caps) = PACKAGE_REGEX.captures(source) {
            table.package = caps.get(1).map(|m| m.as_str().replace('`', ""));
            table.package_range = caps.get(0).map(|m| m.range());
        }

        for caps in IMPORT_REGEX.captures_iter(source) {
            let Some(path) = caps.get(2) else { continue };
            table.imports.push(Import {
                path: path.as_str().replace('`', ""),
                wildcard: caps.get(3).is_some(),
                alias: caps.get(4).map(|m| m.as_str().to_string()),
            });
            table.last_import_range = caps.get(0).map(|m| m.range());
        }

        table
    }

    /// Fully qualified name for a simple name brought in by an explicit import.
    pub fn resolve(&self, simple_name: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|i| i.simple_name() == Some(simple_name))
            .map(|i| i.path.as_str())
    }

    /// True when `fq_name` is usable by its simple name in this file.
    ///
    /// That is the case for an exact import, a wildcard import of its
    /// package, or when the file lives in that package.
    pub fn covers(&self, fq_name: &str) -> bool {
        let (package, simple) = match fq_name.rsplit_once('.') {
            Some(split) => split,
            None => return true,
        };
        self.package.as_deref() == Some(package)
            || self.imports.iter().any(|i| {
                (i.path == fq_name && i.alias.as_deref().is_none_or(|a| a == simple))
                    || (i.wildcard && i.path == package)
            })
    }

    /// An explicit import that binds the simple name of `fq_name` to another type.
    pub fn conflicts_with(&self, fq_name: &str) -> bool {
        let simple = fq_name.rsplit('.').next().unwrap_or(fq_name);
        self.imports
            .iter()
            .any(|i| i.simple_name() == Some(simple) && i.path != fq_name)
    }
}
