use anyhow::Result;

use crate::core::syntax::{Document, imports::ImportTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Already usable by simple name.
    Present,
    Added,
    /// Another type holds the simple name; the reference stays qualified.
    Conflict,
}

/// Add `statement` (importing `fq_name`) to the header of `document`.
///
/// The import goes after the last import, else after the package line,
/// else at the top of the file.
pub fn ensure_import(document: &mut Document, statement: &str, fq_name: &str) -> Result<ImportOutcome> {
    let table = ImportTable::parse(document.text());
    if table.covers(fq_name) {
        return Ok(ImportOutcome::Present);
    }
    if table.conflicts_with(fq_name) {
        return Ok(ImportOutcome::Conflict);
    }

    let (offset, text) = match (&table.last_import_range, &table.package_range) {
        (Some(last), _) => (last.end, format!("\n{}", statement)),
        (None, Some(package)) => (package.end, format!("\n\n{}", statement)),
        (None, None) => (0, format!("{}\n\n", statement)),
    };
    document.insert(offset, &text)?;
    tracing::debug!(path = %document.path().display(), import = fq_name, "added import");
    Ok(ImportOutcome::Added)
}
