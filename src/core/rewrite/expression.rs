use anyhow::{Result, bail};

use crate::core::syntax::{Dialect, imports::ImportTable, parse_code};

/// Compose accessor used in declarative code.
pub const STRING_RESOURCE_FN: &str = "androidx.compose.ui.res.stringResource";

/// Context lookup used in imperative code.
pub const IMPERATIVE_FN: &str = "getString";

/// How code at a site reaches the string table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Inside a composable: `stringResource(...)`.
    Declarative,
    /// `<prefix>getString(...)`, where the prefix names a context.
    Imperative { prefix: String },
    /// An XML attribute: `@string/<key>`.
    Markup,
}

pub struct ExpressionRequest<'a> {
    /// Package holding `R`. `None` leaves `R` unqualified.
    pub qualifier: Option<&'a str>,
    pub key: &'a str,
    pub arguments: &'a [String],
    pub access: &'a Access,
}

impl ExpressionRequest<'_> {
    /// Fully qualified resource holder, `com.example.R`.
    pub fn holder(&self) -> String {
        match self.qualifier {
            Some(qualifier) => format!("{}.R", qualifier),
            None => "R".to_string(),
        }
    }

    pub fn reference(&self) -> String {
        format!("{}.string.{}", self.holder(), self.key)
    }

    /// Names the expression needs imported to be written in short form.
    pub fn required_imports(&self) -> Vec<String> {
        let mut imports = Vec::new();
        if self.qualifier.is_some() && !matches!(self.access, Access::Markup) {
            imports.push(self.holder());
        }
        if matches!(self.access, Access::Declarative) {
            imports.push(STRING_RESOURCE_FN.to_string());
        }
        imports
    }
}

/// Fully qualified lookup expression for a code site.
pub fn code_expression(request: &ExpressionRequest) -> String {
    let mut arguments = vec![request.reference()];
    arguments.extend(request.arguments.iter().cloned());
    let arguments = arguments.join(", ");

    match request.access {
        Access::Declarative => format!("{}({})", STRING_RESOURCE_FN, arguments),
        Access::Imperative { prefix } => format!("{}{}({})", prefix, IMPERATIVE_FN, arguments),
        Access::Markup => markup_reference(request.key),
    }
}

pub fn markup_reference(key: &str) -> String {
    format!("@string/{}", key)
}

/// Reject an expression that does not parse as one in `dialect`.
pub fn validate_expression(dialect: Dialect, expression: &str) -> Result<()> {
    let snippet = match dialect {
        Dialect::Kotlin => format!("val snippet = {}\n", expression),
        Dialect::Java => format!("class Snippet {{ Object snippet = {}; }}\n", expression),
        Dialect::Markup => return Ok(()),
    };
    let tree = parse_code(dialect, &snippet, None)?;
    if tree.root_node().has_error() {
        bail!("Generated expression does not parse: {}", expression);
    }
    Ok(())
}

/// Collapse qualified names that the file's imports bring into scope.
pub fn shorten(expression: &str, imports: &ImportTable, request: &ExpressionRequest) -> String {
    let mut short = expression.to_string();

    if request.qualifier.is_some() {
        let holder = request.holder();
        if imports.covers(&holder) && !imports.conflicts_with(&holder) {
            short = short.replacen(&format!("{}.string.", holder), "R.string.", 1);
        }
    }

    if matches!(request.access, Access::Declarative)
        && imports.covers(STRING_RESOURCE_FN)
        && !imports.conflicts_with(STRING_RESOURCE_FN)
    {
        short = short.replacen(STRING_RESOURCE_FN, "stringResource", 1);
    }

    short
}
