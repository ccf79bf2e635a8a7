//! Classifier deciding whether a candidate literal is user-facing text.
//!
//! Rules run in a fixed order and the first match wins. The policy holds no
//! mutable state, so scanner workers share one instance across threads.

use std::{
    collections::HashSet,
    path::{Component, Path},
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    config::Config,
    utils::{contains_alphabetic, contains_alphanumeric},
};

/// printf-style placeholder: `%` + optional position + flags/width/precision + conversion.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(\d+\$)?[-#+ 0,(<]*[\d.]*[a-zA-Z]").unwrap());

static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{8})$").unwrap());

/// Call names whose string arguments are never user-facing (compared lowercase).
pub const TECHNICAL_METHODS: &[&str] = &[
    "d",
    "e",
    "i",
    "v",
    "w",
    "wtf",
    "log",
    "print",
    "println",
    "error",
    "tag",
    "putextra",
    "getstringextra",
    "putstring",
    "getstring",
    "putlong",
    "putint",
    "getboolean",
    "getint",
    "getfloat",
    "edit",
    "settag",
    "gettag",
    "findviewwithtag",
    "query",
    "insert",
    "update",
    "delete",
    "execsql",
    "columnindex",
    "action",
    "addcategory",
    "setpackage",
    "setclassname",
    "getsystemservice",
    "testtag",
    "semantics",
];

/// Receiver types whose calls only take technical strings.
pub const TECHNICAL_RECEIVERS: &[&str] = &["android.util.Log", "timber.log.Timber", "BuildConfig"];

/// Source set directories holding test code.
pub const TEST_DIR_NAMES: &[&str] = &["test", "androidTest"];

const URI_PREFIXES: &[&str] = &["http://", "https://", "android:"];

/// Where a literal sits in the syntax tree, as far as skipping is concerned.
#[derive(Debug, Clone, Default)]
pub struct SyntacticContext<'a> {
    pub path: Option<&'a Path>,
    /// Inside an annotation argument.
    pub in_annotation: bool,
    /// Name of the call the literal is an argument of.
    pub call_name: Option<String>,
    /// Receiver of that call, import-resolved when possible.
    pub receiver: Option<String>,
    /// Number of embedded expressions folded into the text.
    pub argument_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooShort,
    Ignored,
    Technical,
    TestFile,
    Annotation,
    TechnicalMethod,
    TechnicalReceiver,
}

pub struct SkipPolicy {
    ignore_texts: HashSet<String>,
    technical_methods: HashSet<String>,
    ignore_test_files: bool,
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl SkipPolicy {
    pub fn new(config: &Config) -> Self {
        let technical_methods = TECHNICAL_METHODS
            .iter()
            .map(|m| m.to_string())
            .chain(config.technical_methods.iter().map(|m| m.to_lowercase()))
            .collect();
        Self {
            ignore_texts: config.ignore_texts.iter().map(|t| t.trim().to_string()).collect(),
            technical_methods,
            ignore_test_files: config.ignore_test_files,
        }
    }

    pub fn should_skip(&self, text: &str, context: &SyntacticContext) -> bool {
        self.skip_reason(text, context).is_some()
    }

    /// The first rule that rejects `text`, or `None` for extractable text.
    pub fn skip_reason(&self, text: &str, context: &SyntacticContext) -> Option<SkipReason> {
        let trimmed = text.trim();
        if trimmed.chars().count() <= 1 {
            return Some(SkipReason::TooShort);
        }
        if self.ignore_texts.contains(trimmed) {
            return Some(SkipReason::Ignored);
        }
        if is_technical_content(trimmed, context.argument_count) {
            return Some(SkipReason::Technical);
        }
        if self.ignore_test_files && context.path.is_some_and(is_test_path) {
            return Some(SkipReason::TestFile);
        }
        if context.in_annotation {
            return Some(SkipReason::Annotation);
        }
        if context
            .call_name
            .as_deref()
            .is_some_and(|name| self.technical_methods.contains(&name.to_lowercase()))
        {
            return Some(SkipReason::TechnicalMethod);
        }
        if context.receiver.as_deref().is_some_and(is_technical_receiver) {
            return Some(SkipReason::TechnicalReceiver);
        }
        None
    }
}

/// Placeholder-free text without letters, colors, and URIs.
///
/// Folded templates (`argument_count > 0`) keep their static text when it has
/// any letter or digit, so `66|%1$s` survives while `%1$s` alone does not.
fn is_technical_content(text: &str, argument_count: usize) -> bool {
    if HEX_COLOR_REGEX.is_match(text) {
        return true;
    }
    if URI_PREFIXES.iter().any(|p| text.starts_with(p)) || text.contains("://") {
        return true;
    }
    let remainder = PLACEHOLDER_REGEX.replace_all(text, "");
    if argument_count > 0 {
        !contains_alphanumeric(&remainder)
    } else {
        !contains_alphabetic(&remainder)
    }
}

/// True when a path component is a test source set directory.
pub fn is_test_path(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| TEST_DIR_NAMES.contains(&name)),
        _ => false,
    })
}

fn is_technical_receiver(receiver: &str) -> bool {
    TECHNICAL_RECEIVERS.iter().any(|technical| {
        receiver == *technical
            || receiver.ends_with(&format!(".{}", technical))
            || technical.ends_with(&format!(".{}", receiver))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn policy() -> SkipPolicy {
        SkipPolicy::default()
    }

    fn plain() -> SyntacticContext<'static> {
        SyntacticContext::default()
    }

    fn call(name: &str) -> SyntacticContext<'static> {
        SyntacticContext {
            call_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_boundary_cases() {
        let policy = policy();
        assert!(policy.should_skip("#FF00FF", &plain()));
        assert!(policy.should_skip("#80FF00FF", &plain()));
        assert!(policy.should_skip("http://x", &plain()));
        assert!(policy.should_skip("A", &plain()));
        assert!(!policy.should_skip("Hello %1$s", &plain()));
        assert!(policy.should_skip("Something went wrong", &call("log")));
    }

    #[test]
    fn test_too_short_and_blank() {
        let policy = policy();
        assert_eq!(policy.skip_reason("", &plain()), Some(SkipReason::TooShort));
        assert_eq!(policy.skip_reason("   x  ", &plain()), Some(SkipReason::TooShort));
        assert_eq!(policy.skip_reason("Ok", &plain()), None);
    }

    #[test]
    fn test_technical_content() {
        let policy = policy();
        for text in ["123", "---", "%d", "%1$s %2$d", "https://example.com", "content://x", "android:id"] {
            assert_eq!(
                policy.skip_reason(text, &plain()),
                Some(SkipReason::Technical),
                "{text}"
            );
        }
        assert_eq!(policy.skip_reason("Color #FF00FF", &plain()), None);
        assert_eq!(policy.skip_reason("你好", &plain()), None);
    }

    #[test]
    fn test_folded_template_keeps_digits() {
        let policy = policy();
        let template = SyntacticContext {
            argument_count: 1,
            ..Default::default()
        };
        assert_eq!(policy.skip_reason("66|%1$s", &template), None);
        assert_eq!(policy.skip_reason("%1$s:", &template), Some(SkipReason::Technical));
        assert_eq!(policy.skip_reason("66|", &plain()), Some(SkipReason::Technical));
    }

    #[test]
    fn test_test_directories() {
        let policy = policy();
        for path in ["app/src/test/java/A.kt", "app/src/androidTest/java/A.kt"] {
            let context = SyntacticContext {
                path: Some(Path::new(path)),
                ..Default::default()
            };
            assert_eq!(policy.skip_reason("Hello", &context), Some(SkipReason::TestFile));
        }
        let main = SyntacticContext {
            path: Some(Path::new("app/src/main/java/Latest.kt")),
            ..Default::default()
        };
        assert_eq!(policy.skip_reason("Hello", &main), None);
    }

    #[test]
    fn test_test_directories_allowed_when_disabled() {
        let policy = SkipPolicy::new(&Config {
            ignore_test_files: false,
            ..Default::default()
        });
        let context = SyntacticContext {
            path: Some(Path::new("app/src/test/java/A.kt")),
            ..Default::default()
        };
        assert_eq!(policy.skip_reason("Hello", &context), None);
    }

    #[test]
    fn test_annotation_argument() {
        let context = SyntacticContext {
            in_annotation: true,
            ..Default::default()
        };
        assert_eq!(
            policy().skip_reason("Use the new API", &context),
            Some(SkipReason::Annotation)
        );
    }

    #[test]
    fn test_technical_methods_are_case_insensitive() {
        let policy = policy();
        for name in ["d", "putExtra", "getSharedPreferences_notListed", "execSQL", "testTag"] {
            let expected = if name.ends_with("notListed") {
                None
            } else {
                Some(SkipReason::TechnicalMethod)
            };
            assert_eq!(policy.skip_reason("Some text", &call(name)), expected, "{name}");
        }
    }

    #[test]
    fn test_configured_technical_method() {
        let policy = SkipPolicy::new(&Config {
            technical_methods: vec!["trackEvent".to_string()],
            ..Default::default()
        });
        assert_eq!(
            policy.skip_reason("Screen opened", &call("trackevent")),
            Some(SkipReason::TechnicalMethod)
        );
    }

    #[test]
    fn test_ignore_texts() {
        let policy = SkipPolicy::new(&Config {
            ignore_texts: vec!["OK".to_string()],
            ..Default::default()
        });
        assert_eq!(policy.skip_reason(" OK ", &plain()), Some(SkipReason::Ignored));
    }

    #[test]
    fn test_technical_receivers() {
        let policy = policy();
        for receiver in ["android.util.Log", "Log", "Timber", "com.example.BuildConfig", "BuildConfig"] {
            let context = SyntacticContext {
                call_name: Some("format".to_string()),
                receiver: Some(receiver.to_string()),
                ..Default::default()
            };
            assert_eq!(
                policy.skip_reason("Some text", &context),
                Some(SkipReason::TechnicalReceiver),
                "{receiver}"
            );
        }
        let context = SyntacticContext {
            call_name: Some("setText".to_string()),
            receiver: Some("binding.title".to_string()),
            ..Default::default()
        };
        assert_eq!(policy.skip_reason("Some text", &context), None);
    }
}
