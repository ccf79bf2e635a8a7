use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use quick_xml::{Reader, events::Event};
use regex::Regex;

use super::ProjectModel;

pub const BUILD_FILE_NAMES: &[&str] = &["build.gradle.kts", "build.gradle"];

const MANIFEST_PATHS: &[&str] = &["src/main/AndroidManifest.xml", "AndroidManifest.xml"];

/// `namespace = "x"`, `namespace "x"`, `namespace("x")`, also inside one-line blocks.
static NAMESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bnamespace\s*(?:=\s*|\(\s*)?["']([\w.]+)["']"#).unwrap()
});

static APPLICATION_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bapplicationId\s*(?:=\s*|\(\s*)?["']([\w.]+)["']"#).unwrap()
});

static LINE_COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)//.*$").unwrap());

/// Nearest ancestor directory of `file` holding a Gradle build file.
pub fn module_dir(file: &Path) -> Option<PathBuf> {
    file.ancestors()
        .skip(1)
        .find(|dir| BUILD_FILE_NAMES.iter().any(|name| dir.join(name).is_file()))
        .map(Path::to_path_buf)
}

/// `package` attribute of the module manifest's root element.
pub fn manifest_package(module: &Path) -> Option<String> {
    let manifest = MANIFEST_PATHS
        .iter()
        .map(|relative| module.join(relative))
        .find(|p| p.is_file())?;
    let text = fs::read_to_string(&manifest).ok()?;

    let mut reader = Reader::from_str(&text);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() != b"manifest" {
                    return None;
                }
                let attribute = e.try_get_attribute("package").ok()??;
                let value = attribute.unescape_value().ok()?;
                return Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// `namespace`, else `applicationId`, from the module's build file.
pub fn build_file_namespace(module: &Path) -> Option<String> {
    let text = BUILD_FILE_NAMES
        .iter()
        .map(|name| module.join(name))
        .find_map(|p| fs::read_to_string(p).ok())?;
    let text = LINE_COMMENT_REGEX.replace_all(&text, "");
    [&*NAMESPACE_REGEX, &*APPLICATION_ID_REGEX]
        .iter()
        .find_map(|regex| regex.captures(&text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Project model backed by Gradle files and the config `namespace` override.
#[derive(Debug, Clone, Default)]
pub struct GradleProject {
    namespace_override: Option<String>,
}

impl GradleProject {
    pub fn new(namespace_override: Option<String>) -> Self {
        Self { namespace_override }
    }
}

impl ProjectModel for GradleProject {
    fn declared_namespace(&self, _: &Path) -> Option<String> {
        self.namespace_override.clone()
    }

    // Gradle files carry no separate application model.
    fn application_id(&self, _: &Path) -> Option<String> {
        None
    }
}
