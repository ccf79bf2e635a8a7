use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert!(
        parsed.get("includes").is_some(),
        "Config should have 'includes' field"
    );
    assert_eq!(parsed["sourceRoot"], "./");
    assert_eq!(parsed["fallbackContextPrefix"], "App.instance.");
    assert_eq!(parsed["ignoreTestFiles"], true);
    assert!(
        parsed["textAttributes"]
            .as_array()
            .is_some_and(|attrs| attrs.iter().any(|a| a == "android:text")),
        "Config should list android:text"
    );

    assert!(
        content.contains("  "),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Created .strliftrc.json"));
    assert!(test.root().join(".strliftrc.json").exists());
    let content = test.read_file(".strliftrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".strliftrc.json", "{}")?;

    let output = test.run(&["init"])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: .strliftrc.json already exists"));
    assert_eq!(test.read_file(".strliftrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::android_project()?;
    test.write_file(".strliftrc.json", r#"{ "ignores": ["[unclosed"] }"#)?;

    let output = test.run(&["scan"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid glob pattern in 'ignores'"));

    Ok(())
}
