use anyhow::{Context, Result};
use regex::Regex;

use crate::{CliTest, LAYOUT, MAIN_KT, STRINGS, stderr, stdout};

const ACTIVITY: &str = r#"package com.example.app

import android.app.Activity

class MainActivity : Activity() {
    fun render() {
        setTitle("Welcome back")
        showMessage("Welcome back")
    }
}
"#;

const LAYOUT_XML: &str = r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <Button android:text="Sign in" />
    <TextView android:text="@string/already_done" />
</LinearLayout>
"#;

fn project() -> Result<CliTest> {
    let test = CliTest::android_project()?;
    test.write_file(MAIN_KT, ACTIVITY)?;
    test.write_file(LAYOUT, LAYOUT_XML)?;
    Ok(test)
}

/// Key of the entry holding `text` in the string table.
fn key_for(table: &str, text: &str) -> Result<String> {
    let pattern = Regex::new(&format!(
        r#"<string name="([a-z0-9_]+)">{}</string>"#,
        regex::escape(text)
    ))?;
    let captures = pattern
        .captures(table)
        .with_context(|| format!("no entry for {:?} in:\n{}", text, table))?;
    Ok(captures[1].to_string())
}

#[test]
fn test_extract_dry_run_writes_nothing() -> Result<()> {
    let test = project()?;

    let output = test.run(&["extract"])?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(0));
    assert!(out.contains("Would extract 3 string(s) in 2 group(s)."));
    assert!(out.contains("Run with --apply"));
    assert!(!test.root().join(STRINGS).exists());
    assert_eq!(test.read_file(MAIN_KT)?, ACTIVITY);
    assert_eq!(test.read_file(LAYOUT)?, LAYOUT_XML);

    Ok(())
}

#[test]
fn test_extract_apply_rewrites_sources() -> Result<()> {
    let test = project()?;

    let output = test.run(&["extract", "--apply"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("Extracted 3 of 3 string(s) in 2 group(s)."));

    let table = test.read_file(STRINGS)?;
    assert!(table.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n"));
    let welcome = key_for(&table, "Welcome back")?;
    let sign_in = key_for(&table, "Sign in")?;
    assert_ne!(welcome, sign_in);

    let source = test.read_file(MAIN_KT)?;
    assert!(source.contains(&format!("setTitle(getString(R.string.{}))", welcome)));
    assert!(source.contains(&format!("showMessage(getString(R.string.{}))", welcome)));
    assert!(!source.contains("\"Welcome back\""));

    let layout = test.read_file(LAYOUT)?;
    assert!(layout.contains(&format!("<Button android:text=\"@string/{}\" />", sign_in)));
    assert!(layout.contains("@string/already_done"));

    // Nothing is left to extract.
    let output = test.run(&["scan"])?;
    assert_eq!(output.status.code(), Some(0));

    Ok(())
}

#[test]
fn test_extract_exclude() -> Result<()> {
    let test = project()?;

    let output = test.run(&["extract", "--apply", "--exclude", "Sign in"])?;

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("Excluded 1 group(s) by --exclude"));
    assert!(out.contains("Extracted 2 of 2 string(s) in 1 group(s)."));
    assert_eq!(test.read_file(LAYOUT)?, LAYOUT_XML);
    assert!(!test.read_file(STRINGS)?.contains("Sign in"));

    Ok(())
}

#[test]
fn test_extract_reuses_existing_key() -> Result<()> {
    let test = project()?;
    test.write_file(
        STRINGS,
        "<resources>\n    <string name=\"welcome\">Welcome back</string>\n</resources>\n",
    )?;

    let output = test.run(&["extract", "--apply", "--exclude", "Sign in"])?;

    assert_eq!(output.status.code(), Some(0));
    assert!(
        test.read_file(MAIN_KT)?
            .contains("setTitle(getString(R.string.welcome))")
    );
    assert_eq!(
        test.read_file(STRINGS)?,
        "<resources>\n    <string name=\"welcome\">Welcome back</string>\n</resources>\n"
    );

    Ok(())
}

#[test]
fn test_extract_always_new_key_renames_references() -> Result<()> {
    let test = project()?;
    test.write_file(
        STRINGS,
        "<resources>\n    <string name=\"welcome\">Welcome back</string>\n</resources>\n",
    )?;
    test.write_file(
        "app/src/main/java/com/example/app/Other.kt",
        "package com.example.app\n\nfun other() = getString(R.string.welcome)\n",
    )?;

    let output = test.run(&["extract", "--apply", "--always-new-key", "--exclude", "Sign in"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let table = test.read_file(STRINGS)?;
    let key = key_for(&table, "Welcome back")?;
    assert_ne!(key, "welcome");
    assert!(!table.contains("\"welcome\""));
    assert!(
        test.read_file("app/src/main/java/com/example/app/Other.kt")?
            .contains(&format!("getString(R.string.{})", key))
    );
    assert!(
        test.read_file(MAIN_KT)?
            .contains(&format!("setTitle(getString(R.string.{}))", key))
    );

    Ok(())
}

#[test]
fn test_extract_without_namespace_reports_code_sites() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(MAIN_KT, ACTIVITY)?;
    test.write_file(LAYOUT, LAYOUT_XML)?;

    let output = test.run(&["extract", "--apply"])?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("Extracted 1 of 3 string(s) in 2 group(s)."));
    assert!(out.contains("2 string(s) could not be rewritten:"));
    assert!(out.contains("  - MainActivity.kt:7 - cannot resolve namespace"));
    assert!(out.contains("  - MainActivity.kt:8 - cannot resolve namespace"));
    assert_eq!(test.read_file(MAIN_KT)?, ACTIVITY);
    assert!(test.read_file(LAYOUT)?.contains("@string/"));

    Ok(())
}

#[test]
fn test_extract_namespace_flag() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(MAIN_KT, ACTIVITY)?;

    let output = test.run(&["extract", "--apply", "--namespace", "com.example.app"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(test.read_file(MAIN_KT)?.contains("setTitle(getString(R.string."));

    Ok(())
}

#[test]
fn test_extract_unwritable_table_is_an_error() -> Result<()> {
    let test = project()?;
    test.write_file("blocker", "")?;

    let output = test.run(&["extract", "--apply", "--strings-file", "blocker/strings.xml"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error:"));
    assert_eq!(test.read_file(MAIN_KT)?, ACTIVITY);

    Ok(())
}
