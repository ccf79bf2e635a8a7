use anyhow::Result;
use serde_json::Value;

use crate::{CliTest, LAYOUT, MAIN_KT, stderr, stdout};

const ACTIVITY: &str = r#"package com.example.app

import android.app.Activity
import android.os.Bundle
import android.util.Log

class MainActivity : Activity() {
    override fun onCreate(savedInstanceState: Bundle?) {
        super.onCreate(savedInstanceState)
        setTitle("Welcome back")
        Log.d("MainActivity", "created view")
        showMessage("Welcome back")
    }
}
"#;

const LAYOUT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android">
    <Button
        android:id="@+id/sign_in"
        android:text="Sign in" />
    <TextView android:text="@string/already_done" />
</LinearLayout>
"#;

fn project() -> Result<CliTest> {
    let test = CliTest::android_project()?;
    test.write_file(MAIN_KT, ACTIVITY)?;
    test.write_file(LAYOUT, LAYOUT_XML)?;
    Ok(test)
}

#[test]
fn test_scan_lists_groups() -> Result<()> {
    let test = project()?;

    let output = test.run(&["scan"])?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(out.contains("string: \"Welcome back\""));
    assert!(out.contains("string: \"Sign in\""));
    assert!(out.contains(&format!("--> {}:10:18", MAIN_KT)));
    assert!(out.contains(&format!("= also: {}:12:21", MAIN_KT)));
    assert!(out.contains(&format!("--> {}:5:23", LAYOUT)));
    assert!(out.contains("3 hard-coded string(s) in 2 group(s) (2 source file(s) scanned)"));
    assert!(!out.contains("created view"));
    assert!(!out.contains("already_done"));

    // Scanning never writes.
    assert!(!test.root().join(crate::STRINGS).exists());
    assert_eq!(test.read_file(MAIN_KT)?, ACTIVITY);

    Ok(())
}

#[test]
fn test_scan_json() -> Result<()> {
    let test = project()?;

    let output = test.run(&["scan", "--json"])?;
    let parsed: Value = serde_json::from_str(&stdout(&output))?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(parsed["filesScanned"], 2);
    let groups = parsed["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["text"], "Welcome back");
    assert_eq!(groups[0]["occurrences"].as_array().unwrap().len(), 2);
    assert_eq!(groups[0]["occurrences"][0]["line"], 10);
    assert_eq!(groups[0]["occurrences"][0]["dialect"], "Kotlin");
    assert_eq!(groups[1]["text"], "Sign in");
    assert_eq!(groups[1]["selected"], true);
    assert!(groups[1]["newKey"].as_str().is_some_and(|k| !k.is_empty()));

    Ok(())
}

#[test]
fn test_scan_clean_project() -> Result<()> {
    let test = CliTest::android_project()?;
    test.write_file(
        MAIN_KT,
        "package com.example.app\n\nfun title() = getString(R.string.title)\n",
    )?;

    let output = test.run(&["scan"])?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Scanned 1 source file - no hard-coded strings found"));

    Ok(())
}

#[test]
fn test_scan_honours_ignore_texts_and_ignores() -> Result<()> {
    let test = project()?;
    test.write_file(
        ".strliftrc.json",
        r#"{ "ignoreTexts": ["Welcome back"], "ignores": ["**/layout/**"] }"#,
    )?;

    let output = test.run(&["scan"])?;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Scanned 1 source file - no hard-coded strings found"));

    Ok(())
}

#[test]
fn test_scan_skips_test_sources() -> Result<()> {
    let test = CliTest::android_project()?;
    test.write_file(
        "app/src/test/java/com/example/app/MainTest.kt",
        "package com.example.app\n\nfun check() = expect(\"Welcome back\")\n",
    )?;

    let output = test.run(&["scan"])?;

    assert_eq!(output.status.code(), Some(0));

    Ok(())
}

#[test]
fn test_scan_reports_unparseable_files() -> Result<()> {
    let test = project()?;
    test.write_file(
        "app/src/main/res/layout/broken.xml",
        "<LinearLayout><TextView android:text=\"Broken\"></LinearLayout>",
    )?;

    let output = test.run(&["scan"])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("1 file(s) could not be scanned (use -v for details)"));
    assert!(stdout(&output).contains("string: \"Welcome back\""));

    let output = test.run(&["scan", "--verbose"])?;
    assert!(stderr(&output).contains("broken.xml"));

    Ok(())
}
