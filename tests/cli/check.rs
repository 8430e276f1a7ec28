use std::collections::BTreeSet;

use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, run};

const REPEATED: &str = r#"export function total(order) {
  return order.items.length + order.items.length;
}
"#;

#[test]
fn test_reports_repeated_expression() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", REPEATED)?;

    let output = run(test.check_command())?;

    assert_eq!(output.code, Some(1));
    assert!(
        output
            .stdout
            .contains("warning: \"order.items.length\"  repeated-expression")
    );
    assert!(output.stdout.contains("--> ./src/app.ts:2:10"));
    assert!(output.stdout.contains("= also: ./src/app.ts:2:31"));
    assert!(
        output
            .stdout
            .contains("= hint: extract into `const length = order.items.length;`")
    );
    assert!(output.stdout.contains("2 problems (0 errors, 2 warnings)"));

    Ok(())
}

#[test]
fn test_clean_file() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.ts",
        r#"export function total(order) {
  const items = order.items;
  return items.length;
}
"#,
    )?;

    let output = run(test.check_command())?;

    assert_eq!(output.code, Some(0));
    assert!(
        output
            .stdout
            .contains("Checked 1 source file - no repeated expressions found")
    );

    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", REPEATED)?;

    let mut cmd = test.check_command();
    cmd.args(["--format", "json"]);
    let output = run(cmd)?;

    assert_eq!(output.code, Some(1));
    let report: Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(report["filesChecked"], 1);

    let candidates = report["candidates"].as_array().unwrap();
    let texts: BTreeSet<&str> = candidates
        .iter()
        .map(|c| c["canonicalText"].as_str().unwrap())
        .collect();
    assert_eq!(texts, BTreeSet::from(["order.items", "order.items.length"]));
    for candidate in candidates {
        assert_eq!(candidate["file"], "./src/app.ts");
        assert_eq!(candidate["body"]["name"], "total");
        assert_eq!(candidate["body"]["kind"], "function");
        assert_eq!(candidate["occurrences"].as_array().unwrap().len(), 2);
        assert_eq!(candidate["nameIsSafe"], true);
    }

    Ok(())
}

#[test]
fn test_max_line_span() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.js",
        r#"function f(a) {
  log(a.b);



  return a.b;
}
"#,
    )?;

    assert_eq!(run(test.check_command())?.code, Some(1));

    let mut narrow = test.check_command();
    narrow.args(["--max-line-span", "3"]);
    assert_eq!(run(narrow)?.code, Some(0));

    test.write_file(".hoistrc.json", r#"{ "maxLineSpan": 2 }"#)?;
    assert_eq!(run(test.check_command())?.code, Some(0));

    let mut wide = test.check_command();
    wide.args(["--max-line-span", "4"]);
    assert_eq!(run(wide)?.code, Some(1));

    Ok(())
}

#[test]
fn test_negative_max_line_span_is_an_error() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", REPEATED)?;

    let mut cmd = test.check_command();
    cmd.args(["--max-line-span", "-1"]);
    let output = run(cmd)?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("maxLineSpan must not be negative"));

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", REPEATED)?;
    test.write_file(".hoistrc.json", r#"{ "kinds": [] }"#)?;

    let output = run(test.check_command())?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("at least one expression kind"));

    Ok(())
}

#[test]
fn test_config_ignores_and_kinds() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/generated/api.ts", REPEATED)?;
    test.write_file(
        "src/app.js",
        "function f(a) {\n  g(a.b, a.b);\n}\n",
    )?;
    test.write_file(
        ".hoistrc.json",
        r#"{
         "ignores": ["**/generated/**"],
         "kinds": ["call"]
     }"#,
    )?;

    let output = run(test.check_command())?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("Checked 1 source file"));

    Ok(())
}

#[test]
fn test_test_files_are_skipped_by_default() -> Result<()> {
    let test = CliTest::with_file("src/app.test.ts", REPEATED)?;

    let output = run(test.check_command())?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("Checked 0 source files"));

    Ok(())
}

#[test]
fn test_parse_error_is_reported() -> Result<()> {
    let test = CliTest::with_file("src/broken.ts", "export function (\n")?;

    let output = run(test.check_command())?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("parse-error"));
    assert!(output.stdout.contains("--> ./src/broken.ts"));
    assert!(output.stderr.contains("1 file(s) could not be parsed"));

    Ok(())
}

#[test]
fn test_source_root() -> Result<()> {
    let test = CliTest::with_file("packages/web/src/app.ts", REPEATED)?;

    let mut cmd = test.check_command();
    cmd.args(["--source-root", "packages/web"]);
    let output = run(cmd)?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("--> packages/web/src/app.ts:2:10"));

    Ok(())
}

#[test]
fn test_missing_source_root_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.check_command();
    cmd.args(["--source-root", "nope"]);
    let output = run(cmd)?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("Source root is not a directory"));

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.command();
    cmd.arg("--help");
    let output = run(cmd)?;

    assert_eq!(output.code, Some(0));
    for command in ["check", "explain", "init"] {
        assert!(output.stdout.contains(command), "missing {command}");
    }

    Ok(())
}
