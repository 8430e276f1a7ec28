use anyhow::Result;

use crate::{CliTest, run};

const SOURCE: &str = "function f(a) {\n  return a.b() + a.b();\n}\n";

fn explain(test: &CliTest, offset: usize, length: usize) -> Result<crate::Run> {
    let mut cmd = test.command();
    cmd.args(["explain", "src/a.js", "--offset"])
        .arg(offset.to_string())
        .arg("--length")
        .arg(length.to_string());
    run(cmd)
}

#[test]
fn test_hoistable_selection() -> Result<()> {
    let test = CliTest::with_file("src/a.js", SOURCE)?;
    let offset = SOURCE.find("a.b()").unwrap();

    let output = explain(&test, offset, "a.b()".len())?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("`a.b()` can be hoisted into a local variable"));

    Ok(())
}

#[test]
fn test_method_selector_is_rejected() -> Result<()> {
    let test = CliTest::with_file("src/a.js", SOURCE)?;
    let offset = SOURCE.find("a.b()").unwrap();

    let output = explain(&test, offset, "a.b".len())?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("`a.b` cannot be hoisted (src/a.js):"));
    assert!(output.stdout.contains("- is called as a method"));

    Ok(())
}

#[test]
fn test_partial_selection_is_rejected() -> Result<()> {
    let test = CliTest::with_file("src/a.js", SOURCE)?;
    let offset = SOURCE.find("a.b()").unwrap();

    let output = explain(&test, offset, 2)?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("does not match a single node"));

    Ok(())
}

#[test]
fn test_selection_outside_file_is_an_error() -> Result<()> {
    let test = CliTest::with_file("src/a.js", SOURCE)?;

    let output = explain(&test, SOURCE.len(), 10)?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("is outside src/a.js"));

    Ok(())
}

#[test]
fn test_overflowing_selection_is_an_error() -> Result<()> {
    let test = CliTest::with_file("src/a.js", SOURCE)?;

    let output = explain(&test, 1, usize::MAX)?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("is outside src/a.js"));

    Ok(())
}
