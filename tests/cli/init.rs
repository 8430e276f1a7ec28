use anyhow::Result;
use insta::assert_snapshot;

use crate::{CliTest, run};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.command();
    cmd.arg("init");
    let output = run(cmd)?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("Created .hoistrc.json"));
    assert_snapshot!(test.read_file(".hoistrc.json")?, @r#"
    {
      "ignores": [
        "**/node_modules/**",
        "**/dist/**",
        "**/*.min.js"
      ],
      "includes": [],
      "ignoreTestFiles": true,
      "maxLineSpan": 10,
      "kinds": [
        "call",
        "fieldAccess",
        "qualifiedName",
        "indexAccess"
      ]
    }
    "#);

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".hoistrc.json", "{}")?;

    let mut cmd = test.command();
    cmd.arg("init");
    let output = run(cmd)?;

    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains(".hoistrc.json already exists"));
    assert_eq!(test.read_file(".hoistrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    let mut init = test.command();
    init.arg("init");
    run(init)?;

    test.write_file(
        "src/app.ts",
        "export function App(props) {\n  return props.title;\n}\n",
    )?;

    let output = run(test.check_command())?;
    assert_eq!(
        output.code,
        Some(0),
        "Check command should work with initialized config. stderr: {}",
        output.stderr
    );

    Ok(())
}
