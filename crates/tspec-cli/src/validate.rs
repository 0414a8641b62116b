//! # Validate Subcommand
//!
//! Builds every record in a JSON or YAML file with the selected fixture
//! type and reports one line per record.
//!
//! ```bash
//! tspec validate guitars.json
//! tspec validate pickups.yaml --type pickup --compiled
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::Value;
use tspec_core::{Record, TypeSpecError};

use crate::fixtures::Fixtures;

/// Fixture type a file is validated against.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureType {
    /// A guitar with nested pickups.
    Guitar,
    /// A single pickup.
    Pickup,
}

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON or YAML file holding one record or an array of records.
    pub path: PathBuf,

    /// Fixture type to validate against.
    #[arg(long = "type", value_enum, default_value_t = FixtureType::Guitar)]
    pub fixture: FixtureType,

    /// Validate with the compiled spec instead of the interpreted one.
    #[arg(long)]
    pub compiled: bool,
}

/// Execute the validate subcommand. Returns exit code 1 if any record fails.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let records = load_records(&args.path)?;
    let fixtures = Fixtures::load().context("failed to define fixture schemas")?;
    tracing::info!(
        path = %args.path.display(),
        records = records.len(),
        compiled = args.compiled,
        "validating"
    );

    let outcomes = create_all(&fixtures, args.fixture, args.compiled, &records);
    let mut failures = 0usize;
    for (index, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok(_) => println!("  OK    [{index}]"),
            Err(e) => {
                failures += 1;
                println!("  FAIL  [{index}] {}: {e}", e.code());
            }
        }
    }

    println!();
    println!("{} passed, {failures} failed", outcomes.len() - failures);
    Ok(if failures > 0 { 1 } else { 0 })
}

/// Build every record with the selected schema.
pub fn create_all(
    fixtures: &Fixtures,
    fixture: FixtureType,
    compiled: bool,
    records: &[Value],
) -> Vec<Result<Record, TypeSpecError>> {
    let spec = match fixture {
        FixtureType::Guitar => &fixtures.guitar,
        FixtureType::Pickup => &fixtures.pickup,
    };
    if compiled {
        let spec = spec.build();
        records.iter().map(|record| spec.create(record)).collect()
    } else {
        records.iter().map(|record| spec.create(record)).collect()
    }
}

/// Read a record file. Files ending in `.yaml` or `.yml` are parsed as
/// YAML, everything else as JSON. A top-level array is a list of records.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let value: Value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML: {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))?
    };

    Ok(match value {
        Value::Array(records) => records,
        record => vec![record],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::guitars;
    use serde_json::json;
    use tspec_core::ErrorCode;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_json_array_and_single_record() {
        let dir = tempfile::tempdir().unwrap();
        let many = write(&dir, "many.json", &guitars().to_string());
        assert_eq!(load_records(&many).unwrap().len(), 3);

        let one = write(&dir, "one.json", &guitars()[0].to_string());
        assert_eq!(load_records(&one).unwrap(), vec![guitars()[0].clone()]);
    }

    #[test]
    fn loads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "pickup.yml",
            "position: bridge\nmake: Seymour Duncan\nmodel: SH-4\ncolor: Black\n\
             coil: humbucker\nmagnet: alnico-5\ncircuit: passive\n",
        );
        let records = load_records(&path).unwrap();
        assert_eq!(records[0]["model"], json!("SH-4"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.json", "{not json");
        assert!(load_records(&path).is_err());
        assert!(load_records(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn interpreted_and_compiled_agree() {
        let fixtures = Fixtures::load().unwrap();
        let mut records = guitars().as_array().unwrap().clone();
        records.push(json!({"make": "Gibson"}));
        records.push(json!("not a guitar"));

        let interpreted = create_all(&fixtures, FixtureType::Guitar, false, &records);
        let compiled = create_all(&fixtures, FixtureType::Guitar, true, &records);
        assert_eq!(interpreted, compiled);
        assert!(interpreted[..3].iter().all(Result::is_ok));
        assert_eq!(interpreted[3].as_ref().unwrap_err().code(), ErrorCode::MissingProperty);
        assert_eq!(interpreted[4].as_ref().unwrap_err().code(), ErrorCode::InvalidValue);
    }

    #[test]
    fn run_validate_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(&dir, "good.json", &guitars().to_string());
        let args = ValidateArgs {
            path: good,
            fixture: FixtureType::Guitar,
            compiled: true,
        };
        assert_eq!(run_validate(&args).unwrap(), 0);

        let bad = write(&dir, "bad.json", r#"[{"make": "Gibson"}]"#);
        let args = ValidateArgs {
            path: bad,
            fixture: FixtureType::Pickup,
            compiled: false,
        };
        assert_eq!(run_validate(&args).unwrap(), 1);
    }
}
