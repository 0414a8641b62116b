//! # Summary Subcommand
//!
//! Runs the `Guitar` to `GuitarSummary` operation over the sample guitars,
//! or over the guitars in a file, and prints each summary as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::fixtures::{guitars, Fixtures};
use crate::validate::load_records;

/// Arguments for the summary subcommand.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// JSON or YAML file of guitars. Defaults to the built-in samples.
    pub path: Option<PathBuf>,
}

/// Execute the summary subcommand. Returns exit code 1 if any guitar fails.
pub fn run_summary(args: &SummaryArgs) -> Result<u8> {
    let fixtures = Fixtures::load().context("failed to define fixture schemas")?;
    let op = fixtures
        .summary_op()
        .context("failed to build summary operation")?;
    let records = match &args.path {
        Some(path) => load_records(path)?,
        None => guitars().as_array().cloned().unwrap_or_default(),
    };

    let mut failed = false;
    for (index, record) in records.iter().enumerate() {
        match op.run(record, None) {
            Ok(summary) => println!("{}", serde_json::to_string(&summary)?),
            Err(e) => {
                failed = true;
                tracing::error!(index, code = %e.code(), "{e}");
            }
        }
    }
    Ok(u8::from(failed))
}
