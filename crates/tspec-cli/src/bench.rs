//! # Bench Subcommand
//!
//! Times construction of the sample guitars through the interpreted and
//! compiled paths. Each iteration creates every pickup, then every guitar
//! from the created pickups.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tspec_core::{CompiledSpec, Record, TypeSpec, TypeSpecError};

use crate::fixtures::{guitars, Fixtures};

/// Arguments for the bench subcommand.
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Passes over the sample data per path.
    #[arg(long, default_value_t = 5000)]
    pub iterations: u32,

    /// Skip the interpreted path.
    #[arg(long)]
    pub compiled_only: bool,
}

/// Anything that builds a frozen record from loose input.
pub trait RecordFactory {
    /// Build a record from `args`.
    fn create_record(&self, args: &Value) -> Result<Record, TypeSpecError>;
}

impl RecordFactory for TypeSpec {
    fn create_record(&self, args: &Value) -> Result<Record, TypeSpecError> {
        self.create(args)
    }
}

impl RecordFactory for CompiledSpec {
    fn create_record(&self, args: &Value) -> Result<Record, TypeSpecError> {
        self.create(args)
    }
}

/// Timing of one path.
#[derive(Debug, Clone)]
pub struct BenchReport {
    /// Which path was timed.
    pub label: &'static str,
    /// Passes over the sample data.
    pub iterations: u32,
    /// Guitars created in total.
    pub records: usize,
    /// Wall-clock time for all passes.
    pub elapsed: Duration,
}

impl BenchReport {
    /// Guitars created per second.
    pub fn per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return f64::INFINITY;
        }
        self.records as f64 / secs
    }
}

/// Create every guitar in `data`, creating its pickups first.
pub fn init_guitars<P, G>(pickup: &P, guitar: &G, data: &[Value]) -> Result<Vec<Record>, TypeSpecError>
where
    P: RecordFactory + ?Sized,
    G: RecordFactory + ?Sized,
{
    data.iter()
        .map(|entry| {
            let mut args = entry.clone();
            if let Some(pickups) = entry["pickups"].as_array() {
                let created = pickups
                    .iter()
                    .map(|p| pickup.create_record(p).map(Value::from))
                    .collect::<Result<Vec<_>, _>>()?;
                args["pickups"] = Value::Array(created);
            }
            guitar.create_record(&args)
        })
        .collect()
}

/// Run `pass` `iterations` times and time it.
pub fn measure<F>(label: &'static str, iterations: u32, mut pass: F) -> Result<BenchReport, TypeSpecError>
where
    F: FnMut() -> Result<usize, TypeSpecError>,
{
    let start = Instant::now();
    let mut records = 0;
    for _ in 0..iterations {
        records += pass()?;
    }
    Ok(BenchReport {
        label,
        iterations,
        records,
        elapsed: start.elapsed(),
    })
}

/// Execute the bench subcommand.
pub fn run_bench(args: &BenchArgs) -> Result<u8> {
    let fixtures = Fixtures::load().context("failed to define fixture schemas")?;
    let compiled = fixtures.compiled();
    let data = guitars();
    let data = data.as_array().map(Vec::as_slice).unwrap_or_default();
    tracing::info!(iterations = args.iterations, guitars = data.len(), "benchmarking");

    let mut reports = Vec::new();
    if !args.compiled_only {
        reports.push(measure("TypeSpec", args.iterations, || {
            init_guitars(&*fixtures.pickup, &*fixtures.guitar, data).map(|g| g.len())
        })?);
    }
    reports.push(measure("TypeSpecBuild", args.iterations, || {
        init_guitars(&compiled.pickup, &compiled.guitar, data).map(|g| g.len())
    })?);

    for report in &reports {
        println!(
            "  {:<14} {:>8} records in {:>10.3?}  ({:.0} records/s)",
            report.label,
            report.records,
            report.elapsed,
            report.per_second()
        );
    }
    Ok(0)
}
