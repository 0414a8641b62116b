//! # tspec CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tspec_cli::bench::{run_bench, BenchArgs};
use tspec_cli::summary::{run_summary, SummaryArgs};
use tspec_cli::validate::{run_validate, ValidateArgs};

/// Runtime type specifications for JSON records.
#[derive(Parser, Debug)]
#[command(name = "tspec", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build every record in a file with a fixture type.
    Validate(ValidateArgs),

    /// Time the interpreted and compiled construction paths.
    Bench(BenchArgs),

    /// Summarize guitars through the summary operation.
    Summary(SummaryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Bench(args) => run_bench(&args),
        Commands::Summary(args) => run_summary(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tspec_cli::validate::FixtureType;

    #[test]
    fn cli_parse_validate_defaults() {
        let cli = Cli::try_parse_from(["tspec", "validate", "guitars.json"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("guitars.json"));
            assert_eq!(args.fixture, FixtureType::Guitar);
            assert!(!args.compiled);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_pickup_compiled() {
        let cli = Cli::try_parse_from([
            "tspec",
            "validate",
            "pickups.yaml",
            "--type",
            "pickup",
            "--compiled",
        ])
        .unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.fixture, FixtureType::Pickup);
            assert!(args.compiled);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_requires_path() {
        assert!(Cli::try_parse_from(["tspec", "validate"]).is_err());
    }

    #[test]
    fn cli_parse_validate_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["tspec", "validate", "x.json", "--type", "bass"]).is_err());
    }

    #[test]
    fn cli_parse_bench_defaults() {
        let cli = Cli::try_parse_from(["tspec", "bench"]).unwrap();
        if let Commands::Bench(args) = cli.command {
            assert_eq!(args.iterations, 5000);
            assert!(!args.compiled_only);
        } else {
            panic!("expected bench");
        }
    }

    #[test]
    fn cli_parse_bench_flags() {
        let cli =
            Cli::try_parse_from(["tspec", "bench", "--iterations", "10", "--compiled-only"]).unwrap();
        if let Commands::Bench(args) = cli.command {
            assert_eq!(args.iterations, 10);
            assert!(args.compiled_only);
        } else {
            panic!("expected bench");
        }
    }

    #[test]
    fn cli_parse_summary_optional_path() {
        let cli = Cli::try_parse_from(["tspec", "summary"]).unwrap();
        assert!(matches!(cli.command, Commands::Summary(SummaryArgs { path: None })));
    }

    #[test]
    fn cli_parse_verbosity() {
        let cli = Cli::try_parse_from(["tspec", "-vv", "summary"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["tspec", "bench", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }
}
