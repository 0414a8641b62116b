//! # tspec-cli: Command-Line Front End
//!
//! Provides the `tspec` binary: validation of record files against the
//! guitar fixtures, a benchmark of the interpreted and compiled paths, and a
//! pipeline demonstration.
//!
//! ## Subcommands
//!
//! - `tspec validate`: build every record in a JSON or YAML file.
//! - `tspec bench`: time guitar construction on both paths.
//! - `tspec summary`: run the guitar summary operation.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live here.
//! - Handlers return an exit code and leave schema logic to the core crates.

pub mod bench;
pub mod fixtures;
pub mod summary;
pub mod validate;
