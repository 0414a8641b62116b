#![deny(missing_docs)]

//! # tspec-core: Runtime Type Specifications
//!
//! This crate defines named record types as sets of constrained properties
//! and validates, constructs, and updates JSON records against them. It is
//! the leaf of the workspace: the pipeline crate and the CLI build on it.
//!
//! ## Key Design Principles
//!
//! 1. **One error taxonomy.** Every failure is a [`TypeSpecError`] carrying
//!    a closed [`ErrorCode`]. Only `is_of` turns failures into `false`.
//!
//! 2. **Inheritance is an ordered merge.** A type's effective properties are
//!    its ancestors' definitions followed by its own, with descendants
//!    shadowing in place. See [`TypeSpec::effective_props`].
//!
//! 3. **Frozen output.** `create` and `update` return a [`Record`], which
//!    never exposes its fields mutably.
//!
//! 4. **Two paths, one contract.** [`CompiledSpec`] flattens a type once and
//!    checks through pre-bound closures, returning exactly what the
//!    interpreted [`TypeSpec`] returns.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tspec-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod build;
pub mod error;
pub mod predicate;
pub mod record;
pub mod spec;

// Re-export primary types for ergonomic imports.
pub use build::CompiledSpec;
pub use error::{ErrorCode, TypeSpecError};
pub use predicate::{is_equal, Choice, Constraint, Predicate};
pub use record::{AsFields, Record};
pub use spec::{PropDefinition, TypeSpec};
