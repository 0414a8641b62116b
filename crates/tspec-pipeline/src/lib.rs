//! # tspec-pipeline: Validated Transformation Pipelines
//!
//! Builds on `tspec-core` to convert a validated input record into a
//! validated output record.
//!
//! ## Components
//!
//! - **Transform** (`transform.rs`, `async_transform.rs`): one rule reading
//!   selected properties, applying a function, and writing the output to
//!   the result or the environment.
//!
//! - **Op** (`op.rs`, `async_op.rs`): an input type, an output type, and an
//!   ordered transform list. `run` checks the input and builds the output
//!   with `create`, so every success conforms to the output type.
//!
//! - **Sink** (`sink.rs`): the capability check deciding which transform
//!   kinds a stage can run.
//!
//! - **Continuation** (`continuation.rs`): a stack-safe step runner with
//!   explicit continue and halt signals.
//!
//! - **Proc** (`process.rs`): a draining queue of operations, sync and
//!   async mixed.
//!
//! ## Concurrency
//!
//! Nothing runs in parallel. Async stages await each step before the next
//! one starts, and there is no cancellation: a run proceeds to completion
//! or to the first error.

pub mod async_op;
pub mod async_transform;
pub mod continuation;
pub mod op;
pub mod process;
pub mod sink;
pub mod transform;

pub use async_op::AsyncOp;
pub use async_transform::{AsyncTransform, AsyncTransformConfig, TransformFuture};
pub use continuation::{trampoline, Bounce, Continuation, Flow};
pub use op::Op;
pub use process::{Proc, Stage};
pub use sink::{AnyTransform, TransformKind, TransformSink};
pub use transform::{MappingConfig, Scope, Selection, Target, Transform, TransformConfig};
