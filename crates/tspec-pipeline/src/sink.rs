//! # Transform Sinks
//!
//! Pipeline stages differ in what they can run. A synchronous [`Op`] folds
//! its transforms in a plain loop and cannot wait on a future, so it accepts
//! only synchronous transforms. An [`AsyncOp`] awaits between steps and
//! accepts both kinds.
//!
//! Stages declare this through [`TransformSink::accepts`]. Attaching or
//! pushing a transform of an unsupported kind fails with `INVALID_VALUE`
//! and leaves the stage unchanged.
//!
//! [`Op`]: crate::op::Op
//! [`AsyncOp`]: crate::async_op::AsyncOp

use std::fmt;
use std::sync::Arc;

use tspec_core::TypeSpecError;

use crate::async_transform::AsyncTransform;
use crate::transform::Transform;

/// The execution model of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// Produces its output immediately.
    Sync,
    /// Produces a future of its output.
    Async,
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("synchronous"),
            Self::Async => f.write_str("asynchronous"),
        }
    }
}

/// A shared transform of either kind.
///
/// Composed pipelines hold clones of these handles, so a transform appears
/// by identity in every pipeline it was composed into.
#[derive(Debug, Clone)]
pub enum AnyTransform {
    /// A synchronous transform.
    Sync(Arc<Transform>),
    /// An asynchronous transform.
    Async(Arc<AsyncTransform>),
}

impl AnyTransform {
    /// The execution model of the wrapped transform.
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Sync(_) => TransformKind::Sync,
            Self::Async(_) => TransformKind::Async,
        }
    }

    /// Whether both handles point at the same transform.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sync(a), Self::Sync(b)) => Arc::ptr_eq(a, b),
            (Self::Async(a), Self::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A pipeline stage that transforms can be appended to.
pub trait TransformSink {
    /// Human-readable stage name used in errors.
    fn stage_name(&self) -> &'static str;

    /// Whether this stage can run transforms of `kind`.
    fn accepts(&self, kind: TransformKind) -> bool;

    /// Append a transform.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` if the stage cannot run the transform's kind.
    fn push_transform(&mut self, transform: AnyTransform) -> Result<(), TypeSpecError>;

    /// Append `transform` if this stage can run it.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` if the stage does not accept the transform's kind.
    fn attach(&mut self, transform: AnyTransform) -> Result<(), TypeSpecError> {
        let kind = transform.kind();
        if !self.accepts(kind) {
            return Err(unsupported_kind(self.stage_name(), kind));
        }
        self.push_transform(transform)
    }
}

pub(crate) fn unsupported_kind(stage: &str, kind: TransformKind) -> TypeSpecError {
    TypeSpecError::InvalidValue(format!("{stage} cannot run {kind} transforms"))
}
