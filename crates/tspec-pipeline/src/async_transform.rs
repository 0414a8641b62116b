//! # Asynchronous Transforms
//!
//! [`AsyncTransform`] mirrors [`Transform`](crate::transform::Transform)
//! with functions that return a future of their output. The function runs
//! synchronously against a borrowed [`Scope`] and hands back a `'static`
//! future, so anything the future needs from the scope is cloned into it.
//!
//! Asynchronous transforms can only be attached to an
//! [`AsyncOp`](crate::async_op::AsyncOp).

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tspec_core::TypeSpecError;

use crate::sink::{AnyTransform, TransformSink};
use crate::transform::{Binding, MappingConfig, Scope, Target};

/// Future produced by an asynchronous transform function.
pub type TransformFuture = BoxFuture<'static, Result<Value, TypeSpecError>>;

/// Configuration of an asynchronous transform.
pub type AsyncTransformConfig = MappingConfig<TransformFuture>;

/// An asynchronous transform bound to the result or the environment.
#[derive(Clone)]
pub struct AsyncTransform {
    binding: Binding<TransformFuture>,
}

impl AsyncTransform {
    /// Build a transform that writes to the pipeline's result.
    pub fn onto_result(config: AsyncTransformConfig) -> Result<Self, TypeSpecError> {
        Binding::bind(Target::Result, config).map(|binding| Self { binding })
    }

    /// Build a transform that writes to the pipeline's environment.
    pub fn onto_env(config: AsyncTransformConfig) -> Result<Self, TypeSpecError> {
        Binding::bind(Target::Env, config).map(|binding| Self { binding })
    }

    /// Which half of the working pair this transform writes to.
    pub fn target(&self) -> Target {
        self.binding.target()
    }

    /// Properties read, or `None` in whole-record mode.
    pub fn from_props(&self) -> Option<&[String]> {
        self.binding.from_props()
    }

    /// Destination field, or `None` when the output replaces the target.
    pub fn to_prop(&self) -> Option<&str> {
        self.binding.to_prop()
    }

    /// Start computing this transform's output, reading the selection from
    /// `value`.
    pub fn process_value(&self, value: &Value, scope: Scope<'_>) -> TransformFuture {
        self.binding.call(value, scope)
    }

    /// Apply to the result half of the working pair.
    pub async fn process_result(
        &self,
        pair: (Value, Value),
    ) -> Result<(Value, Value), TypeSpecError> {
        let pending = self.process_value(&pair.0, Scope { result: &pair.0, env: &pair.1 });
        let output = pending.await?;
        self.binding.write_result(pair, output)
    }

    /// Apply to the environment half of the working pair.
    pub async fn process_env(
        &self,
        pair: (Value, Value),
    ) -> Result<(Value, Value), TypeSpecError> {
        let pending = self.process_value(&pair.1, Scope { result: &pair.0, env: &pair.1 });
        let output = pending.await?;
        self.binding.write_env(pair, output)
    }

    /// Apply to whichever half this transform targets.
    pub async fn process(&self, pair: (Value, Value)) -> Result<(Value, Value), TypeSpecError> {
        match self.target() {
            Target::Result => self.process_result(pair).await,
            Target::Env => self.process_env(pair).await,
        }
    }

    /// Append this transform to a pipeline stage.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` unless the stage accepts asynchronous transforms.
    pub fn add_to<S: TransformSink + ?Sized>(self, sink: &mut S) -> Result<(), TypeSpecError> {
        sink.attach(AnyTransform::Async(Arc::new(self)))
    }
}

impl fmt::Debug for AsyncTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTransform")
            .field("target", &self.target())
            .field("from", &self.from_props())
            .field("to", &self.to_prop())
            .finish()
    }
}
