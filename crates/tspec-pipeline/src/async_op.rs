//! # Asynchronous Operations
//!
//! [`AsyncOp`] has the same boundaries as [`Op`]: input checked against the
//! input type, output built with the output type. Between them it folds a
//! mix of synchronous and asynchronous transforms, awaiting each one before
//! the next starts. Steps never overlap.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};
use tspec_core::{Record, TypeSpec, TypeSpecError};

use crate::async_transform::{AsyncTransform, AsyncTransformConfig};
use crate::op::{working_env, Op};
use crate::sink::{AnyTransform, TransformKind, TransformSink};

/// An asynchronous, validated transformation between two types.
#[derive(Debug, Clone)]
pub struct AsyncOp {
    input_type: Arc<TypeSpec>,
    output_type: Arc<TypeSpec>,
    transforms: Vec<AnyTransform>,
}

impl AsyncOp {
    /// An operation with no transforms.
    pub fn init(input_type: Arc<TypeSpec>, output_type: Arc<TypeSpec>) -> Self {
        Self {
            input_type,
            output_type,
            transforms: Vec::new(),
        }
    }

    /// Type every input must satisfy.
    pub fn input_type(&self) -> &Arc<TypeSpec> {
        &self.input_type
    }

    /// Type every output is built with.
    pub fn output_type(&self) -> &Arc<TypeSpec> {
        &self.output_type
    }

    /// Transforms in application order.
    pub fn transforms(&self) -> &[AnyTransform] {
        &self.transforms
    }

    /// Append an asynchronous transform writing to the result.
    pub fn onto_result(mut self, config: AsyncTransformConfig) -> Result<Self, TypeSpecError> {
        AsyncTransform::onto_result(config)?.add_to(&mut self)?;
        Ok(self)
    }

    /// Append an asynchronous transform writing to the environment.
    pub fn onto_env(mut self, config: AsyncTransformConfig) -> Result<Self, TypeSpecError> {
        AsyncTransform::onto_env(config)?.add_to(&mut self)?;
        Ok(self)
    }

    /// Alias of [`AsyncOp::onto_result`].
    pub fn left(self, config: AsyncTransformConfig) -> Result<Self, TypeSpecError> {
        self.onto_result(config)
    }

    /// Alias of [`AsyncOp::onto_env`].
    pub fn right(self, config: AsyncTransformConfig) -> Result<Self, TypeSpecError> {
        self.onto_env(config)
    }

    /// Validate `input`, apply every transform in sequence, and build the
    /// output.
    pub async fn run(&self, input: &Value, env: Option<&Value>) -> Result<Record, TypeSpecError> {
        debug!(
            input_type = self.input_type.type_name(),
            output_type = self.output_type.type_name(),
            transforms = self.transforms.len(),
            "running async operation"
        );
        self.input_type.check(input)?;

        let mut pair = (input.clone(), working_env(env));
        for (step, transform) in self.transforms.iter().enumerate() {
            trace!(step, kind = %transform.kind(), "applying transform");
            pair = match transform {
                AnyTransform::Sync(t) => t.process(pair)?,
                AnyTransform::Async(t) => t.process(pair).await?,
            };
        }

        self.output_type.create(&pair.0)
    }

    /// Await `input`, then [`AsyncOp::run`] it.
    pub async fn run_pending<F>(&self, input: F, env: Option<Value>) -> Result<Record, TypeSpecError>
    where
        F: Future<Output = Value>,
    {
        let input = input.await;
        self.run(&input, env.as_ref()).await
    }

    /// A new operation applying this operation's transforms, then `other`'s.
    ///
    /// The result keeps both of this operation's types; `other`'s types are
    /// ignored. Transform handles are shared with both sources.
    pub fn compose(&self, other: &AsyncOp) -> AsyncOp {
        AsyncOp {
            input_type: Arc::clone(&self.input_type),
            output_type: Arc::clone(&self.output_type),
            transforms: self
                .transforms
                .iter()
                .chain(other.transforms.iter())
                .cloned()
                .collect(),
        }
    }
}

impl From<&Op> for AsyncOp {
    fn from(op: &Op) -> Self {
        Self {
            input_type: Arc::clone(op.input_type()),
            output_type: Arc::clone(op.output_type()),
            transforms: op
                .transforms()
                .iter()
                .cloned()
                .map(AnyTransform::Sync)
                .collect(),
        }
    }
}

impl TransformSink for AsyncOp {
    fn stage_name(&self) -> &'static str {
        "AsyncOp"
    }

    fn accepts(&self, _kind: TransformKind) -> bool {
        true
    }

    fn push_transform(&mut self, transform: AnyTransform) -> Result<(), TypeSpecError> {
        self.transforms.push(transform);
        Ok(())
    }
}
