//! # Operations
//!
//! An [`Op`] is a validated transformation from one type to another. `run`
//! checks the input against the input type, folds the transform list over a
//! private working pair of `(result, env)`, and builds the output with the
//! output type's `create`. Nothing unvalidated crosses either boundary.
//!
//! ## Working Copy
//!
//! The working pair starts as owned copies of the caller's input and
//! environment. Transforms consume and return the pair by value, so no
//! transform can observe or mutate the caller's values, and concurrent runs
//! of one `Op` never share working state.
//!
//! ## Shared Transforms
//!
//! Transforms are held as `Arc` handles. [`Op::compose`] copies handles, not
//! transforms, so a composed pipeline refers to the very same transforms as
//! its sources. Transforms are immutable once built, so the sharing is only
//! observable through identity.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};
use tspec_core::{Record, TypeSpec, TypeSpecError};

use crate::sink::{unsupported_kind, AnyTransform, TransformKind, TransformSink};
use crate::transform::{Transform, TransformConfig};

/// A synchronous, validated transformation between two types.
#[derive(Debug, Clone)]
pub struct Op {
    input_type: Arc<TypeSpec>,
    output_type: Arc<TypeSpec>,
    transforms: Vec<Arc<Transform>>,
}

impl Op {
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
    pub fn transforms(&self) -> &[Arc<Transform>] {
        &self.transforms
    }

    /// Append a transform writing to the result.
    pub fn onto_result(mut self, config: TransformConfig) -> Result<Self, TypeSpecError> {
        Transform::onto_result(config)?.add_to(&mut self)?;
        Ok(self)
    }

    /// Append a transform writing to the environment.
    pub fn onto_env(mut self, config: TransformConfig) -> Result<Self, TypeSpecError> {
        Transform::onto_env(config)?.add_to(&mut self)?;
        Ok(self)
    }

    /// Alias of [`Op::onto_result`].
    pub fn left(self, config: TransformConfig) -> Result<Self, TypeSpecError> {
        self.onto_result(config)
    }

    /// Alias of [`Op::onto_env`].
    pub fn right(self, config: TransformConfig) -> Result<Self, TypeSpecError> {
        self.onto_env(config)
    }

    /// Validate `input`, apply every transform, and build the output.
    ///
    /// A missing `env` starts as an empty object.
    ///
    /// # Errors
    ///
    /// Input validation failures, transform errors, and output construction
    /// failures, each propagated unchanged.
    pub fn run(&self, input: &Value, env: Option<&Value>) -> Result<Record, TypeSpecError> {
        debug!(
            input_type = self.input_type.type_name(),
            output_type = self.output_type.type_name(),
            transforms = self.transforms.len(),
            "running operation"
        );
        self.input_type.check(input)?;

        let mut pair = (input.clone(), working_env(env));
        for (step, transform) in self.transforms.iter().enumerate() {
            trace!(step, side = ?transform.target(), "applying transform");
            pair = transform.process(pair)?;
        }

        self.output_type.create(&pair.0)
    }

    /// A new operation applying this operation's transforms, then `other`'s.
    ///
    /// The result keeps both of this operation's types; `other`'s types are
    /// ignored. Transform handles are shared with both sources.
    pub fn compose(&self, other: &Op) -> Op {
        Op {
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

impl TransformSink for Op {
    fn stage_name(&self) -> &'static str {
        "Op"
    }

    fn accepts(&self, kind: TransformKind) -> bool {
        kind == TransformKind::Sync
    }

    fn push_transform(&mut self, transform: AnyTransform) -> Result<(), TypeSpecError> {
        match transform {
            AnyTransform::Sync(transform) => {
                self.transforms.push(transform);
                Ok(())
            }
            AnyTransform::Async(_) => {
                Err(unsupported_kind(self.stage_name(), TransformKind::Async))
            }
        }
    }
}

pub(crate) fn working_env(env: Option<&Value>) -> Value {
    env.cloned().unwrap_or_else(|| Value::Object(Map::new()))
}
