//! # Transforms
//!
//! A [`Transform`] is one rule in an operation's pipeline: it reads the
//! selected source properties (or nothing, in whole-record mode), applies a
//! function, and writes the output either over the whole target or into one
//! named field of it.
//!
//! The target is the pipeline's result or its environment, fixed when the
//! transform is built with [`Transform::onto_result`] or
//! [`Transform::onto_env`]. Sources are read from the same value the
//! transform writes to.
//!
//! ## Configuration
//!
//! [`TransformConfig`] is an explicit record of `from`, `to`, and the
//! function:
//!
//! | Constructor | Reads | Writes |
//! |-------------|-------|--------|
//! | `whole(f)` | `Scope` only | whole target |
//! | `select(from, f)` | listed props | whole target |
//! | `select(from, f).to(p)` | listed props | field `p` |
//! | `map(p, f)` | prop `p` | field `p` |
//! | `rename(a, b, f)` | prop `a` | field `b` |
//!
//! A selection of exactly one property passes that property's value; a
//! longer selection passes an array of values in selection order. A
//! selected property that is absent reads as `null`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tspec_core::TypeSpecError;

use crate::sink::{AnyTransform, TransformSink};

/// What a transform function sees of the pipeline besides its selection.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// The working result.
    pub result: &'a Value,
    /// The working environment.
    pub env: &'a Value,
}

/// Which half of the working pair a transform writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The value that becomes the operation's output.
    Result,
    /// The side channel threaded alongside the result.
    Env,
}

/// Property names a transform reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(Vec<String>);

impl Selection {
    /// Selected names in order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub(crate) fn validate(&self) -> Result<(), TypeSpecError> {
        if self.0.is_empty() || self.0.iter().any(|name| name.trim().is_empty()) {
            return Err(TypeSpecError::invalid_value(
                "Properties to map from",
                "a non-empty list of non-empty strings",
            ));
        }
        Ok(())
    }

    /// Read the selection out of `value`. One name yields its value, many
    /// yield an array.
    pub(crate) fn read(&self, value: &Value) -> Value {
        let lookup = |name: &String| value.get(name).cloned().unwrap_or(Value::Null);
        match self.0.as_slice() {
            [single] => lookup(single),
            names => Value::Array(names.iter().map(lookup).collect()),
        }
    }
}

impl From<&str> for Selection {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for Selection {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for Selection {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for Selection {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Selection {
    fn from(names: [&str; N]) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

type WholeFn<O> = Arc<dyn Fn(Scope<'_>) -> O + Send + Sync>;
type SelectFn<O> = Arc<dyn Fn(Value, Scope<'_>) -> O + Send + Sync>;

enum Mapping<O> {
    Whole(WholeFn<O>),
    Select { from: Selection, func: SelectFn<O> },
}

impl<O> Clone for Mapping<O> {
    fn clone(&self) -> Self {
        match self {
            Self::Whole(func) => Self::Whole(Arc::clone(func)),
            Self::Select { from, func } => Self::Select {
                from: from.clone(),
                func: Arc::clone(func),
            },
        }
    }
}

/// Configuration of a transform whose function produces `O`.
///
/// Synchronous transforms use [`TransformConfig`], asynchronous ones
/// [`AsyncTransformConfig`](crate::async_transform::AsyncTransformConfig).
pub struct MappingConfig<O> {
    mapping: Mapping<O>,
    to: Option<String>,
}

/// Configuration of a synchronous transform.
pub type TransformConfig = MappingConfig<Result<Value, TypeSpecError>>;

impl<O> Clone for MappingConfig<O> {
    fn clone(&self) -> Self {
        Self {
            mapping: self.mapping.clone(),
            to: self.to.clone(),
        }
    }
}

impl<O> MappingConfig<O> {
    /// Compute a value from the whole working pair.
    pub fn whole<F>(func: F) -> Self
    where
        F: Fn(Scope<'_>) -> O + Send + Sync + 'static,
    {
        Self {
            mapping: Mapping::Whole(Arc::new(func)),
            to: None,
        }
    }

    /// Compute a value from the selected properties of the target.
    pub fn select<F>(from: impl Into<Selection>, func: F) -> Self
    where
        F: Fn(Value, Scope<'_>) -> O + Send + Sync + 'static,
    {
        Self {
            mapping: Mapping::Select {
                from: from.into(),
                func: Arc::new(func),
            },
            to: None,
        }
    }

    /// Rewrite one property in place.
    pub fn map<F>(prop: &str, func: F) -> Self
    where
        F: Fn(Value, Scope<'_>) -> O + Send + Sync + 'static,
    {
        Self::select(prop, func).to(prop)
    }

    /// Compute property `to` from property `from`.
    pub fn rename<F>(from: &str, to: &str, func: F) -> Self
    where
        F: Fn(Value, Scope<'_>) -> O + Send + Sync + 'static,
    {
        Self::select(from, func).to(to)
    }

    /// Write the output into field `prop` instead of replacing the target.
    pub fn to(mut self, prop: &str) -> Self {
        self.to = Some(prop.to_string());
        self
    }
}

/// A validated config fixed to one half of the working pair.
pub(crate) struct Binding<O> {
    target: Target,
    mapping: Mapping<O>,
    to: Option<String>,
}

impl<O> Clone for Binding<O> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            mapping: self.mapping.clone(),
            to: self.to.clone(),
        }
    }
}

impl<O> Binding<O> {
    pub(crate) fn bind(target: Target, config: MappingConfig<O>) -> Result<Self, TypeSpecError> {
        if let Mapping::Select { from, .. } = &config.mapping {
            from.validate()?;
        }
        if let Some(prop) = config.to.as_deref() {
            if prop.trim().is_empty() {
                return Err(TypeSpecError::invalid_value(
                    "Property to map to",
                    "a non-empty string",
                ));
            }
        }
        Ok(Self {
            target,
            mapping: config.mapping,
            to: config.to,
        })
    }

    pub(crate) fn target(&self) -> Target {
        self.target
    }

    pub(crate) fn from_props(&self) -> Option<&[String]> {
        match &self.mapping {
            Mapping::Whole(_) => None,
            Mapping::Select { from, .. } => Some(from.names()),
        }
    }

    pub(crate) fn to_prop(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// Call the function, reading the selection from `value`.
    pub(crate) fn call(&self, value: &Value, scope: Scope<'_>) -> O {
        match &self.mapping {
            Mapping::Whole(func) => func(scope),
            Mapping::Select { from, func } => func(from.read(value), scope),
        }
    }

    /// Store `output` in the result half of `pair`.
    pub(crate) fn write_result(
        &self,
        pair: (Value, Value),
        output: Value,
    ) -> Result<(Value, Value), TypeSpecError> {
        let (result, env) = pair;
        Ok((write(result, self.to_prop(), output, "Result")?, env))
    }

    /// Store `output` in the environment half of `pair`.
    pub(crate) fn write_env(
        &self,
        pair: (Value, Value),
        output: Value,
    ) -> Result<(Value, Value), TypeSpecError> {
        let (result, env) = pair;
        Ok((result, write(env, self.to_prop(), output, "Environment")?))
    }
}

/// A synchronous transform bound to the result or the environment.
#[derive(Clone)]
pub struct Transform {
    binding: Binding<Result<Value, TypeSpecError>>,
}

impl Transform {
    /// Build a transform that writes to the pipeline's result.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` if the selection is empty or names a blank property,
    /// or if the destination property is blank.
    pub fn onto_result(config: TransformConfig) -> Result<Self, TypeSpecError> {
        Binding::bind(Target::Result, config).map(|binding| Self { binding })
    }

    /// Build a transform that writes to the pipeline's environment.
    pub fn onto_env(config: TransformConfig) -> Result<Self, TypeSpecError> {
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

    /// Compute this transform's output, reading the selection from `value`.
    pub fn process_value(&self, value: &Value, scope: Scope<'_>) -> Result<Value, TypeSpecError> {
        self.binding.call(value, scope)
    }

    /// Apply to the result half of the working pair.
    pub fn process_result(&self, pair: (Value, Value)) -> Result<(Value, Value), TypeSpecError> {
        let output = self.process_value(&pair.0, Scope { result: &pair.0, env: &pair.1 })?;
        self.binding.write_result(pair, output)
    }

    /// Apply to the environment half of the working pair.
    pub fn process_env(&self, pair: (Value, Value)) -> Result<(Value, Value), TypeSpecError> {
        let output = self.process_value(&pair.1, Scope { result: &pair.0, env: &pair.1 })?;
        self.binding.write_env(pair, output)
    }

    /// Apply to whichever half this transform targets.
    pub fn process(&self, pair: (Value, Value)) -> Result<(Value, Value), TypeSpecError> {
        match self.target() {
            Target::Result => self.process_result(pair),
            Target::Env => self.process_env(pair),
        }
    }

    /// Append this transform to a pipeline stage.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` if the stage does not accept synchronous transforms.
    pub fn add_to<S: TransformSink + ?Sized>(self, sink: &mut S) -> Result<(), TypeSpecError> {
        sink.attach(AnyTransform::Sync(Arc::new(self)))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("target", &self.target())
            .field("from", &self.from_props())
            .field("to", &self.to_prop())
            .finish()
    }
}

/// Replace `target` with `output`, or store `output` in its field `to`.
fn write(
    mut target: Value,
    to: Option<&str>,
    output: Value,
    label: &str,
) -> Result<Value, TypeSpecError> {
    let Some(prop) = to else {
        return Ok(output);
    };
    let fields = target
        .as_object_mut()
        .ok_or_else(|| TypeSpecError::invalid_value(label, "an object to write a named property"))?;
    fields.insert(prop.to_string(), output);
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tspec_core::ErrorCode;
    use serde_json::json;

    fn pair() -> (Value, Value) {
        (json!({"a": 1, "b": 2}), json!({"scale": 10}))
    }

    #[test]
    fn map_rewrites_in_place() {
        let t = Transform::onto_result(TransformConfig::map("a", |v, _| {
            Ok(json!(v.as_i64().unwrap_or(0) + 1))
        }))
        .unwrap();
        let (result, env) = t.process(pair()).unwrap();
        assert_eq!(result, json!({"a": 2, "b": 2}));
        assert_eq!(env, json!({"scale": 10}));
    }

    #[test]
    fn single_selection_passes_scalar() {
        let t = Transform::onto_result(TransformConfig::rename("a", "c", |v, _| {
            assert!(v.is_number());
            Ok(v)
        }))
        .unwrap();
        let (result, _) = t.process(pair()).unwrap();
        assert_eq!(result, json!({"a": 1, "b": 2, "c": 1}));
    }

    #[test]
    fn multi_selection_passes_array_in_order() {
        let t = Transform::onto_result(
            TransformConfig::select(["b", "a", "missing"], |v, _| Ok(v)).to("all"),
        )
        .unwrap();
        let (result, _) = t.process(pair()).unwrap();
        assert_eq!(result["all"], json!([2, 1, null]));
    }

    #[test]
    fn select_without_destination_replaces_target() {
        let t = Transform::onto_result(TransformConfig::select(["a", "b"], |v, _| {
            Ok(json!({"sum": v[0].as_i64().unwrap_or(0) + v[1].as_i64().unwrap_or(0)}))
        }))
        .unwrap();
        let (result, _) = t.process(pair()).unwrap();
        assert_eq!(result, json!({"sum": 3}));
    }

    #[test]
    fn whole_sees_result_and_env() {
        let t = Transform::onto_result(TransformConfig::whole(|scope| {
            let scale = scope.env["scale"].as_i64().unwrap_or(1);
            Ok(json!({"a": scope.result["a"].as_i64().unwrap_or(0) * scale}))
        }))
        .unwrap();
        assert_eq!(t.from_props(), None);
        assert_eq!(t.process(pair()).unwrap().0, json!({"a": 10}));
    }

    #[test]
    fn onto_env_reads_and_writes_env() {
        let t = Transform::onto_env(TransformConfig::map("scale", |v, scope| {
            Ok(json!(v.as_i64().unwrap_or(0) + scope.result["b"].as_i64().unwrap_or(0)))
        }))
        .unwrap();
        assert_eq!(t.target(), Target::Env);
        let (result, env) = t.process(pair()).unwrap();
        assert_eq!(result, json!({"a": 1, "b": 2}));
        assert_eq!(env, json!({"scale": 12}));
    }

    #[test]
    fn named_write_into_non_object_fails() {
        let t = Transform::onto_env(TransformConfig::whole(|_| Ok(json!(1))).to("x")).unwrap();
        let err = t.process((json!({}), json!("not an object"))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidValue);
    }

    #[test]
    fn function_errors_propagate_unchanged() {
        let t = Transform::onto_result(TransformConfig::map("a", |_, _| {
            Err(TypeSpecError::unknown("boom"))
        }))
        .unwrap();
        assert_eq!(t.process(pair()).unwrap_err(), TypeSpecError::unknown("boom"));
    }

    #[test]
    fn config_is_validated() {
        let empty: Vec<&str> = Vec::new();
        let err = Transform::onto_result(TransformConfig::select(empty, |v, _| Ok(v))).err();
        assert_eq!(err.map(|e| e.code()), Some(ErrorCode::InvalidValue));

        let err = Transform::onto_result(TransformConfig::map("", |v, _| Ok(v))).err();
        assert_eq!(err.map(|e| e.code()), Some(ErrorCode::InvalidValue));

        let err = Transform::onto_result(TransformConfig::whole(|_| Ok(json!({}))).to(" ")).err();
        assert_eq!(err.map(|e| e.code()), Some(ErrorCode::InvalidValue));
    }
}
