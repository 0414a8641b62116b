//! # Type Specifications
//!
//! A [`TypeSpec`] declares a named type as an ordered set of property
//! definitions, optionally inheriting the definitions of one parent type.
//!
//! ## Effective Property Set
//!
//! The properties a type actually enforces are the merge of its ancestors'
//! definitions with its own, ancestor first, where a descendant definition
//! replaces an ancestor definition of the same name in place. The merge is
//! a pure function of the chain ([`TypeSpec::effective_props`]) shared by
//! the interpreted path here and the compiled path in [`crate::build`].
//!
//! ## `check` versus `create`
//!
//! The two are deliberately asymmetric:
//!
//! - [`TypeSpec::check`] answers "is this already a complete, valid
//!   instance?". Every effective property must be present, including those
//!   that have defaults. No defaults are substituted.
//! - [`TypeSpec::create`] answers "build me a complete instance from partial
//!   input". Absent optional properties take their defaults.
//!
//! Callers that expect `check` to tolerate omitted-but-defaulted fields
//! should run the value through `create` first.
//!
//! ## Lifecycle
//!
//! Specs are built with consuming builder calls, then frozen behind an
//! `Arc` with [`TypeSpec::shared`]. A parent must be shared before a child
//! can extend it, so inheritance chains are acyclic by construction.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::build::CompiledSpec;
use crate::error::TypeSpecError;
use crate::predicate::{Constraint, Predicate};
use crate::record::{AsFields, Record};

/// One property of a type: its predicate, and its default if optional.
#[derive(Clone, Debug)]
pub struct PropDefinition {
    type_name: String,
    constraint: Constraint,
    default: Option<Value>,
}

impl PropDefinition {
    /// A definition owned by `type_name`; optional iff `default` is given.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` if `default` fails the constraint.
    pub fn new(
        type_name: &str,
        name: &str,
        constraint: impl Into<Constraint>,
        default: Option<Value>,
    ) -> Result<Self, TypeSpecError> {
        let constraint = constraint.into();
        if let Some(value) = &default {
            if !constraint.admits(value) {
                return Err(TypeSpecError::InvalidValue(format!(
                    "default value for property \"{name}\" of type \"{type_name}\" fails its check"
                )));
            }
        }
        Ok(Self {
            type_name: type_name.to_string(),
            constraint,
            default,
        })
    }

    /// Name of the type that declared this property.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The predicate or nested type values must satisfy.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// A property is required iff it was declared without a default.
    pub fn required(&self) -> bool {
        self.default.is_none()
    }

    /// The default substituted by `create` when the property is absent.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether `value` satisfies this property.
    #[inline]
    pub fn check(&self, value: &Value) -> bool {
        self.constraint.admits(value)
    }
}

/// A named record type with constrained properties.
#[derive(Clone, Debug)]
pub struct TypeSpec {
    type_name: String,
    props: Vec<(String, PropDefinition)>,
    parent: Option<Arc<TypeSpec>>,
}

impl TypeSpec {
    /// Start a new root type.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` if `type_name` is blank.
    pub fn init(type_name: impl Into<String>) -> Result<Self, TypeSpecError> {
        let type_name = type_name.into();
        if type_name.trim().is_empty() {
            return Err(TypeSpecError::invalid_value("Type Name", "a non-empty string"));
        }
        Ok(Self {
            type_name,
            props: Vec::new(),
            parent: None,
        })
    }

    /// Start a new type inheriting every property of `parent`.
    pub fn extend(
        type_name: impl Into<String>,
        parent: &Arc<TypeSpec>,
    ) -> Result<Self, TypeSpecError> {
        let mut spec = Self::init(type_name)?;
        spec.parent = Some(Arc::clone(parent));
        Ok(spec)
    }

    /// Freeze the definition for sharing as a parent, nested type, or
    /// pipeline boundary.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Declare a required property.
    pub fn prop(
        self,
        name: &str,
        constraint: impl Into<Constraint>,
    ) -> Result<Self, TypeSpecError> {
        self.define(name, constraint.into(), None)
    }

    /// Declare an optional property whose absence `create` fills with
    /// `default`.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` if `default` fails the constraint.
    pub fn optional(
        self,
        name: &str,
        constraint: impl Into<Constraint>,
        default: Value,
    ) -> Result<Self, TypeSpecError> {
        self.define(name, constraint.into(), Some(default))
    }

    /// Declare a property fixed to `value`.
    pub fn constant(self, name: &str, value: Value) -> Result<Self, TypeSpecError> {
        let constraint = Predicate::equals(value.clone());
        self.define(name, constraint.into(), Some(value))
    }

    fn define(
        mut self,
        name: &str,
        constraint: Constraint,
        default: Option<Value>,
    ) -> Result<Self, TypeSpecError> {
        if name.trim().is_empty() {
            return Err(TypeSpecError::invalid_value("Property Name", "a non-empty string"));
        }
        if self.props.iter().any(|(own, _)| own == name) {
            return Err(TypeSpecError::redefined_prop(&self.type_name, name));
        }
        let definition = PropDefinition::new(&self.type_name, name, constraint, default)?;
        self.props.push((name.to_string(), definition));
        Ok(self)
    }

    /// Name of the type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The parent type, if any.
    pub fn parent(&self) -> Option<&Arc<TypeSpec>> {
        self.parent.as_ref()
    }

    /// Properties declared on this type only, in declaration order.
    pub fn own_props(&self) -> impl Iterator<Item = (&str, &PropDefinition)> {
        self.props.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// The effective property set: ancestors first, descendants shadowing
    /// same-named ancestor definitions in place.
    pub fn effective_props(&self) -> Vec<(&str, &PropDefinition)> {
        let mut chain: Vec<&TypeSpec> = Vec::new();
        let mut cursor = Some(self);
        while let Some(spec) = cursor {
            chain.push(spec);
            cursor = spec.parent.as_deref();
        }

        let mut merged: Vec<(&str, &PropDefinition)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for spec in chain.into_iter().rev() {
            for (name, def) in &spec.props {
                match slots.get(name.as_str()) {
                    Some(&slot) => merged[slot].1 = def,
                    None => {
                        slots.insert(name.as_str(), merged.len());
                        merged.push((name.as_str(), def));
                    }
                }
            }
        }
        merged
    }

    /// Effective property names in effective order.
    pub fn prop_names(&self) -> Vec<&str> {
        self.effective_props().into_iter().map(|(name, _)| name).collect()
    }

    /// Look up the effective definition of `name`.
    ///
    /// # Errors
    ///
    /// `MISSING_PROPERTY` if neither this type nor an ancestor declares it.
    pub fn prop_definition(&self, name: &str) -> Result<&PropDefinition, TypeSpecError> {
        let mut cursor = Some(self);
        while let Some(spec) = cursor {
            if let Some((_, def)) = spec.props.iter().find(|(own, _)| own == name) {
                return Ok(def);
            }
            cursor = spec.parent.as_deref();
        }
        Err(TypeSpecError::missing_prop(&self.type_name, name))
    }

    /// Return `instance` unchanged if it is a complete, valid instance.
    ///
    /// Every effective property must be present, defaults included.
    ///
    /// # Errors
    ///
    /// - `INVALID_VALUE` if `instance` is not record-shaped.
    /// - `UNSUPPORTED_PROPERTY` for a key the type does not declare.
    /// - `INVALID_PROPERTY_TYPE` for a value failing its predicate.
    /// - `MISSING_PROPERTY` if any effective property is absent.
    pub fn check<'v, R>(&self, instance: &'v R) -> Result<&'v R, TypeSpecError>
    where
        R: AsFields + ?Sized,
    {
        let fields = instance.fields().ok_or_else(|| self.not_a_record("check"))?;
        let effective = self.effective_props();

        for (name, value) in fields {
            let definition = effective
                .iter()
                .find(|(prop, _)| *prop == name.as_str())
                .map(|(_, def)| *def)
                .ok_or_else(|| TypeSpecError::unsupported_prop(&self.type_name, name))?;
            if !definition.check(value) {
                return Err(TypeSpecError::invalid_prop(&self.type_name, name));
            }
        }

        if fields.len() != effective.len() {
            let missing = effective
                .iter()
                .map(|(name, _)| *name)
                .find(|name| !fields.contains_key(*name))
                .unwrap_or_default();
            return Err(TypeSpecError::missing_prop(&self.type_name, missing));
        }

        Ok(instance)
    }

    /// Build a frozen instance from `args`, filling absent optional
    /// properties with their defaults. Keys of `args` the type does not
    /// declare are not copied.
    ///
    /// # Errors
    ///
    /// - `INVALID_VALUE` if `args` is not record-shaped.
    /// - `MISSING_PROPERTY` for an absent required property.
    /// - `INVALID_PROPERTY_TYPE` for a value failing its predicate.
    pub fn create<R>(&self, args: &R) -> Result<Record, TypeSpecError>
    where
        R: AsFields + ?Sized,
    {
        let args = args.fields().ok_or_else(|| self.not_a_record("create"))?;
        let mut fields = Map::new();

        for (name, definition) in self.effective_props() {
            match args.get(name) {
                None => match definition.default_value() {
                    Some(default) => {
                        fields.insert(name.to_string(), default.clone());
                    }
                    None => return Err(TypeSpecError::missing_prop(&self.type_name, name)),
                },
                Some(value) if definition.check(value) => {
                    fields.insert(name.to_string(), value.clone());
                }
                Some(_) => return Err(TypeSpecError::invalid_prop(&self.type_name, name)),
            }
        }

        Ok(Record::from_map(fields))
    }

    /// Build a new frozen instance taking each effective property from
    /// `patch` when present, else from `instance`. Defaults are never
    /// consulted: a property absent from both fails.
    ///
    /// # Errors
    ///
    /// - `INVALID_VALUE` if either argument is not record-shaped.
    /// - `INVALID_PROPERTY_TYPE` for any absent or failing property.
    pub fn update<R, P>(&self, instance: &R, patch: &P) -> Result<Record, TypeSpecError>
    where
        R: AsFields + ?Sized,
        P: AsFields + ?Sized,
    {
        let current = instance.fields().ok_or_else(|| self.not_a_record("update"))?;
        let patch = patch.fields().ok_or_else(|| self.not_a_record("update"))?;
        let mut fields = Map::new();

        for (name, definition) in self.effective_props() {
            match patch.get(name).or_else(|| current.get(name)) {
                Some(value) if definition.check(value) => {
                    fields.insert(name.to_string(), value.clone());
                }
                _ => return Err(TypeSpecError::invalid_prop(&self.type_name, name)),
            }
        }

        Ok(Record::from_map(fields))
    }

    /// `true` iff [`TypeSpec::check`] would succeed. Never fails.
    pub fn is_of<R>(&self, value: &R) -> bool
    where
        R: AsFields + ?Sized,
    {
        self.check(value).is_ok()
    }

    /// Synthesize the compiled equivalent of this type.
    pub fn build(&self) -> CompiledSpec {
        CompiledSpec::from_spec(self)
    }

    fn not_a_record(&self, action: &str) -> TypeSpecError {
        TypeSpecError::not_a_record(&self.type_name, action)
    }
}
