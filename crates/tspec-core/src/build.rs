//! # Compiled Specifications
//!
//! [`CompiledSpec`] is the fast path for schemas validated at high volume.
//! It is synthesized once from an effective property list and afterwards
//! never walks an inheritance chain or rebuilds the property set.
//!
//! ## Design
//!
//! Each property becomes a [`Slot`] holding a pre-bound checker closure and
//! its default. A name-to-slot hash index replaces the interpreted path's
//! linear scan. Constraints bound to a nested `TypeSpec` are compiled
//! recursively, so a nested object is checked by its own compiled spec.
//!
//! ## Equivalence Invariant
//!
//! For every input, `check`, `create`, and `update` return exactly what the
//! interpreted [`TypeSpec`] methods return, including the error kind and
//! message. Both paths follow the same precedence: shape, then instance
//! keys in map order (unsupported before invalid), then missing properties
//! in effective order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::TypeSpecError;
use crate::predicate::Constraint;
use crate::record::{AsFields, Record};
use crate::spec::{PropDefinition, TypeSpec};

type Checker = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// One compiled property.
#[derive(Clone)]
struct Slot {
    name: String,
    check: Checker,
    default: Option<Value>,
}

impl Slot {
    fn compile(name: &str, definition: &PropDefinition) -> Self {
        let check: Checker = match definition.constraint() {
            Constraint::Predicate(predicate) => {
                let predicate = predicate.clone();
                Arc::new(move |value| predicate.test(value))
            }
            Constraint::Spec(nested) => {
                let nested = nested.build();
                Arc::new(move |value| nested.is_of(value))
            }
        };
        Self {
            name: name.to_string(),
            check,
            default: definition.default_value().cloned(),
        }
    }
}

/// A type specification flattened and compiled for repeated use.
#[derive(Clone)]
pub struct CompiledSpec {
    type_name: String,
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl CompiledSpec {
    /// Compile a type from an ordered effective property list.
    ///
    /// # Errors
    ///
    /// - `INVALID_VALUE` if `type_name` is blank.
    /// - `INVALID_PROPERTY_TYPE` if a property name appears twice.
    pub fn init<'a, I>(type_name: impl Into<String>, props: I) -> Result<Self, TypeSpecError>
    where
        I: IntoIterator<Item = (&'a str, &'a PropDefinition)>,
    {
        let type_name = type_name.into();
        if type_name.trim().is_empty() {
            return Err(TypeSpecError::invalid_value("Type Name", "a non-empty string"));
        }

        let mut spec = Self {
            type_name,
            slots: Vec::new(),
            index: HashMap::new(),
        };
        for (name, definition) in props {
            if spec.index.contains_key(name) {
                return Err(TypeSpecError::redefined_prop(&spec.type_name, name));
            }
            spec.index.insert(name.to_string(), spec.slots.len());
            spec.slots.push(Slot::compile(name, definition));
        }
        Ok(spec)
    }

    /// Compile an interpreted spec, flattening its inheritance chain once.
    pub(crate) fn from_spec(spec: &TypeSpec) -> Self {
        let slots: Vec<Slot> = spec
            .effective_props()
            .into_iter()
            .map(|(name, definition)| Slot::compile(name, definition))
            .collect();
        let index = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.name.clone(), i))
            .collect();
        Self {
            type_name: spec.type_name().to_string(),
            slots,
            index,
        }
    }

    /// Name of the type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Effective property names in effective order.
    pub fn prop_names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.name.as_str()).collect()
    }

    /// Same contract as [`TypeSpec::check`].
    pub fn check<'v, R>(&self, instance: &'v R) -> Result<&'v R, TypeSpecError>
    where
        R: AsFields + ?Sized,
    {
        let fields = instance
            .fields()
            .ok_or_else(|| TypeSpecError::not_a_record(&self.type_name, "check"))?;

        for (name, value) in fields {
            let slot = self
                .index
                .get(name)
                .map(|&i| &self.slots[i])
                .ok_or_else(|| TypeSpecError::unsupported_prop(&self.type_name, name))?;
            if !(slot.check)(value) {
                return Err(TypeSpecError::invalid_prop(&self.type_name, name));
            }
        }

        if fields.len() != self.slots.len() {
            let missing = self
                .slots
                .iter()
                .find(|slot| !fields.contains_key(&slot.name))
                .map(|slot| slot.name.as_str())
                .unwrap_or_default();
            return Err(TypeSpecError::missing_prop(&self.type_name, missing));
        }

        Ok(instance)
    }

    /// Same contract as [`TypeSpec::create`].
    pub fn create<R>(&self, args: &R) -> Result<Record, TypeSpecError>
    where
        R: AsFields + ?Sized,
    {
        let args = args
            .fields()
            .ok_or_else(|| TypeSpecError::not_a_record(&self.type_name, "create"))?;
        let mut fields = Map::new();

        for slot in &self.slots {
            let value = match (args.get(&slot.name), &slot.default) {
                (Some(value), _) if (slot.check)(value) => value.clone(),
                (Some(_), _) => return Err(TypeSpecError::invalid_prop(&self.type_name, &slot.name)),
                (None, Some(default)) => default.clone(),
                (None, None) => return Err(TypeSpecError::missing_prop(&self.type_name, &slot.name)),
            };
            fields.insert(slot.name.clone(), value);
        }

        Ok(Record::from_map(fields))
    }

    /// Same contract as [`TypeSpec::update`].
    pub fn update<R, P>(&self, instance: &R, patch: &P) -> Result<Record, TypeSpecError>
    where
        R: AsFields + ?Sized,
        P: AsFields + ?Sized,
    {
        let current = instance
            .fields()
            .ok_or_else(|| TypeSpecError::not_a_record(&self.type_name, "update"))?;
        let patch = patch
            .fields()
            .ok_or_else(|| TypeSpecError::not_a_record(&self.type_name, "update"))?;
        let mut fields = Map::new();

        for slot in &self.slots {
            match patch.get(&slot.name).or_else(|| current.get(&slot.name)) {
                Some(value) if (slot.check)(value) => {
                    fields.insert(slot.name.clone(), value.clone());
                }
                _ => return Err(TypeSpecError::invalid_prop(&self.type_name, &slot.name)),
            }
        }

        Ok(Record::from_map(fields))
    }

    /// `true` iff [`CompiledSpec::check`] would succeed.
    pub fn is_of<R>(&self, value: &R) -> bool
    where
        R: AsFields + ?Sized,
    {
        self.check(value).is_ok()
    }
}

impl fmt::Debug for CompiledSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSpec")
            .field("type_name", &self.type_name)
            .field("props", &self.prop_names())
            .finish()
    }
}
