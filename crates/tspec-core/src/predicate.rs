//! # Predicates and Constraints
//!
//! A [`Predicate`] is a shared, thread-safe boolean test over a JSON value.
//! A [`Constraint`] is what a property is bound to: either a predicate or
//! another [`TypeSpec`], in which case membership is decided by
//! [`TypeSpec::is_of`]. Nesting specs this way composes object and array
//! schemas without any special casing in the validator.
//!
//! Predicates never raise. A helper applied to a value of the wrong shape
//! (for example [`Predicate::array_of`] applied to a string) returns `false`
//! and the owning property reports `INVALID_PROPERTY_TYPE`.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::spec::TypeSpec;

/// A boolean test over a JSON value.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    /// Wrap a closure as a predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Apply the predicate.
    #[inline]
    pub fn test(&self, value: &Value) -> bool {
        (self.0)(value)
    }

    /// Any string.
    pub fn string() -> Self {
        Self::new(Value::is_string)
    }

    /// A string holding at least one non-whitespace character.
    pub fn nonempty_string() -> Self {
        Self::new(is_nonempty_string)
    }

    /// Any JSON number.
    pub fn number() -> Self {
        Self::new(Value::is_number)
    }

    /// A number with no fractional part.
    pub fn int() -> Self {
        Self::new(is_int)
    }

    /// A non-negative number with no fractional part.
    pub fn unsigned_int() -> Self {
        Self::new(|v| is_int(v) && v.as_f64().is_some_and(|n| n >= 0.0))
    }

    /// `true` or `false`.
    pub fn bool() -> Self {
        Self::new(Value::is_boolean)
    }

    /// A JSON object.
    pub fn object() -> Self {
        Self::new(Value::is_object)
    }

    /// A JSON array.
    pub fn array() -> Self {
        Self::new(Value::is_array)
    }

    /// `null`, the JSON rendering of "no value".
    pub fn void() -> Self {
        Self::new(Value::is_null)
    }

    /// Deep equality with `expected`.
    pub fn equals(expected: Value) -> Self {
        Self::new(move |v| is_equal(&expected, v))
    }

    /// Membership in a fixed set of alternatives.
    ///
    /// Literal alternatives match by [`is_equal`]; spec alternatives match by
    /// [`TypeSpec::is_of`].
    pub fn either<I, C>(choices: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Choice>,
    {
        let choices: Vec<Choice> = choices.into_iter().map(Into::into).collect();
        Self::new(move |v| choices.iter().any(|choice| choice.matches(v)))
    }

    /// An array whose every element satisfies `constraint`.
    ///
    /// An empty array passes only when `allow_empty` is set.
    pub fn array_of(constraint: impl Into<Constraint>, allow_empty: bool) -> Self {
        let constraint = constraint.into();
        Self::new(move |v| match v.as_array() {
            Some(items) if items.is_empty() => allow_empty,
            Some(items) => items.iter().all(|item| constraint.admits(item)),
            None => false,
        })
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

fn is_nonempty_string(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.trim().is_empty())
}

fn is_int(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

/// What a property is bound to.
#[derive(Clone, Debug)]
pub enum Constraint {
    /// A plain predicate.
    Predicate(Predicate),
    /// A nested type; values must satisfy its `check`.
    Spec(Arc<TypeSpec>),
}

impl Constraint {
    /// Whether `value` satisfies this constraint.
    #[inline]
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            Self::Predicate(p) => p.test(value),
            Self::Spec(spec) => spec.is_of(value),
        }
    }
}

impl From<Predicate> for Constraint {
    fn from(p: Predicate) -> Self {
        Self::Predicate(p)
    }
}

impl From<Arc<TypeSpec>> for Constraint {
    fn from(spec: Arc<TypeSpec>) -> Self {
        Self::Spec(spec)
    }
}

impl From<&Arc<TypeSpec>> for Constraint {
    fn from(spec: &Arc<TypeSpec>) -> Self {
        Self::Spec(Arc::clone(spec))
    }
}

/// One alternative of [`Predicate::either`].
#[derive(Clone, Debug)]
pub enum Choice {
    /// Matches a deeply-equal value.
    Literal(Value),
    /// Matches any instance of the type.
    Spec(Arc<TypeSpec>),
}

impl Choice {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Literal(expected) => is_equal(expected, value),
            Self::Spec(spec) => spec.is_of(value),
        }
    }
}

impl From<Value> for Choice {
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

impl From<&str> for Choice {
    fn from(s: &str) -> Self {
        Self::Literal(Value::String(s.to_string()))
    }
}

impl From<String> for Choice {
    fn from(s: String) -> Self {
        Self::Literal(Value::String(s))
    }
}

impl From<i64> for Choice {
    fn from(n: i64) -> Self {
        Self::Literal(Value::from(n))
    }
}

impl From<bool> for Choice {
    fn from(b: bool) -> Self {
        Self::Literal(Value::Bool(b))
    }
}

impl From<Arc<TypeSpec>> for Choice {
    fn from(spec: Arc<TypeSpec>) -> Self {
        Self::Spec(spec)
    }
}

impl From<&Arc<TypeSpec>> for Choice {
    fn from(spec: &Arc<TypeSpec>) -> Self {
        Self::Spec(Arc::clone(spec))
    }
}

/// Deep structural equality.
///
/// Arrays compare by length and element order; objects by key set and
/// per-key value. Numbers compare by numeric value, so `1` equals `1.0`.
/// Traversal uses an explicit queue, so deeply nested values do not grow
/// the call stack.
pub fn is_equal(a: &Value, b: &Value) -> bool {
    let mut queue: VecDeque<(&Value, &Value)> = VecDeque::new();
    queue.push_back((a, b));

    while let Some((a, b)) = queue.pop_front() {
        match (a, b) {
            (Value::Null, Value::Null) => {}
            (Value::Bool(x), Value::Bool(y)) if x == y => {}
            (Value::String(x), Value::String(y)) if x == y => {}
            (Value::Number(x), Value::Number(y)) => {
                if !numbers_equal(x, y) {
                    return false;
                }
            }
            (Value::Array(xs), Value::Array(ys)) => {
                if xs.len() != ys.len() {
                    return false;
                }
                queue.extend(xs.iter().zip(ys.iter()));
            }
            (Value::Object(xm), Value::Object(ym)) => {
                if xm.len() != ym.len() {
                    return false;
                }
                for (key, xv) in xm {
                    match ym.get(key) {
                        Some(yv) => queue.push_back((xv, yv)),
                        None => return false,
                    }
                }
            }
            _ => return false,
        }
    }

    true
}

fn numbers_equal(x: &serde_json::Number, y: &serde_json::Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitive_predicates() {
        assert!(Predicate::string().test(&json!("")));
        assert!(!Predicate::string().test(&json!(1)));

        assert!(Predicate::nonempty_string().test(&json!("x")));
        assert!(!Predicate::nonempty_string().test(&json!("   ")));
        assert!(!Predicate::nonempty_string().test(&json!(null)));

        assert!(Predicate::number().test(&json!(1.5)));
        assert!(!Predicate::number().test(&json!("1")));

        assert!(Predicate::int().test(&json!(-3)));
        assert!(Predicate::int().test(&json!(3.0)));
        assert!(!Predicate::int().test(&json!(3.5)));

        assert!(Predicate::unsigned_int().test(&json!(0)));
        assert!(Predicate::unsigned_int().test(&json!(2001)));
        assert!(!Predicate::unsigned_int().test(&json!(-1)));
        assert!(!Predicate::unsigned_int().test(&json!(1.25)));

        assert!(Predicate::bool().test(&json!(false)));
        assert!(!Predicate::bool().test(&json!(0)));

        assert!(Predicate::object().test(&json!({})));
        assert!(!Predicate::object().test(&json!([])));

        assert!(Predicate::array().test(&json!([])));
        assert!(!Predicate::array().test(&json!({})));

        assert!(Predicate::void().test(&json!(null)));
        assert!(!Predicate::void().test(&json!(0)));
    }

    #[test]
    fn either_matches_literals() {
        let position = Predicate::either(["neck", "middle", "bridge"]);
        assert!(position.test(&json!("bridge")));
        assert!(!position.test(&json!("unknown-slot")));
        assert!(!position.test(&json!(1)));
    }

    #[test]
    fn either_matches_nested_specs() {
        let point = TypeSpec::init("Point")
            .and_then(|t| t.prop("x", Predicate::int()))
            .and_then(|t| t.prop("y", Predicate::int()))
            .map(TypeSpec::shared)
            .unwrap();
        let shape = Predicate::either(vec![Choice::from("origin"), Choice::from(&point)]);
        assert!(shape.test(&json!("origin")));
        assert!(shape.test(&json!({"x": 1, "y": 2})));
        assert!(!shape.test(&json!({"x": 1})));
    }

    #[test]
    fn array_of_respects_allow_empty() {
        let strict = Predicate::array_of(Predicate::int(), false);
        let lenient = Predicate::array_of(Predicate::int(), true);

        assert!(!strict.test(&json!([])));
        assert!(lenient.test(&json!([])));
        assert!(strict.test(&json!([1, 2, 3])));
        assert!(!strict.test(&json!([1, "2"])));
        assert!(!lenient.test(&json!("not an array")));
    }

    #[test]
    fn is_equal_is_structural() {
        assert!(is_equal(&json!({"a": [1, {"b": 2}]}), &json!({"a": [1, {"b": 2}]})));
        assert!(is_equal(&json!(1), &json!(1.0)));
        assert!(!is_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!is_equal(&json!([1, 2]), &json!([1, 2, 3])));
        assert!(!is_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!is_equal(&json!({"a": 1}), &json!({"b": 1})));
        assert!(!is_equal(&json!(null), &json!(false)));
        assert!(!is_equal(&json!("1"), &json!(1)));
    }

    #[test]
    fn is_equal_handles_deep_nesting() {
        let mut a = json!(0);
        let mut b = json!(0);
        for _ in 0..2_000 {
            a = Value::Array(vec![a]);
            b = Value::Array(vec![b]);
        }
        assert!(is_equal(&a, &b));
        assert!(!is_equal(&a, &json!([[0]])));
    }
}
