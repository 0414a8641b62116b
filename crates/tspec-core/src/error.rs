//! # Error Taxonomy
//!
//! Every failure raised by a type specification, a compiled specification,
//! or a pipeline flows through [`TypeSpecError`]. The set of error kinds is
//! closed: callers match on [`ErrorCode`] rather than on message text.
//!
//! ## Design
//!
//! - Property-level errors carry the offending type name and property name.
//! - Definition-time errors (redefining a property, a default that fails its
//!   own predicate) use the same taxonomy and are meant to fail fast.
//! - Nothing in the core catches these errors except `is_of`, which turns
//!   any validation failure into `false`.

use std::fmt;

use thiserror::Error;

/// The closed set of error kinds.
///
/// Numeric values are stable and match the historical error-code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ErrorCode {
    /// The specific nature of the error is not known.
    Unknown = 0,
    /// A property required to build or check an instance is missing.
    MissingProperty = 1,
    /// A property is bound to a value that fails its predicate, or a
    /// property definition conflicts with an existing one.
    InvalidPropertyType = 2,
    /// An instance carries a property the type does not declare.
    UnsupportedProperty = 3,
    /// A value is of an incorrect shape for the operation.
    InvalidValue = 4,
}

impl ErrorCode {
    /// Canonical upper-case name of the code (e.g. `MISSING_PROPERTY`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::MissingProperty => "MISSING_PROPERTY",
            Self::InvalidPropertyType => "INVALID_PROPERTY_TYPE",
            Self::UnsupportedProperty => "UNSUPPORTED_PROPERTY",
            Self::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by type specifications and pipelines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeSpecError {
    /// A property is missing from an instance.
    #[error("property \"{property}\" is missing from instance of type \"{type_name}\"")]
    MissingProperty {
        /// Type the instance was checked against.
        type_name: String,
        /// The missing property.
        property: String,
    },

    /// A property value failed its predicate, or a definition conflicts.
    #[error("property \"{property}\" of type \"{type_name}\" {reason}")]
    InvalidPropertyType {
        /// Type that owns the property.
        type_name: String,
        /// The offending property.
        property: String,
        /// What went wrong with it.
        reason: String,
    },

    /// An instance carries a property the type does not declare.
    #[error("property \"{property}\" is not supported by type \"{type_name}\"")]
    UnsupportedProperty {
        /// Type the instance was checked against.
        type_name: String,
        /// The undeclared property.
        property: String,
    },

    /// A value has the wrong shape for the requested operation.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Anything that does not fit the other kinds.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl TypeSpecError {
    /// The taxonomy code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingProperty { .. } => ErrorCode::MissingProperty,
            Self::InvalidPropertyType { .. } => ErrorCode::InvalidPropertyType,
            Self::UnsupportedProperty { .. } => ErrorCode::UnsupportedProperty,
            Self::InvalidValue(_) => ErrorCode::InvalidValue,
            Self::Unknown(_) => ErrorCode::Unknown,
        }
    }

    /// A property is missing from an instance of `type_name`.
    pub fn missing_prop(type_name: &str, property: &str) -> Self {
        Self::MissingProperty {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }

    /// A property value of `type_name` failed its predicate.
    pub fn invalid_prop(type_name: &str, property: &str) -> Self {
        Self::InvalidPropertyType {
            type_name: type_name.to_string(),
            property: property.to_string(),
            reason: "failed its check".to_string(),
        }
    }

    /// An own property of `type_name` was defined twice.
    pub fn redefined_prop(type_name: &str, property: &str) -> Self {
        Self::InvalidPropertyType {
            type_name: type_name.to_string(),
            property: property.to_string(),
            reason: "has already been defined".to_string(),
        }
    }

    /// An instance of `type_name` carries an undeclared property.
    pub fn unsupported_prop(type_name: &str, property: &str) -> Self {
        Self::UnsupportedProperty {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }

    /// `value_name` must be of `expected`.
    pub fn invalid_value(value_name: &str, expected: &str) -> Self {
        Self::InvalidValue(format!("\"{value_name}\" must be {expected}"))
    }

    /// An instance handed to `action` on `type_name` is not record-shaped.
    pub fn not_a_record(type_name: &str, action: &str) -> Self {
        Self::InvalidValue(format!(
            "must {action} instance of type \"{type_name}\" using an object"
        ))
    }

    /// An error whose nature is not known.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_keep_their_numeric_values() {
        assert_eq!(ErrorCode::Unknown as u8, 0);
        assert_eq!(ErrorCode::MissingProperty as u8, 1);
        assert_eq!(ErrorCode::InvalidPropertyType as u8, 2);
        assert_eq!(ErrorCode::UnsupportedProperty as u8, 3);
        assert_eq!(ErrorCode::InvalidValue as u8, 4);
    }

    #[test]
    fn helpers_map_to_codes() {
        assert_eq!(
            TypeSpecError::missing_prop("Pickup", "make").code(),
            ErrorCode::MissingProperty
        );
        assert_eq!(
            TypeSpecError::invalid_prop("Pickup", "make").code(),
            ErrorCode::InvalidPropertyType
        );
        assert_eq!(
            TypeSpecError::redefined_prop("Pickup", "make").code(),
            ErrorCode::InvalidPropertyType
        );
        assert_eq!(
            TypeSpecError::unsupported_prop("Pickup", "extra").code(),
            ErrorCode::UnsupportedProperty
        );
        assert_eq!(
            TypeSpecError::invalid_value("Type Name", "a non-empty string").code(),
            ErrorCode::InvalidValue
        );
        assert_eq!(TypeSpecError::unknown("boom").code(), ErrorCode::Unknown);
    }

    #[test]
    fn messages_name_type_and_property() {
        let msg = TypeSpecError::missing_prop("Guitar", "year").to_string();
        assert!(msg.contains("Guitar"));
        assert!(msg.contains("year"));

        let msg = TypeSpecError::redefined_prop("Guitar", "make").to_string();
        assert!(msg.contains("already been defined"));
    }

    #[test]
    fn code_display_is_upper_snake() {
        assert_eq!(ErrorCode::InvalidPropertyType.to_string(), "INVALID_PROPERTY_TYPE");
    }
}
