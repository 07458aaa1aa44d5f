//! Core type definitions for jsonable.
//!
//! This crate defines the closed value model shared by the codec engine:
//! - [`Json`] / [`JsonMap`]: the portable key/value representation
//! - [`Data`]: in-process field values handed to and from records
//! - [`TypeDescriptor`]: the closed set of supported declared types
//! - [`EnumType`] and [`Enumeration`]: enumerations with representation values
//! - [`Jsonable`] and [`NestedType`]: the nested-record capability
//! - [`Depth`]: the recursion guard threaded through every codec call
//!
//! Nothing here knows about field options or record schemas; those live in
//! the `jsonable` crate.

mod data;
mod depth;
mod descriptor;
mod enumeration;
mod nested;
mod portable;
mod value;

pub use data::Data;
pub use depth::{DEFAULT_MAX_DEPTH, Depth};
pub use descriptor::TypeDescriptor;
pub use enumeration::{EnumMember, EnumRepr, EnumType, EnumValue, Enumeration};
pub use nested::{DynNested, Jsonable, NestedType};
pub use portable::Portable;
pub use value::{Json, JsonMap, json_kind};

#[doc(hidden)]
pub mod __private {
    pub use std::sync::{Arc, LazyLock};
}

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, encoding or decoding values.
///
/// Every variant is a deterministic data-shape error: retrying the same call
/// with the same input fails the same way.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The descriptor is outside the supported set.
    #[error("unsupported type {descriptor}: {reason}")]
    UnsupportedType { descriptor: String, reason: String },

    /// A map key that is not a string reached a string-keyed map.
    #[error("map keys must be strings, found {found}")]
    UnsupportedKeyType { found: &'static str },

    /// A fixed tuple had the wrong number of elements.
    #[error("tuple arity mismatch: expected {expected} elements, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// No enumeration member has the given representation value.
    #[error("{value} is not a valid value of enumeration {enumeration}")]
    InvalidEnumValue { enumeration: String, value: Json },

    /// Decoding found no value and no default for a field.
    #[error("missing required field `{field}` of {record}")]
    MissingRequiredField { record: String, field: String },

    /// Nesting went deeper than the configured limit.
    #[error("maximum nesting depth of {limit} exceeded")]
    DepthExceeded { limit: usize },

    /// A value of the wrong kind reached an encoder or decoder.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A value of the right kind that cannot be represented.
    #[error("invalid {kind} value: {message}")]
    InvalidValue { kind: &'static str, message: String },

    /// An option lookup named a field the record does not declare.
    #[error("{record} has no field `{field}`")]
    UnknownField { record: String, field: String },

    /// Raised by user-supplied encoders, decoders and hooks.
    #[error("{0}")]
    Custom(String),

    /// JSON text handling inside a hook failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Context added by the record codec around a failing field.
    #[error("field `{field}` of {record}: {source}")]
    InField {
        record: String,
        field: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a [`Error::Custom`] from any displayable message.
    pub fn custom(message: impl std::fmt::Display) -> Self {
        Self::Custom(message.to_string())
    }

    /// Wraps this error with the record and field it was raised in.
    #[must_use]
    pub fn in_field(self, record: &str, field: &str) -> Self {
        Self::InField {
            record: record.to_owned(),
            field: field.to_owned(),
            source: Box::new(self),
        }
    }

    /// Returns the error with every [`Error::InField`] layer stripped.
    pub fn innermost(&self) -> &Error {
        let mut current = self;
        while let Self::InField { source, .. } = current {
            current = source;
        }
        current
    }

    /// A [`Error::TypeMismatch`] for a runtime value of the wrong kind.
    pub fn mismatch(expected: &'static str, found: &Data) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.kind(),
        }
    }

    /// A [`Error::TypeMismatch`] for a portable value of the wrong kind.
    pub fn json_mismatch(expected: &'static str, found: &Json) -> Self {
        Self::TypeMismatch {
            expected,
            found: json_kind(found),
        }
    }
}
