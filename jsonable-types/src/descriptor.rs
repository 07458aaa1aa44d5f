//! Declared field types.

use crate::{EnumType, NestedType};
use std::fmt;
use std::sync::Arc;

/// The closed set of declared types the codec can dispatch on.
///
/// Descriptors are compared structurally. Enumerations compare by their
/// [`EnumType`] and nested records by the Rust type they stand for.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Decimal,
    Timestamp,
    Duration,
    Enum(Arc<EnumType>),
    /// A value that may be absent. Equivalent to `Union(vec![t, Null])`.
    Optional(Box<TypeDescriptor>),
    List(Box<TypeDescriptor>),
    Set(Box<TypeDescriptor>),
    /// A tuple with one declared type per position.
    Tuple(Vec<TypeDescriptor>),
    /// A homogeneous tuple of any length.
    VarTuple(Box<TypeDescriptor>),
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Record(NestedType),
    /// Dispatch on the runtime value instead of the declaration.
    Any,
    /// Only `Union[T, Null]` is supported; anything else is rejected at
    /// resolution time.
    Union(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(element: TypeDescriptor) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: TypeDescriptor) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn var_tuple(element: TypeDescriptor) -> Self {
        Self::VarTuple(Box::new(element))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Names the kind of this descriptor for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
            Self::Decimal => "decimal",
            Self::Timestamp => "timestamp",
            Self::Duration => "duration",
            Self::Enum(_) => "enum",
            Self::Optional(_) => "optional",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Tuple(_) | Self::VarTuple(_) => "tuple",
            Self::Map { .. } => "map",
            Self::Record(_) => "record",
            Self::Any => "any",
            Self::Union(_) => "union",
        }
    }

    /// If this is `Union[T, Null]` in either order, returns `T`.
    pub fn nullable_member(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Union(members) => match members.as_slice() {
                [inner, Self::Null] | [Self::Null, inner] if *inner != Self::Null => Some(inner),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Decimal => f.write_str("decimal"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Duration => f.write_str("duration"),
            Self::Enum(ty) => f.write_str(ty.name()),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::Set(inner) => write!(f, "set<{inner}>"),
            Self::Tuple(items) => {
                f.write_str("tuple<")?;
                write_joined(f, items)?;
                f.write_str(">")
            }
            Self::VarTuple(inner) => write!(f, "tuple<{inner}, ...>"),
            Self::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Record(nested) => f.write_str(nested.name()),
            Self::Any => f.write_str("any"),
            Self::Union(members) => {
                f.write_str("union<")?;
                write_joined(f, members)?;
                f.write_str(">")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
