//! Runtime field values.

use crate::{Depth, DynNested, EnumRepr, EnumValue, Error, Jsonable, Result, TypeDescriptor};
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, TimeDelta, Utc};

/// A field value as records hand it to the codec and receive it back.
///
/// `Data` mirrors [`TypeDescriptor`]: every declared kind has one runtime
/// variant, and [`Data::runtime_descriptor`] recovers a descriptor from a value for
/// fields declared as [`TypeDescriptor::Any`].
#[derive(Debug, Clone)]
pub enum Data {
    Null,
    Bool(bool),
    /// Wide enough for every `i64` and `u64`.
    Int(i128),
    Float(f64),
    Str(String),
    Decimal(BigDecimal),
    Timestamp(DateTime<Utc>),
    Duration(TimeDelta),
    Enum(EnumValue),
    List(Vec<Data>),
    /// Unordered; equality ignores element order.
    Set(Vec<Data>),
    Tuple(Vec<Data>),
    /// Key/value pairs. Only string keys survive encoding.
    Map(Vec<(Data, Data)>),
    Record(Box<dyn DynNested>),
}

impl Data {
    /// Wraps a nested record.
    pub fn nested<T: Jsonable>(value: T) -> Self {
        Self::Record(Box::new(value))
    }

    /// Unwraps a nested record of type `T`.
    pub fn into_nested<T: Jsonable>(self) -> Result<T> {
        match self {
            Self::Record(boxed) => {
                let found = boxed.nested_type().name();
                boxed
                    .into_any()
                    .downcast::<T>()
                    .map(|b| *b)
                    .map_err(|_| Error::InvalidValue {
                        kind: "record",
                        message: format!(
                            "expected {}, found {found}",
                            std::any::type_name::<T>()
                        ),
                    })
            }
            other => Err(Error::mismatch("record", &other)),
        }
    }

    /// Borrows a nested record of type `T`, if this is one.
    pub fn as_nested<T: Jsonable>(&self) -> Option<&T> {
        match self {
            Self::Record(boxed) => boxed.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Names the kind of this value for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Decimal(_) => "decimal",
            Self::Timestamp(_) => "timestamp",
            Self::Duration(_) => "duration",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Tuple(_) => "tuple",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
        }
    }

    /// The descriptor used to dispatch this value when its field is declared
    /// as [`TypeDescriptor::Any`]. Container elements dispatch the same way.
    pub fn runtime_descriptor(&self) -> TypeDescriptor {
        match self {
            Self::Null => TypeDescriptor::Null,
            Self::Bool(_) => TypeDescriptor::Bool,
            Self::Int(_) => TypeDescriptor::Int,
            Self::Float(_) => TypeDescriptor::Float,
            Self::Str(_) => TypeDescriptor::Str,
            Self::Decimal(_) => TypeDescriptor::Decimal,
            Self::Timestamp(_) => TypeDescriptor::Timestamp,
            Self::Duration(_) => TypeDescriptor::Duration,
            Self::Enum(value) => TypeDescriptor::Enum(value.enum_type().clone()),
            Self::List(_) => TypeDescriptor::list(TypeDescriptor::Any),
            Self::Set(_) => TypeDescriptor::set(TypeDescriptor::Any),
            Self::Tuple(_) => TypeDescriptor::var_tuple(TypeDescriptor::Any),
            Self::Map(_) => TypeDescriptor::map(TypeDescriptor::Any, TypeDescriptor::Any),
            Self::Record(nested) => TypeDescriptor::Record(nested.nested_type()),
        }
    }

    /// The generic emptiness test behind `omitempty`.
    ///
    /// Null, false, numeric zero, the empty string, zero durations, empty
    /// containers and enumeration members whose representation is `0` are
    /// empty. Timestamps and nested records never are.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
            Self::Str(s) => s.is_empty(),
            Self::Decimal(d) => d.is_zero(),
            Self::Duration(d) => d.is_zero(),
            Self::Enum(value) => *value.repr() == EnumRepr::Int(0),
            Self::List(items) | Self::Set(items) | Self::Tuple(items) => items.is_empty(),
            Self::Map(pairs) => pairs.is_empty(),
            Self::Timestamp(_) | Self::Record(_) => false,
        }
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => same_elements(a, b),
            (Self::Map(a), Self::Map(b)) => same_elements(a, b),
            (Self::Record(a), Self::Record(b)) => {
                if a.nested_type() != b.nested_type() {
                    return false;
                }
                if let (Some(a), Some(b)) = (a.nested_fields(), b.nested_fields()) {
                    return a == b;
                }
                let depth = Depth::default();
                match (a.encode_nested(depth), b.encode_nested(depth)) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

fn same_elements<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x))
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Data {
    fn from(value: i64) -> Self {
        Self::Int(value.into())
    }
}

impl From<u64> for Data {
    fn from(value: u64) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<EnumValue> for Data {
    fn from(value: EnumValue) -> Self {
        Self::Enum(value)
    }
}
