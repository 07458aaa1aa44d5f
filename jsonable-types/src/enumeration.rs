//! Enumerations: closed sets of named members, each with one representation
//! value that is what actually crosses the portable boundary.

use crate::{Error, Json, Result};
use std::fmt;
use std::sync::Arc;

/// The representation value of an enumeration member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumRepr {
    Int(i64),
    Str(String),
}

impl EnumRepr {
    /// Returns the portable form of this representation.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::Int(v) => Json::from(*v),
            Self::Str(s) => Json::String(s.clone()),
        }
    }

    /// Returns true if `value` is exactly this representation.
    pub fn matches(&self, value: &Json) -> bool {
        match (self, value) {
            (Self::Int(v), Json::Number(n)) => n.as_i64() == Some(*v),
            (Self::Str(s), Json::String(other)) => s == other,
            _ => false,
        }
    }
}

impl fmt::Display for EnumRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// One member of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: EnumRepr,
}

impl EnumMember {
    /// Shorthand for a member with an integer representation.
    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: EnumRepr::Int(value),
        }
    }

    /// Shorthand for a member with a string representation.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: EnumRepr::Str(value.into()),
        }
    }
}

/// An enumeration type: its name and members in declaration order.
///
/// Declaration order matters beyond presentation: the zero value of an
/// enumeration is its first member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    members: Vec<EnumMember>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, members: Vec<EnumMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    /// Returns the index of the member whose representation is `value`.
    pub fn position(&self, value: &Json) -> Option<usize> {
        self.members.iter().position(|m| m.value.matches(value))
    }

    /// Looks a member up by its representation value.
    pub fn lookup(self: &Arc<Self>, value: &Json) -> Result<EnumValue> {
        match self.position(value) {
            Some(index) => Ok(EnumValue {
                ty: Arc::clone(self),
                index,
            }),
            None => Err(Error::InvalidEnumValue {
                enumeration: self.name.clone(),
                value: value.clone(),
            }),
        }
    }

    /// Returns the first declared member, if any.
    pub fn first(self: &Arc<Self>) -> Option<EnumValue> {
        EnumValue::new(Arc::clone(self), 0)
    }
}

/// A member of a specific enumeration.
#[derive(Debug, Clone)]
pub struct EnumValue {
    ty: Arc<EnumType>,
    index: usize,
}

impl EnumValue {
    /// Returns `None` if `index` is not a member of `ty`.
    pub fn new(ty: Arc<EnumType>, index: usize) -> Option<Self> {
        (index < ty.members.len()).then_some(Self { ty, index })
    }

    pub fn enum_type(&self) -> &Arc<EnumType> {
        &self.ty
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn member(&self) -> &EnumMember {
        &self.ty.members[self.index]
    }

    pub fn repr(&self) -> &EnumRepr {
        &self.member().value
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && (Arc::ptr_eq(&self.ty, &other.ty) || self.ty == other.ty)
    }
}

/// A Rust enum that maps onto an [`EnumType`] by member index.
///
/// Usually derived with `#[derive(Enumeration)]`, which also emits
/// [`impl_enumeration!`](crate::impl_enumeration) for the `Portable` impl.
pub trait Enumeration: Sized + 'static {
    fn enum_type() -> Arc<EnumType>;

    /// Index of this variant among the declared members.
    fn index(&self) -> usize;

    fn from_index(index: usize) -> Option<Self>;

    fn to_enum_value(&self) -> EnumValue {
        EnumValue {
            ty: Self::enum_type(),
            index: self.index(),
        }
    }

    fn from_enum_value(value: &EnumValue) -> Result<Self> {
        let ty = Self::enum_type();
        if ty.name() != value.enum_type().name() {
            return Err(Error::InvalidEnumValue {
                enumeration: ty.name().to_owned(),
                value: value.repr().to_json(),
            });
        }
        Self::from_index(value.index()).ok_or_else(|| Error::InvalidEnumValue {
            enumeration: ty.name().to_owned(),
            value: value.repr().to_json(),
        })
    }
}

/// Implements `Portable` for a type that implements [`Enumeration`].
#[macro_export]
macro_rules! impl_enumeration {
    ($ty:ty) => {
        impl $crate::Portable for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Enum(<$ty as $crate::Enumeration>::enum_type())
            }

            fn to_data(&self) -> $crate::Data {
                $crate::Data::Enum($crate::Enumeration::to_enum_value(self))
            }

            fn from_data(data: $crate::Data) -> $crate::Result<Self> {
                match data {
                    $crate::Data::Enum(value) => {
                        <$ty as $crate::Enumeration>::from_enum_value(&value)
                    }
                    other => ::core::result::Result::Err($crate::Error::mismatch("enum", &other)),
                }
            }
        }
    };
}
