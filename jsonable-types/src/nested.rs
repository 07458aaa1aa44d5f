//! The nested-record capability.
//!
//! A type takes part in nesting because it can convert itself to and from a
//! [`JsonMap`], not because it shares an ancestor with other records. Derived
//! records implement [`Jsonable`] through the record codec; hand-written types
//! implement it directly and call [`impl_nested!`](crate::impl_nested) to
//! become usable as field types.

use crate::{Data, Depth, JsonMap, Result};
use std::any::{Any, TypeId};
use std::fmt;

/// Conversion between a value and a string-keyed map of portable values.
pub trait Jsonable: Clone + fmt::Debug + Send + Sync + 'static {
    fn to_map(&self) -> Result<JsonMap>;

    fn from_map(map: &JsonMap) -> Result<Self>;

    /// Encodes at a given nesting level. Hand-written types that do not nest
    /// further can keep the default.
    fn to_map_within(&self, depth: Depth) -> Result<JsonMap> {
        let _ = depth;
        self.to_map()
    }

    /// Decodes at a given nesting level.
    fn from_map_within(map: &JsonMap, depth: Depth) -> Result<Self> {
        let _ = depth;
        Self::from_map(map)
    }

    /// The zero instance used when a field of this type has no value.
    fn zero_within(depth: Depth) -> Result<Self> {
        Self::from_map_within(&JsonMap::new(), depth)
    }

    /// Field values in declaration order, for types with a field schema.
    /// [`Data::Record`] equality compares these when both sides have them and
    /// encoded maps otherwise.
    fn field_data(&self) -> Option<Vec<Data>> {
        None
    }
}

/// Descriptor payload for a nested-record type.
#[derive(Clone, Copy)]
pub struct NestedType {
    name: &'static str,
    type_id: fn() -> TypeId,
    decode: fn(&JsonMap, Depth) -> Result<Data>,
    zero: fn(Depth) -> Result<Data>,
}

impl NestedType {
    pub fn of<T: Jsonable>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>,
            decode: |map, depth| T::from_map_within(map, depth).map(Data::nested),
            zero: |depth| T::zero_within(depth).map(Data::nested),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Decodes a map into a [`Data::Record`] of this type.
    pub fn decode(&self, map: &JsonMap, depth: Depth) -> Result<Data> {
        (self.decode)(map, depth)
    }

    /// Produces the zero instance of this type as a [`Data::Record`].
    pub fn zero(&self, depth: Depth) -> Result<Data> {
        (self.zero)(depth)
    }
}

impl PartialEq for NestedType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for NestedType {}

impl fmt::Debug for NestedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedType").field(&self.name).finish()
    }
}

/// Object-safe form of [`Jsonable`], stored inside [`Data::Record`].
pub trait DynNested: Any + fmt::Debug + Send + Sync {
    fn nested_type(&self) -> NestedType;

    fn encode_nested(&self, depth: Depth) -> Result<JsonMap>;

    fn nested_fields(&self) -> Option<Vec<Data>>;

    fn clone_nested(&self) -> Box<dyn DynNested>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Jsonable> DynNested for T {
    fn nested_type(&self) -> NestedType {
        NestedType::of::<T>()
    }

    fn encode_nested(&self, depth: Depth) -> Result<JsonMap> {
        self.to_map_within(depth)
    }

    fn nested_fields(&self) -> Option<Vec<Data>> {
        self.field_data()
    }

    fn clone_nested(&self) -> Box<dyn DynNested> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Clone for Box<dyn DynNested> {
    fn clone(&self) -> Self {
        (**self).clone_nested()
    }
}

/// Implements `Portable` for a type that implements [`Jsonable`].
#[macro_export]
macro_rules! impl_nested {
    ($ty:ty) => {
        impl $crate::Portable for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Record($crate::NestedType::of::<$ty>())
            }

            fn to_data(&self) -> $crate::Data {
                $crate::Data::nested(::core::clone::Clone::clone(self))
            }

            fn from_data(data: $crate::Data) -> $crate::Result<Self> {
                data.into_nested::<$ty>()
            }
        }
    };
}
