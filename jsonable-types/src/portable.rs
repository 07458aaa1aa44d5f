//! Rust types that map onto a [`TypeDescriptor`].
//!
//! The derive macros read field types through [`Portable`]: the descriptor
//! comes from [`Portable::descriptor`], and field values cross into the codec
//! with [`Portable::to_data`] and back with [`Portable::from_data`].

use crate::{Data, Error, Result, TypeDescriptor};
use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

/// A Rust type with a declared descriptor and a [`Data`] conversion.
pub trait Portable: Sized {
    fn descriptor() -> TypeDescriptor;

    fn to_data(&self) -> Data;

    fn from_data(data: Data) -> Result<Self>;
}

impl Portable for Data {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Any
    }

    fn to_data(&self) -> Data {
        self.clone()
    }

    fn from_data(data: Data) -> Result<Self> {
        Ok(data)
    }
}

impl Portable for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Null
    }

    fn to_data(&self) -> Data {
        Data::Null
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Null => Ok(()),
            other => Err(Error::mismatch("null", &other)),
        }
    }
}

impl Portable for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Bool
    }

    fn to_data(&self) -> Data {
        Data::Bool(*self)
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Bool(v) => Ok(v),
            other => Err(Error::mismatch("bool", &other)),
        }
    }
}

macro_rules! int_portable {
    ($($ty:ty),+) => {$(
        impl Portable for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::Int
            }

            // Lossless: every listed type fits in `i128`.
            #[allow(clippy::cast_lossless)]
            fn to_data(&self) -> Data {
                Data::Int(*self as i128)
            }

            fn from_data(data: Data) -> Result<Self> {
                match data {
                    Data::Int(v) => <$ty>::try_from(v).map_err(|_| Error::InvalidValue {
                        kind: "int",
                        message: format!("{v} is out of range for {}", stringify!($ty)),
                    }),
                    other => Err(Error::mismatch("int", &other)),
                }
            }
        }
    )+};
}

int_portable!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Portable for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Float
    }

    fn to_data(&self) -> Data {
        Data::Float(*self)
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Float(v) => Ok(v),
            other => Err(Error::mismatch("float", &other)),
        }
    }
}

impl Portable for f32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Float
    }

    fn to_data(&self) -> Data {
        Data::Float(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_data(data: Data) -> Result<Self> {
        f64::from_data(data).map(|v| v as f32)
    }
}

impl Portable for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Str
    }

    fn to_data(&self) -> Data {
        Data::Str(self.clone())
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Str(v) => Ok(v),
            other => Err(Error::mismatch("string", &other)),
        }
    }
}

impl Portable for BigDecimal {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Decimal
    }

    fn to_data(&self) -> Data {
        Data::Decimal(self.clone())
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Decimal(v) => Ok(v),
            other => Err(Error::mismatch("decimal", &other)),
        }
    }
}

impl Portable for DateTime<Utc> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Timestamp
    }

    fn to_data(&self) -> Data {
        Data::Timestamp(*self)
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Timestamp(v) => Ok(v),
            other => Err(Error::mismatch("timestamp", &other)),
        }
    }
}

impl Portable for TimeDelta {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Duration
    }

    fn to_data(&self) -> Data {
        Data::Duration(*self)
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Duration(v) => Ok(v),
            other => Err(Error::mismatch("duration", &other)),
        }
    }
}

impl<T: Portable> Portable for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::descriptor())
    }

    fn to_data(&self) -> Data {
        self.as_ref().map_or(Data::Null, T::to_data)
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Null => Ok(None),
            other => T::from_data(other).map(Some),
        }
    }
}

impl<T: Portable> Portable for Box<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn to_data(&self) -> Data {
        (**self).to_data()
    }

    fn from_data(data: Data) -> Result<Self> {
        T::from_data(data).map(Box::new)
    }
}

impl<T: Portable> Portable for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::list(T::descriptor())
    }

    fn to_data(&self) -> Data {
        Data::List(self.iter().map(T::to_data).collect())
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::List(items) => items.into_iter().map(T::from_data).collect(),
            other => Err(Error::mismatch("list", &other)),
        }
    }
}

/// Homogeneous tuples of any length.
impl<T: Portable> Portable for Box<[T]> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::var_tuple(T::descriptor())
    }

    fn to_data(&self) -> Data {
        Data::Tuple(self.iter().map(T::to_data).collect())
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Tuple(items) | Data::List(items) => items.into_iter().map(T::from_data).collect(),
            other => Err(Error::mismatch("tuple", &other)),
        }
    }
}

impl<T, S> Portable for HashSet<T, S>
where
    T: Portable + Eq + Hash,
    S: BuildHasher + Default,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::set(T::descriptor())
    }

    fn to_data(&self) -> Data {
        Data::Set(self.iter().map(T::to_data).collect())
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Set(items) | Data::List(items) => items.into_iter().map(T::from_data).collect(),
            other => Err(Error::mismatch("set", &other)),
        }
    }
}

impl<T: Portable + Ord> Portable for BTreeSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::set(T::descriptor())
    }

    fn to_data(&self) -> Data {
        Data::Set(self.iter().map(T::to_data).collect())
    }

    fn from_data(data: Data) -> Result<Self> {
        match data {
            Data::Set(items) | Data::List(items) => items.into_iter().map(T::from_data).collect(),
            other => Err(Error::mismatch("set", &other)),
        }
    }
}

fn map_pairs<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> Data
where
    K: Portable + 'a,
    V: Portable + 'a,
{
    Data::Map(entries.map(|(k, v)| (k.to_data(), v.to_data())).collect())
}

fn pairs_into<K, V, C>(data: Data) -> Result<C>
where
    K: Portable,
    V: Portable,
    C: FromIterator<(K, V)>,
{
    match data {
        Data::Map(pairs) => pairs
            .into_iter()
            .map(|(k, v)| Ok((K::from_data(k)?, V::from_data(v)?)))
            .collect(),
        other => Err(Error::mismatch("map", &other)),
    }
}

/// The key descriptor is declared as-is; anything but a string key is
/// rejected when the field's codec is resolved.
impl<K, V, S> Portable for HashMap<K, V, S>
where
    K: Portable + Eq + Hash,
    V: Portable,
    S: BuildHasher + Default,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::map(K::descriptor(), V::descriptor())
    }

    fn to_data(&self) -> Data {
        map_pairs(self.iter())
    }

    fn from_data(data: Data) -> Result<Self> {
        pairs_into(data)
    }
}

impl<K: Portable + Ord, V: Portable> Portable for BTreeMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::map(K::descriptor(), V::descriptor())
    }

    fn to_data(&self) -> Data {
        map_pairs(self.iter())
    }

    fn from_data(data: Data) -> Result<Self> {
        pairs_into(data)
    }
}

macro_rules! tuple_portable {
    ($len:literal => $($name:ident . $idx:tt),+) => {
        impl<$($name: Portable),+> Portable for ($($name,)+) {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::Tuple(vec![$($name::descriptor()),+])
            }

            fn to_data(&self) -> Data {
                Data::Tuple(vec![$(self.$idx.to_data()),+])
            }

            fn from_data(data: Data) -> Result<Self> {
                match data {
                    Data::Tuple(items) | Data::List(items) => {
                        if items.len() != $len {
                            return Err(Error::ArityMismatch {
                                expected: $len,
                                actual: items.len(),
                            });
                        }
                        let mut items = items.into_iter();
                        Ok(($($name::from_data(items.next().unwrap_or(Data::Null))?,)+))
                    }
                    other => Err(Error::mismatch("tuple", &other)),
                }
            }
        }
    };
}

tuple_portable!(1 => A.0);
tuple_portable!(2 => A.0, B.1);
tuple_portable!(3 => A.0, B.1, C.2);
tuple_portable!(4 => A.0, B.1, C.2, D.3);
tuple_portable!(5 => A.0, B.1, C.2, D.3, E.4);
tuple_portable!(6 => A.0, B.1, C.2, D.3, E.4, F.5);
