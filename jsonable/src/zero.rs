//! Zero values: the structurally valid default of any supported type.

use crate::{Data, Depth, Error, Result, TypeDescriptor, registry};
use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta, Utc};

/// Returns the zero value of `descriptor`.
///
/// Optional values are null rather than the zero of their inner type, nested
/// records are their own all-zero instance, and enumerations are their first
/// declared member. The signature matches `DefaultFactory`, so this function
/// can be used as a record's class-level default factory.
pub fn zero_value(descriptor: &TypeDescriptor, depth: Depth) -> Result<Data> {
    registry::validate(descriptor)?;
    let zero = match descriptor {
        TypeDescriptor::Null
        | TypeDescriptor::Any
        | TypeDescriptor::Optional(_)
        | TypeDescriptor::Union(_) => Data::Null,
        TypeDescriptor::Bool => Data::Bool(false),
        TypeDescriptor::Int => Data::Int(0),
        TypeDescriptor::Float => Data::Float(0.0),
        TypeDescriptor::Str => Data::Str(String::new()),
        TypeDescriptor::Decimal => Data::Decimal(BigDecimal::from(0)),
        TypeDescriptor::Timestamp => Data::Timestamp(DateTime::<Utc>::UNIX_EPOCH),
        TypeDescriptor::Duration => Data::Duration(TimeDelta::zero()),
        TypeDescriptor::Enum(ty) => {
            Data::Enum(ty.first().ok_or_else(|| Error::UnsupportedType {
                descriptor: descriptor.to_string(),
                reason: "enumeration has no members".to_owned(),
            })?)
        }
        TypeDescriptor::List(_) => Data::List(Vec::new()),
        TypeDescriptor::Set(_) => Data::Set(Vec::new()),
        TypeDescriptor::VarTuple(_) => Data::Tuple(Vec::new()),
        TypeDescriptor::Tuple(elements) => {
            let depth = depth.descend()?;
            Data::Tuple(
                elements
                    .iter()
                    .map(|element| zero_value(element, depth))
                    .collect::<Result<_>>()?,
            )
        }
        TypeDescriptor::Map { .. } => Data::Map(Vec::new()),
        TypeDescriptor::Record(nested) => nested.zero(depth.descend()?)?,
    };
    Ok(zero)
}

/// [`zero_value`] with the default depth limit.
pub fn zero(descriptor: &TypeDescriptor) -> Result<Data> {
    zero_value(descriptor, Depth::default())
}
