use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta, Utc};
use jsonable::{
    Data, Depth, EnumMember, EnumType, Enumeration, Error, Portable, Record, TypeDescriptor, zero,
    zero_value,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

// ── Scalars ──────────────────────────────────────────────────────

#[test]
fn scalar_zeros() {
    assert_eq!(zero(&TypeDescriptor::Bool).unwrap(), Data::Bool(false));
    assert_eq!(zero(&TypeDescriptor::Int).unwrap(), Data::Int(0));
    assert_eq!(zero(&TypeDescriptor::Float).unwrap(), Data::Float(0.0));
    assert_eq!(zero(&TypeDescriptor::Str).unwrap(), Data::from(""));
    assert_eq!(
        zero(&TypeDescriptor::Decimal).unwrap(),
        Data::Decimal(BigDecimal::from(0))
    );
    assert_eq!(
        zero(&TypeDescriptor::Timestamp).unwrap(),
        Data::Timestamp(DateTime::<Utc>::UNIX_EPOCH)
    );
    assert_eq!(
        zero(&TypeDescriptor::Duration).unwrap(),
        Data::Duration(TimeDelta::zero())
    );
    assert_eq!(zero(&TypeDescriptor::Any).unwrap(), Data::Null);
}

// ── Composites ───────────────────────────────────────────────────

#[test]
fn optional_is_null_not_inner_zero() {
    assert_eq!(
        zero(&TypeDescriptor::optional(TypeDescriptor::Int)).unwrap(),
        Data::Null
    );
}

#[test]
fn containers_are_empty_of_their_kind() {
    assert_eq!(
        zero(&TypeDescriptor::list(TypeDescriptor::Int)).unwrap(),
        Data::List(Vec::new())
    );
    assert_eq!(
        zero(&TypeDescriptor::set(TypeDescriptor::Int)).unwrap(),
        Data::Set(Vec::new())
    );
    assert_eq!(
        zero(&TypeDescriptor::map(TypeDescriptor::Str, TypeDescriptor::Int)).unwrap(),
        Data::Map(Vec::new())
    );
    assert_eq!(
        zero(&TypeDescriptor::var_tuple(TypeDescriptor::Int)).unwrap(),
        Data::Tuple(Vec::new())
    );
}

#[test]
fn fixed_tuples_zero_each_position() {
    assert_eq!(
        zero(&<(i64, String, Option<bool>)>::descriptor()).unwrap(),
        Data::Tuple(vec![Data::Int(0), Data::from(""), Data::Null])
    );
}

#[test]
fn unsupported_descriptors_fail_like_the_registry() {
    let union = TypeDescriptor::Union(vec![TypeDescriptor::Int, TypeDescriptor::Str]);
    assert!(matches!(zero(&union), Err(Error::UnsupportedType { .. })));
    let nested = TypeDescriptor::list(union);
    assert!(matches!(zero(&nested), Err(Error::UnsupportedType { .. })));
    let keyed = TypeDescriptor::map(TypeDescriptor::Int, TypeDescriptor::Int);
    assert!(matches!(zero(&keyed), Err(Error::UnsupportedKeyType { .. })));
}

// ── Enumerations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enumeration)]
enum Priority {
    High = 3,
    Low = 1,
}

#[test]
fn enumeration_zero_is_first_declared_member() {
    let data = zero(&Priority::descriptor()).unwrap();
    assert_eq!(Priority::from_data(data).unwrap(), Priority::High);
}

#[test]
fn empty_enumeration_has_no_zero() {
    let empty = TypeDescriptor::Enum(Arc::new(EnumType::new("Never", Vec::<EnumMember>::new())));
    assert!(matches!(zero(&empty), Err(Error::UnsupportedType { .. })));
}

// ── Records ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Record)]
struct Address {
    street: String,
    number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Customer {
    name: String,
    address: Address,
    previous: Vec<Address>,
}

#[test]
fn record_zero_recurses_into_fields() {
    let data = zero(&Customer::descriptor()).unwrap();
    assert_eq!(
        Customer::from_data(data).unwrap(),
        Customer {
            name: String::new(),
            address: Address {
                street: String::new(),
                number: None,
            },
            previous: Vec::new(),
        }
    );
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Chain {
    next: Box<Chain>,
}

#[test]
fn required_self_reference_hits_the_depth_limit() {
    let err = zero_value(&Chain::descriptor(), Depth::new(16)).unwrap_err();
    assert!(matches!(err.innermost(), Error::DepthExceeded { limit: 16 }));
}
