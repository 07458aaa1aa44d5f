use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta};
use jsonable::registry::{self, resolve_decoder, resolve_encoder, validate};
use jsonable::{Data, Depth, EnumMember, EnumType, Error, Json, TypeDescriptor};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn color() -> Arc<EnumType> {
    Arc::new(EnumType::new(
        "Color",
        vec![EnumMember::int("BLACK", 0), EnumMember::int("BLUE", 1)],
    ))
}

fn round_trip(descriptor: &TypeDescriptor, data: Data) -> (Json, Data) {
    let json = registry::encode(descriptor, &data).unwrap();
    let back = registry::decode(descriptor, json.clone()).unwrap();
    (json, back)
}

// ── Primitives ───────────────────────────────────────────────────

#[test]
fn primitives_map_to_themselves() {
    assert_eq!(registry::encode(&TypeDescriptor::Bool, &Data::Bool(true)).unwrap(), json!(true));
    assert_eq!(registry::encode(&TypeDescriptor::Int, &Data::Int(-3)).unwrap(), json!(-3));
    assert_eq!(registry::encode(&TypeDescriptor::Float, &Data::Float(1.5)).unwrap(), json!(1.5));
    assert_eq!(registry::encode(&TypeDescriptor::Str, &Data::from("x")).unwrap(), json!("x"));
    assert_eq!(registry::encode(&TypeDescriptor::Null, &Data::Null).unwrap(), json!(null));
}

#[test]
fn float_decoder_accepts_integer_literals() {
    assert_eq!(
        registry::decode(&TypeDescriptor::Float, json!(2)).unwrap(),
        Data::Float(2.0)
    );
}

#[test]
fn non_finite_floats_have_no_portable_form() {
    let err = registry::encode(&TypeDescriptor::Float, &Data::Float(f64::NAN)).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { kind: "float", .. }));
}

#[test]
fn decimal_uses_canonical_string() {
    let price: BigDecimal = "10.5".parse().unwrap();
    let (json, back) = round_trip(&TypeDescriptor::Decimal, Data::Decimal(price.clone()));
    assert_eq!(json, json!("10.5"));
    assert_eq!(back, Data::Decimal(price));
}

#[test]
fn decimal_decodes_numeric_literals() {
    assert_eq!(
        registry::decode(&TypeDescriptor::Decimal, json!(10.5)).unwrap(),
        Data::Decimal("10.5".parse().unwrap())
    );
}

#[test]
fn timestamp_is_epoch_seconds() {
    let at = DateTime::from_timestamp(1_659_984_864, 0).unwrap();
    let (json, back) = round_trip(&TypeDescriptor::Timestamp, Data::Timestamp(at));
    assert_eq!(json, json!(1_659_984_864));
    assert_eq!(back, Data::Timestamp(at));
}

#[test]
fn duration_is_whole_seconds() {
    let (json, back) = round_trip(
        &TypeDescriptor::Duration,
        Data::Duration(TimeDelta::seconds(90)),
    );
    assert_eq!(json, json!(90));
    assert_eq!(back, Data::Duration(TimeDelta::seconds(90)));
}

#[test]
fn strict_kinds() {
    let err = registry::decode(&TypeDescriptor::Str, json!(1)).unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch {
            expected: "string",
            found: "int"
        }
    ));
    let err = registry::encode(&TypeDescriptor::Int, &Data::from("1")).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { expected: "int", .. }));
}

// ── Enumerations ─────────────────────────────────────────────────

#[test]
fn enum_encodes_representation() {
    let ty = color();
    let descriptor = TypeDescriptor::Enum(ty.clone());
    let blue = jsonable::EnumValue::new(ty, 1).unwrap();
    let (json, back) = round_trip(&descriptor, Data::Enum(blue.clone()));
    assert_eq!(json, json!(1));
    assert_eq!(back, Data::Enum(blue));
}

#[test]
fn enum_rejects_unknown_representation() {
    let err = registry::decode(&TypeDescriptor::Enum(color()), json!(9)).unwrap_err();
    assert!(matches!(err, Error::InvalidEnumValue { .. }));
}

#[test]
fn string_enums() {
    let ty = Arc::new(EnumType::new(
        "Size",
        vec![EnumMember::string("SMALL", "s"), EnumMember::string("LARGE", "l")],
    ));
    let descriptor = TypeDescriptor::Enum(ty.clone());
    let data = registry::decode(&descriptor, json!("l")).unwrap();
    assert_eq!(data, Data::Enum(jsonable::EnumValue::new(ty, 1).unwrap()));
    assert_eq!(registry::encode(&descriptor, &data).unwrap(), json!("l"));
}

// ── Containers ───────────────────────────────────────────────────

#[test]
fn list_of_optional_ints() {
    let descriptor = TypeDescriptor::list(TypeDescriptor::optional(TypeDescriptor::Int));
    let data = Data::List(vec![Data::Int(1), Data::Null, Data::Int(3)]);
    let (json, back) = round_trip(&descriptor, data.clone());
    assert_eq!(json, json!([1, null, 3]));
    assert_eq!(back, data);
}

#[test]
fn nullable_union_behaves_as_optional() {
    let descriptor = TypeDescriptor::Union(vec![TypeDescriptor::Null, TypeDescriptor::Str]);
    assert_eq!(registry::encode(&descriptor, &Data::Null).unwrap(), json!(null));
    assert_eq!(
        registry::decode(&descriptor, json!("a")).unwrap(),
        Data::from("a")
    );
}

#[test]
fn wider_unions_are_unsupported() {
    let descriptor = TypeDescriptor::Union(vec![TypeDescriptor::Int, TypeDescriptor::Str]);
    assert!(matches!(
        resolve_encoder(&descriptor),
        Err(Error::UnsupportedType { .. })
    ));
    assert!(matches!(
        resolve_decoder(&descriptor),
        Err(Error::UnsupportedType { .. })
    ));
}

#[test]
fn unsupported_element_fails_at_resolution() {
    let descriptor = TypeDescriptor::list(TypeDescriptor::Union(vec![
        TypeDescriptor::Int,
        TypeDescriptor::Float,
    ]));
    let err = resolve_encoder(&descriptor).err().unwrap();
    match err {
        Error::UnsupportedType { descriptor, .. } => assert_eq!(descriptor, "union<int, float>"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(validate(&descriptor).is_err());
}

#[test]
fn fixed_tuple_positions() {
    let descriptor = TypeDescriptor::Tuple(vec![TypeDescriptor::Str, TypeDescriptor::Timestamp]);
    let at = DateTime::from_timestamp(60, 0).unwrap();
    let data = Data::Tuple(vec![Data::from("a"), Data::Timestamp(at)]);
    let (json, back) = round_trip(&descriptor, data.clone());
    assert_eq!(json, json!(["a", 60]));
    assert_eq!(back, data);
}

#[test]
fn fixed_tuple_arity_is_checked_both_ways() {
    let descriptor = TypeDescriptor::Tuple(vec![TypeDescriptor::Int, TypeDescriptor::Int]);
    let err = registry::decode(&descriptor, json!([1, 2, 3])).unwrap_err();
    assert!(matches!(
        err,
        Error::ArityMismatch {
            expected: 2,
            actual: 3
        }
    ));
    let err = registry::encode(&descriptor, &Data::Tuple(vec![Data::Int(1)])).unwrap_err();
    assert!(matches!(
        err,
        Error::ArityMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn variadic_tuple_takes_any_length() {
    let descriptor = TypeDescriptor::var_tuple(TypeDescriptor::Int);
    let (json, _) = round_trip(&descriptor, Data::Tuple(vec![Data::Int(1); 4]));
    assert_eq!(json, json!([1, 1, 1, 1]));
}

#[test]
fn sets_decode_as_sets() {
    let descriptor = TypeDescriptor::set(TypeDescriptor::Str);
    let data = registry::decode(&descriptor, json!(["a", "b"])).unwrap();
    assert_eq!(data, Data::Set(vec![Data::from("b"), Data::from("a")]));
}

#[test]
fn string_keyed_map() {
    let descriptor = TypeDescriptor::map(TypeDescriptor::Str, TypeDescriptor::Int);
    let data = Data::Map(vec![(Data::from("a"), Data::Int(1))]);
    let (json, back) = round_trip(&descriptor, data.clone());
    assert_eq!(json, json!({"a": 1}));
    assert_eq!(back, data);
}

#[test]
fn declared_non_string_keys_are_rejected() {
    let descriptor = TypeDescriptor::map(TypeDescriptor::Int, TypeDescriptor::Str);
    assert!(matches!(
        resolve_encoder(&descriptor),
        Err(Error::UnsupportedKeyType { found: "int" })
    ));
}

#[test]
fn runtime_non_string_keys_are_rejected() {
    let descriptor = TypeDescriptor::map(TypeDescriptor::Any, TypeDescriptor::Int);
    let data = Data::Map(vec![(Data::Int(1), Data::Int(1))]);
    let err = registry::encode(&descriptor, &data).unwrap_err();
    assert!(matches!(err, Error::UnsupportedKeyType { found: "int" }));
}

// ── Dynamic values ───────────────────────────────────────────────

#[test]
fn any_dispatches_on_runtime_value() {
    let at = DateTime::from_timestamp(5, 0).unwrap();
    let data = Data::List(vec![
        Data::Int(1),
        Data::from("two"),
        Data::Timestamp(at),
        Data::Map(vec![(Data::from("k"), Data::Bool(true))]),
    ]);
    assert_eq!(
        registry::encode(&TypeDescriptor::Any, &data).unwrap(),
        json!([1, "two", 5, {"k": true}])
    );
}

#[test]
fn any_decodes_by_json_kind() {
    let data = registry::decode(&TypeDescriptor::Any, json!({"a": [1, 2.5, null]})).unwrap();
    assert_eq!(
        data,
        Data::Map(vec![(
            Data::from("a"),
            Data::List(vec![Data::Int(1), Data::Float(2.5), Data::Null])
        )])
    );
}

// ── Depth ────────────────────────────────────────────────────────

#[test]
fn nesting_beyond_the_limit_fails() {
    let descriptor = TypeDescriptor::list(TypeDescriptor::list(TypeDescriptor::Int));
    let decode = resolve_decoder(&descriptor).unwrap();
    assert!(decode(json!([[1]]), Depth::new(2)).is_ok());
    assert!(matches!(
        decode(json!([[1]]), Depth::new(1)),
        Err(Error::DepthExceeded { limit: 1 })
    ));
}

#[test]
fn dynamic_nesting_is_bounded() {
    let mut deep = json!(1);
    for _ in 0..10 {
        deep = json!([deep]);
    }
    assert!(registry::decode_dynamic(deep.clone(), Depth::new(10)).is_ok());
    assert!(registry::decode_dynamic(deep, Depth::new(9)).is_err());
}
