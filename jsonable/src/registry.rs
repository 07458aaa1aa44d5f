//! Type dispatch: descriptor in, encoder/decoder pair out.
//!
//! Resolution walks a descriptor once and captures every element codec in the
//! returned closure, so applying a resolved codec never looks anything up
//! again. The only exception is [`TypeDescriptor::Any`], which has nothing to
//! resolve until it sees a value.

use crate::{Data, Depth, Error, Json, JsonMap, Result, TypeDescriptor};
use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta, Utc};
use jsonable_types::EnumType;
use std::sync::Arc;

/// A resolved encoder: runtime value to portable value.
pub type EncodeFn = Arc<dyn Fn(&Data, Depth) -> Result<Json> + Send + Sync>;

/// A resolved decoder: portable value to runtime value.
pub type DecodeFn = Arc<dyn Fn(Json, Depth) -> Result<Data> + Send + Sync>;

fn encoder(f: impl Fn(&Data, Depth) -> Result<Json> + Send + Sync + 'static) -> EncodeFn {
    Arc::new(f)
}

fn decoder(f: impl Fn(Json, Depth) -> Result<Data> + Send + Sync + 'static) -> DecodeFn {
    Arc::new(f)
}

fn unsupported(descriptor: &TypeDescriptor, reason: &str) -> Error {
    Error::UnsupportedType {
        descriptor: descriptor.to_string(),
        reason: reason.to_owned(),
    }
}

fn check_key(key: &TypeDescriptor) -> Result<()> {
    match key {
        TypeDescriptor::Str | TypeDescriptor::Any => Ok(()),
        other => Err(Error::UnsupportedKeyType {
            found: other.kind(),
        }),
    }
}

fn nullable_inner(descriptor: &TypeDescriptor) -> Result<&TypeDescriptor> {
    descriptor
        .nullable_member()
        .ok_or_else(|| unsupported(descriptor, "only a union of one type with null is supported"))
}

/// Checks that `descriptor` is inside the supported set without building any
/// codec. Nested record types are checked when their own fields resolve.
pub fn validate(descriptor: &TypeDescriptor) -> Result<()> {
    match descriptor {
        TypeDescriptor::Optional(inner)
        | TypeDescriptor::List(inner)
        | TypeDescriptor::Set(inner)
        | TypeDescriptor::VarTuple(inner) => validate(inner),
        TypeDescriptor::Union(_) => validate(nullable_inner(descriptor)?),
        TypeDescriptor::Tuple(elements) => elements.iter().try_for_each(validate),
        TypeDescriptor::Map { key, value } => {
            check_key(key)?;
            validate(value)
        }
        _ => Ok(()),
    }
}

/// Encodes one value against a descriptor, resolving the encoder on the spot.
pub fn encode(descriptor: &TypeDescriptor, data: &Data) -> Result<Json> {
    resolve_encoder(descriptor)?(data, Depth::default())
}

/// Decodes one value against a descriptor, resolving the decoder on the spot.
pub fn decode(descriptor: &TypeDescriptor, json: Json) -> Result<Data> {
    resolve_decoder(descriptor)?(json, Depth::default())
}

// ── Encoders ─────────────────────────────────────────────────────

/// Returns the encoder for `descriptor`.
///
/// Fails with [`Error::UnsupportedType`] or [`Error::UnsupportedKeyType`] if
/// the descriptor, or any descriptor nested in it, is outside the supported
/// set.
pub fn resolve_encoder(descriptor: &TypeDescriptor) -> Result<EncodeFn> {
    let resolved = match descriptor {
        TypeDescriptor::Null => encoder(|data, _| match data {
            Data::Null => Ok(Json::Null),
            other => Err(Error::mismatch("null", other)),
        }),
        TypeDescriptor::Bool => encoder(|data, _| match data {
            Data::Bool(v) => Ok(Json::Bool(*v)),
            other => Err(Error::mismatch("bool", other)),
        }),
        TypeDescriptor::Int => encoder(|data, _| match data {
            Data::Int(v) => int_to_json(*v),
            other => Err(Error::mismatch("int", other)),
        }),
        TypeDescriptor::Float => encoder(|data, _| match data {
            Data::Float(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .ok_or_else(|| Error::InvalidValue {
                    kind: "float",
                    message: format!("{v} has no portable form"),
                }),
            other => Err(Error::mismatch("float", other)),
        }),
        TypeDescriptor::Str => encoder(|data, _| match data {
            Data::Str(v) => Ok(Json::String(v.clone())),
            other => Err(Error::mismatch("string", other)),
        }),
        TypeDescriptor::Decimal => encoder(|data, _| match data {
            Data::Decimal(v) => Ok(Json::String(v.to_string())),
            other => Err(Error::mismatch("decimal", other)),
        }),
        TypeDescriptor::Timestamp => encoder(|data, _| match data {
            Data::Timestamp(v) => Ok(Json::from(v.timestamp())),
            other => Err(Error::mismatch("timestamp", other)),
        }),
        TypeDescriptor::Duration => encoder(|data, _| match data {
            Data::Duration(v) => Ok(Json::from(v.num_seconds())),
            other => Err(Error::mismatch("duration", other)),
        }),
        TypeDescriptor::Enum(ty) => {
            let ty = Arc::clone(ty);
            encoder(move |data, _| match data {
                Data::Enum(v) if same_enum(v.enum_type(), &ty) => Ok(v.repr().to_json()),
                Data::Enum(v) => Err(Error::InvalidEnumValue {
                    enumeration: ty.name().to_owned(),
                    value: v.repr().to_json(),
                }),
                other => Err(Error::mismatch("enum", other)),
            })
        }
        TypeDescriptor::Optional(inner) => nullable_encoder(resolve_encoder(inner)?),
        TypeDescriptor::Union(_) => nullable_encoder(resolve_encoder(nullable_inner(descriptor)?)?),
        TypeDescriptor::List(element) => {
            let element = resolve_encoder(element)?;
            encoder(move |data, depth| match data {
                Data::List(items) => encode_items(&element, items, depth),
                other => Err(Error::mismatch("list", other)),
            })
        }
        TypeDescriptor::Set(element) => {
            let element = resolve_encoder(element)?;
            encoder(move |data, depth| match data {
                Data::Set(items) => encode_items(&element, items, depth),
                other => Err(Error::mismatch("set", other)),
            })
        }
        TypeDescriptor::VarTuple(element) => {
            let element = resolve_encoder(element)?;
            encoder(move |data, depth| match data {
                Data::Tuple(items) => encode_items(&element, items, depth),
                other => Err(Error::mismatch("tuple", other)),
            })
        }
        TypeDescriptor::Tuple(elements) => {
            let positions = elements
                .iter()
                .map(resolve_encoder)
                .collect::<Result<Vec<_>>>()?;
            encoder(move |data, depth| match data {
                Data::Tuple(items) => {
                    if items.len() != positions.len() {
                        return Err(Error::ArityMismatch {
                            expected: positions.len(),
                            actual: items.len(),
                        });
                    }
                    let depth = depth.descend()?;
                    items
                        .iter()
                        .zip(&positions)
                        .map(|(item, encode)| encode(item, depth))
                        .collect::<Result<Vec<_>>>()
                        .map(Json::Array)
                }
                other => Err(Error::mismatch("tuple", other)),
            })
        }
        TypeDescriptor::Map { key, value } => {
            check_key(key)?;
            let value = resolve_encoder(value)?;
            encoder(move |data, depth| match data {
                Data::Map(pairs) => {
                    let depth = depth.descend()?;
                    let mut out = JsonMap::new();
                    for (k, v) in pairs {
                        let Data::Str(k) = k else {
                            return Err(Error::UnsupportedKeyType { found: k.kind() });
                        };
                        out.insert(k.clone(), value(v, depth)?);
                    }
                    Ok(Json::Object(out))
                }
                other => Err(Error::mismatch("map", other)),
            })
        }
        TypeDescriptor::Record(nested) => {
            let nested = *nested;
            encoder(move |data, depth| match data {
                Data::Record(record) if record.nested_type() == nested => {
                    record.encode_nested(depth.descend()?).map(Json::Object)
                }
                Data::Record(record) => Err(Error::InvalidValue {
                    kind: "record",
                    message: format!(
                        "expected {}, found {}",
                        nested.name(),
                        record.nested_type().name()
                    ),
                }),
                other => Err(Error::mismatch("record", other)),
            })
        }
        TypeDescriptor::Any => encoder(|data, depth| {
            let concrete = resolve_encoder(&data.runtime_descriptor())?;
            concrete(data, depth)
        }),
    };
    Ok(resolved)
}

fn same_enum(a: &Arc<EnumType>, b: &Arc<EnumType>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

fn nullable_encoder(inner: EncodeFn) -> EncodeFn {
    encoder(move |data, depth| match data {
        Data::Null => Ok(Json::Null),
        other => inner(other, depth),
    })
}

fn encode_items(element: &EncodeFn, items: &[Data], depth: Depth) -> Result<Json> {
    let depth = depth.descend()?;
    items
        .iter()
        .map(|item| element(item, depth))
        .collect::<Result<Vec<_>>>()
        .map(Json::Array)
}

// ── Decoders ─────────────────────────────────────────────────────

/// Returns the decoder for `descriptor`. Fails exactly where
/// [`resolve_encoder`] fails.
pub fn resolve_decoder(descriptor: &TypeDescriptor) -> Result<DecodeFn> {
    let resolved = match descriptor {
        TypeDescriptor::Null => decoder(|json, _| match json {
            Json::Null => Ok(Data::Null),
            other => Err(Error::json_mismatch("null", &other)),
        }),
        TypeDescriptor::Bool => decoder(|json, _| match json {
            Json::Bool(v) => Ok(Data::Bool(v)),
            other => Err(Error::json_mismatch("bool", &other)),
        }),
        TypeDescriptor::Int => decoder(|json, _| int_from_json(&json).map(Data::Int)),
        TypeDescriptor::Float => decoder(|json, _| match &json {
            Json::Number(n) => n.as_f64().map(Data::Float).ok_or_else(|| Error::InvalidValue {
                kind: "float",
                message: format!("{n} is not representable"),
            }),
            other => Err(Error::json_mismatch("float", other)),
        }),
        TypeDescriptor::Str => decoder(|json, _| match json {
            Json::String(v) => Ok(Data::Str(v)),
            other => Err(Error::json_mismatch("string", &other)),
        }),
        TypeDescriptor::Decimal => {
            decoder(|json, _| decimal_from_json(&json).map(Data::Decimal))
        }
        TypeDescriptor::Timestamp => {
            decoder(|json, _| timestamp_from_json(&json).map(Data::Timestamp))
        }
        TypeDescriptor::Duration => decoder(|json, _| {
            let secs = int_from_json(&json)?;
            i64::try_from(secs)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .map(Data::Duration)
                .ok_or_else(|| Error::InvalidValue {
                    kind: "duration",
                    message: format!("{secs} seconds is out of range"),
                })
        }),
        TypeDescriptor::Enum(ty) => {
            let ty = Arc::clone(ty);
            decoder(move |json, _| ty.lookup(&json).map(Data::Enum))
        }
        TypeDescriptor::Optional(inner) => nullable_decoder(resolve_decoder(inner)?),
        TypeDescriptor::Union(_) => nullable_decoder(resolve_decoder(nullable_inner(descriptor)?)?),
        TypeDescriptor::List(element) => {
            let element = resolve_decoder(element)?;
            decoder(move |json, depth| decode_items(&element, json, depth).map(Data::List))
        }
        TypeDescriptor::Set(element) => {
            let element = resolve_decoder(element)?;
            decoder(move |json, depth| decode_items(&element, json, depth).map(Data::Set))
        }
        TypeDescriptor::VarTuple(element) => {
            let element = resolve_decoder(element)?;
            decoder(move |json, depth| decode_items(&element, json, depth).map(Data::Tuple))
        }
        TypeDescriptor::Tuple(elements) => {
            let positions = elements
                .iter()
                .map(resolve_decoder)
                .collect::<Result<Vec<_>>>()?;
            decoder(move |json, depth| match json {
                Json::Array(items) => {
                    if items.len() != positions.len() {
                        return Err(Error::ArityMismatch {
                            expected: positions.len(),
                            actual: items.len(),
                        });
                    }
                    let depth = depth.descend()?;
                    items
                        .into_iter()
                        .zip(&positions)
                        .map(|(item, decode)| decode(item, depth))
                        .collect::<Result<Vec<_>>>()
                        .map(Data::Tuple)
                }
                other => Err(Error::json_mismatch("array", &other)),
            })
        }
        TypeDescriptor::Map { key, value } => {
            check_key(key)?;
            let value = resolve_decoder(value)?;
            decoder(move |json, depth| match json {
                Json::Object(entries) => {
                    let depth = depth.descend()?;
                    entries
                        .into_iter()
                        .map(|(k, v)| Ok((Data::Str(k), value(v, depth)?)))
                        .collect::<Result<Vec<_>>>()
                        .map(Data::Map)
                }
                other => Err(Error::json_mismatch("object", &other)),
            })
        }
        TypeDescriptor::Record(nested) => {
            let nested = *nested;
            decoder(move |json, depth| match json {
                Json::Object(map) => nested.decode(&map, depth.descend()?),
                other => Err(Error::json_mismatch("object", &other)),
            })
        }
        TypeDescriptor::Any => decoder(decode_dynamic),
    };
    Ok(resolved)
}

fn nullable_decoder(inner: DecodeFn) -> DecodeFn {
    decoder(move |json, depth| match json {
        Json::Null => Ok(Data::Null),
        other => inner(other, depth),
    })
}

fn decode_items(element: &DecodeFn, json: Json, depth: Depth) -> Result<Vec<Data>> {
    match json {
        Json::Array(items) => {
            let depth = depth.descend()?;
            items.into_iter().map(|item| element(item, depth)).collect()
        }
        other => Err(Error::json_mismatch("array", &other)),
    }
}

/// Decodes a value with no declared type, following the kind the upstream
/// parser already assigned.
pub fn decode_dynamic(json: Json, depth: Depth) -> Result<Data> {
    Ok(match json {
        Json::Null => Data::Null,
        Json::Bool(v) => Data::Bool(v),
        Json::Number(n) => match json_int(&n) {
            Some(v) => Data::Int(v),
            None => Data::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(v) => Data::Str(v),
        Json::Array(items) => {
            let depth = depth.descend()?;
            Data::List(
                items
                    .into_iter()
                    .map(|item| decode_dynamic(item, depth))
                    .collect::<Result<_>>()?,
            )
        }
        Json::Object(entries) => {
            let depth = depth.descend()?;
            Data::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((Data::Str(k), decode_dynamic(v, depth)?)))
                    .collect::<Result<_>>()?,
            )
        }
    })
}

fn json_int(n: &serde_json::Number) -> Option<i128> {
    n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from))
}

fn int_from_json(json: &Json) -> Result<i128> {
    match json {
        Json::Number(n) if n.is_f64() => Err(Error::json_mismatch("int", json)),
        Json::Number(n) => json_int(n).ok_or_else(|| Error::InvalidValue {
            kind: "int",
            message: format!("{n} is out of range"),
        }),
        other => Err(Error::json_mismatch("int", other)),
    }
}

/// Portable numbers span `i64::MIN..=u64::MAX`.
fn int_to_json(v: i128) -> Result<Json> {
    if let Ok(v) = i64::try_from(v) {
        return Ok(Json::from(v));
    }
    u64::try_from(v).map(Json::from).map_err(|_| Error::InvalidValue {
        kind: "int",
        message: format!("{v} is out of range"),
    })
}

fn decimal_from_json(json: &Json) -> Result<BigDecimal> {
    let text = match json {
        Json::String(s) => s.trim().to_owned(),
        Json::Number(n) => n.to_string(),
        other => return Err(Error::json_mismatch("decimal", other)),
    };
    text.parse::<BigDecimal>().map_err(|e| Error::InvalidValue {
        kind: "decimal",
        message: format!("{text:?}: {e}"),
    })
}

/// Whole seconds since the Unix epoch, as an integer, an integral float or a
/// numeric string.
#[allow(clippy::cast_possible_truncation)]
fn timestamp_from_json(json: &Json) -> Result<DateTime<Utc>> {
    let secs = match json {
        Json::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Json::String(s) => s.trim().parse::<i64>().ok(),
        other => return Err(Error::json_mismatch("timestamp", other)),
    };
    let secs = secs.ok_or_else(|| Error::InvalidValue {
        kind: "timestamp",
        message: format!("{json} is not a whole number of seconds"),
    })?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::InvalidValue {
        kind: "timestamp",
        message: format!("{secs} seconds is out of range"),
    })
}
