//! The record codec: records to maps and back, one field at a time.
//!
//! Encoding, per field in declaration order: skip `skip`, drop values
//! `omitempty` calls empty, pick the output key, then run the custom encoder
//! or the dispatched one.
//!
//! Decoding, per field: skip `skip`, take the first candidate key present in
//! the map (remembering which), fall back to `default_before_decoding`, treat
//! a raw value `omitempty` calls empty as absent, run `before_decoder`, then
//! the custom decoder or the dispatched one. Fields still without a value are
//! filled by the class-level default factory, if any, unless they declare a
//! default of their own.

use crate::options::EffectiveOptions;
use crate::record::{DefaultFactory, FieldValues, Origin, Record, RecordType};
use crate::{CodecConfig, Data, Depth, Json, JsonMap, Result, naming, registry, zero_value};
use std::collections::HashMap;
use tracing::trace;

/// Encodes a record with the default configuration.
pub fn encode<R: Record>(record: &R) -> Result<JsonMap> {
    encode_with(record, &CodecConfig::default())
}

pub fn encode_with<R: Record>(record: &R, config: &CodecConfig) -> Result<JsonMap> {
    encode_within(record, config.depth())
}

/// Encodes a record nested at `depth`.
pub fn encode_within<R: Record>(record: &R, depth: Depth) -> Result<JsonMap> {
    let ty = R::record_type();
    let values = record.to_fields();
    let origin = record.origin();
    let mut out = JsonMap::new();

    for (index, (field, value)) in ty.fields().iter().zip(&values).enumerate() {
        let options = ty.options_at(index);
        if options.skip() || options.omits(value) {
            continue;
        }
        let chosen = origin.and_then(|o| o.chosen_key(field.name()));
        let key = naming::output_key(field.name(), &options, chosen);
        let json = encode_field(ty, index, &options, value, depth)
            .map_err(|e| e.in_field(ty.name(), field.name()))?;
        out.insert(key, json);
    }
    Ok(out)
}

fn encode_field(
    ty: &RecordType,
    index: usize,
    options: &EffectiveOptions,
    value: &Data,
    depth: Depth,
) -> Result<Json> {
    match &options.encoder {
        Some(encode) => encode(value),
        None => ty.encoder_at(index)?(value, depth),
    }
}

/// Decodes a record with the default configuration.
pub fn decode<R: Record>(map: &JsonMap) -> Result<R> {
    decode_with(map, &CodecConfig::default())
}

pub fn decode_with<R: Record>(map: &JsonMap, config: &CodecConfig) -> Result<R> {
    decode_within(map, config.depth())
}

/// Decodes a record nested at `depth`.
pub fn decode_within<R: Record>(map: &JsonMap, depth: Depth) -> Result<R> {
    decode_fields(map, depth, R::record_type().default_factory())
}

/// Decodes a record, zero-filling every field that ends up without a value
/// and declares no default, whatever the record's own default factory.
///
/// This is how the zero instance of a nested record is built.
pub fn decode_zeroed<R: Record>(map: &JsonMap, depth: Depth) -> Result<R> {
    decode_fields(map, depth, Some(zero_value as DefaultFactory))
}

fn decode_fields<R: Record>(
    map: &JsonMap,
    depth: Depth,
    factory: Option<DefaultFactory>,
) -> Result<R> {
    let ty = R::record_type();
    let mut values = Vec::with_capacity(ty.fields().len());
    let mut chosen = HashMap::new();

    for (index, field) in ty.fields().iter().enumerate() {
        let options = ty.options_at(index);
        if options.skip() {
            values.push(None);
            continue;
        }
        let value = decode_field(ty, index, &options, map, depth, &mut chosen)
            .map_err(|e| e.in_field(ty.name(), field.name()))?;
        values.push(value);
    }

    if let Some(factory) = factory {
        for (index, field) in ty.fields().iter().enumerate() {
            if values[index].is_some() || field.has_default() {
                continue;
            }
            trace!(record = ty.name(), field = field.name(), "filling from default factory");
            let value = factory(ty.descriptor_at(index), depth)
                .map_err(|e| e.in_field(ty.name(), field.name()))?;
            values[index] = Some(value);
        }
    }

    let origin = if R::KEEPS_ORIGIN {
        Origin::new(map.clone(), chosen)
    } else {
        Origin::default()
    };
    R::from_fields(FieldValues::new(ty, values, origin))
}

fn decode_field(
    ty: &RecordType,
    index: usize,
    options: &EffectiveOptions,
    map: &JsonMap,
    depth: Depth,
    chosen: &mut HashMap<&'static str, String>,
) -> Result<Option<Data>> {
    let field = &ty.fields()[index];
    let candidates = naming::candidate_keys(field.name(), options);
    let found = candidates
        .into_iter()
        .find_map(|key| map.get(&key).map(|value| (key, value)));

    let raw = match (found, &options.default_before_decoding) {
        (Some((key, value)), _) => {
            trace!(record = ty.name(), field = field.name(), key = %key, "matched key");
            chosen.insert(field.name(), key);
            value.clone()
        }
        (None, Some(default)) => {
            trace!(record = ty.name(), field = field.name(), "substituting default_before_decoding");
            default.clone()
        }
        (None, None) => return Ok(None),
    };

    if options.omitempty() && options.is_empty(&registry::decode_dynamic(raw.clone(), depth)?) {
        return Ok(None);
    }

    let raw = match &options.before_decoder {
        Some(hook) => hook(raw)?,
        None => raw,
    };

    let value = match &options.decoder {
        Some(decode) => decode(raw)?,
        None => ty.decoder_at(index)?(raw, depth)?,
    };
    Ok(Some(value))
}
