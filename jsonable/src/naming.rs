//! Key resolution for encoding and decoding.
//!
//! Precedence, strongest first: `name`, `name_choice`, `name_inverter`
//! (decoding only), `name_converter`, the declared field name.

use crate::FieldOptions;
use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// The key a field is written under.
///
/// `chosen` is the key a `name_choice` field matched when the instance was
/// decoded; it is reused so that re-encoding keeps the input's key. Without
/// it the first candidate is used.
pub fn output_key(field: &str, options: &FieldOptions, chosen: Option<&str>) -> String {
    if let Some(name) = &options.name {
        return name.clone();
    }
    if let Some(choices) = &options.name_choice {
        return match chosen {
            Some(key) => key.to_owned(),
            None => choices.first().map_or_else(|| field.to_owned(), Clone::clone),
        };
    }
    if let Some(convert) = &options.name_converter {
        return convert(field);
    }
    field.to_owned()
}

/// The keys tried, in order, when a field is decoded.
pub fn candidate_keys(field: &str, options: &FieldOptions) -> Vec<String> {
    if let Some(name) = &options.name {
        return vec![name.clone()];
    }
    if let Some(choices) = &options.name_choice {
        let mut keys = choices.clone();
        if !keys.iter().any(|k| k == field) {
            keys.push(field.to_owned());
        }
        return keys;
    }
    if let Some(invert) = &options.name_inverter {
        return vec![invert(field)];
    }
    if let Some(convert) = &options.name_converter {
        return vec![convert(field)];
    }
    vec![field.to_owned()]
}

/// `created_at` → `createdAt`.
pub fn camel_case(name: &str) -> String {
    name.to_lower_camel_case()
}

/// `created_at` → `CreatedAt`.
pub fn pascal_case(name: &str) -> String {
    name.to_upper_camel_case()
}
