//! The portable value model.
//!
//! Encoding produces, and decoding consumes, plain `serde_json` values. The
//! workspace enables `preserve_order`, so a [`JsonMap`] keeps the insertion
//! order the record codec writes fields in.

/// A portable value.
pub type Json = serde_json::Value;

/// A string-keyed map of portable values.
pub type JsonMap = serde_json::Map<String, Json>;

/// Names the kind of a portable value for diagnostics.
pub fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(n) if n.is_f64() => "float",
        Json::Number(_) => "int",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
