//! Conversion between Rust records and portable JSON maps, driven by
//! per-field options.
//!
//! A record declares its fields once, usually through `#[derive(Record)]`.
//! Each field's declared type selects an encoder/decoder pair from the
//! [`registry`]; its options decide the key it is written under and read
//! from, whether it is omitted, how missing values are filled, and whether a
//! custom codec replaces the dispatched one.
//!
//! ```
//! use jsonable::{Record, codec};
//!
//! #[derive(Debug, Clone, PartialEq, Record)]
//! struct Book {
//!     title: String,
//!     #[jsonable(name = "pageCount", omitempty)]
//!     pages: u32,
//! }
//!
//! let book = Book { title: "Dune".into(), pages: 0 };
//! let map = codec::encode(&book).unwrap();
//! assert_eq!(serde_json::Value::Object(map.clone()), serde_json::json!({"title": "Dune"}));
//!
//! let err = codec::decode::<Book>(&map).unwrap_err();
//! assert!(matches!(err.innermost(), jsonable::Error::MissingRequiredField { .. }));
//! ```

extern crate self as jsonable;

pub mod codec;
pub mod config;
pub mod naming;
pub mod options;
pub mod record;
pub mod registry;
pub mod zero;

pub use config::CodecConfig;
pub use options::{EffectiveOptions, FieldOptions};
pub use record::{DefaultFactory, FieldDef, FieldValues, Origin, Record, RecordType};
pub use zero::{zero, zero_value};

pub use jsonable_derive::{Enumeration, Record};
pub use jsonable_types::*;
