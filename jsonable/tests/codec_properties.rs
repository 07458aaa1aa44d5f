//! Property-based tests for the record codec.
//!
//! - Round-trip: decode(encode(x)) == x for every supported field kind
//! - Precedence: an explicit name beats any name transform in both directions
//! - Omission: omitted fields never appear in the encoded map

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeDelta, Utc};
use jsonable::naming::{candidate_keys, output_key};
use jsonable::{Enumeration, FieldOptions, Record, codec};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// FIXTURES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enumeration)]
enum Mood {
    Calm = 0,
    Busy = 1,
    #[jsonable(value = "away")]
    Away,
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Inner {
    id: i64,
    mood: Mood,
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Everything {
    flag: bool,
    small: i32,
    big: i64,
    ratio: f64,
    text: String,
    price: BigDecimal,
    at: DateTime<Utc>,
    wait: TimeDelta,
    mood: Mood,
    maybe: Option<String>,
    list: Vec<i64>,
    set: BTreeSet<String>,
    pair: (String, bool),
    spread: Box<[u8]>,
    map: BTreeMap<String, Inner>,
    inner: Inner,
    nested: Vec<Option<Inner>>,
}

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn mood_strategy() -> impl Strategy<Value = Mood> {
    prop_oneof![Just(Mood::Calm), Just(Mood::Busy), Just(Mood::Away)]
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 _-]{0,24}").unwrap()
}

fn inner_strategy() -> impl Strategy<Value = Inner> {
    (any::<i64>(), mood_strategy()).prop_map(|(id, mood)| Inner { id, mood })
}

fn decimal_strategy() -> impl Strategy<Value = BigDecimal> {
    (any::<i64>(), 0i64..8).prop_map(|(digits, scale)| BigDecimal::new(digits.into(), scale))
}

fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (-62_135_596_800i64..253_402_300_799).prop_map(|secs| {
        DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    })
}

fn finite_float() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::ZERO
}

prop_compose! {
    fn everything_strategy()(
        (flag, small, big, ratio) in (any::<bool>(), any::<i32>(), any::<i64>(), finite_float()),
        (text, price, at, wait) in (
            text_strategy(),
            decimal_strategy(),
            timestamp_strategy(),
            -1_000_000_000i64..1_000_000_000,
        ),
        (mood, maybe, list, set) in (
            mood_strategy(),
            prop::option::of(text_strategy()),
            prop::collection::vec(any::<i64>(), 0..8),
            prop::collection::btree_set(text_strategy(), 0..5),
        ),
        (pair, spread, map) in (
            (text_strategy(), any::<bool>()),
            prop::collection::vec(any::<u8>(), 0..6),
            prop::collection::btree_map(text_strategy(), inner_strategy(), 0..4),
        ),
        (inner, nested) in (
            inner_strategy(),
            prop::collection::vec(prop::option::of(inner_strategy()), 0..4),
        ),
    ) -> Everything {
        Everything {
            flag,
            small,
            big,
            ratio,
            text,
            price,
            at,
            wait: TimeDelta::seconds(wait),
            mood,
            maybe,
            list,
            set,
            pair,
            spread: spread.into_boxed_slice(),
            map,
            inner,
            nested,
        }
    }
}

// =============================================================================
// ROUND-TRIP PROPERTIES
// =============================================================================

mod round_trip_properties {
    use super::*;

    proptest! {
        #[test]
        fn decode_inverts_encode(value in everything_strategy()) {
            let map = codec::encode(&value).unwrap();
            let back: Everything = codec::decode(&map).unwrap();
            prop_assert_eq!(back, value);
        }

        #[test]
        fn encoding_is_deterministic(value in everything_strategy()) {
            let first = codec::encode(&value).unwrap();
            let second = codec::encode(&value).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

// =============================================================================
// OPTION PROPERTIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Record)]
#[jsonable(omitempty)]
struct Counts {
    count: i64,
    label: String,
    items: Vec<i64>,
}

mod option_properties {
    use super::*;

    proptest! {
        #[test]
        fn explicit_name_beats_transforms(
            field in "[a-z_]{1,12}",
            name in "[A-Za-z]{1,12}",
        ) {
            let options = FieldOptions::new()
                .name(name.clone())
                .name_converter(jsonable::naming::camel_case)
                .name_inverter(|n: &str| n.to_uppercase());
            prop_assert_eq!(output_key(&field, &options, None), name.clone());
            prop_assert_eq!(candidate_keys(&field, &options), vec![name]);
        }

        #[test]
        fn omitted_fields_never_appear(
            count in prop_oneof![Just(0i64), any::<i64>()],
            label in prop_oneof![Just(String::new()), text_strategy()],
            items in prop::collection::vec(any::<i64>(), 0..3),
        ) {
            let value = Counts { count, label: label.clone(), items: items.clone() };
            let map = codec::encode(&value).unwrap();
            prop_assert_eq!(map.contains_key("count"), count != 0);
            prop_assert_eq!(map.contains_key("label"), !label.is_empty());
            prop_assert_eq!(map.contains_key("items"), !items.is_empty());
        }

        #[test]
        fn option_resolution_is_idempotent(field in prop_oneof![
            Just("count"),
            Just("label"),
            Just("items"),
        ]) {
            let ty = Counts::record_type();
            let first = ty.effective_options(field).unwrap();
            let second = ty.effective_options(field).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(std::sync::Arc::ptr_eq(&first, &second));
        }
    }
}
