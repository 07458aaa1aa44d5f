use jsonable::naming::{candidate_keys, output_key};
use jsonable::{
    Data, Error, FieldDef, FieldOptions, Json, Record, RecordType, TypeDescriptor, codec,
};
use std::sync::{Arc, LazyLock};
use std::thread;

fn record_type() -> RecordType {
    RecordType::builder("Profile")
        .options(
            FieldOptions::new()
                .omitempty(true)
                .name_converter(jsonable::naming::pascal_case),
        )
        .field(FieldDef::of::<String>("user_name").options(FieldOptions::new().name("login")))
        .field(FieldDef::of::<i64>("age").options(FieldOptions::new().omitempty(false)))
        .field(FieldDef::of::<Vec<String>>("tags"))
        .build()
}

// ── Merge ────────────────────────────────────────────────────────

#[test]
fn field_options_override_class_options() {
    let ty = record_type();
    let age = ty.effective_options("age").unwrap();
    assert!(!age.omitempty());
    let tags = ty.effective_options("tags").unwrap();
    assert!(tags.omitempty());
    assert!(tags.name_converter.is_some());
}

#[test]
fn explicit_name_beats_converter_both_ways() {
    let ty = record_type();
    let options = ty.effective_options("user_name").unwrap();
    assert!(options.name_converter.is_some());
    assert_eq!(output_key("user_name", &options, None), "login");
    assert_eq!(candidate_keys("user_name", &options), vec!["login"]);
}

#[test]
fn converter_applies_without_a_name() {
    let ty = record_type();
    let options = ty.effective_options("tags").unwrap();
    assert_eq!(output_key("tags", &options, None), "Tags");
    assert_eq!(candidate_keys("tags", &options), vec!["Tags"]);
}

#[test]
fn unknown_fields_are_reported() {
    let ty = record_type();
    assert!(matches!(
        ty.effective_options("nope"),
        Err(Error::UnknownField { .. })
    ));
    assert!(ty.descriptor("nope").is_err());
}

#[test]
fn descriptors_come_from_the_declared_type() {
    let ty = record_type();
    assert_eq!(
        ty.descriptor("tags").unwrap(),
        &TypeDescriptor::list(TypeDescriptor::Str)
    );
    assert_eq!(ty.field_index("age"), Some(1));
}

// ── Caching ──────────────────────────────────────────────────────

#[test]
fn resolution_is_cached_and_idempotent() {
    let ty = record_type();
    let first = ty.effective_options("age").unwrap();
    let second = ty.effective_options("age").unwrap();
    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&first, &second));
}

static SHARED: LazyLock<RecordType> = LazyLock::new(record_type);

#[test]
fn concurrent_first_use_publishes_one_value() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| SHARED.effective_options("tags").unwrap()))
        .collect();
    let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for options in &resolved[1..] {
        assert!(Arc::ptr_eq(&resolved[0], options));
    }
}

#[derive(Debug, Clone, PartialEq, Record)]
#[jsonable(omitempty)]
struct Counter {
    hits: u64,
    #[jsonable(omitempty = false)]
    misses: u64,
}

#[test]
fn derived_records_cache_per_field() {
    let ty = Counter::record_type();
    assert!(std::ptr::eq(ty, Counter::record_type()));

    let hits = ty.effective_options("hits").unwrap();
    let misses = ty.effective_options("misses").unwrap();
    assert!(hits.omitempty());
    assert!(!misses.omitempty());
    assert!(Arc::ptr_eq(&hits, &ty.effective_options("hits").unwrap()));
}

#[test]
fn concurrent_encoding_agrees() {
    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            thread::spawn(move || {
                let counter = Counter { hits: i, misses: 0 };
                codec::encode(&counter).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let map = handle.join().unwrap();
        assert_eq!(map["misses"], Json::from(0));
        assert_eq!(map.contains_key("hits"), i != 0);
    }
}

// ── Emptiness ────────────────────────────────────────────────────

#[test]
fn tester_defaults_to_generic_emptiness() {
    let ty = record_type();
    let tags = ty.effective_options("tags").unwrap();
    assert!(tags.is_empty(&Data::List(Vec::new())));
    assert!(tags.omits(&Data::List(Vec::new())));

    let age = ty.effective_options("age").unwrap();
    assert!(age.is_empty(&Data::Int(0)));
    assert!(!age.omits(&Data::Int(0)));
}
