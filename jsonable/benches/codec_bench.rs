use criterion::{Criterion, black_box, criterion_group, criterion_main};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use jsonable::{Enumeration, JsonMap, Record, codec};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Fixture records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enumeration)]
enum Color {
    Black = 0,
    Blue = 1,
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Pencil {
    name: String,
    color: Color,
    price: BigDecimal,
    #[jsonable(name = "create_time")]
    created_at: DateTime<Utc>,
    #[jsonable(omitempty)]
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Record)]
#[jsonable(name_converter = jsonable::naming::camel_case)]
struct Inventory {
    shop_name: String,
    pencils: Vec<Pencil>,
    by_sku: BTreeMap<String, Pencil>,
}

fn pencil(i: usize) -> Pencil {
    Pencil {
        name: format!("pencil-{i}"),
        color: if i % 2 == 0 { Color::Black } else { Color::Blue },
        price: BigDecimal::new((1050 + i as i64).into(), 2),
        created_at: DateTime::from_timestamp(1_659_984_864 + i as i64, 0).unwrap_or_default(),
        tags: Vec::new(),
    }
}

fn inventory(n: usize) -> Inventory {
    Inventory {
        shop_name: "stationery".into(),
        pencils: (0..n).map(pencil).collect(),
        by_sku: (0..n).map(|i| (format!("sku-{i}"), pencil(i))).collect(),
    }
}

// ---------------------------------------------------------------------------
// Single record
// ---------------------------------------------------------------------------

fn bench_encode_pencil(c: &mut Criterion) {
    let value = pencil(1);
    c.bench_function("encode_pencil", |b| {
        b.iter(|| black_box(codec::encode(black_box(&value)).unwrap()));
    });
}

fn bench_decode_pencil(c: &mut Criterion) {
    let map = codec::encode(&pencil(1)).unwrap();
    c.bench_function("decode_pencil", |b| {
        b.iter(|| black_box(codec::decode::<Pencil>(black_box(&map)).unwrap()));
    });
}

// ---------------------------------------------------------------------------
// Nested containers
// ---------------------------------------------------------------------------

fn bench_encode_inventory_100(c: &mut Criterion) {
    let value = inventory(100);
    c.bench_function("encode_inventory_100", |b| {
        b.iter(|| black_box(codec::encode(black_box(&value)).unwrap()));
    });
}

fn bench_decode_inventory_100(c: &mut Criterion) {
    let map: JsonMap = codec::encode(&inventory(100)).unwrap();
    c.bench_function("decode_inventory_100", |b| {
        b.iter(|| black_box(codec::decode::<Inventory>(black_box(&map)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_encode_pencil,
    bench_decode_pencil,
    bench_encode_inventory_100,
    bench_decode_inventory_100,
);
criterion_main!(benches);
