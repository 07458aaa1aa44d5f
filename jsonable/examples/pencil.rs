//! Decodes a pencil from JSON text, prints it, and encodes it back.
//!
//! Run with `RUST_LOG=jsonable=debug` to see field resolution.

use anyhow::Context;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime, Utc};
use jsonable::{Enumeration, Error, Json, JsonMap, Record, codec};
use tracing::info;
use tracing_subscriber::EnvFilter;

const INPUT: &str =
    r#"{"name": "pencil", "color": 1, "price": "10.5", "create_time": "2022-08-08T18:54:24"}"#;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enumeration)]
enum Color {
    Black = 0,
    Blue = 1,
}

fn iso8601(at: &DateTime<Utc>) -> jsonable::Result<Json> {
    Ok(Json::String(at.format(FORMAT).to_string()))
}

fn parse_iso8601(json: Json) -> jsonable::Result<DateTime<Utc>> {
    let text = json
        .as_str()
        .ok_or_else(|| Error::json_mismatch("string", &json))?;
    NaiveDateTime::parse_from_str(text, FORMAT)
        .map(|at| at.and_utc())
        .map_err(Error::custom)
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Pencil {
    name: String,
    color: Color,
    price: BigDecimal,
    #[jsonable(name = "create_time", encoder = iso8601, decoder = parse_iso8601)]
    created_at: DateTime<Utc>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input: JsonMap = serde_json::from_str(INPUT).context("input is not a JSON object")?;
    let pencil: Pencil = codec::decode(&input)?;
    info!(name = %pencil.name, color = ?pencil.color, price = %pencil.price, "decoded");

    let output = serde_json::to_string(&codec::encode(&pencil)?)?;
    println!("{output}");
    Ok(())
}
