//! Tick feeds: CSV ingestion and synthetic generation
//!
//! CSV rows are `symbol,timestamp_ns,price,volume,side` with a header
//! row; prices arrive as decimal currency and are scaled to fixed point
//! on load. The synthetic feed is a seeded random walk, so the same seed
//! always produces the same stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;
use types::ids::Timestamp;
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::tick::{Symbol, Tick};

/// Failures while loading a tick file.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to read tick file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed tick row: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown side {side:?} in record {record}")]
    UnknownSide { record: u64, side: String },
}

/// One CSV row before scaling.
#[derive(Debug, Deserialize)]
struct TickRow {
    symbol: String,
    timestamp: u64,
    price: f64,
    volume: i64,
    side: String,
}

/// Load a tick stream from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<Tick>, FeedError> {
    let file = std::fs::File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut ticks = Vec::new();
    for (record, row) in reader.deserialize().enumerate() {
        let row: TickRow = row?;
        let side = match row.side.as_str() {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            other => {
                return Err(FeedError::UnknownSide {
                    record: record as u64 + 1,
                    side: other.to_string(),
                })
            }
        };
        ticks.push(Tick {
            symbol: Symbol::new(row.symbol),
            price: Price::from_f64(row.price),
            volume: Quantity::new(row.volume),
            timestamp: row.timestamp,
            side,
        });
    }
    Ok(ticks)
}

/// Load from CSV, falling back to `count` synthetic ticks when the file
/// cannot be read or parsed.
pub fn load_or_synthetic(path: &Path, count: usize, seed: u64) -> Vec<Tick> {
    match load_csv(path) {
        Ok(ticks) => ticks,
        Err(err) => {
            warn!(error = %err, path = %path.display(), "falling back to synthetic ticks");
            synthetic_walk(count, seed)
        }
    }
}

/// Seeded random walk: single symbol, base price $100.0000, price steps
/// within ±0.1%, volumes 100–1000, one tick per millisecond.
pub fn synthetic_walk(count: usize, seed: u64) -> Vec<Tick> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let symbol = Symbol::new("AAPL");
    let mut price: i64 = 1_000_000;
    let mut timestamp: Timestamp = 1_700_000_000_000_000_000;

    let mut ticks = Vec::with_capacity(count);
    for _ in 0..count {
        let drift: f64 = rng.gen_range(-0.001..0.001);
        price += (drift * price as f64) as i64;

        ticks.push(Tick {
            symbol: symbol.clone(),
            price: Price::from_raw(price),
            volume: Quantity::new(rng.gen_range(100..=1_000)),
            timestamp,
            side: if rng.gen_bool(0.5) {
                Side::Buy
            } else {
                Side::Sell
            },
        });
        timestamp += 1_000_000;
    }
    ticks
}
