//! Backtest driver library
//!
//! Everything around the matching core: tick feeds (CSV and synthetic)
//! and the example strategies. The binary in `main.rs` wires these into
//! a [`matching_engine::TickEngine`] run.
//!
//! # Modules
//! - `feed` — CSV ingestion and the seeded synthetic tick generator
//! - `strategies` — Momentum and market-maker reference strategies

pub mod feed;
pub mod strategies;
