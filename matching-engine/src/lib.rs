//! Matching engine for event-driven backtests
//!
//! Replays an ordered tick stream, drives registered strategies, and
//! matches the orders they submit against per-symbol limit books under
//! strict price-time priority.
//!
//! **Key invariants:**
//! - FIFO within each price level; better prices always match first
//! - Trades print at the resting (maker) price
//! - Deterministic: the same tick stream produces the same trades, ids,
//!   and final order states
//! - Order records live in an arena for the whole run; books reference
//!   them by slot, never by pointer
//!
//! # Modules
//! - `arena` — Block storage for order records
//! - `book` — Per-symbol limit order book
//! - `engine` — Tick dispatch loop, order sequencing, run statistics
//! - `strategy` — Contract implemented by trading strategies

pub mod arena;
pub mod book;
pub mod engine;
pub mod strategy;

pub use arena::{OrderArena, OrderSlot};
pub use book::OrderBook;
pub use engine::{EngineContext, EngineStats, TickEngine};
pub use strategy::Strategy;
