//! Strategy contract
//!
//! A strategy consumes market events and may submit orders back through
//! the engine handle it receives on each tick. Trade notifications carry
//! no handle, so a strategy reacts to its fills on a later tick rather
//! than submitting from inside the fan-out.

use crate::engine::EngineContext;
use types::tick::Tick;
use types::trade::Trade;

/// Consumer of ticks and trades, driven by [`crate::TickEngine`].
pub trait Strategy {
    /// Called once per tick, in registration order, after the tick's
    /// book is guaranteed to exist.
    fn on_tick(&mut self, tick: &Tick, engine: &mut EngineContext);

    /// Called once per executed trade from any book, in execution order.
    /// Strategies own the attribution: compare the trade's order ids
    /// against ids returned from their own submissions.
    fn on_trade(&mut self, trade: &Trade);

    /// Stable human-readable identifier.
    fn name(&self) -> &str;
}
