//! Example strategies
//!
//! Reference implementations of the strategy contract. Both attribute
//! fills to themselves through the order ids returned by the engine and
//! track their net position from those fills alone.

pub mod market_maker;
pub mod momentum;

pub use market_maker::{MarketMaker, MarketMakerConfig};
pub use momentum::{Momentum, MomentumConfig};
