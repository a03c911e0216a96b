//! Trade execution record
//!
//! A trade is one atomic fill between a resting order and an incoming
//! one. The price is always the resting (maker) order's price, and the
//! timestamp is the later of the two participants', the moment the match
//! became possible.

use crate::ids::{OrderId, Timestamp};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// An atomic fill between one buy and one sell order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: Timestamp,
}

impl Trade {
    pub fn new(
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        price: Price,
        quantity: Quantity,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            timestamp,
        }
    }

    /// Traded value in raw price units; widened so large runs can sum it.
    pub fn notional(&self) -> i128 {
        self.price.raw() as i128 * self.quantity.raw() as i128
    }
}
