//! Order lifecycle types
//!
//! An [`Order`] record is a single cache line: id, terms, fill progress,
//! and status all live together so the matching loop touches one line per
//! order. Status transitions follow fill progress: `Pending` until the
//! first fill, `Partial` while some quantity remains, `Filled` when none
//! does. `Cancelled` is terminal and set only by an explicit cancel or by
//! a market order that exhausts the book.

use crate::ids::{OrderId, Timestamp, UserId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Matching behavior of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Take whatever liquidity the opposite side offers
    Market,
    /// Match while crossing, rest the remainder at the limit price
    Limit,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// No fills yet
    Pending,
    /// Some quantity filled, some remaining
    Partial,
    /// Completely filled (terminal)
    Filled,
    /// Cancelled before completion (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A single order record.
///
/// Aligned to a cache line so arena neighbours never share one.
/// `initial_quantity` is frozen at creation for fill-ratio analytics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(align(64))]
pub struct Order {
    pub id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub filled: Quantity,
    pub initial_quantity: Quantity,
    pub timestamp: Timestamp,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub user_id: UserId,
}

impl Order {
    /// Build an unsequenced order template. The engine assigns `id` and
    /// `timestamp` at submission.
    pub fn new(
        price: Price,
        quantity: Quantity,
        side: Side,
        order_type: OrderType,
        user_id: UserId,
    ) -> Self {
        Self {
            id: OrderId::UNASSIGNED,
            price,
            quantity,
            filled: Quantity::ZERO,
            initial_quantity: quantity,
            timestamp: 0,
            side,
            order_type,
            status: OrderStatus::Pending,
            user_id,
        }
    }

    /// Unfilled quantity.
    pub fn remaining(&self) -> Quantity {
        self.quantity - self.filled
    }

    pub fn is_filled(&self) -> bool {
        self.filled >= self.quantity
    }

    /// Fraction of the original size that has filled. Analytics only.
    pub fn fill_ratio(&self) -> f64 {
        if self.initial_quantity.is_positive() {
            self.filled.raw() as f64 / self.initial_quantity.raw() as f64
        } else {
            0.0
        }
    }

    /// Record a fill and advance the status.
    pub fn apply_fill(&mut self, quantity: Quantity) {
        debug_assert!(quantity.is_positive());
        debug_assert!(quantity <= self.remaining());
        self.filled += quantity;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
    }

    /// Settle the status from fill progress after a matching pass:
    /// `Filled`, `Partial`, or back to `Pending` when nothing matched.
    pub fn resolve_status(&mut self) {
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else if self.filled.is_positive() {
            OrderStatus::Partial
        } else {
            OrderStatus::Pending
        };
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new(
            Price::ZERO,
            Quantity::ZERO,
            Side::Buy,
            OrderType::Limit,
            0,
        )
    }
}
