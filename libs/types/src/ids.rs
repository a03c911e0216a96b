//! Identifier and time scalars
//!
//! Order ids are a monotonic `u64` sequence handed out by the engine, so
//! replaying the same input stream reproduces the same ids. Zero is
//! reserved to mean "not yet assigned".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanoseconds since an arbitrary epoch.
pub type Timestamp = u64;

/// Opaque owner tag a strategy stamps on its orders.
pub type UserId = u32;

/// Engine-assigned order identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Sentinel for order templates before the engine sequences them.
    pub const UNASSIGNED: OrderId = OrderId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
