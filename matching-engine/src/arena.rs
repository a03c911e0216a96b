//! Arena storage for order records
//!
//! Orders are written into fixed-size blocks that are never moved or
//! freed while the arena lives, so an [`OrderSlot`] stays valid for the
//! whole run. `reset` rewinds the write cursor without returning memory,
//! letting one arena serve several runs back to back. The `Order` type
//! is 64-byte aligned, so blocks start on a cache line and records never
//! straddle one.

use types::order::Order;

/// Order slots per block.
const BLOCK_SLOTS: usize = 4096;

/// Stable handle to an order inside an [`OrderArena`].
///
/// Handles issued before a `reset` are logically dead afterwards; using
/// one reads whatever record later claimed the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderSlot(pub(crate) u32);

impl OrderSlot {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Growing block arena for [`Order`] records.
pub struct OrderArena {
    blocks: Vec<Box<[Order]>>,
    len: usize,
}

impl OrderArena {
    pub fn new() -> Self {
        Self {
            blocks: vec![Self::new_block()],
            len: 0,
        }
    }

    /// Store an order and return its slot. Amortized O(1); grows by one
    /// block when the current block is full.
    pub fn insert(&mut self, order: Order) -> OrderSlot {
        let index = self.len;
        let block = index / BLOCK_SLOTS;
        if block == self.blocks.len() {
            self.blocks.push(Self::new_block());
        }
        self.blocks[block][index % BLOCK_SLOTS] = order;
        self.len += 1;
        OrderSlot(index as u32)
    }

    pub fn get(&self, slot: OrderSlot) -> &Order {
        debug_assert!(slot.index() < self.len);
        &self.blocks[slot.index() / BLOCK_SLOTS][slot.index() % BLOCK_SLOTS]
    }

    pub fn get_mut(&mut self, slot: OrderSlot) -> &mut Order {
        debug_assert!(slot.index() < self.len);
        &mut self.blocks[slot.index() / BLOCK_SLOTS][slot.index() % BLOCK_SLOTS]
    }

    /// Logically empty the arena, keeping every block for reuse.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Number of live order records.
    pub fn allocated_count(&self) -> usize {
        self.len
    }

    /// Bytes held across all blocks, live or not.
    pub fn memory_usage(&self) -> usize {
        self.blocks.len() * BLOCK_SLOTS * std::mem::size_of::<Order>()
    }

    fn new_block() -> Box<[Order]> {
        vec![Order::default(); BLOCK_SLOTS].into_boxed_slice()
    }
}

impl Default for OrderArena {
    fn default() -> Self {
        Self::new()
    }
}
