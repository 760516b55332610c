//! Base packet table

use crate::protocol::NUM_BASE_SLOTS;
use bytes::Bytes;

/// Rotating set of base packets shared by convention between both ends of a session
///
/// Every slot always holds one complete packet; slots start out empty.
#[derive(Debug, Clone)]
pub struct BaseTable {
    slots: [Bytes; NUM_BASE_SLOTS],
}

impl BaseTable {
    /// Create a table with every slot empty
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Bytes::new()),
        }
    }

    /// Packet held in `index`, or `None` if the index is out of range
    pub fn get(&self, index: usize) -> Option<&Bytes> {
        self.slots.get(index)
    }

    /// Replace the packet held in `index`
    ///
    /// # Panics
    /// Panics if `index >= NUM_BASE_SLOTS`; callers hold indices produced by
    /// [`SlotCursor`] or validated by the header codec
    pub fn store(&mut self, index: usize, packet: Bytes) {
        self.slots[index] = packet;
    }

    /// Iterate over `(index, packet)` in slot order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Bytes)> {
        self.slots.iter().enumerate()
    }

    /// Total bytes retained across all slots
    pub fn memory_usage(&self) -> usize {
        self.slots.iter().map(Bytes::len).sum()
    }

    /// Empty every slot
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Bytes::new();
        }
    }
}

impl Default for BaseTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Round-robin cursor naming the next slot to overwrite on promotion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotCursor {
    next: usize,
}

impl SlotCursor {
    /// Create a cursor pointing at slot 0
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Slot the next promotion will use
    pub fn peek(&self) -> usize {
        self.next
    }

    /// Claim the next slot and advance
    pub fn advance(&mut self) -> usize {
        let slot = self.next;
        self.next = (self.next + 1) % NUM_BASE_SLOTS;
        slot
    }

    /// Point back at slot 0
    pub fn reset(&mut self) {
        self.next = 0;
    }
}
