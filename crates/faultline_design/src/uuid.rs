//! Monotonic allocation of process-unique identifiers.

/// The reserved identifier of the top-module instance.
///
/// The simulation driver compares `GlobalFiModInstNr` entries against this
/// constant to derive the top module's `fiEnable`; the allocator never
/// issues it.
pub const TOP_MODULE_UUID: u32 = 1;

/// Allocator for assignment and instance UUIDs.
///
/// Issues each identifier exactly once, counting up from 2. One allocator is
/// threaded through an entire instrumentation run so FI-signals and module
/// instances draw from the same sequence.
#[derive(Debug)]
pub struct UuidAllocator {
    next: u32,
}

impl UuidAllocator {
    /// Creates an allocator whose first minted value is 2.
    pub fn new() -> Self {
        Self {
            next: TOP_MODULE_UUID + 1,
        }
    }

    /// Mints the next identifier.
    pub fn mint(&mut self) -> u32 {
        let uuid = self.next;
        self.next += 1;
        uuid
    }
}

impl Default for UuidAllocator {
    fn default() -> Self {
        Self::new()
    }
}
