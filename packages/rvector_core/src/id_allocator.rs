/// Dense integer identifier generator with delete-recycle.
///
/// Always works in `u64`; the "stringly typed" original-id-preservation
/// behavior of the source this is grounded on is a serialization concern
/// handled by [`crate::document::Document`] converting `u64 <-> String` keys
/// at its own boundary, not by this allocator (see DESIGN.md).
#[derive(Debug, Default)]
pub struct IdAllocator {
    max_id: u64,
    freed: Vec<u64>,
}

impl IdAllocator {
    /// Build an allocator whose `max_id` is the highest id in `live_ids` and
    /// whose free stack is empty — the state a fresh open (no in-flight
    /// deletes) starts from.
    pub fn from_live_ids(live_ids: impl IntoIterator<Item = u64>) -> Self {
        let max_id = live_ids.into_iter().max().unwrap_or(0);
        Self {
            max_id,
            freed: Vec::new(),
        }
    }

    /// Allocate the next id: a previously freed id if one is available
    /// (I6: the most recently freed id is preferred), else `max_id + 1`.
    pub fn gen(&mut self) -> u64 {
        if let Some(id) = self.freed.pop() {
            return id;
        }
        self.max_id += 1;
        self.max_id
    }

    /// Return `id` to the free stack so a future `gen()` recycles it.
    /// A no-op if `id` is already sitting in the free stack — callers must
    /// not be able to push the same id twice (e.g. a duplicate id in one
    /// delete batch), since that would let a later `gen()` hand it to two
    /// live entries at once.
    pub fn delete(&mut self, id: u64) {
        if !self.freed.contains(&id) {
            self.freed.push(id);
        }
    }

    pub fn max_id(&self) -> u64 {
        self.max_id
    }
}
