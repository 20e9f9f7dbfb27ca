use std::cell::Cell;

/// Trailing-edge debounce by generation counter: every call arms a new
/// generation, and after the wait only the latest one is still current.
#[derive(Debug, Default)]
pub struct Debouncer {
    generation: Cell<u64>,
}

impl Debouncer {
    pub fn arm(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    /// Drops whatever is waiting.
    pub fn cancel(&self) {
        self.arm();
    }
}
