//! Heap reclamation hook invoked before retrying a memory-starved operation.

/// Something that can free or compact heap before a retry.
pub trait HeapReclaim {
    fn reclaim(&mut self);
}

/// Hook that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoReclaim;

impl HeapReclaim for NoReclaim {
    fn reclaim(&mut self) {}
}

impl<F: FnMut()> HeapReclaim for F {
    fn reclaim(&mut self) {
        self();
    }
}
