use async_trait::async_trait;
use gridfeed_common::GridItem;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// A paginated source of grid items.
///
/// `next_n(n)` returns up to `n` items. Returning fewer than `n` (including none) means
/// the source is exhausted; a source that fails should report it the same way.
#[async_trait]
pub trait GridIterator: Send {
    async fn next_n(&mut self, n: usize) -> Vec<GridItem>;
}

/// Iterator handle shared between a store and the snapshots taken from it.
///
/// The lock is held by a fetch for its whole run, so a restored snapshot and the
/// generation it came from never drive the source concurrently.
#[derive(Clone)]
pub struct SharedIterator(Arc<Mutex<Box<dyn GridIterator>>>);

impl SharedIterator {
    pub fn new(iter: impl GridIterator + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(iter))))
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Box<dyn GridIterator>> {
        self.0.lock().await
    }
}

impl std::fmt::Debug for SharedIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedIterator").finish_non_exhaustive()
    }
}
