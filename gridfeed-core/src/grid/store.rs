use super::fetch::run_fetch;
use super::iterator::SharedIterator;
use super::state::GridState;
use super::view::VirtualView;
use super::GridError;
use crate::config::GridConfig;
use gridfeed_common::GridItem;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Events emitted by a [`GridStore`] as its contents change
#[derive(Clone, Debug, PartialEq)]
pub enum GridEvent {
    FetchStarted { fetch_id: u64, target: usize },
    BatchAppended { fetch_id: u64, count: usize, total: usize },
    /// The iterator returned a short batch; nothing more will be fetched
    Exhausted { total: usize },
    /// A reset superseded a running fetch
    FetchCanceled { fetch_id: u64 },
    FetchFinished { fetch_id: u64 },
    Reset { len: usize, done: bool },
}

struct ActiveFetch {
    id: u64,
    token: CancellationToken,
}

struct StoreInner {
    state: GridState,
    active_fetch: Option<ActiveFetch>,
    next_fetch_id: u64,
}

/// Result of handing one batch to the store.
pub(crate) enum BatchOutcome {
    Canceled,
    Appended { count: usize, exhausted: bool },
}

/// Backing store of a grid view: the loaded items plus fetch bookkeeping.
///
/// All state sits behind one lock. No lock is held while the iterator is polled or
/// while the view is asked to redraw, so a view refresh may re-enter the store.
pub struct GridStore {
    inner: RwLock<StoreInner>,
    config: GridConfig,
    view: Arc<dyn VirtualView>,
    runtime: Handle,
    event_tx: broadcast::Sender<GridEvent>,
}

impl std::fmt::Debug for GridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read();
        f.debug_struct("GridStore")
            .field("len", &inner.state.items.len())
            .field("done", &inner.state.done)
            .field("fetching", &inner.active_fetch.is_some())
            .finish_non_exhaustive()
    }
}

impl GridStore {
    /// Create a store whose fetches run on the current tokio runtime.
    pub fn new(
        state: GridState,
        config: GridConfig,
        view: Arc<dyn VirtualView>,
    ) -> Result<Arc<Self>, GridError> {
        let runtime = Handle::try_current().map_err(|_| GridError::NoRuntime)?;
        Ok(Self::with_runtime(state, config, view, runtime))
    }

    pub fn with_runtime(
        state: GridState,
        config: GridConfig,
        view: Arc<dyn VirtualView>,
        runtime: Handle,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            inner: RwLock::new(StoreInner {
                state,
                active_fetch: None,
                next_fetch_id: 0,
            }),
            config,
            view,
            runtime,
            event_tx,
        })
    }

    // Every write leaves the state consistent, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: GridEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Subscribe to store events (appends, resets, fetch lifecycle)
    pub fn subscribe_events(&self) -> broadcast::Receiver<GridEvent> {
        self.event_tx.subscribe()
    }

    pub fn len(&self) -> usize {
        self.read().state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn item(&self, index: usize) -> Option<GridItem> {
        self.read().state.items.get(index).cloned()
    }

    pub fn items(&self) -> Vec<GridItem> {
        self.read().state.items.clone()
    }

    pub fn is_done(&self) -> bool {
        self.read().state.done
    }

    pub fn is_fetching(&self) -> bool {
        self.read().active_fetch.is_some()
    }

    pub fn highest_shown(&self) -> usize {
        self.read().state.highest_shown
    }

    /// Record that the row at `index` is being materialized and return its item.
    ///
    /// `None` when `index` is past the loaded items, which happens when a reset lands
    /// between the view reading the length and updating a row.
    pub fn note_shown(&self, index: usize) -> Option<GridItem> {
        let mut inner = self.write();
        let item = inner.state.items.get(index).cloned()?;
        if index > inner.state.highest_shown {
            inner.state.highest_shown = index;
        }
        Some(item)
    }

    /// Copy of the current state, tagged with the view's scroll offset.
    pub fn snapshot(&self, scroll_offset: f32) -> GridState {
        let mut state = self.read().state.clone();
        state.scroll_offset = scroll_offset;
        state
    }

    /// Start a background fetch of at least `min_count` items unless one is already
    /// running or the source is exhausted. Returns whether a fetch was started.
    pub fn ensure_fetching(self: &Arc<Self>, min_count: usize) -> bool {
        let (fetch_id, token, iterator) = {
            let mut inner = self.write();
            if inner.state.done || inner.active_fetch.is_some() {
                return false;
            }
            let Some(iterator) = inner.state.iterator.clone() else {
                inner.state.done = true;
                return false;
            };
            inner.next_fetch_id += 1;
            let fetch_id = inner.next_fetch_id;
            let token = CancellationToken::new();
            inner.active_fetch = Some(ActiveFetch {
                id: fetch_id,
                token: token.clone(),
            });
            (fetch_id, token, iterator)
        };

        debug!("Starting grid fetch {} (target {})", fetch_id, min_count);
        self.emit(GridEvent::FetchStarted {
            fetch_id,
            target: min_count,
        });
        self.runtime.spawn(run_fetch(
            Arc::clone(self),
            iterator,
            token,
            fetch_id,
            min_count,
        ));
        true
    }

    /// Replace the contents with a fresh, empty stream from `iterator`.
    pub fn reset(&self, iterator: SharedIterator) {
        self.replace_state(GridState::streaming(iterator));
    }

    /// Replace the contents with a complete, fixed list.
    pub fn reset_fixed(&self, items: Vec<GridItem>) {
        self.replace_state(GridState::fixed(items));
    }

    /// Drop all items; nothing will be fetched until the next reset.
    pub fn clear(&self) {
        self.replace_state(GridState::fixed(Vec::new()));
    }

    /// Replace the contents with a previously taken snapshot.
    pub fn restore(&self, state: GridState) {
        self.replace_state(state);
    }

    /// Cancel the running fetch, if any, leaving the items as they are.
    pub fn cancel_fetch(&self) {
        let canceled = Self::take_active(&mut self.write());
        if let Some(fetch_id) = canceled {
            debug!("Canceled grid fetch {}", fetch_id);
            self.emit(GridEvent::FetchCanceled { fetch_id });
        }
    }

    // Must be called with the write lock held: the token is canceled before the lock
    // is released, so the fetch cannot append after the caller's mutation.
    fn take_active(inner: &mut StoreInner) -> Option<u64> {
        inner.active_fetch.take().map(|active| {
            active.token.cancel();
            active.id
        })
    }

    fn replace_state(&self, state: GridState) {
        let (canceled, len, done) = {
            let mut inner = self.write();
            let canceled = Self::take_active(&mut inner);
            inner.state = state;
            (canceled, inner.state.items.len(), inner.state.done)
        };

        if let Some(fetch_id) = canceled {
            debug!("Canceled grid fetch {} on reset", fetch_id);
            self.emit(GridEvent::FetchCanceled { fetch_id });
        }
        debug!("Grid reset to {} items (done: {})", len, done);
        self.emit(GridEvent::Reset { len, done });
    }

    /// Append a batch fetched by `fetch_id`, unless that fetch has been canceled.
    pub(crate) fn apply_batch(
        &self,
        fetch_id: u64,
        token: &CancellationToken,
        batch: Vec<GridItem>,
        requested: usize,
    ) -> BatchOutcome {
        let count = batch.len();
        let exhausted = count < requested;
        let total = {
            let mut inner = self.write();
            let current = inner.active_fetch.as_ref().map(|active| active.id);
            if token.is_cancelled() || current != Some(fetch_id) {
                return BatchOutcome::Canceled;
            }
            inner.state.items.extend(batch);
            if exhausted {
                inner.state.done = true;
            }
            inner.state.items.len()
        };

        self.emit(GridEvent::BatchAppended {
            fetch_id,
            count,
            total,
        });
        if exhausted {
            debug!("Grid source exhausted after {} items", total);
            self.emit(GridEvent::Exhausted { total });
        }
        BatchOutcome::Appended { count, exhausted }
    }

    /// Whether the fetch should run another round: still current, source not
    /// exhausted, and the view is still near the end of the loaded items.
    pub(crate) fn wants_more(&self, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        let inner = self.read();
        !inner.state.done
            && inner
                .state
                .highest_shown
                .saturating_add(self.config.fetch_threshold)
                >= inner.state.items.len()
    }

    /// Mark `fetch_id` as no longer running, unless a reset already replaced it.
    pub(crate) fn finish_fetch(&self, fetch_id: u64) {
        let finished = {
            let mut inner = self.write();
            match &inner.active_fetch {
                Some(active) if active.id == fetch_id => {
                    inner.active_fetch = None;
                    true
                }
                _ => false,
            }
        };
        if finished {
            debug!("Grid fetch {} finished", fetch_id);
            self.emit(GridEvent::FetchFinished { fetch_id });
        }
    }

    pub(crate) fn request_redraw(&self) {
        self.view.refresh();
    }
}
