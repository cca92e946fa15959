#![allow(dead_code)]

use async_trait::async_trait;
use gridfeed_core::grid::{GridIterator, GridStore, VirtualView};
use gridfeed_core::GridItem;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::new("gridfeed_core=debug"))
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .try_init();
}

pub fn item(id: &str) -> GridItem {
    GridItem::new(id, format!("Album {id}"))
}

pub fn items(prefix: &str, range: std::ops::Range<usize>) -> Vec<GridItem> {
    range.map(|i| item(&format!("{prefix}-{i}"))).collect()
}

pub fn ids(items: &[GridItem]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}

/// Virtual view that records what the loader asked of it.
#[derive(Default)]
pub struct RecordingView {
    refreshes: AtomicUsize,
    scrolled_to: Mutex<Vec<usize>>,
    offset: Mutex<f32>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn scrolled_to(&self) -> Vec<usize> {
        self.scrolled_to.lock().unwrap().clone()
    }
}

impl VirtualView for RecordingView {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    fn scroll_to(&self, index: usize) {
        self.scrolled_to.lock().unwrap().push(index);
    }

    fn scroll_offset(&self) -> f32 {
        *self.offset.lock().unwrap()
    }

    fn set_scroll_offset(&self, offset: f32) {
        *self.offset.lock().unwrap() = offset;
    }
}

/// Returns pre-scripted batches in order, then empty batches.
pub struct ScriptedIterator {
    batches: VecDeque<Vec<GridItem>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedIterator {
    /// One batch per entry of `sizes`, with ids `{prefix}-{n}` numbered across batches.
    pub fn with_sizes(prefix: &str, sizes: &[usize]) -> (Self, Arc<AtomicUsize>) {
        let mut next = 0;
        let batches = sizes
            .iter()
            .map(|&size| {
                let batch = items(prefix, next..next + size);
                next += size;
                batch
            })
            .collect();
        Self::with_batches(batches)
    }

    pub fn with_batches(batches: Vec<Vec<GridItem>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                batches: batches.into(),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl GridIterator for ScriptedIterator {
    async fn next_n(&mut self, _n: usize) -> Vec<GridItem> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.pop_front().unwrap_or_default()
    }
}

/// Never runs out: every call returns exactly `n` sequentially numbered items.
pub struct EndlessIterator {
    prefix: String,
    next: usize,
}

impl EndlessIterator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: 0,
        }
    }
}

#[async_trait]
impl GridIterator for EndlessIterator {
    async fn next_n(&mut self, n: usize) -> Vec<GridItem> {
        let batch = items(&self.prefix, self.next..self.next + n);
        self.next += n;
        batch
    }
}

/// Endless iterator where every batch waits for a permit on `gate`.
pub struct GatedIterator {
    inner: EndlessIterator,
    gate: Arc<Semaphore>,
}

impl GatedIterator {
    pub fn new(prefix: &str) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            Self {
                inner: EndlessIterator::new(prefix),
                gate: Arc::clone(&gate),
            },
            gate,
        )
    }
}

#[async_trait]
impl GridIterator for GatedIterator {
    async fn next_n(&mut self, n: usize) -> Vec<GridItem> {
        match self.gate.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return Vec::new(),
        }
        self.inner.next_n(n).await
    }
}

/// Poll `condition` until it holds, failing the test after a few seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..2000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}

/// Wait for the running fetch, if any, to finish.
pub async fn settle(store: &GridStore) {
    wait_until(|| !store.is_fetching()).await;
}
