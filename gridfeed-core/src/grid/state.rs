use super::iterator::SharedIterator;
use gridfeed_common::GridItem;

/// Everything a grid view needs to resume where it left off.
///
/// Produced by [`GridStore::snapshot`](super::GridStore::snapshot) and consumed by
/// [`GridStore::restore`](super::GridStore::restore). A snapshot never carries an
/// in-flight fetch: restoring one starts idle and fetches again on demand.
#[derive(Debug, Clone, Default)]
pub struct GridState {
    pub(crate) items: Vec<GridItem>,
    pub(crate) iterator: Option<SharedIterator>,
    pub(crate) highest_shown: usize,
    pub(crate) done: bool,
    pub(crate) scroll_offset: f32,
}

impl GridState {
    /// Empty state that loads from `iterator`.
    pub fn streaming(iterator: SharedIterator) -> Self {
        Self {
            iterator: Some(iterator),
            ..Default::default()
        }
    }

    /// Complete state: nothing will ever be fetched.
    pub fn fixed(items: Vec<GridItem>) -> Self {
        Self {
            items,
            done: true,
            ..Default::default()
        }
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn highest_shown(&self) -> usize {
        self.highest_shown
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn has_iterator(&self) -> bool {
        self.iterator.is_some()
    }
}
