use super::iterator::{GridIterator, SharedIterator};
use super::state::GridState;
use super::store::GridStore;
use super::GridError;
use crate::config::GridConfig;
use gridfeed_common::{FocusDirection, GridItem, GridLayout, GridMetrics};
use std::cell::Cell;
use std::sync::Arc;

/// The toolkit's virtualized grid, as seen from the loader.
///
/// The toolkit owns card recycling and calls back into [`GridView::length`] and
/// [`GridView::update_card`]; the loader only asks it to redraw and scroll.
/// `refresh` may be called from a background task.
pub trait VirtualView: Send + Sync {
    /// Re-query the length and re-run updates for visible cards.
    fn refresh(&self);
    fn scroll_to(&self, index: usize);
    fn scroll_offset(&self) -> f32;
    fn set_scroll_offset(&self, offset: f32);
}

/// A recyclable card showing one grid item.
pub trait ItemCard {
    fn item_index(&self) -> Option<usize>;
    fn set_item_index(&mut self, index: Option<usize>);
    /// Model the card currently shows, if any
    fn model(&self) -> Option<&GridItem>;
    fn update(&mut self, item: &GridItem);
    fn show_placeholder(&mut self);

    fn needs_update(&self, item: &GridItem) -> bool {
        self.model() != Some(item)
    }
}

/// Headless card that keeps what it is bound to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridCard {
    index: Option<usize>,
    model: Option<GridItem>,
    binds: usize,
}

impl GridCard {
    pub fn is_placeholder(&self) -> bool {
        self.model.is_none()
    }

    /// How many times the card has been bound to a model.
    pub fn bind_count(&self) -> usize {
        self.binds
    }
}

impl ItemCard for GridCard {
    fn item_index(&self) -> Option<usize> {
        self.index
    }

    fn set_item_index(&mut self, index: Option<usize>) {
        self.index = index;
    }

    fn model(&self) -> Option<&GridItem> {
        self.model.as_ref()
    }

    fn update(&mut self, item: &GridItem) {
        self.model = Some(item.clone());
        self.binds += 1;
    }

    fn show_placeholder(&mut self) {
        self.model = None;
    }
}

/// Adapter between a [`GridStore`] and a toolkit's virtualized grid.
///
/// Lives on the render thread. Dropping it cancels any running fetch.
pub struct GridView {
    store: Arc<GridStore>,
    view: Arc<dyn VirtualView>,
    metrics: GridMetrics,
    width: f32,
    num_cols_cached: Cell<Option<usize>>,
}

impl GridView {
    /// Streaming view over `iter`; starts loading the first page immediately.
    pub fn new(
        iter: impl GridIterator + 'static,
        config: GridConfig,
        view: Arc<dyn VirtualView>,
    ) -> Result<Self, GridError> {
        let grid = Self::with_state(GridState::streaming(SharedIterator::new(iter)), config, view)?;
        grid.store.ensure_fetching(grid.store.config().initial_prefetch);
        Ok(grid)
    }

    /// View over a complete list.
    pub fn new_fixed(
        items: Vec<GridItem>,
        config: GridConfig,
        view: Arc<dyn VirtualView>,
    ) -> Result<Self, GridError> {
        Self::with_state(GridState::fixed(items), config, view)
    }

    /// View resuming a state saved with [`GridView::save_to_state`].
    pub fn from_state(
        state: GridState,
        config: GridConfig,
        view: Arc<dyn VirtualView>,
    ) -> Result<Self, GridError> {
        let scroll_offset = state.scroll_offset();
        let grid = Self::with_state(state, config, view)?;
        grid.view.refresh();
        grid.view.set_scroll_offset(scroll_offset);
        Ok(grid)
    }

    fn with_state(
        state: GridState,
        config: GridConfig,
        view: Arc<dyn VirtualView>,
    ) -> Result<Self, GridError> {
        config.validate()?;
        let metrics = GridMetrics {
            item_width: config.item_width,
            item_height: config.item_height,
            padding: config.item_padding,
            buffer_rows: 1,
        };
        let store = GridStore::new(state, config, Arc::clone(&view))?;
        Ok(Self {
            store,
            view,
            metrics,
            width: 0.0,
            num_cols_cached: Cell::new(None),
        })
    }

    pub fn store(&self) -> &Arc<GridStore> {
        &self.store
    }

    pub fn save_to_state(&self) -> GridState {
        self.store.snapshot(self.view.scroll_offset())
    }

    pub fn clear(&self) {
        self.store.clear();
        self.view.refresh();
    }

    /// Start over with a new source.
    pub fn reset(&self, iter: impl GridIterator + 'static) {
        self.store.reset(SharedIterator::new(iter));
        self.store.ensure_fetching(self.store.config().initial_prefetch);
        self.view.refresh();
    }

    pub fn reset_fixed(&self, items: Vec<GridItem>) {
        self.store.reset_fixed(items);
        self.view.refresh();
    }

    pub fn reset_from_state(&self, state: GridState) {
        let scroll_offset = state.scroll_offset();
        self.store.restore(state);
        self.view.refresh();
        self.view.set_scroll_offset(scroll_offset);
        self.view.refresh();
    }

    pub fn scroll_offset(&self) -> f32 {
        self.view.scroll_offset()
    }

    pub fn set_scroll_offset(&self, offset: f32) {
        self.view.set_scroll_offset(offset);
    }

    /// Length callback for the toolkit.
    pub fn length(&self) -> usize {
        self.store.len()
    }

    /// Create-item callback for the toolkit.
    pub fn create_card(&self) -> GridCard {
        GridCard::default()
    }

    /// Update-item callback for the toolkit: bind `card` to the item at `index`.
    ///
    /// Showing a row within `fetch_threshold` of the end of the loaded items asks the
    /// store for `refill_count` more.
    pub fn update_card<C: ItemCard>(&self, index: usize, card: &mut C) {
        // index can be out of range if a reset shrank the list during a redraw
        let Some(item) = self.store.note_shown(index) else {
            card.set_item_index(Some(index));
            card.show_placeholder();
            return;
        };

        if card.item_index() != Some(index) || card.needs_update(&item) {
            card.set_item_index(Some(index));
            card.update(&item);
        }

        let config = self.store.config();
        if index.saturating_add(config.fetch_threshold) > self.store.len() {
            self.store.ensure_fetching(config.refill_count);
        }
    }

    pub fn resize(&mut self, width: f32) {
        self.width = width;
        self.num_cols_cached.set(None);
    }

    pub fn num_cols(&self) -> usize {
        if let Some(cols) = self.num_cols_cached.get() {
            return cols;
        }
        let cols = self.metrics.columns(self.width);
        self.num_cols_cached.set(Some(cols));
        cols
    }

    /// Visible window for the current scroll position.
    pub fn layout(&self, viewport_height: f32) -> GridLayout {
        GridLayout::calculate(
            self.length(),
            &self.metrics,
            self.width,
            viewport_height,
            self.view.scroll_offset(),
        )
    }

    /// Move keyboard focus from the card at `from`. Scrolls the target into view and
    /// returns its index, or `None` at the edge of the grid.
    pub fn focus_neighbor(&self, from: usize, direction: FocusDirection) -> Option<usize> {
        let target = direction.neighbor(from, self.num_cols(), self.length())?;
        self.view.scroll_to(target);
        Some(target)
    }
}

impl Drop for GridView {
    fn drop(&mut self) {
        self.store.cancel_fetch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_card_starts_unbound() {
        let card = GridCard::default();
        assert_eq!(card.item_index(), None);
        assert!(card.is_placeholder());
        assert_eq!(card.bind_count(), 0);
    }

    #[test]
    fn grid_card_needs_update_compares_by_value() {
        let mut card = GridCard::default();
        let item = GridItem::new("al-1", "Abbey Road");
        assert!(card.needs_update(&item));

        card.update(&item);
        assert!(!card.needs_update(&item.clone()));
        assert!(card.needs_update(&GridItem::new("al-2", "Let It Be")));
    }

    #[test]
    fn grid_card_placeholder_clears_model() {
        let mut card = GridCard::default();
        card.update(&GridItem::new("al-1", "Abbey Road"));
        card.show_placeholder();
        assert!(card.is_placeholder());
        assert_eq!(card.bind_count(), 1);
    }
}
