//! Column and row arithmetic for wrapped grids.
//!
//! Everything here is a pure function of the container size, so it can be cached
//! by the caller and recomputed on resize.

/// Fixed per-item geometry of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    /// Width of one item card
    pub item_width: f32,
    /// Height of one item card
    pub item_height: f32,
    /// Padding between cards, horizontally and vertically
    pub padding: f32,
    /// Extra rows to materialize above and below the viewport
    pub buffer_rows: usize,
}

impl GridMetrics {
    /// Number of columns that fit in `container_width`. Never less than one.
    pub fn columns(&self, container_width: f32) -> usize {
        if container_width <= self.item_width {
            return 1;
        }
        ((container_width + self.padding) / (self.item_width + self.padding))
            .floor()
            .max(1.0) as usize
    }

    fn row_height(&self) -> f32 {
        self.item_height + self.padding
    }
}

/// Visible window of a grid for one scroll position.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    /// First row to materialize (including buffer)
    pub start_row: usize,
    /// Last row to materialize (exclusive, including buffer)
    pub end_row: usize,
    /// First item index to materialize
    pub start_idx: usize,
    /// Last item index to materialize (exclusive)
    pub end_idx: usize,
}

impl GridLayout {
    pub fn calculate(
        item_count: usize,
        metrics: &GridMetrics,
        container_width: f32,
        container_height: f32,
        scroll_offset: f32,
    ) -> Self {
        let columns = metrics.columns(container_width);
        let total_rows = item_count.div_ceil(columns);

        // A degenerate row height divides to infinity; float-to-int casts saturate
        let row_height = metrics.row_height();
        let first_visible_row = (scroll_offset.max(0.0) / row_height).floor() as usize;
        let visible_row_count = ((container_height / row_height).ceil() as usize)
            .max(1)
            .saturating_add(1);

        let start_row = first_visible_row.saturating_sub(metrics.buffer_rows);
        let end_row = first_visible_row
            .saturating_add(visible_row_count)
            .saturating_add(metrics.buffer_rows)
            .min(total_rows);
        let start_row = start_row.min(end_row);

        Self {
            columns,
            start_row,
            end_row,
            start_idx: (start_row * columns).min(item_count),
            end_idx: (end_row * columns).min(item_count),
        }
    }

    /// Item indices to materialize, in order.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start_idx..self.end_idx
    }

    /// Scroll offset that brings the row containing `index` to the top.
    pub fn offset_for_index(index: usize, columns: usize, metrics: &GridMetrics) -> f32 {
        (index / columns.max(1)) as f32 * metrics.row_height()
    }
}

/// Keyboard focus movement between cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Left,
    Right,
    Up,
    Down,
}

impl FocusDirection {
    /// Index of the neighbor of `from` in a grid of `columns` columns and `len` items.
    /// `None` if the move would leave the grid.
    pub fn neighbor(self, from: usize, columns: usize, len: usize) -> Option<usize> {
        let target = match self {
            FocusDirection::Left => from.checked_sub(1)?,
            FocusDirection::Right => from + 1,
            FocusDirection::Up => from.checked_sub(columns)?,
            FocusDirection::Down => from + columns,
        };
        (target < len).then_some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> GridMetrics {
        GridMetrics {
            item_width: 200.0,
            item_height: 250.0,
            padding: 4.0,
            buffer_rows: 1,
        }
    }

    #[test]
    fn test_columns_narrow_container_is_one() {
        assert_eq!(metrics().columns(0.0), 1);
        assert_eq!(metrics().columns(150.0), 1);
        assert_eq!(metrics().columns(200.0), 1);
    }

    #[test]
    fn test_columns_counts_padding() {
        // 3 * 200 + 2 * 4 = 608
        assert_eq!(metrics().columns(607.0), 2);
        assert_eq!(metrics().columns(608.0), 3);
        assert_eq!(metrics().columns(1000.0), 4);
    }

    #[test]
    fn test_layout_at_top() {
        let layout = GridLayout::calculate(100, &metrics(), 1000.0, 600.0, 0.0);
        assert_eq!(layout.columns, 4);
        assert_eq!(layout.start_row, 0);
        // ceil(600 / 254) + 1 visible rows, plus one buffer row
        assert_eq!(layout.end_row, 5);
        assert_eq!(layout.indices(), 0..20);
    }

    #[test]
    fn test_layout_scrolled_includes_buffer_above() {
        let layout = GridLayout::calculate(100, &metrics(), 1000.0, 600.0, 254.0 * 4.0);
        assert_eq!(layout.start_row, 3);
        assert_eq!(layout.start_idx, 12);
    }

    #[test]
    fn test_layout_clamps_to_item_count() {
        let layout = GridLayout::calculate(6, &metrics(), 1000.0, 600.0, 0.0);
        assert_eq!(layout.end_row, 2);
        assert_eq!(layout.indices(), 0..6);
    }

    #[test]
    fn test_layout_empty_grid() {
        let layout = GridLayout::calculate(0, &metrics(), 1000.0, 600.0, 500.0);
        assert_eq!(layout.indices(), 0..0);
    }

    #[test]
    fn test_layout_zero_row_height_does_not_overflow() {
        let flat = GridMetrics {
            item_height: 0.0,
            padding: 0.0,
            ..metrics()
        };
        let layout = GridLayout::calculate(10, &flat, 1000.0, 600.0, 0.0);
        assert_eq!(layout.start_row, 0);
        assert_eq!(layout.indices(), 0..10);

        let scrolled = GridLayout::calculate(10, &flat, 1000.0, 600.0, 300.0);
        assert!(scrolled.end_idx <= 10);
        assert!(scrolled.start_idx <= scrolled.end_idx);
    }

    #[test]
    fn test_offset_for_index() {
        assert_eq!(GridLayout::offset_for_index(9, 4, &metrics()), 254.0 * 2.0);
        assert_eq!(GridLayout::offset_for_index(3, 0, &metrics()), 254.0 * 3.0);
    }

    #[test]
    fn test_focus_neighbor() {
        assert_eq!(FocusDirection::Left.neighbor(0, 4, 10), None);
        assert_eq!(FocusDirection::Left.neighbor(5, 4, 10), Some(4));
        assert_eq!(FocusDirection::Right.neighbor(5, 4, 10), Some(6));
        assert_eq!(FocusDirection::Right.neighbor(9, 4, 10), None);
        assert_eq!(FocusDirection::Up.neighbor(2, 4, 10), None);
        assert_eq!(FocusDirection::Up.neighbor(6, 4, 10), Some(2));
        assert_eq!(FocusDirection::Down.neighbor(5, 4, 10), Some(9));
        assert_eq!(FocusDirection::Down.neighbor(6, 4, 10), None);
    }
}
