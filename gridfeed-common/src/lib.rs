mod grid_item;
mod grid_layout;

pub use grid_item::GridItem;
pub use grid_layout::{FocusDirection, GridLayout, GridMetrics};
