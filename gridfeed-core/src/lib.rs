pub mod config;
pub mod grid;
pub mod media;
pub mod retry;
pub mod subsonic_client;

pub use gridfeed_common::{FocusDirection, GridItem, GridLayout, GridMetrics};
