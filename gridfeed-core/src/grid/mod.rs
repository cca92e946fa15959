//! Incrementally loaded grid views.
//!
//! A [`GridStore`] owns the loaded prefix of a paginated source and at most one
//! background fetch. A [`GridView`] adapts it to a toolkit's virtualized grid:
//! the toolkit asks for the length and asks to update recycled cards by index, and
//! updates near the end of the loaded prefix start the next fetch.

mod fetch;
mod iterator;
mod state;
mod store;
mod view;

pub use iterator::{GridIterator, SharedIterator};
pub use state::GridState;
pub use store::{GridEvent, GridStore};
pub use view::{GridCard, GridView, ItemCard, VirtualView};

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("No tokio runtime available to run background fetches")]
    NoRuntime,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
