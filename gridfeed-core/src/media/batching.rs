use super::{Album, AlbumIterator};
use crate::grid::GridIterator;
use async_trait::async_trait;
use gridfeed_common::GridItem;

/// Pulls albums from a one-at-a-time source in batches.
pub struct BatchingIterator<I> {
    iter: I,
}

impl<I: AlbumIterator> BatchingIterator<I> {
    pub fn new(iter: I) -> Self {
        Self { iter }
    }

    /// Up to `n` albums; fewer only when the source ran dry.
    pub async fn next_n(&mut self, n: usize) -> Vec<Album> {
        let mut results = Vec::with_capacity(n);
        while results.len() < n {
            match self.iter.next_album().await {
                Some(album) => results.push(album),
                None => break,
            }
        }
        results
    }
}

/// Adapts an album source into grid items.
pub struct AlbumGridIterator<I> {
    iter: BatchingIterator<I>,
}

impl<I: AlbumIterator> AlbumGridIterator<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter: BatchingIterator::new(iter),
        }
    }
}

#[async_trait]
impl<I: AlbumIterator> GridIterator for AlbumGridIterator<I> {
    async fn next_n(&mut self, n: usize) -> Vec<GridItem> {
        self.iter
            .next_n(n)
            .await
            .into_iter()
            .map(GridItem::from)
            .collect()
    }
}
