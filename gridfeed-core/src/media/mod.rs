//! Domain records and the album sources that feed grid views.

mod batching;
mod subsonic;

pub use batching::{AlbumGridIterator, BatchingIterator};
pub use subsonic::SubsonicAlbumIterator;

use async_trait::async_trait;
use gridfeed_common::GridItem;

/// An album as reported by a media provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub cover_art_id: String,
    pub artist_names: Vec<String>,
    pub artist_ids: Vec<String>,
    pub year: Option<i32>,
}

impl From<Album> for GridItem {
    fn from(album: Album) -> Self {
        GridItem {
            name: album.name,
            id: album.id,
            cover_art_id: album.cover_art_id,
            secondary: album.artist_names,
            secondary_ids: album.artist_ids,
        }
    }
}

/// Yields albums one at a time until the source is exhausted.
///
/// Stateful and not expected to be called concurrently. Sources that hit an
/// unrecoverable failure report it as exhaustion by returning `None`.
#[async_trait]
pub trait AlbumIterator: Send {
    async fn next_album(&mut self) -> Option<Album>;
}
