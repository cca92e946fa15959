use super::{Album, AlbumIterator};
use crate::retry::retry_with_backoff;
use crate::subsonic_client::{AlbumListType, ClientAlbum, SubsonicClient};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Album source paging through `getAlbumList2` with `size`/`offset`.
///
/// A page shorter than the page size ends the listing. A page that still fails after
/// retries also ends it: the grid simply shows what was loaded so far.
pub struct SubsonicAlbumIterator {
    client: Arc<SubsonicClient>,
    list_type: AlbumListType,
    page_size: u32,
    offset: u32,
    buffer: VecDeque<Album>,
    exhausted: bool,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl SubsonicAlbumIterator {
    pub fn new(client: Arc<SubsonicClient>, list_type: AlbumListType) -> Self {
        Self {
            client,
            list_type,
            page_size: DEFAULT_PAGE_SIZE,
            offset: 0,
            buffer: VecDeque::new(),
            exhausted: false,
            retry_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    async fn fetch_page(&mut self) {
        let (list_type, page_size, offset) = (self.list_type, self.page_size, self.offset);
        let result = retry_with_backoff(self.retry_attempts, self.retry_delay, "getAlbumList2", || {
            let client = Arc::clone(&self.client);
            async move { client.get_album_list(list_type, page_size, offset).await }
        })
        .await;

        match result {
            Ok(page) => {
                debug!(
                    "Fetched {} albums ({}) at offset {}",
                    page.len(),
                    list_type.as_str(),
                    offset
                );
                if (page.len() as u32) < page_size {
                    self.exhausted = true;
                }
                self.offset += page.len() as u32;
                self.buffer.extend(page.into_iter().map(album_from_client));
            }
            Err(e) => {
                warn!(
                    "Album listing {} stopped at offset {}: {}",
                    list_type.as_str(),
                    offset,
                    e
                );
                self.exhausted = true;
            }
        }
    }
}

#[async_trait]
impl AlbumIterator for SubsonicAlbumIterator {
    async fn next_album(&mut self) -> Option<Album> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch_page().await;
        }
        self.buffer.pop_front()
    }
}

fn album_from_client(album: ClientAlbum) -> Album {
    let (artist_names, artist_ids) = match album.artists {
        Some(artists) if !artists.is_empty() => artists.into_iter().map(|a| (a.name, a.id)).unzip(),
        _ => match album.artist {
            Some(name) => (vec![name], album.artist_id.into_iter().collect()),
            None => (Vec::new(), Vec::new()),
        },
    };

    Album {
        id: album.id,
        name: album.name,
        cover_art_id: album.cover_art.unwrap_or_default(),
        artist_names,
        artist_ids,
        year: album.year,
    }
}
