use super::iterator::SharedIterator;
use super::store::{BatchOutcome, GridStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Background fetch loop for one [`GridStore`] fetch.
///
/// Pulls `batch_size` items at a time until `min_count` items have been appended, then
/// keeps going while the view is still showing rows near the end of what is loaded.
/// Stops early on exhaustion or cancellation. A canceled fetch never appends: the token
/// is raced against every iterator call and re-checked under the store lock.
pub(crate) async fn run_fetch(
    store: Arc<GridStore>,
    iterator: SharedIterator,
    token: CancellationToken,
    fetch_id: u64,
    min_count: usize,
) {
    let batch_size = store.config().batch_size.max(1);
    let target = min_count.max(1);

    let mut iter = tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!("Grid fetch {} canceled before start", fetch_id);
            return;
        }
        guard = iterator.lock() => guard,
    };

    while store.wants_more(&token) {
        let mut fetched = 0;
        while fetched < target {
            let batch = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Grid fetch {} canceled while fetching", fetch_id);
                    return;
                }
                batch = iter.next_n(batch_size) => batch,
            };

            match store.apply_batch(fetch_id, &token, batch, batch_size) {
                BatchOutcome::Canceled => {
                    debug!("Grid fetch {} canceled, dropping batch", fetch_id);
                    return;
                }
                BatchOutcome::Appended { count, exhausted } => {
                    if count > 0 {
                        store.request_redraw();
                    }
                    fetched += count;
                    if exhausted {
                        break;
                    }
                }
            }
        }
    }

    drop(iter);
    store.finish_fetch(fetch_id);
}
