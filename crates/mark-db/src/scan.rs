//! Lazy, page-at-a-time scans over the relation store.
//!
//! A scan holds only a cursor (the last row id seen) and the current page, so
//! rows inserted or deleted behind the cursor never disturb it and a dropped
//! stream leaves nothing to clean up. Calling the producing operation again
//! starts a fresh scan.

use std::collections::VecDeque;

use futures::stream::{self, BoxStream, StreamExt};

use crate::error::DatabaseError;
use crate::store::{MarkFilter, PageRequest, RelationStore, StoredMark};

/// Default number of rows fetched per page for query streams.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

struct ScanState {
    cursor: Option<i64>,
    buffer: VecDeque<StoredMark>,
    exhausted: bool,
}

/// Stream every row matching `filter` in ascending row-id order.
pub fn scan<'a, S>(store: &'a S, filter: MarkFilter, page_size: u32) -> BoxStream<'a, Result<StoredMark, DatabaseError>>
where
    S: RelationStore + ?Sized,
{
    let page_size = page_size.max(1);
    let initial = ScanState {
        cursor: None,
        buffer: VecDeque::new(),
        exhausted: false,
    };

    stream::try_unfold(initial, move |mut state| {
        let filter = filter.clone();
        async move {
            if state.buffer.is_empty() && !state.exhausted {
                let page = match state.cursor {
                    Some(after) => PageRequest::after(after, page_size),
                    None => PageRequest::first(page_size),
                };
                let rows = store.select(&filter, page).await?;
                state.exhausted = rows.len() < page_size as usize;
                if let Some(last) = rows.last() {
                    state.cursor = Some(last.row_id);
                }
                state.buffer.extend(rows);
            }
            Ok::<_, DatabaseError>(state.buffer.pop_front().map(|row| (row, state)))
        }
    })
    .boxed()
}
