//! Exhaustive collection of paginated listings.

use std::future::Future;

use crate::error::Result;

/// One page of a listing: its records plus the cursor for the next page.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub records: Vec<T>,
    /// Path of the next page, as returned by the server. `None` or empty
    /// means the server offered no further page.
    pub next: Option<String>,
}

/// When to stop fetching pages.
///
/// The two listing endpoints terminate differently: the handle listing
/// stops returning a cursor on its last page, while the lock listing keeps
/// returning cursors and signals the end with an empty page. Both rules
/// are kept per-endpoint rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop when the returned next-cursor is absent or empty.
    CursorNull,
    /// Stop when the fetched page contains zero records, regardless of
    /// the cursor it carries.
    EmptyPage,
}

/// Drive `fetch` from a `None` cursor until `policy` says stop,
/// concatenating records in page order.
///
/// Each cursor comes from the previous response, so fetches are strictly
/// sequential. Any fetch error aborts the whole collection; a partial
/// record list is never returned.
pub async fn collect_pages<T, F, Fut>(mut fetch: F, policy: Termination) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = fetch(cursor.take()).await?;
        if policy == Termination::EmptyPage && page.records.is_empty() {
            break;
        }
        records.extend(page.records);
        cursor = page.next.filter(|next| !next.is_empty());
        if cursor.is_none() {
            // Under CursorNull this is the normal end. Under EmptyPage the
            // server always hands back a cursor; without one there is no
            // way to request another page, so stop rather than refetch.
            break;
        }
    }
    Ok(records)
}
