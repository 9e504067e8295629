//! Generic "fetch every page" loop shared by both clients.
//!
//! GitHub pages by number and advertises the next one in the `Link` header;
//! Tracker pages by offset and reports the total in
//! `X-Tracker-Pagination-Total`. Both reduce to a [`Cursor`] and a [`Page`].

/// Where the next request should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// 1-based page number (`?page=`).
    Page(u32),
    /// Number of items to skip (`?offset=`).
    Offset(usize),
}

/// One fetched page and the cursor for the following one, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Cursor>,
}

/// Request pages starting at `start` until a page comes back empty or
/// no next cursor is reported. The first error aborts the walk.
pub fn collect_pages<T, E, F>(start: Cursor, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Cursor) -> Result<Page<T>, E>,
{
    let mut all = Vec::new();
    let mut cursor = Some(start);
    while let Some(current) = cursor {
        let page = fetch(current)?;
        if page.items.is_empty() {
            break;
        }
        all.extend(page.items);
        cursor = page.next;
    }
    Ok(all)
}

/// Page number of the `rel="next"` entry of a GitHub `Link` header.
pub fn next_page_from_link(header: Option<&str>) -> Option<u32> {
    header?
        .split(',')
        .find_map(|entry| {
            let mut parts = entry.split(';');
            let url = parts.next()?.trim();
            parts
                .any(|p| p.trim() == "rel=\"next\"")
                .then(|| url.trim_start_matches('<').trim_end_matches('>'))
        })
        .and_then(page_param)
}

fn page_param(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

/// Offset cursor following a Tracker page of `returned` items read at `offset`.
pub fn next_offset(offset: usize, returned: usize, total: Option<usize>) -> Option<Cursor> {
    let next = offset + returned;
    match total {
        Some(total) if next >= total => None,
        _ => Some(Cursor::Offset(next)),
    }
}
