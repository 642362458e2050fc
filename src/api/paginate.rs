use std::collections::HashSet;

use serde::de::DeserializeOwned;

use super::model::Page;
use super::{ApiError, Fetch, fetch_as};

/// Upper bound on pages fetched by one listing.
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Walks a v2 listing, following `next_url` until it is empty, and hands every
/// resource to `visit` in server order. The first error from either the API or
/// `visit` stops the walk and is returned.
pub fn list_all<T, F, V>(
    source: &F,
    path: &str,
    max_pages: usize,
    mut visit: V,
) -> Result<(), ApiError>
where
    T: DeserializeOwned,
    F: Fetch + ?Sized,
    V: FnMut(T) -> Result<(), ApiError>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut next = path.to_string();
    let mut pages = 0usize;

    while !next.is_empty() {
        if pages >= max_pages || !seen.insert(next.clone()) {
            return Err(ApiError::PaginationLoop {
                path: path.to_string(),
                pages,
            });
        }
        pages += 1;

        let page: Page<T> = fetch_as(source, &next)?;
        for item in page.resources {
            visit(item)?;
        }
        next = page.next_url.unwrap_or_default();
    }

    Ok(())
}
