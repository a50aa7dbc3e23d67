/// One page of a larger result set, alongside the size of that set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub total: usize,
    pub items: Vec<T>,
}

/// Returns `items[skip..skip + limit]` clipped to bounds. `total` counts
/// everything before slicing. Bounding `limit` is the caller's job.
pub fn paginate<T>(items: Vec<T>, skip: usize, limit: usize) -> Page<T> {
    let total = items.len();
    let items = items.into_iter().skip(skip).take(limit).collect();
    Page { total, items }
}
