use serde::Serialize;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Number of pages needed for `len` items; a zero page size counts as one.
pub fn total_pages(len: usize, per_page: usize) -> usize {
    len.div_ceil(per_page.max(1))
}

/// Returns the 1-indexed page actually served and its slice of `items`.
///
/// Page `0` is treated as page 1 and pages past the end fall back to the
/// last page, so a non-empty input never yields an empty page.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> (usize, &[T]) {
    let per_page = per_page.max(1);
    let last_page = total_pages(items.len(), per_page).max(1);
    let page = page.clamp(1, last_page);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());

    (page, &items[start.min(items.len())..end])
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    /// Wraps an already sliced page of a result holding `total` items.
    pub fn from_page(items: Vec<T>, page: usize, total: usize, per_page: usize) -> Self {
        let total_pages = total_pages(total, per_page);
        Self {
            items,
            pages: get_pages(total_pages, page, 2, 2, 4, 2),
            page,
            total,
            total_pages,
        }
    }
}

impl<T: Clone> Paginated<T> {
    /// Slices one page out of `items`, clamping the page number into range.
    pub fn from_slice(items: &[T], page: usize, per_page: usize) -> Self {
        let (page, slice) = page_slice(items, page, per_page);
        Self::from_page(slice.to_vec(), page, items.len(), per_page)
    }
}
