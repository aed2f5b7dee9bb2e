#![forbid(unsafe_code)]

pub const HISTORY_PAGE_SIZE: usize = 31;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.total_pages
    }
}

/// Number of pages needed for `len` items; never less than one.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

pub fn clamp_page_index(requested: usize, len: usize, page_size: usize) -> usize {
    requested.min(total_pages(len, page_size) - 1)
}

/// Reverses `items` (newest first) and cuts out page `page_index`, clamped into range.
pub fn paginate_desc<T: Clone>(items: &[T], page_size: usize, page_index: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let page_index = clamp_page_index(page_index, items.len(), page_size);

    let items = items
        .iter()
        .rev()
        .skip(page_index * page_size)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items,
        page_index,
        total_pages,
    }
}
