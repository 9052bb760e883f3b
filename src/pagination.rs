use serde::Serialize;

/// A page of items plus the page-number window rendered by the pager.
///
/// `pages` holds page numbers with `None` marking an elision (`…`): the first
/// and last page are always shown, plus a window around the current page.
#[derive(Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub pages: Vec<Option<usize>>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize) -> Self {
        let page = current_page.max(1);
        Self {
            items,
            page,
            total_pages,
            pages: page_window(page, total_pages, 2),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// First page, a `radius`-wide window around the current page, and the last
/// page, with `None` gaps where pages are skipped.
fn page_window(current: usize, total: usize, radius: usize) -> Vec<Option<usize>> {
    if total == 0 {
        return Vec::new();
    }

    let mut window = Vec::new();
    let mut previous = 0usize;
    for page in 1..=total {
        let in_window = page == 1
            || page == total
            || (page >= current.saturating_sub(radius) && page <= current + radius);
        if !in_window {
            continue;
        }
        if previous != 0 && page > previous + 1 {
            window.push(None);
        }
        window.push(Some(page));
        previous = page;
    }
    window
}
