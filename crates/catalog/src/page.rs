use serde::Serialize;

/// One page of a paginated listing, 1-indexed.
///
/// `total_pages` is at least 1 even for an empty collection, matching the
/// paginator the views were written against. A page past the end yields an
/// empty item list rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub page: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    pub has_prev_page: bool,
    pub has_next_page: bool,
}

/// Slice `items` into the requested page.
pub fn paginate<T>(items: Vec<T>, limit: u32, page: u32) -> Page<T> {
    let total = items.len() as u64;
    let limit = limit.max(1);
    let page = page.max(1);

    let total_pages = (total.div_ceil(u64::from(limit)) as u32).max(1);

    let start = u64::from(page - 1) * u64::from(limit);
    let page_items: Vec<T> = items
        .into_iter()
        .skip(start as usize)
        .take(limit as usize)
        .collect();

    let has_prev_page = page > 1;
    let has_next_page = page < total_pages;

    Page {
        items: page_items,
        total_pages,
        page,
        prev_page: has_prev_page.then(|| page - 1),
        next_page: has_next_page.then(|| page + 1),
        has_prev_page,
        has_next_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_yields_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), 10, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_prev_page);
        assert!(!page.has_next_page);
        assert_eq!(page.prev_page, None);
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn boundary_flags_on_first_middle_and_last_page() {
        let items: Vec<u32> = (0..25).collect();

        let first = paginate(items.clone(), 10, 1);
        assert_eq!(first.items.len(), 10);
        assert!(!first.has_prev_page);
        assert!(first.has_next_page);

        let middle = paginate(items.clone(), 10, 2);
        assert!(middle.has_prev_page);
        assert!(middle.has_next_page);
        assert_eq!(middle.prev_page, Some(1));
        assert_eq!(middle.next_page, Some(3));

        let last = paginate(items, 10, 3);
        assert_eq!(last.items.len(), 5);
        assert!(last.has_prev_page);
        assert!(!last.has_next_page);
        assert_eq!(last.next_page, None);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let page = paginate((0..5).collect::<Vec<u32>>(), 10, 4);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next_page);
    }
}
