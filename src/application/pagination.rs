//! Page-number pagination over client-held lists.
//!
//! Listing pages fetch their snapshot once and slice it locally, so the
//! pagination model is a clamped page number rather than an opaque cursor:
//! `Previous` is unavailable on the first page, `Next` on the last, and a
//! requested page beyond the end clamps to the final page.

use serde::Deserialize;

/// Raw page query parameter; anything absent or malformed means page one.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParam(pub Option<u32>);

impl PageParam {
    pub fn number(self) -> usize {
        self.0.map(|page| page.max(1) as usize).unwrap_or(1)
    }
}

/// One page slice of a larger list, with the navigation facts the view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn previous_page(&self) -> Option<usize> {
        self.has_previous().then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<usize> {
        self.has_next().then(|| self.page + 1)
    }
}

/// Slice `items` down to the requested page. `page` is clamped into
/// `1..=page_count`; an empty list yields a single empty page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Paginated<T> {
    let page_size = page_size.max(1);
    let total = items.len();
    let page_count = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, page_count);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    let items = if start < total {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Paginated {
        items,
        page,
        page_count,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_holds_the_remainder() {
        let items: Vec<u32> = (0..23).collect();
        let page = paginate(&items, 3, 9);
        assert_eq!(page.items.len(), 23 - 2 * 9);
        assert_eq!(page.page, 3);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn next_is_unavailable_exactly_on_the_last_page() {
        let items: Vec<u32> = (0..20).collect();
        for page_number in 1..=2 {
            let page = paginate(&items, page_number, 10);
            assert_eq!(page.has_next(), page_number < 2);
        }
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let items: Vec<u32> = (0..5).collect();
        let page = paginate(&items, 99, 2);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, vec![4]);

        let page = paginate(&items, 0, 2);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn empty_list_is_a_single_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_count, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn page_param_defaults_to_one() {
        assert_eq!(PageParam(None).number(), 1);
        assert_eq!(PageParam(Some(0)).number(), 1);
        assert_eq!(PageParam(Some(4)).number(), 4);
    }
}
