use crate::router::PageKey;
use crate::tmdb::{CatalogItem, Page};

/// Provider-side ceiling on addressable pages. Kept as a constant rather
/// than inferred semantics.
pub const MAX_PROVIDER_PAGES: u32 = 500;

/// How many tiles before the end of the loaded grid the proximity trigger
/// starts requesting the next page.
pub const PAGE_LOOKAHEAD: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    pub current_page: u32,
    pub total_pages: u32,
    pub loading: bool,
    /// Latched by a failed fetch; holds the trigger off until the user
    /// moves the selection again.
    pub failed: bool,
}

/// Incremental-loading controller for one view-all session. Owned by the
/// grid state and discarded with it on navigation, which also tears down the
/// proximity trigger.
#[derive(Debug)]
pub struct RowPaginator {
    key: PageKey,
    cursor: PaginationCursor,
}

impl RowPaginator {
    pub fn new(key: PageKey) -> Self {
        Self {
            key,
            cursor: PaginationCursor {
                current_page: 0,
                total_pages: 1,
                loading: false,
                failed: false,
            },
        }
    }

    pub fn key(&self) -> &PageKey {
        &self.key
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    /// All pages fetched. Once true it stays true; the proximity trigger is
    /// permanently disengaged.
    pub fn exhausted(&self) -> bool {
        self.cursor.current_page >= self.cursor.total_pages
    }

    /// Proximity signal: the selection has moved within `PAGE_LOOKAHEAD`
    /// tiles of the end of the loaded grid.
    pub fn near_end(&self, selected: usize, loaded: usize) -> bool {
        selected + PAGE_LOOKAHEAD >= loaded
    }

    /// Claim the next page number to fetch. At most one fetch is in flight
    /// per paginator; a trigger while loading, after a failure, or after the
    /// last page is a silent no-op.
    pub fn begin(&mut self) -> Option<u32> {
        if self.cursor.loading || self.cursor.failed || self.exhausted() {
            return None;
        }
        self.cursor.loading = true;
        Some(self.cursor.current_page + 1)
    }

    /// Fold a fetched page in: clamp the reported total, drop items without
    /// a poster, return the rest in fetch order for appending.
    pub fn apply(&mut self, page: Page) -> Vec<CatalogItem> {
        self.cursor.loading = false;
        self.cursor.failed = false;
        self.cursor.current_page = page.page;
        self.cursor.total_pages = page.total_pages.clamp(1, MAX_PROVIDER_PAGES);
        page.results
            .into_iter()
            .filter(|item| item.poster_path.is_some())
            .collect()
    }

    /// A failed fetch clears the in-flight flag and latches the cursor.
    /// The proximity signal fires on every event-loop tick, so without the
    /// latch a failure would be retried continuously; instead the trigger
    /// stays off until the user moves the selection (`rearm`).
    pub fn fail(&mut self) {
        self.cursor.loading = false;
        self.cursor.failed = true;
    }

    /// The user moved the selection: a previous failure no longer holds the
    /// trigger off.
    pub fn rearm(&mut self) {
        self.cursor.failed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::MediaKind;

    fn page(number: u32, total: u32, items: usize) -> Page {
        let results = (0..items)
            .map(|n| CatalogItem {
                id: (number as u64) * 100 + n as u64,
                title: format!("Item {n}"),
                media_type: None,
                poster_path: Some(format!("/p{n}.jpg")),
                backdrop_path: None,
                overview: String::new(),
                release_date: None,
                vote_average: 0.0,
            })
            .collect();
        Page {
            page: number,
            results,
            total_pages: total,
        }
    }

    fn paginator() -> RowPaginator {
        RowPaginator::new(PageKey::Popular(MediaKind::Movie))
    }

    #[test]
    fn only_one_fetch_in_flight() {
        let mut p = paginator();
        assert_eq!(p.begin(), Some(1));
        // Trigger fires again while loading: silent no-op.
        assert_eq!(p.begin(), None);
        p.apply(page(1, 3, 5));
        assert_eq!(p.begin(), Some(2));
    }

    #[test]
    fn stops_at_last_page_even_if_trigger_fires() {
        let mut p = paginator();
        p.begin();
        p.apply(page(1, 2, 5));
        p.begin();
        p.apply(page(2, 2, 5));
        assert!(p.exhausted());
        assert_eq!(p.begin(), None);
        assert_eq!(p.begin(), None);
    }

    #[test]
    fn clamps_reported_total_pages() {
        let mut p = paginator();
        p.begin();
        p.apply(page(1, 40_000, 5));
        assert_eq!(p.cursor().total_pages, MAX_PROVIDER_PAGES);
    }

    #[test]
    fn drops_items_without_posters() {
        let mut p = paginator();
        p.begin();
        let mut full = page(1, 1, 3);
        full.results[1].poster_path = None;
        let kept = p.apply(full);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|item| item.poster_path.is_some()));
    }

    #[test]
    fn failure_latches_until_rearmed() {
        let mut p = paginator();
        assert_eq!(p.begin(), Some(1));
        p.fail();
        // The trigger keeps firing; the latch keeps it quiet.
        assert_eq!(p.begin(), None);
        assert_eq!(p.begin(), None);
        p.rearm();
        assert_eq!(p.begin(), Some(1));
    }

    #[test]
    fn success_after_rearm_clears_the_latch() {
        let mut p = paginator();
        p.begin();
        p.fail();
        p.rearm();
        p.begin();
        p.apply(page(1, 3, 5));
        assert!(!p.cursor().failed);
        assert_eq!(p.begin(), Some(2));
    }

    #[test]
    fn proximity_uses_lookahead() {
        let p = paginator();
        assert!(p.near_end(12, 20));
        assert!(!p.near_end(5, 20));
    }
}
