//! Paged browse collection with exactly-once-in-flight fetch semantics.
//!
//! The store performs no I/O. Each intent that needs data returns a
//! [`PageRequest`] ticket; the caller performs the fetch and hands the
//! outcome back through [`FeedStore::apply_page`]. Every issued ticket carries
//! the store generation at issue time, and a resolution whose generation no
//! longer matches is dropped without touching state.

use crate::model::{Item, PageCursor, Phase};
use crate::provider::ProviderError;
use std::collections::HashSet;
use std::sync::Arc;

/// Which intent issued a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Initial,
    More,
    Refresh,
}

/// A page fetch the caller must perform on behalf of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub kind: PageKind,
    pub cursor: PageCursor,
}

/// Outcome of handing a fetch result back to a state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The result matched the current generation and was applied.
    Applied,
    /// The result was superseded and discarded.
    Stale,
}

/// Render-facing feed state.
///
/// `items` is unique by `id` at all times. It is shared behind an `Arc` so a
/// render snapshot is an O(1) clone.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub items: Arc<Vec<Item>>,
    pub cursor: PageCursor,
    pub exhausted: bool,
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedStore {
    state: FeedState,
    /// Ids present in `state.items`
    seen: HashSet<String>,
    generation: u64,
    /// Kind of the request whose failure put the store in `Error`
    failed: Option<PageKind>,
}

impl FeedStore {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: FeedState {
                items: Arc::new(Vec::new()),
                cursor: PageCursor::first(page_size),
                exhausted: false,
                phase: Phase::Idle,
            },
            seen: HashSet::new(),
            generation: 0,
            failed: None,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn items(&self) -> &Arc<Vec<Item>> {
        &self.state.items
    }

    pub fn cursor(&self) -> PageCursor {
        self.state.cursor
    }

    pub fn exhausted(&self) -> bool {
        self.state.exhausted
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn page_size(&self) -> u32 {
        self.state.cursor.page_size
    }

    fn issue(&mut self, kind: PageKind, cursor: PageCursor) -> PageRequest {
        self.generation = self.generation.wrapping_add(1);
        PageRequest {
            generation: self.generation,
            kind,
            cursor,
        }
    }

    /// First load on mount.
    ///
    /// Only allowed while nothing is loaded and no fetch is outstanding. A
    /// failed initial load leaves the store in `Error`, from which the same
    /// intent may be re-issued.
    pub fn load_initial(&mut self) -> Option<PageRequest> {
        if !self.state.phase.is_settled() || !self.state.items.is_empty() {
            tracing::debug!(phase = ?self.state.phase, "load_initial dropped");
            return None;
        }

        self.state.phase = Phase::LoadingInitial;
        let request = self.issue(PageKind::Initial, PageCursor::first(self.page_size()));
        tracing::debug!(generation = request.generation, "load_initial issued");
        Some(request)
    }

    /// Request the page under the cursor.
    ///
    /// Silently dropped while any fetch is outstanding or once the feed is
    /// exhausted: no state change, no request. After a failed refresh or a
    /// failed initial load the first page has not been applied, so only that
    /// intent may be re-issued.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if !self.state.phase.is_settled() || self.state.exhausted || self.awaits_first_page() {
            tracing::debug!(
                phase = ?self.state.phase,
                exhausted = self.state.exhausted,
                failed = ?self.failed,
                "load_more dropped"
            );
            return None;
        }

        self.state.phase = Phase::LoadingMore;
        let request = self.issue(PageKind::More, self.state.cursor);
        tracing::debug!(
            generation = request.generation,
            page = request.cursor.page_number,
            "load_more issued"
        );
        Some(request)
    }

    fn awaits_first_page(&self) -> bool {
        match self.failed {
            Some(PageKind::Refresh) => true,
            Some(PageKind::Initial) => self.state.items.is_empty(),
            _ => false,
        }
    }

    /// Restart from the first page.
    ///
    /// Cursor and exhaustion are reset immediately; the current items stay
    /// visible until the new first page resolves. Any outstanding fetch is
    /// superseded. Re-entrant calls while refreshing are dropped.
    pub fn refresh(&mut self) -> Option<PageRequest> {
        if self.state.phase == Phase::Refreshing {
            tracing::debug!("refresh dropped (already refreshing)");
            return None;
        }

        self.state.phase = Phase::Refreshing;
        self.state.cursor = PageCursor::first(self.page_size());
        self.state.exhausted = false;
        let request = self.issue(PageKind::Refresh, self.state.cursor);
        tracing::debug!(generation = request.generation, "refresh issued");
        Some(request)
    }

    /// Apply the outcome of a previously issued [`PageRequest`].
    pub fn apply_page(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Item>, ProviderError>,
    ) -> Resolution {
        if request.generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = request.generation,
                kind = ?request.kind,
                "Ignoring stale page (generation mismatch)"
            );
            return Resolution::Stale;
        }

        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(
                    kind = ?request.kind,
                    page = request.cursor.page_number,
                    failure = ?e.kind(),
                    error = %e,
                    "Page fetch failed"
                );
                self.state.phase = Phase::Error;
                self.failed = Some(request.kind);
                return Resolution::Applied;
            }
        };

        self.failed = None;
        let raw_len = batch.len();
        match request.kind {
            PageKind::Initial | PageKind::Refresh => {
                self.seen.clear();
                let mut items = Vec::with_capacity(raw_len);
                merge_unique(&mut self.seen, &mut items, batch);
                self.state.items = Arc::new(items);
            }
            PageKind::More => {
                let items = Arc::make_mut(&mut self.state.items);
                let added = merge_unique(&mut self.seen, items, batch);
                if added < raw_len {
                    tracing::debug!(
                        page = request.cursor.page_number,
                        duplicates = raw_len - added,
                        "Dropped duplicate items from page"
                    );
                }
            }
        }

        if request.cursor.is_full(raw_len) {
            self.state.cursor = request.cursor.next();
        } else {
            self.state.exhausted = true;
        }
        self.state.phase = Phase::Idle;

        tracing::debug!(
            kind = ?request.kind,
            page = request.cursor.page_number,
            count = self.state.items.len(),
            exhausted = self.state.exhausted,
            "Page applied"
        );
        Resolution::Applied
    }
}

/// Append the items of `batch` whose id is not in `seen`, in arrival order.
///
/// Returns the number of items appended.
pub(crate) fn merge_unique(
    seen: &mut HashSet<String>,
    items: &mut Vec<Item>,
    batch: Vec<Item>,
) -> usize {
    let before = items.len();
    for item in batch {
        if seen.insert(item.id.clone()) {
            items.push(item);
        }
    }
    items.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(id: u32) -> Item {
        Item::new(id.to_string(), format!("Store {}", id), "Lisbon")
    }

    fn batch(ids: impl IntoIterator<Item = u32>) -> Vec<Item> {
        ids.into_iter().map(item).collect()
    }

    fn ids(store: &FeedStore) -> Vec<String> {
        store.items().iter().map(|i| i.id.clone()).collect()
    }

    fn loaded_store(page_size: u32, first: Vec<Item>) -> FeedStore {
        let mut store = FeedStore::new(page_size);
        let req = store.load_initial().unwrap();
        assert_eq!(store.apply_page(req, Ok(first)), Resolution::Applied);
        store
    }

    #[test]
    fn test_new_store_is_idle_and_empty() {
        let store = FeedStore::new(5);
        assert_eq!(store.phase(), Phase::Idle);
        assert!(store.items().is_empty());
        assert_eq!(store.cursor(), PageCursor::first(5));
        assert!(!store.exhausted());
    }

    #[test]
    fn test_load_initial_full_page_advances_cursor() {
        let mut store = FeedStore::new(5);
        let req = store.load_initial().unwrap();
        assert_eq!(store.phase(), Phase::LoadingInitial);
        assert_eq!(req.cursor.page_number, 1);
        assert_eq!(req.kind, PageKind::Initial);

        store.apply_page(req, Ok(batch(1..=5)));
        assert_eq!(store.phase(), Phase::Idle);
        assert_eq!(store.cursor().page_number, 2);
        assert!(!store.exhausted());
        assert_eq!(store.items().len(), 5);
    }

    #[test]
    fn test_load_initial_short_page_exhausts() {
        let store = loaded_store(5, batch(1..=3));
        assert!(store.exhausted());
        assert_eq!(store.cursor().page_number, 1);
    }

    #[test]
    fn test_load_initial_dedups_within_batch() {
        let store = loaded_store(5, batch([1, 2, 2, 3, 1]));
        assert_eq!(ids(&store), vec!["1", "2", "3"]);
        // Raw batch length decides exhaustion, not the deduplicated one
        assert!(!store.exhausted());
        assert_eq!(store.cursor().page_number, 2);
    }

    #[test]
    fn test_load_initial_failure_sets_error() {
        let mut store = FeedStore::new(5);
        let req = store.load_initial().unwrap();
        store.apply_page(req, Err(ProviderError::Timeout));
        assert_eq!(store.phase(), Phase::Error);
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_load_initial_retry_after_error() {
        let mut store = FeedStore::new(5);
        let req = store.load_initial().unwrap();
        store.apply_page(req, Err(ProviderError::Timeout));

        let retry = store.load_initial().unwrap();
        store.apply_page(retry, Ok(batch(1..=5)));
        assert_eq!(store.phase(), Phase::Idle);
        assert_eq!(store.items().len(), 5);
    }

    #[test]
    fn test_load_initial_dropped_when_items_present() {
        let mut store = loaded_store(5, batch(1..=5));
        let before = store.clone();
        assert!(store.load_initial().is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn test_load_initial_dropped_while_loading() {
        let mut store = FeedStore::new(5);
        let _req = store.load_initial().unwrap();
        assert!(store.load_initial().is_none());
        assert!(store.load_more().is_none());
    }

    #[test]
    fn test_load_more_appends_and_dedups_overlap() {
        let mut store = loaded_store(5, batch(1..=5));
        let req = store.load_more().unwrap();
        assert_eq!(req.cursor.page_number, 2);
        assert_eq!(store.phase(), Phase::LoadingMore);

        store.apply_page(req, Ok(batch(4..=8)));
        assert_eq!(ids(&store), vec!["1", "2", "3", "4", "5", "6", "7", "8"]);
        assert_eq!(store.cursor().page_number, 3);
        assert!(!store.exhausted());
    }

    #[test]
    fn test_load_more_is_noop_while_outstanding() {
        let mut store = loaded_store(5, batch(1..=5));
        let first = store.load_more();
        assert!(first.is_some());

        let snapshot = store.clone();
        assert!(store.load_more().is_none());
        assert!(store.load_more().is_none());
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_load_more_is_noop_after_exhaustion() {
        let mut store = loaded_store(5, batch(1..=5));
        let req = store.load_more().unwrap();
        store.apply_page(req, Ok(Vec::new()));
        assert!(store.exhausted());
        assert_eq!(store.phase(), Phase::Idle);

        let snapshot = store.clone();
        assert!(store.load_more().is_none());
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_load_more_failure_keeps_items_and_cursor() {
        let mut store = loaded_store(5, batch(1..=5));
        let req = store.load_more().unwrap();
        store.apply_page(req, Err(ProviderError::HttpStatus(500)));

        assert_eq!(store.phase(), Phase::Error);
        assert_eq!(store.items().len(), 5);
        assert_eq!(store.cursor().page_number, 2);

        // Retry is a fresh load_more for the same page
        let retry = store.load_more().unwrap();
        assert_eq!(retry.cursor.page_number, 2);
    }

    #[test]
    fn test_refresh_resets_cursor_and_exhaustion() {
        let mut store = loaded_store(5, batch(1..=2));
        assert!(store.exhausted());

        let req = store.refresh().unwrap();
        assert_eq!(store.phase(), Phase::Refreshing);
        assert_eq!(store.cursor(), PageCursor::first(5));
        assert!(!store.exhausted());
        // Previous items stay visible while refreshing
        assert_eq!(store.items().len(), 2);

        store.apply_page(req, Ok(batch(10..=14)));
        assert_eq!(ids(&store), vec!["10", "11", "12", "13", "14"]);
        assert_eq!(store.cursor().page_number, 2);
    }

    #[test]
    fn test_refresh_failure_retains_items() {
        let mut store = loaded_store(5, batch(1..=5));
        let req = store.load_more().unwrap();
        store.apply_page(req, Ok(batch(6..=7)));
        let items_before = store.items().clone();

        let req = store.refresh().unwrap();
        store.apply_page(req, Err(ProviderError::Timeout));

        assert_eq!(store.phase(), Phase::Error);
        assert_eq!(store.items(), &items_before);
        assert_eq!(store.cursor(), PageCursor::first(5));
        assert!(!store.exhausted());
    }

    #[test]
    fn test_load_more_after_failed_refresh_is_dropped() {
        let mut store = loaded_store(2, batch([1, 2]));
        let req = store.load_more().unwrap();
        store.apply_page(req, Ok(batch([3, 4])));

        let req = store.refresh().unwrap();
        store.apply_page(req, Err(ProviderError::Timeout));

        // The first page is still owed to the refresh, not to load_more
        let snapshot = store.clone();
        assert!(store.load_more().is_none());
        assert_eq!(store, snapshot);

        let retry = store.refresh().unwrap();
        assert_eq!(retry.kind, PageKind::Refresh);
        store.apply_page(retry, Ok(batch([10, 11])));
        assert_eq!(ids(&store), vec!["10", "11"]);

        let more = store.load_more().unwrap();
        assert_eq!(more.cursor.page_number, 2);
    }

    #[test]
    fn test_load_more_after_failed_initial_load_is_dropped() {
        let mut store = FeedStore::new(5);
        let req = store.load_initial().unwrap();
        store.apply_page(req, Err(ProviderError::HttpStatus(503)));

        assert!(store.load_more().is_none());
        assert_eq!(store.phase(), Phase::Error);
        assert!(store.load_initial().is_some());
    }

    #[test]
    fn test_refresh_is_not_reentrant() {
        let mut store = loaded_store(5, batch(1..=5));
        assert!(store.refresh().is_some());
        let snapshot = store.clone();
        assert!(store.refresh().is_none());
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_load_more_response_after_refresh_is_stale() {
        let mut store = loaded_store(5, batch(1..=5));
        let more = store.load_more().unwrap();
        let refresh = store.refresh().unwrap();

        assert_eq!(store.apply_page(more, Ok(batch(6..=10))), Resolution::Stale);
        assert_eq!(store.phase(), Phase::Refreshing);
        assert_eq!(store.items().len(), 5);

        assert_eq!(
            store.apply_page(refresh, Ok(batch(20..=24))),
            Resolution::Applied
        );
        assert_eq!(ids(&store), vec!["20", "21", "22", "23", "24"]);
    }

    #[test]
    fn test_refresh_then_load_more_dedups_against_new_page() {
        let mut store = loaded_store(5, batch(1..=5));
        let req = store.refresh().unwrap();
        store.apply_page(req, Ok(batch(3..=7)));

        let req = store.load_more().unwrap();
        store.apply_page(req, Ok(batch([1, 2, 3, 8, 9])));
        assert_eq!(ids(&store), vec!["3", "4", "5", "6", "7", "1", "2", "8", "9"]);
    }

    #[test]
    fn test_merge_unique_counts_new_items() {
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        assert_eq!(merge_unique(&mut seen, &mut items, batch([1, 2])), 2);
        assert_eq!(merge_unique(&mut seen, &mut items, batch([2, 3])), 1);
        assert_eq!(items.len(), 3);
    }
}
