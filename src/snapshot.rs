//! Read model consumed by the presentation surface on every render.

use crate::feed::FeedState;
use crate::model::{ActiveMode, Item, Phase};
use crate::search::SearchState;
use std::sync::Arc;

/// Render-ready projection of whichever state is active.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub mode: ActiveMode,
    pub items: Arc<Vec<Item>>,
    /// Initial load or refresh in progress
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub is_refreshing: bool,
    pub is_error: bool,
    /// Nothing to show and nothing loading
    pub is_empty: bool,
    /// No further pages; always true in search mode
    pub exhausted: bool,
    /// Active search query, empty in feed mode
    pub query: String,
}

/// Which state feeds the render surface.
pub fn active_mode(search: &SearchState) -> ActiveMode {
    if search.query.is_empty() {
        ActiveMode::Feed
    } else {
        ActiveMode::Search
    }
}

/// Project the active state into a [`RenderSnapshot`]. Pure, no I/O.
pub fn render(mode: ActiveMode, feed: &FeedState, search: &SearchState) -> RenderSnapshot {
    let (items, phase, exhausted, query) = match mode {
        ActiveMode::Feed => (&feed.items, feed.phase, feed.exhausted, String::new()),
        ActiveMode::Search => (&search.results, search.phase, true, search.query.clone()),
    };

    RenderSnapshot {
        mode,
        items: Arc::clone(items),
        is_loading: matches!(phase, Phase::LoadingInitial | Phase::Refreshing),
        is_loading_more: phase == Phase::LoadingMore,
        is_refreshing: phase == Phase::Refreshing,
        is_error: phase == Phase::Error,
        is_empty: items.is_empty() && phase == Phase::Idle,
        exhausted,
        query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageCursor;

    fn feed_state(items: Vec<Item>, phase: Phase) -> FeedState {
        FeedState {
            items: Arc::new(items),
            cursor: PageCursor::first(5),
            exhausted: false,
            phase,
        }
    }

    fn search_state(query: &str, results: Vec<Item>, phase: Phase) -> SearchState {
        SearchState {
            query: query.to_string(),
            results: Arc::new(results),
            phase,
        }
    }

    #[test]
    fn test_active_mode_follows_query() {
        assert_eq!(active_mode(&SearchState::default()), ActiveMode::Feed);
        assert_eq!(
            active_mode(&search_state("cafe", Vec::new(), Phase::Idle)),
            ActiveMode::Search
        );
    }

    #[test]
    fn test_feed_mode_projects_feed() {
        let feed = feed_state(vec![Item::new("1", "One", "")], Phase::LoadingMore);
        let search = SearchState::default();

        let snap = render(ActiveMode::Feed, &feed, &search);
        assert_eq!(snap.mode, ActiveMode::Feed);
        assert_eq!(snap.items.len(), 1);
        assert!(snap.is_loading_more);
        assert!(!snap.is_loading);
        assert!(!snap.is_empty);
        assert!(!snap.exhausted);
        assert!(snap.query.is_empty());
    }

    #[test]
    fn test_search_mode_projects_results() {
        let feed = feed_state(vec![Item::new("1", "One", "")], Phase::Idle);
        let search = search_state("cafe", Vec::new(), Phase::LoadingInitial);

        let snap = render(ActiveMode::Search, &feed, &search);
        assert!(snap.items.is_empty());
        assert!(snap.is_loading);
        assert!(!snap.is_empty);
        assert!(snap.exhausted);
        assert_eq!(snap.query, "cafe");
    }

    #[test]
    fn test_refreshing_keeps_items_and_flags() {
        let feed = feed_state(vec![Item::new("1", "One", "")], Phase::Refreshing);
        let snap = render(ActiveMode::Feed, &feed, &SearchState::default());
        assert!(snap.is_loading);
        assert!(snap.is_refreshing);
        assert_eq!(snap.items.len(), 1);
    }

    #[test]
    fn test_empty_only_when_idle() {
        let search = SearchState::default();
        let idle = render(ActiveMode::Feed, &feed_state(Vec::new(), Phase::Idle), &search);
        assert!(idle.is_empty);

        let errored = render(ActiveMode::Feed, &feed_state(Vec::new(), Phase::Error), &search);
        assert!(!errored.is_empty);
        assert!(errored.is_error);
    }

    #[test]
    fn test_items_are_shared_not_copied() {
        let feed = feed_state(vec![Item::new("1", "One", "")], Phase::Idle);
        let snap = render(ActiveMode::Feed, &feed, &SearchState::default());
        assert!(Arc::ptr_eq(&snap.items, &feed.items));
    }
}
