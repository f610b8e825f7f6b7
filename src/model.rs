//! Core data types shared by the feed store, search overlay and render snapshot.

use serde::{Deserialize, Serialize};

// ============================================================================
// Item
// ============================================================================

/// A storefront record as returned by an [`ItemProvider`](crate::provider::ItemProvider).
///
/// Only `id` is inspected by the controller (for deduplication). The display
/// fields are carried through untouched for the presentation layer, except
/// `title` and `location` which the catalog provider matches search queries
/// against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Item {
    /// Build an item with only the fields the controller and search care about.
    pub fn new(id: impl Into<String>, title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            location: location.into(),
            category: None,
            rating: None,
            image_url: None,
        }
    }
}

// ============================================================================
// Page Cursor
// ============================================================================

/// Pointer to the next page to request from the provider.
///
/// `page_number` starts at 1; `page_size` is fixed for the lifetime of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageCursor {
    /// Cursor pointing at the first page.
    ///
    /// A `page_size` of zero is clamped to 1.
    pub fn first(page_size: u32) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(1),
        }
    }

    /// The cursor for the following page.
    pub fn next(self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            page_size: self.page_size,
        }
    }

    /// Whether a batch of `len` raw items fills this page.
    ///
    /// A short (or empty) batch signals exhaustion.
    pub fn is_full(&self, len: usize) -> bool {
        len >= self.page_size as usize
    }
}

// ============================================================================
// Phase / Mode
// ============================================================================

/// Fetch lifecycle phase, shared by the feed store and the search overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    LoadingInitial,
    LoadingMore,
    Refreshing,
    Error,
}

impl Phase {
    /// True when no fetch is outstanding for the owning state.
    ///
    /// `Error` is a resting phase: the caller retries by re-issuing the intent.
    pub fn is_settled(self) -> bool {
        matches!(self, Phase::Idle | Phase::Error)
    }
}

/// Which state currently feeds the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveMode {
    Feed,
    Search,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cursor_clamps_zero_page_size() {
        let cursor = PageCursor::first(0);
        assert_eq!(cursor.page_number, 1);
        assert_eq!(cursor.page_size, 1);
    }

    #[test]
    fn test_cursor_next_keeps_page_size() {
        let cursor = PageCursor::first(5).next().next();
        assert_eq!(cursor, PageCursor { page_number: 3, page_size: 5 });
    }

    #[test]
    fn test_is_full() {
        let cursor = PageCursor::first(5);
        assert!(cursor.is_full(5));
        assert!(!cursor.is_full(4));
        assert!(!cursor.is_full(0));
    }

    #[test]
    fn test_settled_phases() {
        assert!(Phase::Idle.is_settled());
        assert!(Phase::Error.is_settled());
        assert!(!Phase::LoadingInitial.is_settled());
        assert!(!Phase::LoadingMore.is_settled());
        assert!(!Phase::Refreshing.is_settled());
    }

    #[test]
    fn test_item_deserializes_with_missing_optional_fields() {
        let item: Item = serde_json::from_str(r#"{"id":"a1","title":"Cafe Nero"}"#).unwrap();
        assert_eq!(item.id, "a1");
        assert_eq!(item.location, "");
        assert!(item.category.is_none());
    }
}
