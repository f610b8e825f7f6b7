//! Query-driven overlay that temporarily replaces the browse feed.
//!
//! - [`overlay`] - Search state machine with stale-response suppression

mod overlay;

pub use overlay::{SearchOverlay, SearchRequest, SearchState, DEFAULT_MAX_QUERY_LENGTH};
