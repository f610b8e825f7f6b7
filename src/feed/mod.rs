//! Browse feed: the paged, deduplicated item collection.
//!
//! - [`store`] - Feed store state machine (initial load, append, refresh)
//!
//! The store never performs I/O itself. Intents hand back a [`PageRequest`]
//! that the [`ListController`](crate::controller::ListController) fulfils
//! through an [`ItemProvider`](crate::provider::ItemProvider).

mod store;

pub use store::{FeedState, FeedStore, PageKind, PageRequest, Resolution};
