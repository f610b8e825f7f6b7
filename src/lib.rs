//! List acquisition for a storefront discovery feed.
//!
//! A [`controller::ListController`] merges paged browsing of a collection
//! ([`feed`]) with a query-driven search mode ([`search`]) behind a single
//! read model ([`snapshot::RenderSnapshot`]). Items come from any
//! [`provider::ItemProvider`].

pub mod config;
pub mod controller;
pub mod feed;
pub mod model;
pub mod provider;
pub mod search;
pub mod snapshot;
pub mod util;

pub use controller::{ControllerEvent, ControllerOptions, ListController};
pub use model::{ActiveMode, Item, PageCursor, Phase};
pub use snapshot::RenderSnapshot;
