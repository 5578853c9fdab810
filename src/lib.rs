//! Match Feed - status-grouped matches feed service
//!
//! This library reads a user's matches feed from the match store. Requested
//! statuses are classified into status groups, each group is queried with
//! its own paging limit, and the results are merged into one deduplicated
//! feed. A failing group never takes its siblings down with it.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{classify_statuses, FeedLimitsConfig, MatchFeedService, QueryBuilder};
pub use error::{FeedError, StoreError};
pub use models::{AggregatedFeed, MatchFeedItem, MatchFeedRequestContext, MatchStatus, MatchStatusGroup, StoreFeedRequestContext, StoreFeedResponse};
