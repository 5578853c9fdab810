use async_trait::async_trait;
use std::collections::HashSet;
use crate::error::StoreError;
use crate::models::{FeedQueryRequest, MatchFeedItem};

/// Read access to the backing match feed store
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Run a feed query; an empty status filter returns every status
    async fn fetch_feed(&self, query: &FeedQueryRequest) -> Result<HashSet<MatchFeedItem>, StoreError>;

    /// Look up a single match of a user
    async fn fetch_feed_item(&self, user_id: i64, match_id: i64) -> Result<Option<MatchFeedItem>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
