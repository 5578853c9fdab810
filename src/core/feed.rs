use std::collections::HashSet;
use std::sync::Arc;
use crate::config::FetchMode;
use crate::core::aggregator::FeedAggregator;
use crate::core::classifier::classify_statuses;
use crate::core::fetcher::GroupFetcher;
use crate::core::limits::{resolve_limit, FeedLimits};
use crate::core::query::QueryBuilder;
use crate::core::safe::recover;
use crate::error::FeedError;
use crate::models::{
    group_label, AggregatedFeed, FeedQueryRequest, MatchFeedItem, MatchFeedRequestContext, StoreFeedRequestContext,
    StoreFeedResponse,
};
use crate::services::metrics::QueryMetricsFactory;
use crate::services::store::MatchStore;

/// Entry points for reading a user's matches feed
///
/// Methods ending in `_safe` always return a value; failures are logged and
/// carried on the response. The remaining methods return `Err` to trusted
/// internal callers.
#[derive(Clone)]
pub struct MatchFeedService {
    store: Arc<dyn MatchStore>,
    fetcher: GroupFetcher,
    aggregator: FeedAggregator,
    query_builder: QueryBuilder,
    limits: Arc<dyn FeedLimits>,
    fetch_mode: FetchMode,
}

impl MatchFeedService {
    pub fn new(
        store: Arc<dyn MatchStore>,
        metrics: Arc<dyn QueryMetricsFactory>,
        limits: Arc<dyn FeedLimits>,
        profile_fields: Vec<String>,
        fetch_mode: FetchMode,
    ) -> Self {
        let fetcher = GroupFetcher::new(store.clone(), metrics);
        let query_builder = QueryBuilder::new(profile_fields);
        let aggregator = FeedAggregator::new(fetcher.clone(), query_builder.clone(), limits.clone());

        Self {
            store,
            fetcher,
            aggregator,
            query_builder,
            limits,
            fetch_mode,
        }
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Whether the backing store answers; errors count as unhealthy
    pub async fn store_healthy(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }

    /// Feed of a single status group
    pub async fn get_user_matches_by_status_group_safe(&self, request: &StoreFeedRequestContext) -> StoreFeedResponse {
        recover(
            async { Ok::<_, FeedError>(self.get_user_matches_by_status_group(request).await) },
            |error| {
                tracing::warn!(
                    "Exception while fetching feed for user {} and group {}, returning empty feed: {}",
                    request.user_id(),
                    group_label(request.group),
                    error
                );
                StoreFeedResponse::failed(request.group, error)
            },
        )
        .await
    }

    async fn get_user_matches_by_status_group(&self, request: &StoreFeedRequestContext) -> StoreFeedResponse {
        let limit = match request.group {
            Some(group) if !request.statuses.is_empty() => {
                resolve_limit(self.limits.as_ref(), group, request.fallback)
            }
            _ => None,
        };

        let query = self.query_builder.for_group(
            request.user_id(),
            request.group,
            &request.statuses,
            limit,
            request.merge_strategy,
        );

        self.fetcher.fetch(query, request.group).await
    }

    /// Full feed across every requested group, with per-group outcomes
    pub async fn get_matches_feed_safe(&self, request: &MatchFeedRequestContext) -> AggregatedFeed {
        recover(async { Ok::<_, FeedError>(self.get_matches_feed(request).await) }, |error| {
            tracing::warn!(
                "Exception while aggregating feed for user {}, returning empty feed: {}",
                request.user_id(),
                error
            );
            AggregatedFeed::failed(error)
        })
        .await
    }

    async fn get_matches_feed(&self, request: &MatchFeedRequestContext) -> AggregatedFeed {
        match self.fetch_mode {
            FetchMode::Legacy => self.aggregator.fetch_legacy(request).await,
            FetchMode::Parallel | FetchMode::Sequential => {
                let groups = classify_statuses(request.user_id(), &request.query.statuses);
                let parallel = self.fetch_mode == FetchMode::Parallel;
                self.aggregator.aggregate(request, groups, parallel).await
            }
        }
    }

    /// Deduplicated items of the full feed; any failure yields an empty set
    pub async fn get_user_matches_from_store_safe(&self, request: &MatchFeedRequestContext) -> HashSet<MatchFeedItem> {
        let feed = self.get_matches_feed_safe(request).await;
        if let Some(error) = &feed.error {
            tracing::warn!(
                "Feed for user {} failed, returning empty set: {}",
                request.user_id(),
                error
            );
            return HashSet::new();
        }
        feed.items
    }

    /// Every match of a user, unfiltered
    pub async fn get_user_matches_internal(&self, user_id: i64) -> Result<Vec<MatchFeedItem>, FeedError> {
        let items = self
            .store
            .fetch_feed(&FeedQueryRequest::for_user(user_id))
            .await
            .map_err(|source| {
                tracing::warn!("Exception while fetching matches for user {}: {}", user_id, source);
                FeedError::Internal { user_id, source }
            })?;

        if items.is_empty() {
            tracing::debug!("No matches found for user {}", user_id);
        } else {
            tracing::debug!("Found {} matches for user {}", items.len(), user_id);
        }

        Ok(items.into_iter().collect())
    }

    /// A single match of a user, if present
    pub async fn get_user_match(&self, user_id: i64, match_id: i64) -> Result<Option<MatchFeedItem>, FeedError> {
        let item = self
            .store
            .fetch_feed_item(user_id, match_id)
            .await
            .map_err(|source| {
                tracing::warn!(
                    "Exception while fetching match {} for user {}: {}",
                    match_id,
                    user_id,
                    source
                );
                FeedError::Internal { user_id, source }
            })?;

        if item.is_some() {
            tracing::debug!("Found match {} for user {}", match_id, user_id);
        }

        Ok(item)
    }
}
