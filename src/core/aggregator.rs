use futures::future::join_all;
use std::sync::Arc;
use crate::core::classifier::StatusGroups;
use crate::core::fetcher::GroupFetcher;
use crate::core::limits::{resolve_limit, FeedLimits};
use crate::core::query::QueryBuilder;
use crate::error::{FeedError, StoreError};
use crate::models::{
    group_label, AggregatedFeed, FeedQueryRequest, MatchFeedRequestContext, MatchStatus, MatchStatusGroup, StoreFeedResponse,
};

/// Fetches every requested status group and merges the results
///
/// # Modes
/// * fan-out: one tokio task per group, all joined before merging
/// * sequential: one group after another
/// * legacy: a single query over the raw status tokens
#[derive(Clone)]
pub struct FeedAggregator {
    fetcher: GroupFetcher,
    query_builder: QueryBuilder,
    limits: Arc<dyn FeedLimits>,
}

impl FeedAggregator {
    pub fn new(fetcher: GroupFetcher, query_builder: QueryBuilder, limits: Arc<dyn FeedLimits>) -> Self {
        Self {
            fetcher,
            query_builder,
            limits,
        }
    }

    /// Query one group per entry of `groups` and union the results
    ///
    /// A failing group leaves an error-tagged, empty sub-result behind; the
    /// other groups still contribute their items.
    pub async fn aggregate(
        &self,
        request: &MatchFeedRequestContext,
        groups: StatusGroups,
        parallel: bool,
    ) -> AggregatedFeed {
        let queries: Vec<(MatchStatusGroup, FeedQueryRequest)> = groups
            .into_iter()
            .map(|(group, statuses)| (group, self.group_query(request, group, &statuses)))
            .collect();

        tracing::debug!(
            "Fetching {} status groups for user {} ({})",
            queries.len(),
            request.user_id(),
            if parallel { "fan-out" } else { "sequential" }
        );

        let group_results = if parallel {
            self.fetch_concurrently(request.user_id(), queries).await
        } else {
            self.fetch_sequentially(queries).await
        };

        let feed = AggregatedFeed::merge(group_results);

        tracing::debug!(
            "Merged {} feed items for user {} ({} groups failed)",
            feed.items.len(),
            request.user_id(),
            feed.group_results.iter().filter(|result| result.is_failed()).count()
        );

        feed
    }

    /// Single query over the raw status tokens, bypassing groups and limits
    pub async fn fetch_legacy(&self, request: &MatchFeedRequestContext) -> AggregatedFeed {
        let query = self.query_builder.for_status_tokens(
            request.user_id(),
            &request.query.statuses,
            request.merge_strategy,
        );

        let mut result = self.fetcher.fetch(query, None).await;

        match result.error.take() {
            Some(error) => AggregatedFeed::failed(error),
            None => AggregatedFeed::merge(vec![result]),
        }
    }

    fn group_query(
        &self,
        request: &MatchFeedRequestContext,
        group: MatchStatusGroup,
        statuses: &[MatchStatus],
    ) -> FeedQueryRequest {
        let limit = if statuses.is_empty() {
            None
        } else {
            resolve_limit(self.limits.as_ref(), group, request.fallback)
        };

        self.query_builder
            .for_group(request.user_id(), Some(group), statuses, limit, request.merge_strategy)
    }

    async fn fetch_sequentially(&self, queries: Vec<(MatchStatusGroup, FeedQueryRequest)>) -> Vec<StoreFeedResponse> {
        let mut results = Vec::with_capacity(queries.len());
        for (group, query) in queries {
            results.push(self.fetcher.fetch(query, Some(group)).await);
        }
        results
    }

    async fn fetch_concurrently(
        &self,
        user_id: i64,
        queries: Vec<(MatchStatusGroup, FeedQueryRequest)>,
    ) -> Vec<StoreFeedResponse> {
        let (groups, handles): (Vec<_>, Vec<_>) = queries
            .into_iter()
            .map(|(group, query)| {
                let fetcher = self.fetcher.clone();
                (group, tokio::spawn(async move { fetcher.fetch(query, Some(group)).await }))
            })
            .unzip();

        join_all(handles)
            .await
            .into_iter()
            .zip(groups)
            .map(|(joined, group)| {
                joined.unwrap_or_else(|join_error| {
                    tracing::warn!(
                        "Feed task for user {} and group {} did not complete: {}",
                        user_id,
                        group,
                        join_error
                    );
                    StoreFeedResponse::failed(
                        Some(group),
                        FeedError::GroupFetch {
                            user_id,
                            group: group_label(Some(group)),
                            source: StoreError::Unexpected(join_error.to_string()),
                        },
                    )
                })
            })
            .collect()
    }
}
