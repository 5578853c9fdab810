use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use crate::error::{panic_message, FeedError, StoreError};
use crate::models::{group_label, FeedQueryRequest, MatchStatusGroup, StoreFeedResponse};
use crate::services::metrics::{QueryMetricsFactory, ScopedTimer};
use crate::services::store::MatchStore;

/// Service tag on every feed query metric
pub const METRICS_HIERARCHY: &str = "match_feed.store";

/// Operation tag for status group queries
pub const METRICS_GET_BY_STATUS_GROUP: &str = "get_user_matches_by_status_group";

/// Runs one feed query and keeps its failure to itself
#[derive(Clone)]
pub struct GroupFetcher {
    store: Arc<dyn MatchStore>,
    metrics: Arc<dyn QueryMetricsFactory>,
}

impl GroupFetcher {
    pub fn new(store: Arc<dyn MatchStore>, metrics: Arc<dyn QueryMetricsFactory>) -> Self {
        Self { store, metrics }
    }

    /// Query the store for one group
    ///
    /// Never fails: a store error, or a panic inside the store call, is
    /// logged and returned on the group's own response.
    pub async fn fetch(&self, query: FeedQueryRequest, group: Option<MatchStatusGroup>) -> StoreFeedResponse {
        let user_id = query.user_id;
        let label = group_label(group);
        let mut response = StoreFeedResponse::new(group);

        let mut timer = ScopedTimer::start(self.metrics.timer(METRICS_HIERARCHY, METRICS_GET_BY_STATUS_GROUP, group));
        let histogram = self.metrics.histogram(METRICS_HIERARCHY, METRICS_GET_BY_STATUS_GROUP, group);

        let outcome = AssertUnwindSafe(self.store.fetch_feed(&query))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(StoreError::Unexpected(panic_message(panic.as_ref()))));

        match outcome {
            Ok(items) => {
                histogram.update(items.len() as u64);
                response.data_available = !items.is_empty();
                response.items = items;
            }
            Err(source) => {
                tracing::warn!(
                    "Exception while fetching the matches from store for user {} and group {}: {}",
                    user_id,
                    label,
                    source
                );
                response.error = Some(FeedError::GroupFetch {
                    user_id,
                    group: label,
                    source,
                });
            }
        }

        if let Some(elapsed_ms) = timer.stop() {
            tracing::info!(
                "Store response time {}ms for user {} and status group {}",
                elapsed_ms,
                user_id,
                label
            );
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use crate::models::{MatchFeedItem, MatchStatus};
    use crate::services::metrics::{QueryHistogram, QueryTimer};

    enum Behaviour {
        Items(Vec<i64>),
        Fail,
        Panic,
    }

    struct FakeStore(Behaviour);

    #[async_trait]
    impl MatchStore for FakeStore {
        async fn fetch_feed(&self, query: &FeedQueryRequest) -> Result<HashSet<MatchFeedItem>, StoreError> {
            match &self.0 {
                Behaviour::Items(ids) => Ok(ids
                    .iter()
                    .map(|id| MatchFeedItem {
                        match_id: *id,
                        user_id: query.user_id,
                        matched_user_id: id + 1000,
                        status: MatchStatus::New,
                        delivered_date: None,
                        last_communication_date: None,
                        profile: None,
                    })
                    .collect()),
                Behaviour::Fail => Err(StoreError::Unavailable("connection reset".to_string())),
                Behaviour::Panic => panic!("store exploded"),
            }
        }

        async fn fetch_feed_item(&self, _user_id: i64, _match_id: i64) -> Result<Option<MatchFeedItem>, StoreError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct Recorded {
        timer_stops: AtomicUsize,
        sizes: Mutex<Vec<u64>>,
        tags: Mutex<Vec<(String, String, &'static str)>>,
    }

    struct RecordingMetrics(Arc<Recorded>);
    struct Timer(Arc<Recorded>);
    struct Histogram(Arc<Recorded>);

    impl QueryTimer for Timer {
        fn stop(&mut self) -> u64 {
            self.0.timer_stops.fetch_add(1, Ordering::SeqCst);
            1
        }
    }

    impl QueryHistogram for Histogram {
        fn update(&self, value: u64) {
            self.0.sizes.lock().unwrap().push(value);
        }
    }

    impl QueryMetricsFactory for RecordingMetrics {
        fn timer(&self, hierarchy: &str, operation: &str, group: Option<MatchStatusGroup>) -> Box<dyn QueryTimer> {
            self.0
                .tags
                .lock()
                .unwrap()
                .push((hierarchy.to_string(), operation.to_string(), group_label(group)));
            Box::new(Timer(self.0.clone()))
        }

        fn histogram(&self, _hierarchy: &str, _operation: &str, _group: Option<MatchStatusGroup>) -> Box<dyn QueryHistogram> {
            Box::new(Histogram(self.0.clone()))
        }
    }

    fn fetcher(behaviour: Behaviour) -> (GroupFetcher, Arc<Recorded>) {
        let recorded = Arc::new(Recorded::default());
        let fetcher = GroupFetcher::new(
            Arc::new(FakeStore(behaviour)),
            Arc::new(RecordingMetrics(recorded.clone())),
        );
        (fetcher, recorded)
    }

    #[tokio::test]
    async fn test_successful_fetch_records_size() {
        let (fetcher, recorded) = fetcher(Behaviour::Items(vec![1, 2, 3]));

        let response = fetcher
            .fetch(FeedQueryRequest::for_user(5), Some(MatchStatusGroup::New))
            .await;

        assert_eq!(response.group, Some(MatchStatusGroup::New));
        assert_eq!(response.items.len(), 3);
        assert!(response.data_available);
        assert!(response.error.is_none());
        assert_eq!(*recorded.sizes.lock().unwrap(), vec![3]);
        assert_eq!(recorded.timer_stops.load(Ordering::SeqCst), 1);
        assert_eq!(
            recorded.tags.lock().unwrap()[0],
            (METRICS_HIERARCHY.to_string(), METRICS_GET_BY_STATUS_GROUP.to_string(), "new")
        );
    }

    #[tokio::test]
    async fn test_empty_result_is_not_data_available() {
        let (fetcher, _) = fetcher(Behaviour::Items(vec![]));

        let response = fetcher.fetch(FeedQueryRequest::for_user(5), None).await;

        assert!(!response.data_available);
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_store_error_is_captured() {
        let (fetcher, recorded) = fetcher(Behaviour::Fail);

        let response = fetcher
            .fetch(FeedQueryRequest::for_user(5), Some(MatchStatusGroup::Archive))
            .await;

        assert!(response.items.is_empty());
        assert!(!response.data_available);
        assert!(matches!(
            response.error,
            Some(FeedError::GroupFetch { user_id: 5, group: "archive", .. })
        ));
        assert!(recorded.sizes.lock().unwrap().is_empty());
        assert_eq!(recorded.timer_stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_panic_is_captured() {
        let (fetcher, recorded) = fetcher(Behaviour::Panic);

        let response = fetcher
            .fetch(FeedQueryRequest::for_user(5), Some(MatchStatusGroup::Communication))
            .await;

        match response.error {
            Some(FeedError::GroupFetch { source: StoreError::Unexpected(message), .. }) => {
                assert!(message.contains("store exploded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(recorded.timer_stops.load(Ordering::SeqCst), 1);
    }
}
