use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::error::FeedError;
use crate::models::domain::{MatchFeedItem, MatchStatusGroup};

/// Result of querying the store for one status group
#[derive(Debug, Default)]
pub struct StoreFeedResponse {
    pub group: Option<MatchStatusGroup>,
    pub items: HashSet<MatchFeedItem>,
    pub data_available: bool,
    pub error: Option<FeedError>,
}

impl StoreFeedResponse {
    pub fn new(group: Option<MatchStatusGroup>) -> Self {
        Self {
            group,
            ..Default::default()
        }
    }

    /// Empty, error-tagged result for a group
    pub fn failed(group: Option<MatchStatusGroup>, error: FeedError) -> Self {
        Self {
            group,
            items: HashSet::new(),
            data_available: false,
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Union of every group's results, with the per-group outcomes kept
#[derive(Debug, Default)]
pub struct AggregatedFeed {
    pub items: HashSet<MatchFeedItem>,
    pub data_available: bool,
    pub group_results: Vec<StoreFeedResponse>,
    pub error: Option<FeedError>,
}

impl AggregatedFeed {
    /// Merge group results into one deduplicated set
    pub fn merge(group_results: Vec<StoreFeedResponse>) -> Self {
        let items: HashSet<MatchFeedItem> = group_results
            .iter()
            .flat_map(|result| result.items.iter().cloned())
            .collect();

        Self {
            data_available: !items.is_empty(),
            items,
            group_results,
            error: None,
        }
    }

    pub fn failed(error: FeedError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    /// Sub-result of one group, if that group was queried
    pub fn group_result(&self, group: MatchStatusGroup) -> Option<&StoreFeedResponse> {
        self.group_results.iter().find(|result| result.group == Some(group))
    }
}

/// Per-group summary returned over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: Option<MatchStatusGroup>,
    pub count: usize,
    #[serde(rename = "dataAvailable")]
    pub data_available: bool,
    pub error: Option<String>,
}

impl From<&StoreFeedResponse> for GroupSummary {
    fn from(result: &StoreFeedResponse) -> Self {
        Self {
            group: result.group,
            count: result.items.len(),
            data_available: result.data_available,
            error: result.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Response for the feed endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub matches: Vec<MatchFeedItem>,
    #[serde(rename = "totalMatches")]
    pub total_matches: usize,
    #[serde(rename = "dataAvailable")]
    pub data_available: bool,
    pub groups: Vec<GroupSummary>,
    pub error: Option<String>,
}

impl FeedResponse {
    pub fn from_aggregate(user_id: i64, feed: &AggregatedFeed) -> Self {
        Self {
            user_id,
            matches: sorted_items(&feed.items),
            total_matches: feed.items.len(),
            data_available: feed.data_available,
            groups: feed.group_results.iter().map(GroupSummary::from).collect(),
            error: feed.error.as_ref().map(ToString::to_string),
        }
    }

    pub fn from_group(user_id: i64, result: &StoreFeedResponse) -> Self {
        Self {
            user_id,
            matches: sorted_items(&result.items),
            total_matches: result.items.len(),
            data_available: result.data_available,
            groups: vec![GroupSummary::from(result)],
            error: result.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Stable output order for a set of items: most recently delivered first
fn sorted_items(items: &HashSet<MatchFeedItem>) -> Vec<MatchFeedItem> {
    let mut matches: Vec<MatchFeedItem> = items.iter().cloned().collect();
    matches.sort_by(|a, b| {
        b.delivered_date
            .cmp(&a.delivered_date)
            .then_with(|| a.match_id.cmp(&b.match_id))
    });
    matches
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::domain::MatchStatus;
    use chrono::{TimeZone, Utc};

    fn item(match_id: i64, day: u32) -> MatchFeedItem {
        MatchFeedItem {
            match_id,
            user_id: 1,
            matched_user_id: 100 + match_id,
            status: MatchStatus::New,
            delivered_date: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            last_communication_date: None,
            profile: None,
        }
    }

    #[test]
    fn test_merge_deduplicates_across_groups() {
        let mut new = StoreFeedResponse::new(Some(MatchStatusGroup::New));
        new.items = [item(1, 1), item(2, 2)].into_iter().collect();
        let mut comm = StoreFeedResponse::new(Some(MatchStatusGroup::Communication));
        comm.items = [item(2, 2), item(3, 3)].into_iter().collect();

        let feed = AggregatedFeed::merge(vec![new, comm]);

        assert_eq!(feed.items.len(), 3);
        assert!(feed.data_available);
        assert!(feed.error.is_none());
    }

    #[test]
    fn test_feed_response_orders_newest_first() {
        let feed = AggregatedFeed::merge(vec![StoreFeedResponse {
            group: Some(MatchStatusGroup::New),
            items: [item(1, 1), item(2, 5), item(3, 3)].into_iter().collect(),
            data_available: true,
            error: None,
        }]);

        let response = FeedResponse::from_aggregate(9, &feed);
        let ids: Vec<i64> = response.matches.iter().map(|m| m.match_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(response.total_matches, 3);
    }

    #[test]
    fn test_group_summary_carries_error_text() {
        let failed = StoreFeedResponse::failed(
            Some(MatchStatusGroup::Archive),
            FeedError::GroupFetch {
                user_id: 1,
                group: "archive",
                source: StoreError::Unavailable("down".to_string()),
            },
        );
        let summary = GroupSummary::from(&failed);
        assert_eq!(summary.count, 0);
        assert!(!summary.data_available);
        assert!(summary.error.unwrap().contains("down"));
    }
}
