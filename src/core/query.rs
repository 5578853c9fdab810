use std::sync::Arc;
use crate::core::classifier::ALL_STATUSES_TOKEN;
use crate::core::limits::PageLimit;
use crate::models::{FeedMergeStrategy, FeedQueryRequest, MatchStatus, MatchStatusGroup};

/// Sort field for every group except communication
pub const DEFAULT_SORT_BY: &str = "delivered-date";

/// Sort field for the communication group
pub const COMMUNICATION_SORT_BY: &str = "last-communication-date";

pub fn sort_by_for_group(group: Option<MatchStatusGroup>) -> &'static str {
    match group {
        Some(MatchStatusGroup::Communication) => COMMUNICATION_SORT_BY,
        _ => DEFAULT_SORT_BY,
    }
}

/// Builds store query descriptors
///
/// Holds the process-wide profile field list that is projected into each
/// item when the caller merges profiles into the feed.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    profile_fields: Arc<Vec<String>>,
}

impl QueryBuilder {
    pub fn new(profile_fields: Vec<String>) -> Self {
        Self {
            profile_fields: Arc::new(profile_fields),
        }
    }

    pub fn profile_fields(&self) -> &[String] {
        &self.profile_fields
    }

    /// Query for one status group
    pub fn for_group(
        &self,
        user_id: i64,
        group: Option<MatchStatusGroup>,
        statuses: &[MatchStatus],
        limit: Option<PageLimit>,
        strategy: Option<FeedMergeStrategy>,
    ) -> FeedQueryRequest {
        FeedQueryRequest {
            user_id,
            status_filters: statuses.iter().map(|status| status.code()).collect(),
            selected_fields: self.selected_fields(strategy),
            sort_by: sort_by_for_group(group).to_string(),
            start_page: limit.map(|limit| limit.start_page),
            page_size: limit.map(|limit| limit.page_size),
        }
    }

    /// Query over raw status tokens, without grouping or paging
    ///
    /// `all` clears the filter so the store returns every status.
    pub fn for_status_tokens<S: AsRef<str>>(
        &self,
        user_id: i64,
        tokens: &[S],
        strategy: Option<FeedMergeStrategy>,
    ) -> FeedQueryRequest {
        let mut status_filters = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            if token.trim().eq_ignore_ascii_case(ALL_STATUSES_TOKEN) {
                status_filters.clear();
                break;
            }
            match MatchStatus::from_name(token) {
                Some(status) if !status_filters.contains(&status.code()) => status_filters.push(status.code()),
                Some(_) => {}
                None => tracing::warn!("Requested match status {} is not valid for user {}", token, user_id),
            }
        }

        FeedQueryRequest {
            user_id,
            status_filters,
            selected_fields: self.selected_fields(strategy),
            sort_by: DEFAULT_SORT_BY.to_string(),
            start_page: None,
            page_size: None,
        }
    }

    fn selected_fields(&self, strategy: Option<FeedMergeStrategy>) -> Option<Vec<String>> {
        match strategy {
            Some(FeedMergeStrategy::ProfileMerge) => Some(self.profile_fields.as_ref().clone()),
            _ => None,
        }
    }
}
