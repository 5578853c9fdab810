use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{FeedMergeStrategy, MatchStatus, MatchStatusGroup};

/// What the caller asked for: the user and the raw status tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFeedQueryContext {
    pub user_id: i64,
    pub statuses: Vec<String>,
}

impl MatchFeedQueryContext {
    pub fn new<I, S>(user_id: i64, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            statuses: statuses.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request for the full, multi-group feed
#[derive(Debug, Clone, Default)]
pub struct MatchFeedRequestContext {
    pub query: MatchFeedQueryContext,
    pub merge_strategy: Option<FeedMergeStrategy>,
    pub fallback: bool,
}

impl MatchFeedRequestContext {
    pub fn new(query: MatchFeedQueryContext) -> Self {
        Self {
            query,
            merge_strategy: None,
            fallback: false,
        }
    }

    pub fn with_merge_strategy(mut self, strategy: FeedMergeStrategy) -> Self {
        self.merge_strategy = Some(strategy);
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn user_id(&self) -> i64 {
        self.query.user_id
    }
}

/// Request for the feed of a single status group
#[derive(Debug, Clone)]
pub struct StoreFeedRequestContext {
    pub query: MatchFeedQueryContext,
    pub group: Option<MatchStatusGroup>,
    pub statuses: Vec<MatchStatus>,
    pub merge_strategy: Option<FeedMergeStrategy>,
    pub fallback: bool,
}

impl StoreFeedRequestContext {
    pub fn new(query: MatchFeedQueryContext, group: Option<MatchStatusGroup>, statuses: Vec<MatchStatus>) -> Self {
        Self {
            query,
            group,
            statuses,
            merge_strategy: None,
            fallback: false,
        }
    }

    pub fn with_merge_strategy(mut self, strategy: FeedMergeStrategy) -> Self {
        self.merge_strategy = Some(strategy);
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn user_id(&self) -> i64 {
        self.query.user_id
    }
}

/// Query string accepted by the feed endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FeedQueryParams {
    /// Comma separated status tokens, e.g. `new,myturn`
    #[validate(length(max = 256))]
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub fallback: bool,
    #[serde(default, rename = "mergeStrategy")]
    pub merge_strategy: Option<FeedMergeStrategy>,
}

impl FeedQueryParams {
    /// Split the `status` parameter into trimmed, non-empty tokens
    pub fn status_tokens(&self) -> Vec<String> {
        self.status
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tokens_split() {
        let params = FeedQueryParams {
            status: Some("new, MyTurn,,theirturn ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.status_tokens(), vec!["new", "MyTurn", "theirturn"]);
    }

    #[test]
    fn test_status_tokens_missing() {
        assert!(FeedQueryParams::default().status_tokens().is_empty());
    }

    #[test]
    fn test_status_param_length_validated() {
        let params = FeedQueryParams {
            status: Some("x".repeat(300)),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
