// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{group_label, FeedMergeStrategy, FeedQueryRequest, MatchFeedItem, MatchStatus, MatchStatusGroup};
pub use requests::{FeedQueryParams, MatchFeedQueryContext, MatchFeedRequestContext, StoreFeedRequestContext};
pub use responses::{AggregatedFeed, ErrorResponse, FeedResponse, GroupSummary, HealthResponse, StoreFeedResponse};
