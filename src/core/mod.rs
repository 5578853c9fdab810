// Core feed exports
pub mod aggregator;
pub mod classifier;
pub mod feed;
pub mod fetcher;
pub mod limits;
pub mod query;
pub mod safe;

pub use aggregator::FeedAggregator;
pub use classifier::{canonical_status_groups, classify_statuses, StatusGroups, ALL_STATUSES_TOKEN};
pub use feed::MatchFeedService;
pub use fetcher::GroupFetcher;
pub use limits::{resolve_limit, FeedLimits, FeedLimitsConfig, PageLimit};
pub use query::{QueryBuilder, COMMUNICATION_SORT_BY, DEFAULT_SORT_BY};
pub use safe::recover;
