use std::collections::HashMap;
use crate::config::{FeedLimitSettings, GroupLimitSettings};
use crate::models::MatchStatusGroup;

/// First page requested whenever a limit applies
pub const FIRST_PAGE: u32 = 1;

/// Source of per-group page sizes
pub trait FeedLimits: Send + Sync {
    fn default_limit(&self, group: MatchStatusGroup) -> Option<u32>;
    fn fallback_limit(&self, group: MatchStatusGroup) -> Option<u32>;
}

/// Paging applied to a group query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit {
    pub start_page: u32,
    pub page_size: u32,
}

/// Per-group limits, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct FeedLimitsConfig {
    groups: HashMap<MatchStatusGroup, GroupLimitSettings>,
}

impl FeedLimitsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: MatchStatusGroup, default_limit: Option<u32>, fallback_limit: Option<u32>) -> Self {
        self.groups.insert(group, GroupLimitSettings { default_limit, fallback_limit });
        self
    }

    pub fn from_settings(settings: &FeedLimitSettings) -> Self {
        let groups = [
            (MatchStatusGroup::New, settings.new),
            (MatchStatusGroup::Communication, settings.communication),
            (MatchStatusGroup::Archive, settings.archive),
        ]
        .into_iter()
        .collect();

        Self { groups }
    }
}

impl FeedLimits for FeedLimitsConfig {
    fn default_limit(&self, group: MatchStatusGroup) -> Option<u32> {
        self.groups.get(&group).and_then(|limits| limits.default_limit)
    }

    fn fallback_limit(&self, group: MatchStatusGroup) -> Option<u32> {
        self.groups.get(&group).and_then(|limits| limits.fallback_limit)
    }
}

/// Resolve the paging for a group; `None` leaves the query unbounded
pub fn resolve_limit(limits: &dyn FeedLimits, group: MatchStatusGroup, fallback: bool) -> Option<PageLimit> {
    let page_size = if fallback {
        limits.fallback_limit(group)
    } else {
        limits.default_limit(group)
    };

    page_size.map(|page_size| PageLimit {
        start_page: FIRST_PAGE,
        page_size,
    })
}
