use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fine-grained status of a match as stored in the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    New,
    Archived,
    OpenComm,
    MyTurn,
    TheirTurn,
    Closed,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 6] = [
        MatchStatus::New,
        MatchStatus::Archived,
        MatchStatus::OpenComm,
        MatchStatus::MyTurn,
        MatchStatus::TheirTurn,
        MatchStatus::Closed,
    ];

    /// Stable integer code persisted by the store
    pub fn code(self) -> i16 {
        match self {
            MatchStatus::New => 0,
            MatchStatus::Archived => 1,
            MatchStatus::OpenComm => 2,
            MatchStatus::MyTurn => 3,
            MatchStatus::TheirTurn => 4,
            MatchStatus::Closed => 5,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            MatchStatus::New => "new",
            MatchStatus::Archived => "archived",
            MatchStatus::OpenComm => "opencomm",
            MatchStatus::MyTurn => "myturn",
            MatchStatus::TheirTurn => "theirturn",
            MatchStatus::Closed => "closed",
        }
    }

    /// Case-insensitive lookup of a requested status token
    pub fn from_name(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.name().eq_ignore_ascii_case(token))
    }

    /// The single status group this status is queried under.
    ///
    /// Closed matches are not served by the feed and belong to no group.
    pub fn group(self) -> Option<MatchStatusGroup> {
        match self {
            MatchStatus::New => Some(MatchStatusGroup::New),
            MatchStatus::Archived => Some(MatchStatusGroup::Archive),
            MatchStatus::OpenComm | MatchStatus::MyTurn | MatchStatus::TheirTurn => {
                Some(MatchStatusGroup::Communication)
            }
            MatchStatus::Closed => None,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse bucket of statuses that is queried and paged as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatusGroup {
    New,
    Communication,
    Archive,
}

impl MatchStatusGroup {
    pub const ALL: [MatchStatusGroup; 3] = [
        MatchStatusGroup::New,
        MatchStatusGroup::Communication,
        MatchStatusGroup::Archive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MatchStatusGroup::New => "new",
            MatchStatusGroup::Communication => "communication",
            MatchStatusGroup::Archive => "archive",
        }
    }

    pub fn from_name(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|group| group.name().eq_ignore_ascii_case(token))
    }

    /// Member statuses in the order the full feed requests them
    pub fn members(self) -> &'static [MatchStatus] {
        match self {
            MatchStatusGroup::New => &[MatchStatus::New],
            MatchStatusGroup::Communication => &[
                MatchStatus::MyTurn,
                MatchStatus::TheirTurn,
                MatchStatus::OpenComm,
            ],
            MatchStatusGroup::Archive => &[MatchStatus::Archived],
        }
    }
}

impl fmt::Display for MatchStatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label used in logs and metric tags for an optional group
pub fn group_label(group: Option<MatchStatusGroup>) -> &'static str {
    group.map_or("none", MatchStatusGroup::name)
}

/// How the caller intends to merge the store feed with other sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedMergeStrategy {
    FeedOnly,
    ProfileMerge,
}

/// A single match record in a user's feed.
///
/// Identity is the match id: two items with the same `match_id` are the same
/// feed entry regardless of which group query returned them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFeedItem {
    #[serde(rename = "matchId")]
    pub match_id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "matchedUserId")]
    pub matched_user_id: i64,
    pub status: MatchStatus,
    #[serde(rename = "deliveredDate", default)]
    pub delivered_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "lastCommunicationDate", default)]
    pub last_communication_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<BTreeMap<String, serde_json::Value>>,
}

impl PartialEq for MatchFeedItem {
    fn eq(&self, other: &Self) -> bool {
        self.match_id == other.match_id
    }
}

impl Eq for MatchFeedItem {}

impl Hash for MatchFeedItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.match_id.hash(state);
    }
}

/// Query descriptor handed to the match store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedQueryRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "statusFilters")]
    pub status_filters: Vec<i16>,
    #[serde(rename = "selectedFields")]
    pub selected_fields: Option<Vec<String>>,
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    #[serde(rename = "startPage")]
    pub start_page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

impl FeedQueryRequest {
    /// Unfiltered, unpaged query for every match of a user
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id,
            status_filters: Vec::new(),
            selected_fields: None,
            sort_by: crate::core::query::DEFAULT_SORT_BY.to_string(),
            start_page: None,
            page_size: None,
        }
    }
}
