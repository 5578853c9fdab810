use std::collections::BTreeMap;
use crate::models::{MatchStatus, MatchStatusGroup};

/// Token that requests every supported status
pub const ALL_STATUSES_TOKEN: &str = "all";

/// Requested statuses keyed by the group they are queried under
pub type StatusGroups = BTreeMap<MatchStatusGroup, Vec<MatchStatus>>;

/// Every supported group with all of its members
pub fn canonical_status_groups() -> StatusGroups {
    MatchStatusGroup::ALL
        .into_iter()
        .map(|group| (group, group.members().to_vec()))
        .collect()
}

/// Classify raw status tokens into status groups
///
/// Each token resolves to at most one status and each status to at most one
/// group, so no status is ever queried twice. Unknown and closed statuses
/// are logged and skipped. The `all` token, or a request that leaves no
/// group behind, yields every group.
pub fn classify_statuses<S: AsRef<str>>(user_id: i64, tokens: &[S]) -> StatusGroups {
    let mut groups = StatusGroups::new();

    for token in tokens {
        let token = token.as_ref();

        if token.trim().eq_ignore_ascii_case(ALL_STATUSES_TOKEN) {
            return canonical_status_groups();
        }

        let Some(status) = MatchStatus::from_name(token) else {
            tracing::warn!("Requested match status {} is not valid for user {}", token, user_id);
            continue;
        };

        let Some(group) = status.group() else {
            tracing::warn!("Match status {} is not supported by the feed, skipping for user {}", status, user_id);
            continue;
        };

        let members = groups.entry(group).or_default();
        if !members.contains(&status) {
            members.push(status);
        }
    }

    if groups.is_empty() {
        tracing::warn!(
            "Feed request for user {} doesn't contain any supported status, returning all matches",
            user_id
        );
        return canonical_status_groups();
    }

    groups
}
