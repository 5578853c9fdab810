// Unit tests for Match Feed

use match_feed::core::{
    classifier::{canonical_status_groups, classify_statuses},
    limits::{resolve_limit, FeedLimits, FeedLimitsConfig, PageLimit},
    query::{QueryBuilder, COMMUNICATION_SORT_BY, DEFAULT_SORT_BY},
};
use match_feed::models::{FeedMergeStrategy, MatchStatus, MatchStatusGroup};

fn builder() -> QueryBuilder {
    QueryBuilder::new(vec!["firstName".to_string(), "photo".to_string()])
}

#[test]
fn test_scenario_new_only() {
    let groups = classify_statuses(10, &["new"]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[&MatchStatusGroup::New], vec![MatchStatus::New]);

    let query = builder().for_group(10, Some(MatchStatusGroup::New), &groups[&MatchStatusGroup::New], None, None);
    assert_eq!(query.sort_by, DEFAULT_SORT_BY);
    assert_eq!(query.status_filters, vec![MatchStatus::New.code()]);
}

#[test]
fn test_scenario_communication_turns() {
    let groups = classify_statuses(10, &["myturn", "theirturn"]);
    assert_eq!(groups.len(), 1);
    let statuses = &groups[&MatchStatusGroup::Communication];
    assert_eq!(statuses, &vec![MatchStatus::MyTurn, MatchStatus::TheirTurn]);

    let query = builder().for_group(10, Some(MatchStatusGroup::Communication), statuses, None, None);
    assert_eq!(query.sort_by, COMMUNICATION_SORT_BY);
}

#[test]
fn test_scenario_empty_request_is_canonical() {
    let tokens: Vec<String> = vec![];
    let groups = classify_statuses(10, &tokens);

    assert_eq!(groups, canonical_status_groups());
    assert_eq!(groups[&MatchStatusGroup::New], vec![MatchStatus::New]);
    assert_eq!(
        groups[&MatchStatusGroup::Communication],
        vec![MatchStatus::MyTurn, MatchStatus::TheirTurn, MatchStatus::OpenComm]
    );
    assert_eq!(groups[&MatchStatusGroup::Archive], vec![MatchStatus::Archived]);
}

#[test]
fn test_all_token_any_case() {
    for token in ["all", "ALL", "All", "aLl"] {
        assert_eq!(classify_statuses(10, &["myturn", token]), canonical_status_groups());
    }
}

#[test]
fn test_closed_does_not_change_other_groups() {
    let without = classify_statuses(10, &["new", "opencomm"]);
    let with = classify_statuses(10, &["closed", "new", "CLOSED", "opencomm"]);
    assert_eq!(without, with);
}

#[test]
fn test_scenario_fallback_without_limit_is_unbounded() {
    let limits = FeedLimitsConfig::new().with_group(MatchStatusGroup::Archive, Some(100), None);

    let limit = resolve_limit(&limits, MatchStatusGroup::Archive, true);
    assert_eq!(limit, None);

    let query = builder().for_group(10, Some(MatchStatusGroup::Archive), &[MatchStatus::Archived], limit, None);
    assert_eq!(query.start_page, None);
    assert_eq!(query.page_size, None);
}

#[test]
fn test_default_limit_applied_to_query() {
    let limits = FeedLimitsConfig::new().with_group(MatchStatusGroup::Archive, Some(100), None);

    let limit = resolve_limit(&limits, MatchStatusGroup::Archive, false);
    assert_eq!(limit, Some(PageLimit { start_page: 1, page_size: 100 }));
    assert_eq!(limits.fallback_limit(MatchStatusGroup::Archive), None);
}

#[test]
fn test_selected_fields_only_for_profile_merge() {
    let statuses = [MatchStatus::New];
    for strategy in [None, Some(FeedMergeStrategy::FeedOnly)] {
        let query = builder().for_group(10, Some(MatchStatusGroup::New), &statuses, None, strategy);
        assert!(query.selected_fields.is_none());
    }

    let merged = builder().for_group(
        10,
        Some(MatchStatusGroup::New),
        &statuses,
        None,
        Some(FeedMergeStrategy::ProfileMerge),
    );
    assert_eq!(merged.selected_fields.unwrap(), vec!["firstName", "photo"]);
}

#[test]
fn test_legacy_query_has_no_group_constraints() {
    let query = builder().for_status_tokens(10, &["myturn", "archived"], None);

    assert_eq!(query.status_filters, vec![MatchStatus::MyTurn.code(), MatchStatus::Archived.code()]);
    assert_eq!(query.sort_by, DEFAULT_SORT_BY);
    assert_eq!(query.page_size, None);
}
