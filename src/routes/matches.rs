use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{classify_statuses, MatchFeedService};
use crate::models::{
    ErrorResponse, FeedQueryParams, FeedResponse, HealthResponse, MatchFeedQueryContext, MatchFeedRequestContext,
    MatchStatusGroup, StoreFeedRequestContext,
};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<MatchFeedService>,
}

/// Configure all feed routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/users/{user_id}/matches", web::get().to(get_matches_feed))
        .route("/users/{user_id}/matches/internal", web::get().to(get_matches_internal))
        .route("/users/{user_id}/matches/groups/{group}", web::get().to(get_group_feed))
        .route("/users/{user_id}/matches/{match_id}", web::get().to(get_match));
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

fn validate_request(user_id: i64, params: &FeedQueryParams) -> Result<(), HttpResponse> {
    if user_id <= 0 {
        return Err(bad_request("Invalid user id", format!("User id must be positive, got {}", user_id)));
    }
    params
        .validate()
        .map_err(|errors| bad_request("Validation failed", errors.to_string()))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.feed.store_healthy().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Full matches feed
///
/// GET /api/v1/users/{userId}/matches?status=new,myturn&fallback=false&mergeStrategy=profile-merge
///
/// Always answers 200: failed groups are reported in `groups[].error`.
async fn get_matches_feed(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    params: web::Query<FeedQueryParams>,
) -> impl Responder {
    let user_id = path.into_inner();
    if let Err(response) = validate_request(user_id, &params) {
        return response;
    }

    let mut request = MatchFeedRequestContext::new(MatchFeedQueryContext::new(user_id, params.status_tokens()))
        .with_fallback(params.fallback);
    if let Some(strategy) = params.merge_strategy {
        request = request.with_merge_strategy(strategy);
    }

    tracing::info!(
        "Fetching matches feed for user {} (statuses: {:?}, fallback: {})",
        user_id,
        request.query.statuses,
        request.fallback
    );

    let feed = state.feed.get_matches_feed_safe(&request).await;
    let response = FeedResponse::from_aggregate(user_id, &feed);

    tracing::info!(
        "Returning {} matches for user {} ({} groups)",
        response.total_matches,
        user_id,
        response.groups.len()
    );

    HttpResponse::Ok().json(response)
}

/// Feed of one status group
///
/// GET /api/v1/users/{userId}/matches/groups/{group}?status=myturn
///
/// Statuses outside the group are ignored; with none left the whole group
/// is requested.
async fn get_group_feed(
    state: web::Data<AppState>,
    path: web::Path<(i64, String)>,
    params: web::Query<FeedQueryParams>,
) -> impl Responder {
    let (user_id, group_name) = path.into_inner();
    if let Err(response) = validate_request(user_id, &params) {
        return response;
    }

    let Some(group) = MatchStatusGroup::from_name(&group_name) else {
        return bad_request(
            "Invalid status group",
            format!("Status group must be one of: new, communication, archive (got {})", group_name),
        );
    };

    let tokens = params.status_tokens();
    let statuses = classify_statuses(user_id, &tokens)
        .remove(&group)
        .unwrap_or_else(|| group.members().to_vec());

    let mut request = StoreFeedRequestContext::new(MatchFeedQueryContext::new(user_id, tokens), Some(group), statuses)
        .with_fallback(params.fallback);
    if let Some(strategy) = params.merge_strategy {
        request = request.with_merge_strategy(strategy);
    }

    let result = state.feed.get_user_matches_by_status_group_safe(&request).await;

    HttpResponse::Ok().json(FeedResponse::from_group(user_id, &result))
}

/// Every match of a user, failing loudly
///
/// GET /api/v1/users/{userId}/matches/internal
async fn get_matches_internal(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let user_id = path.into_inner();

    match state.feed.get_user_matches_internal(user_id).await {
        Ok(matches) => HttpResponse::Ok().json(serde_json::json!({
            "userId": user_id,
            "matches": matches,
            "count": matches.len(),
        })),
        Err(e) => {
            tracing::error!("Failed to fetch matches for {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch matches".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// A single match
///
/// GET /api/v1/users/{userId}/matches/{matchId}
async fn get_match(state: web::Data<AppState>, path: web::Path<(i64, i64)>) -> impl Responder {
    let (user_id, match_id) = path.into_inner();

    match state.feed.get_user_match(user_id, match_id).await {
        Ok(Some(item)) => HttpResponse::Ok().json(item),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Match not found".to_string(),
            message: format!("No match {} for user {}", match_id, user_id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch match {} for {}: {}", match_id, user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch match".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
