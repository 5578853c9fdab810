use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use crate::core::query::{COMMUNICATION_SORT_BY, DEFAULT_SORT_BY};
use crate::error::StoreError;
use crate::models::{FeedQueryRequest, MatchFeedItem, MatchStatus};
use crate::services::store::MatchStore;

/// PostgreSQL-backed match feed store
///
/// Reads the `match_feed` table; one row per match of a user. Profile data
/// is stored denormalized as JSONB and projected down to the selected fields
/// when the query asks for a profile merge.
pub struct PostgresMatchStore {
    pool: PgPool,
}

impl PostgresMatchStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL match store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl MatchStore for PostgresMatchStore {
    async fn fetch_feed(&self, query: &FeedQueryRequest) -> Result<HashSet<MatchFeedItem>, StoreError> {
        let sql = feed_sql(&query.sort_by)?;
        let (limit, offset) = paging(query);
        let status_filters = (!query.status_filters.is_empty()).then(|| query.status_filters.clone());

        let rows = sqlx::query(&sql)
            .bind(query.user_id)
            .bind(status_filters)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(|row| item_from_row(row, query.selected_fields.as_deref()))
            .collect::<Result<HashSet<_>, _>>()?;

        tracing::debug!(
            "Fetched {} feed items for user {} (statuses: {:?})",
            items.len(),
            query.user_id,
            query.status_filters
        );

        Ok(items)
    }

    async fn fetch_feed_item(&self, user_id: i64, match_id: i64) -> Result<Option<MatchFeedItem>, StoreError> {
        let query = r#"
            SELECT match_id, user_id, matched_user_id, status, delivered_date, last_comm_date, profile
            FROM match_feed
            WHERE user_id = $1 AND match_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| item_from_row(&row, None)).transpose()
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Map a sort field to its column; unknown fields are rejected
fn sort_column(sort_by: &str) -> Result<&'static str, StoreError> {
    match sort_by {
        DEFAULT_SORT_BY => Ok("delivered_date"),
        COMMUNICATION_SORT_BY => Ok("last_comm_date"),
        other => Err(StoreError::InvalidData(format!("Unsupported sort field: {}", other))),
    }
}

fn feed_sql(sort_by: &str) -> Result<String, StoreError> {
    let column = sort_column(sort_by)?;
    Ok(format!(
        r#"
            SELECT match_id, user_id, matched_user_id, status, delivered_date, last_comm_date, profile
            FROM match_feed
            WHERE user_id = $1
              AND ($2::smallint[] IS NULL OR status = ANY($2))
            ORDER BY {column} DESC NULLS LAST, match_id DESC
            LIMIT $3 OFFSET $4
        "#
    ))
}

/// LIMIT/OFFSET for a query; no page size means no LIMIT
fn paging(query: &FeedQueryRequest) -> (Option<i64>, i64) {
    match query.page_size {
        Some(page_size) => {
            let page = i64::from(query.start_page.unwrap_or(1).max(1));
            (Some(i64::from(page_size)), (page - 1) * i64::from(page_size))
        }
        None => (None, 0),
    }
}

fn item_from_row(row: &PgRow, selected_fields: Option<&[String]>) -> Result<MatchFeedItem, StoreError> {
    let code: i16 = row.try_get("status")?;
    let status = MatchStatus::from_code(code)
        .ok_or_else(|| StoreError::InvalidData(format!("Unknown match status code: {}", code)))?;
    let profile: Option<Value> = row.try_get("profile")?;

    Ok(MatchFeedItem {
        match_id: row.try_get("match_id")?,
        user_id: row.try_get("user_id")?,
        matched_user_id: row.try_get("matched_user_id")?,
        status,
        delivered_date: row.try_get("delivered_date")?,
        last_communication_date: row.try_get("last_comm_date")?,
        profile: selected_fields.map(|fields| project_profile(profile.as_ref(), fields)),
    })
}

/// Keep only the selected keys of a stored profile document
fn project_profile(profile: Option<&Value>, fields: &[String]) -> BTreeMap<String, Value> {
    let Some(Value::Object(document)) = profile else {
        return BTreeMap::new();
    };

    fields
        .iter()
        .filter_map(|field| document.get(field).map(|value| (field.clone(), value.clone())))
        .collect()
}
