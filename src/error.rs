use thiserror::Error;

/// Errors raised by a match store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected store failure: {0}")]
    Unexpected(String),
}

/// Errors surfaced by the feed service
#[derive(Debug, Error)]
pub enum FeedError {
    /// One status group's store query failed; siblings are unaffected
    #[error("Feed query failed for user {user_id} and group {group}: {source}")]
    GroupFetch {
        user_id: i64,
        group: &'static str,
        #[source]
        source: StoreError,
    },

    /// The orchestration around the store queries failed
    #[error("Feed aggregation failed: {0}")]
    Aggregate(String),

    #[error("Feed query failed for user {user_id}: {source}")]
    Internal {
        user_id: i64,
        #[source]
        source: StoreError,
    },
}

impl FeedError {
    /// Turn a caught panic payload into an aggregation error
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        FeedError::Aggregate(panic_message(payload.as_ref()))
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_fetch_message_carries_context() {
        let err = FeedError::GroupFetch {
            user_id: 42,
            group: "archive",
            source: StoreError::Unavailable("region down".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("42"));
        assert!(message.contains("archive"));
        assert!(message.contains("region down"));
    }

    #[test]
    fn test_panic_payload_messages() {
        let owned: Box<dyn std::any::Any + Send> = Box::new("boom".to_string());
        assert_eq!(FeedError::from_panic(owned).to_string(), "Feed aggregation failed: boom");

        let borrowed: Box<dyn std::any::Any + Send> = Box::new("static boom");
        assert_eq!(panic_message(borrowed.as_ref()), "static boom");

        let other: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "panic with non-string payload");
    }
}
