// Service exports
pub mod metrics;
pub mod postgres;
pub mod store;

pub use metrics::{QueryHistogram, QueryMetricsFactory, QueryTimer, RecorderMetricsFactory, ScopedTimer};
pub use postgres::PostgresMatchStore;
pub use store::MatchStore;
