use metrics::histogram;
use std::time::Instant;
use crate::models::{group_label, MatchStatusGroup};

/// Histogram of store query latency in milliseconds
pub const QUERY_DURATION_METRIC: &str = "match_feed_query_duration_ms";

/// Histogram of the number of items a store query returned
pub const QUERY_RESULT_SIZE_METRIC: &str = "match_feed_query_result_size";

/// A running timer; `stop` records and returns the elapsed milliseconds
pub trait QueryTimer: Send {
    fn stop(&mut self) -> u64;
}

pub trait QueryHistogram: Send {
    fn update(&self, value: u64);
}

/// Creates per-call metric handles tagged with service, operation and group
pub trait QueryMetricsFactory: Send + Sync {
    fn timer(&self, hierarchy: &str, operation: &str, group: Option<MatchStatusGroup>) -> Box<dyn QueryTimer>;
    fn histogram(&self, hierarchy: &str, operation: &str, group: Option<MatchStatusGroup>) -> Box<dyn QueryHistogram>;
}

/// Metrics factory backed by the global `metrics` recorder
///
/// Without an installed recorder every handle is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecorderMetricsFactory;

struct RecorderTimer {
    started: Instant,
    histogram: metrics::Histogram,
}

impl QueryTimer for RecorderTimer {
    fn stop(&mut self) -> u64 {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        self.histogram.record(elapsed_ms as f64);
        elapsed_ms
    }
}

struct RecorderHistogram(metrics::Histogram);

impl QueryHistogram for RecorderHistogram {
    fn update(&self, value: u64) {
        self.0.record(value as f64);
    }
}

impl QueryMetricsFactory for RecorderMetricsFactory {
    fn timer(&self, hierarchy: &str, operation: &str, group: Option<MatchStatusGroup>) -> Box<dyn QueryTimer> {
        let histogram = histogram!(
            QUERY_DURATION_METRIC,
            "service" => hierarchy.to_string(),
            "operation" => operation.to_string(),
            "group" => group_label(group)
        );
        Box::new(RecorderTimer {
            started: Instant::now(),
            histogram,
        })
    }

    fn histogram(&self, hierarchy: &str, operation: &str, group: Option<MatchStatusGroup>) -> Box<dyn QueryHistogram> {
        Box::new(RecorderHistogram(histogram!(
            QUERY_RESULT_SIZE_METRIC,
            "service" => hierarchy.to_string(),
            "operation" => operation.to_string(),
            "group" => group_label(group)
        )))
    }
}

/// Stops the wrapped timer exactly once: explicitly or when dropped
pub struct ScopedTimer {
    timer: Option<Box<dyn QueryTimer>>,
}

impl ScopedTimer {
    pub fn start(timer: Box<dyn QueryTimer>) -> Self {
        Self { timer: Some(timer) }
    }

    /// Stop the timer; later calls return `None`
    pub fn stop(&mut self) -> Option<u64> {
        self.timer.take().map(|mut timer| timer.stop())
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTimer(Arc<AtomicUsize>);

    impl QueryTimer for CountingTimer {
        fn stop(&mut self) -> u64 {
            self.0.fetch_add(1, Ordering::SeqCst);
            3
        }
    }

    #[test]
    fn test_scoped_timer_stops_once_when_stopped_explicitly() {
        let stops = Arc::new(AtomicUsize::new(0));
        {
            let mut timer = ScopedTimer::start(Box::new(CountingTimer(stops.clone())));
            assert_eq!(timer.stop(), Some(3));
            assert_eq!(timer.stop(), None);
        }
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_scoped_timer_stops_on_drop() {
        let stops = Arc::new(AtomicUsize::new(0));
        drop(ScopedTimer::start(Box::new(CountingTimer(stops.clone()))));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recorder_handles_work_without_recorder() {
        let factory = RecorderMetricsFactory;
        let mut timer = factory.timer("feed", "op", Some(MatchStatusGroup::New));
        factory.histogram("feed", "op", None).update(12);
        assert!(timer.stop() < 60_000);
    }
}
