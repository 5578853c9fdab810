use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use crate::error::FeedError;

/// Await `future`, turning an error or a panic into `recovery(error)`
///
/// This is the boundary behind every `*_safe` entry point: whatever happens
/// inside, the caller receives a value.
pub async fn recover<T, F, R>(future: F, recovery: R) -> T
where
    F: Future<Output = Result<T, FeedError>>,
    R: FnOnce(FeedError) -> T,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => value,
        Ok(Err(error)) => recovery(error),
        Err(panic) => recovery(FeedError::from_panic(panic)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_value_passes_through() {
        let value = tokio_test::block_on(recover(async { Ok::<_, FeedError>(5) }, |_| 0));
        assert_eq!(value, 5);
    }

    #[test]
    fn test_error_is_recovered() {
        let value = tokio_test::block_on(recover(
            async {
                Err::<usize, _>(FeedError::Internal {
                    user_id: 1,
                    source: StoreError::Unavailable("down".to_string()),
                })
            },
            |error| error.to_string().len(),
        ));
        assert!(value > 0);
    }

    #[test]
    fn test_panic_is_recovered() {
        let message = tokio_test::block_on(recover(
            async {
                if true {
                    panic!("orchestration bug");
                }
                Ok(String::new())
            },
            |error| error.to_string(),
        ));
        assert_eq!(message, "Feed aggregation failed: orchestration bug");
    }
}
