use crate::usecase::ports::repo::StoreError;

/// Runs store work on tokio's blocking pool so async handlers never hold a worker
/// thread across SQLite I/O.
pub async fn run_blocking<F, T>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| StoreError::unavailable(format!("blocking task failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_blocking_returns_closure_value() {
        let value = run_blocking(|| 40 + 2).await.expect("task should complete");
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn run_blocking_maps_panics_to_store_errors() {
        let err = run_blocking(|| -> usize { panic!("boom") })
            .await
            .expect_err("panicking task should fail");
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
