/// Deadline wrappers for async operations
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Outcome of a deadline-bounded fallible call. The inner error is kept so
/// callers can log it with full context.
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError<E> {
    #[error("operation timed out after {0:?}")]
    Elapsed(Duration),
    #[error("operation failed: {0}")]
    Failed(E),
}

/// Run a fallible `future` with a deadline, folding both failure kinds into
/// one error type.
pub async fn with_timeout_result<F, T, E>(
    duration: Duration,
    future: F,
) -> Result<T, TimeoutError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match timeout(duration, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TimeoutError::Failed(e)),
        Err(_) => {
            tracing::debug!(timeout_ms = duration.as_millis() as u64, "deadline elapsed");
            Err(TimeoutError::Elapsed(duration))
        }
    }
}
