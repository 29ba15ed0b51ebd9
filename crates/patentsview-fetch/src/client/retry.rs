//! Fixed-delay retry loop around a single request.

use std::future::Future;

use tracing::warn;

use crate::error::{ClientError, ClientResult};
use crate::models::RetryPolicy;

/// Run `attempt` until it succeeds or `policy` says to stop.
///
/// Without `force_retry` the first error is returned unchanged. When retrying
/// runs out of attempts the last error is wrapped in
/// [`ClientError::RetriesExhausted`]. Errors that are not retryable are
/// returned as they are.
pub(crate) async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut attempt: F) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);

        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if policy.should_retry(&err, attempts) {
            warn!(
                attempt = attempts,
                max_attempts = ?policy.max_attempts,
                delay = ?policy.delay,
                error = %err,
                "Request failed, retrying"
            );
            tokio::time::sleep(policy.delay).await;
            continue;
        }

        if policy.force_retry && err.is_retryable() {
            return Err(ClientError::RetriesExhausted { attempts, last: Box::new(err) });
        }

        return Err(err);
    }
}
