use std::{future::Future, result::Result, time::Duration};

use perch_core::Error as PerchError;

use crate::error::CliError;

pub const DEFAULT_TIMEOUT_MS: u64 = 30000;
pub const LIST_TIMEOUT_MS: u64 = 30 * 60 * 1000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5000;
pub const DEFAULT_RETRY_COUNT: usize = 3;

pub fn timeout<T, E: Into<CliError>>(
    duration: Duration,
    f: impl Future<Output = Result<T, E>>,
) -> impl Future<Output = Result<T, CliError>> {
    use futures::FutureExt;
    tokio::time::timeout(duration, f).map(move |result| {
        result
            .map(|r| r.map_err(Into::into))
            .unwrap_or_else(|_| Err(PerchError::Timeout(format!("after {} ms", duration.as_millis())).into()))
    })
}

pub fn retry<R, T: Future<Output = Result<R, CliError>>, F: FnMut() -> T>(
    f: F,
) -> impl Future<Output = Result<R, CliError>> {
    use tokio_retry::{strategy::FixedInterval, RetryIf};
    let strategy = FixedInterval::from_millis(DEFAULT_RETRY_DELAY_MS).take(DEFAULT_RETRY_COUNT);
    RetryIf::spawn(strategy, f, |e: &CliError| {
        let retryable = e.retryable();
        if retryable {
            tracing::warn!("Retrying after error: {}", e);
        }
        retryable
    })
}
