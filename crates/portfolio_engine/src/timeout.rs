use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation timed out after {0:?}")]
pub struct TimedOut(pub Duration);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome<T> {
    Completed(T),
    TimedOut,
    Cancelled,
}

/// Races `operation` against a deadline. On timeout the operation is dropped,
/// which aborts any request it had in flight.
pub async fn with_timeout<F: Future>(operation: F, deadline: Duration) -> Result<F::Output, TimedOut> {
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| TimedOut(deadline))
}

/// Like `with_timeout`, but a fired `cancel` token also ends the race.
pub async fn race<F: Future>(
    operation: F,
    deadline: Duration,
    cancel: &CancellationToken,
) -> RaceOutcome<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => RaceOutcome::Cancelled,
        result = with_timeout(operation, deadline) => match result {
            Ok(value) => RaceOutcome::Completed(value),
            Err(TimedOut(_)) => RaceOutcome::TimedOut,
        },
    }
}
