use std::time::{Duration, Instant};

use portfolio_engine::{race, with_timeout, RaceOutcome, TimedOut};
use tokio_util::sync::CancellationToken;

async fn resolve_after(delay: Duration, value: u32) -> u32 {
    tokio::time::sleep(delay).await;
    value
}

#[tokio::test]
async fn fast_operation_wins() {
    let result = with_timeout(resolve_after(Duration::from_millis(10), 7), Duration::from_millis(800)).await;
    assert_eq!(result, Ok(7));
}

#[tokio::test]
async fn slow_operation_times_out_at_the_deadline() {
    let started = Instant::now();
    let result = with_timeout(resolve_after(Duration::from_secs(5), 7), Duration::from_millis(800)).await;
    let elapsed = started.elapsed();

    assert_eq!(result, Err(TimedOut(Duration::from_millis(800))));
    assert!(elapsed >= Duration::from_millis(800), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(2000), "returned late: {elapsed:?}");
}

#[tokio::test]
async fn race_reports_cancellation() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = race(resolve_after(Duration::from_millis(10), 1), Duration::from_secs(1), &cancel).await;
    assert_eq!(outcome, RaceOutcome::Cancelled);
}

#[tokio::test]
async fn race_completes_and_times_out() {
    let cancel = CancellationToken::new();
    let done = race(resolve_after(Duration::ZERO, 3), Duration::from_secs(1), &cancel).await;
    assert_eq!(done, RaceOutcome::Completed(3));

    let late = race(resolve_after(Duration::from_secs(5), 3), Duration::from_millis(20), &cancel).await;
    assert_eq!(late, RaceOutcome::TimedOut);
}
