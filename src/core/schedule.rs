//! Cancellable scheduled completions.
//!
//! Every timed wait in the crate (request deadlines, simulated latency,
//! the startup probe delay) goes through these helpers so that a single
//! [`CancellationToken`] can abort it.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    Finished(T),
    TimedOut,
    Cancelled,
}

/// Run `work` until it finishes, `deadline` elapses, or `cancel` fires.
///
/// On deadline the token is cancelled as well, so anything else sharing it
/// observes the abort. Dropping `work` aborts whatever it was awaiting.
pub async fn with_deadline<F>(
    work: F,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Completion<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Completion::Cancelled,
        output = work => Completion::Finished(output),
        _ = tokio::time::sleep(deadline) => {
            cancel.cancel();
            Completion::TimedOut
        }
    }
}

/// Sleep for `duration` unless cancelled first.
pub async fn delay(duration: Duration, cancel: &CancellationToken) -> Completion<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Completion::Cancelled,
        _ = tokio::time::sleep(duration) => Completion::Finished(()),
    }
}
