//! Best-effort side effects.
//!
//! Some writes must never change the response the caller gets: the
//! verification record is an audit trail, and the signature outcome is
//! returned whether or not it could be stored. `best_effort` runs such a
//! write, logs any error or panic, and reports only whether it succeeded.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

/// Outcome of a best-effort write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestEffortOutcome {
    Completed,
    Failed,
}

impl BestEffortOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, BestEffortOutcome::Completed)
    }
}

/// Runs `write`, swallowing both its error and any panic.
///
/// `operation` names the write in the log line.
pub async fn best_effort<T, E, Fut>(operation: &'static str, write: Fut) -> BestEffortOutcome
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    match AssertUnwindSafe(write).catch_unwind().await {
        Ok(Ok(_)) => BestEffortOutcome::Completed,
        Ok(Err(err)) => {
            tracing::warn!(operation, error = %err, "Best-effort write failed");
            BestEffortOutcome::Failed
        }
        Err(_) => {
            tracing::error!(operation, "Best-effort write panicked");
            BestEffortOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_write_is_completed() {
        let outcome = best_effort("test_write", async { Ok::<_, String>(42) }).await;
        assert_eq!(outcome, BestEffortOutcome::Completed);
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn failed_write_is_swallowed() {
        let outcome = best_effort("test_write", async {
            Err::<(), _>("connection refused".to_string())
        })
        .await;
        assert_eq!(outcome, BestEffortOutcome::Failed);
    }

    #[tokio::test]
    async fn panicking_write_is_swallowed() {
        let outcome = best_effort("test_write", async {
            if true {
                panic!("store exploded");
            }
            Ok::<(), String>(())
        })
        .await;
        assert_eq!(outcome, BestEffortOutcome::Failed);
    }
}
