//! Deadline-bound suspension points
//!
//! Every store call and filesystem call in the publish pipeline goes
//! through [`with_deadline`], so a hung request fails with
//! [`GardenError::Timeout`] instead of stalling the whole batch.

use crate::adapters::github::BLOB_UPLOAD_CONCURRENCY;
use crate::domain::{GardenError, Result};
use std::future::Future;
use std::time::Duration;

/// Sequential store calls around the uploads of one batch commit
const BATCH_FIXED_CALLS: usize = 6;

/// Await `future`, failing with a timeout error once `limit` has elapsed
///
/// # Arguments
///
/// * `limit` - Maximum time to wait
/// * `operation` - Short description used in the error and the log line
/// * `future` - The operation itself
///
/// # Errors
///
/// Returns the operation's own error, or [`GardenError::Timeout`].
pub async fn with_deadline<T, F>(limit: Duration, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation = %operation,
                timeout_ms = limit.as_millis() as u64,
                "Operation exceeded its deadline"
            );
            Err(GardenError::Timeout {
                operation: operation.to_string(),
                seconds: limit.as_secs(),
            })
        }
    }
}

/// Deadline for a store batch touching `files` paths
///
/// A batch is a handful of sequential calls plus one upload round per
/// [`BLOB_UPLOAD_CONCURRENCY`] files, and each call gets the full `limit`.
pub fn batch_deadline(limit: Duration, files: usize) -> Duration {
    let calls = BATCH_FIXED_CALLS + files.div_ceil(BLOB_UPLOAD_CONCURRENCY);
    limit.saturating_mul(u32::try_from(calls).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FailureKind;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let value = with_deadline(Duration::from_secs(1), "fast", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_passes_through_errors() {
        let result: Result<()> = with_deadline(Duration::from_secs(1), "failing", async {
            Err(GardenError::Io("disk".to_string()))
        })
        .await;
        assert!(matches!(result, Err(GardenError::Io(_))));
    }

    #[tokio::test]
    async fn test_expiry_is_timeout_kind() {
        let result: Result<()> = with_deadline(Duration::from_millis(20), "write notes/a.md", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Timeout);
        assert!(err.to_string().contains("write notes/a.md"));
    }

    #[test]
    fn test_batch_deadline_grows_with_upload_rounds() {
        let limit = Duration::from_secs(10);
        assert_eq!(batch_deadline(limit, 0), Duration::from_secs(60));
        assert_eq!(batch_deadline(limit, 1), Duration::from_secs(70));
        assert_eq!(
            batch_deadline(limit, BLOB_UPLOAD_CONCURRENCY * 50),
            Duration::from_secs(560)
        );
    }
}
