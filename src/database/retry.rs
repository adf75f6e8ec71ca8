// ABOUTME: Retry helper for write transactions that lose a SQLite lock race
// ABOUTME: Exponential backoff for transient lock errors, immediate propagation otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fratelli Confeitaria

//! Transaction retry with exponential backoff.
//!
//! SQLite serializes writers, so two concurrent write transactions can race:
//! the loser surfaces a "database is locked" or busy-snapshot error even
//! though re-running it against the committed state would give a proper
//! answer. `retry_on_contention` re-runs the operation for those transient
//! errors only; domain errors (validation, insufficient stock, constraint
//! violations) propagate immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::errors::{AppResult, ErrorCode};

/// Re-run a write transaction while it fails with a transient lock error.
///
/// Backoff doubles per attempt starting at 10ms. `max_attempts` counts the
/// initial attempt, so `5` means at most four retries.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-retryable error.
pub async fn retry_on_contention<F, Fut, T>(mut f: F, max_attempts: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts || !is_retryable(&e.code, &e.message) {
                    if attempt > 1 {
                        error!(
                            attempts = attempt,
                            error = %e,
                            "Transaction failed after retries"
                        );
                    }
                    return Err(e);
                }

                let backoff_ms = 10_u64 << attempt;
                warn!(
                    attempt = attempt,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Transaction hit lock contention, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Transient lock errors are retryable; everything else is not.
///
/// Only database-layer errors qualify, and only when the underlying message
/// points at locking or a timeout. Constraint violations come back through
/// the same channel but indicate real conflicts, so they stay non-retryable.
fn is_retryable(code: &ErrorCode, message: &str) -> bool {
    if *code != ErrorCode::DatabaseError {
        return false;
    }

    let lower = message.to_lowercase();
    if lower.contains("constraint") {
        return false;
    }
    lower.contains("locked")
        || lower.contains("busy")
        || lower.contains("timed out")
        || lower.contains("timeout")
}
