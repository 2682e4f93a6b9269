//! Forced session closer
//!
//! Closes every dangling interval at one timestamp. Employees are closed
//! concurrently; each close still goes through the tracker's per-employee
//! lock, and one failure never stops the others.

use futures::future::join_all;
use shared::error::ErrorCode;
use shared::models::{ForceCloseFailure, ForceCloseOutcome};

use super::ShiftTracker;
use crate::db::repository::time_ledger;
use crate::utils::AppResult;

/// Close all open intervals at `at`
///
/// With nothing open the outcome is empty, so repeated runs are harmless.
pub async fn close_all_open_sessions(tracker: &ShiftTracker, at: i64) -> AppResult<ForceCloseOutcome> {
    let employees = time_ledger::employees_with_open_interval(tracker.pool()).await?;
    if employees.is_empty() {
        tracing::debug!("No open shifts to force-close");
        return Ok(ForceCloseOutcome {
            at,
            ..Default::default()
        });
    }

    let results = join_all(employees.into_iter().map(|employee_id| async move {
        let result = tracker.close_interval(&employee_id, at).await;
        (employee_id, result)
    }))
    .await;

    let mut outcome = ForceCloseOutcome {
        at,
        ..Default::default()
    };
    for (employee_id, result) in results {
        match result {
            Ok(session) => outcome.closed.push(session),
            // closed by a logout between the scan and the close
            Err(e) if e.code == ErrorCode::ShiftNotOpen => {
                tracing::debug!(employee_id = %employee_id, "Shift already closed, skipping");
            }
            Err(e) => {
                tracing::warn!(employee_id = %employee_id, error = %e, "Failed to force-close shift");
                outcome.failed.push(ForceCloseFailure {
                    employee_id,
                    error: e.message,
                });
            }
        }
    }

    tracing::info!(
        closed = outcome.closed.len(),
        failed = outcome.failed.len(),
        at,
        "Force-close finished"
    );
    Ok(outcome)
}
