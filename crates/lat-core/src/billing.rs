//! Billing-cycle arithmetic and workspace usage metering.
//!
//! A workspace renews monthly on the day-of-month it was created. Usage is
//! the number of billable events (document logs plus evaluation results)
//! recorded across all of the workspace's projects since the latest renewal.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Workspace;
use crate::errors::CoreError;
use crate::store::UsageStore;

/// Billable usage of a workspace in its current cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WorkspaceUsage {
    /// Document logs plus evaluation results since `since`.
    pub usage: u64,
    /// Start of the current billing cycle.
    pub since: DateTime<Utc>,
}

/// Most recent renewal date on or before `target_date`.
///
/// `first_renewal_date` fixes the day-of-month anchor. Renewals fall on the
/// anchor day at 00:00 UTC; months shorter than the anchor day renew on
/// their last day. The first cycle starts at `first_renewal_date` itself, so
/// the result is never earlier than it. A `target_date` before
/// `first_renewal_date` also returns `first_renewal_date` as-is.
#[must_use]
pub fn latest_renewal_date(
    first_renewal_date: DateTime<Utc>,
    target_date: DateTime<Utc>,
) -> DateTime<Utc> {
    if target_date < first_renewal_date {
        return first_renewal_date;
    }

    let anchor_day = first_renewal_date.day();
    let Some(candidate) = anchored_date(target_date.year(), target_date.month(), anchor_day)
    else {
        return first_renewal_date;
    };

    let renewal = if candidate.day() <= target_date.day() {
        candidate
    } else {
        let (year, month) = previous_month(target_date.year(), target_date.month());
        match anchored_date(year, month, anchor_day) {
            Some(date) => date,
            None => return first_renewal_date,
        }
    };

    renewal.and_time(NaiveTime::MIN).and_utc().max(first_renewal_date)
}

/// `day` of the given month, clamped to the month's last day.
fn anchored_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

const fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Count billable events of `workspace` since its latest renewal before `now`.
///
/// Usage is `document logs + evaluation results`, with no weighting and no
/// deduplication of results that score the same log. The two counts are
/// independent and fetched concurrently.
///
/// # Errors
///
/// Propagates store errors unchanged. Zero usage is `Ok` with `usage == 0`.
pub async fn compute_workspace_usage<S: UsageStore>(
    store: &S,
    workspace: &Workspace,
    now: DateTime<Utc>,
) -> Result<WorkspaceUsage, CoreError> {
    let since = latest_renewal_date(workspace.created_at, now);

    let (logs, results) = tokio::try_join!(
        store.count_document_logs_since(workspace.id, since),
        store.count_evaluation_results_since(workspace.id, since),
    )?;

    tracing::debug!(
        workspace_id = workspace.id,
        %since,
        logs,
        results,
        "computed workspace usage"
    );

    Ok(WorkspaceUsage {
        usage: logs + results,
        since,
    })
}
