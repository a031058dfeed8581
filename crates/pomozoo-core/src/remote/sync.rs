//! Two-way reconciliation of daily stats with the backend.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::client::BackendClient;
use super::types::HabitSummary;
use crate::error::{RemoteError, Result};
use crate::events::Event;
use crate::state::{Action, StateHolder};
use crate::stats::DailyStats;

/// What a sync pass moved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Days where the remote copy replaced or filled in the local one.
    pub pulled: Vec<NaiveDate>,
    /// Days uploaded because the local copy was newer or remote had none.
    pub pushed: Vec<NaiveDate>,
    pub unchanged: usize,
}

/// Pull the user's remote summaries, merge them through the holder (newer
/// copy of each day wins), then push back every day the backend is behind
/// on.
pub async fn sync_daily_stats(
    client: &BackendClient,
    holder: &mut StateHolder,
) -> Result<SyncReport> {
    let user_id = client.require_session()?.user_id.clone();
    let remote = client.fetch_habit_summaries(&user_id).await?;
    let remote_stamps: HashMap<NaiveDate, _> =
        remote.iter().map(|r| (r.date, r.updated_at)).collect();

    let events = holder.dispatch(Action::MergeRemoteStats(
        remote.into_iter().map(HabitSummary::into_daily_stat).collect(),
    ))?;

    let to_push: Vec<HabitSummary> = holder
        .state()
        .daily_stats
        .iter()
        .filter(|s| match remote_stamps.get(&s.date) {
            Some(theirs) => s.updated_at > *theirs,
            None => true,
        })
        .map(|s| HabitSummary::from_daily_stat(&user_id, s))
        .collect();
    client.upsert_habit_summaries(&to_push).await?;

    let (pulled, unchanged) = events
        .into_iter()
        .find_map(|event| match event {
            Event::StatsMerged {
                pulled, unchanged, ..
            } => Some((pulled, unchanged.len())),
            _ => None,
        })
        .unwrap_or_default();
    let report = SyncReport {
        pulled,
        pushed: to_push.iter().map(|r| r.date).collect(),
        unchanged,
    };
    tracing::info!(
        pulled = report.pulled.len(),
        pushed = report.pushed.len(),
        unchanged = report.unchanged,
        "daily stats synced"
    );
    Ok(report)
}

/// Push every local day without pulling. Used right after sign-up, when the
/// backend has nothing for this user yet.
pub async fn push_all(client: &BackendClient, local: &DailyStats) -> Result<usize, RemoteError> {
    let user_id = client.require_session()?.user_id.clone();
    let rows: Vec<HabitSummary> = local
        .iter()
        .map(|s| HabitSummary::from_daily_stat(&user_id, s))
        .collect();
    client.upsert_habit_summaries(&rows).await?;
    Ok(rows.len())
}
