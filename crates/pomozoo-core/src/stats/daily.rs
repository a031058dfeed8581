//! Date-keyed study/break aggregates.
//!
//! One [`DailyStat`] per calendar day (local time). Every mutation bumps
//! `updated_at`, which is the only thing compared when a local record meets
//! a remote copy of the same day.

use std::collections::{btree_map, BTreeMap};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    /// Minutes per study category.
    #[serde(default)]
    pub study_minutes: BTreeMap<String, u32>,
    /// Minutes per category the preceding study was credited to.
    #[serde(default)]
    pub break_minutes: BTreeMap<String, u32>,
    #[serde(default)]
    pub completed_sessions: u32,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    pub updated_at: DateTime<Utc>,
}

impl DailyStat {
    pub fn empty(date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            date,
            study_minutes: BTreeMap::new(),
            break_minutes: BTreeMap::new(),
            completed_sessions: 0,
            checklist: Vec::new(),
            updated_at: now,
        }
    }

    pub fn total_study_minutes(&self) -> u32 {
        self.study_minutes.values().sum()
    }

    pub fn total_break_minutes(&self) -> u32 {
        self.break_minutes.values().sum()
    }

    /// Stamp a local write. The record always ends up strictly newer than
    /// it was, even when `now` trails a copy pulled from a faster clock.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at + Duration::milliseconds(1));
    }
}

/// Which copy of a day survives a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    UseLocal,
    UseRemote,
}

/// Last-writer-wins on `updated_at`. Ties keep the local record.
pub fn resolve(local: &DailyStat, remote: &DailyStat) -> MergeDecision {
    if remote.updated_at > local.updated_at {
        MergeDecision::UseRemote
    } else {
        MergeDecision::UseLocal
    }
}

/// Merge two records for the same date.
pub fn merge(local: DailyStat, remote: DailyStat) -> DailyStat {
    match resolve(&local, &remote) {
        MergeDecision::UseLocal => local,
        MergeDecision::UseRemote => remote,
    }
}

/// What [`DailyStats::merge_all`] did, per date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Remote copy replaced (or filled in) the local one.
    pub pulled: Vec<NaiveDate>,
    /// Local copy is strictly newer than the remote one.
    pub kept_newer: Vec<NaiveDate>,
    /// Both copies carry the same timestamp.
    pub unchanged: Vec<NaiveDate>,
}

/// Calendar day of `now` in the user's local time zone.
pub fn day_of(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

/// All recorded days. Serialized as a plain list of [`DailyStat`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DailyStat>", into = "Vec<DailyStat>")]
pub struct DailyStats {
    days: BTreeMap<NaiveDate, DailyStat>,
}

impl From<Vec<DailyStat>> for DailyStats {
    fn from(list: Vec<DailyStat>) -> Self {
        let mut stats = DailyStats::default();
        for stat in list {
            stats.upsert(stat);
        }
        stats
    }
}

impl From<DailyStats> for Vec<DailyStat> {
    fn from(stats: DailyStats) -> Self {
        stats.days.into_values().collect()
    }
}

/// Totals across every recorded day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub days: usize,
    pub study_minutes: u32,
    pub break_minutes: u32,
    pub completed_sessions: u32,
    pub by_category: BTreeMap<String, u32>,
}

impl DailyStats {
    pub fn get(&self, date: NaiveDate) -> Option<&DailyStat> {
        self.days.get(&date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyStat> {
        self.days.values()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Record for `date` about to be written at `now`: a new one is
    /// stamped `now`, an existing one is touched.
    fn entry_for_write(&mut self, date: NaiveDate, now: DateTime<Utc>) -> &mut DailyStat {
        match self.days.entry(date) {
            btree_map::Entry::Vacant(slot) => slot.insert(DailyStat::empty(date, now)),
            btree_map::Entry::Occupied(slot) => {
                let stat = slot.into_mut();
                stat.touch(now);
                stat
            }
        }
    }

    /// Insert or merge a whole record; the newer `updated_at` wins.
    pub fn upsert(&mut self, stat: DailyStat) {
        let merged = match self.days.remove(&stat.date) {
            Some(existing) => merge(existing, stat),
            None => stat,
        };
        self.days.insert(merged.date, merged);
    }

    /// Credit one finished study countdown.
    pub fn record_study(
        &mut self,
        date: NaiveDate,
        category: &str,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> &DailyStat {
        let stat = self.entry_for_write(date, now);
        *stat.study_minutes.entry(category.to_string()).or_default() += minutes;
        stat.completed_sessions += 1;
        stat
    }

    /// Credit one finished break.
    pub fn record_break(
        &mut self,
        date: NaiveDate,
        category: &str,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> &DailyStat {
        let stat = self.entry_for_write(date, now);
        *stat.break_minutes.entry(category.to_string()).or_default() += minutes;
        stat
    }

    /// Append a checklist item and return its id.
    pub fn add_checklist_item(&mut self, date: NaiveDate, text: &str, now: DateTime<Utc>) -> String {
        let stat = self.entry_for_write(date, now);
        let id = Uuid::new_v4().to_string();
        stat.checklist.push(ChecklistItem {
            id: id.clone(),
            text: text.trim().to_string(),
            done: false,
        });
        id
    }

    /// Flip an item's `done` flag. Returns the new value, or `None` if the
    /// item does not exist on that date.
    pub fn toggle_checklist_item(
        &mut self,
        date: NaiveDate,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> Option<bool> {
        let stat = self.days.get_mut(&date)?;
        let item = stat.checklist.iter_mut().find(|i| i.id == item_id)?;
        item.done = !item.done;
        let done = item.done;
        stat.touch(now);
        Some(done)
    }

    pub fn remove_checklist_item(
        &mut self,
        date: NaiveDate,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(stat) = self.days.get_mut(&date) else {
            return false;
        };
        let before = stat.checklist.len();
        stat.checklist.retain(|i| i.id != item_id);
        let removed = stat.checklist.len() != before;
        if removed {
            stat.touch(now);
        }
        removed
    }

    pub fn summary(&self) -> StatsSummary {
        let mut summary = StatsSummary {
            days: self.days.len(),
            ..StatsSummary::default()
        };
        for stat in self.days.values() {
            summary.study_minutes += stat.total_study_minutes();
            summary.break_minutes += stat.total_break_minutes();
            summary.completed_sessions += stat.completed_sessions;
            for (category, minutes) in &stat.study_minutes {
                *summary.by_category.entry(category.clone()).or_default() += minutes;
            }
        }
        summary
    }

    /// Consecutive days with study time, ending at `today` (or yesterday,
    /// when nothing has been studied yet today).
    pub fn streak(&self, today: NaiveDate) -> u32 {
        let studied = |d: NaiveDate| {
            self.days
                .get(&d)
                .is_some_and(|s| s.total_study_minutes() > 0)
        };
        let mut day = if studied(today) {
            today
        } else {
            today - Duration::days(1)
        };
        let mut streak = 0;
        while studied(day) {
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }

    /// Merge remote records into this map, day by day.
    pub fn merge_all(&mut self, remote: impl IntoIterator<Item = DailyStat>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for theirs in remote {
            let date = theirs.date;
            match self.days.get(&date) {
                None => {
                    self.days.insert(date, theirs);
                    outcome.pulled.push(date);
                }
                Some(ours) if ours.updated_at == theirs.updated_at => {
                    outcome.unchanged.push(date);
                }
                Some(ours) => match resolve(ours, &theirs) {
                    MergeDecision::UseRemote => {
                        self.days.insert(date, theirs);
                        outcome.pulled.push(date);
                    }
                    MergeDecision::UseLocal => outcome.kept_newer.push(date),
                },
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, 0, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn record_study_accumulates_per_category() {
        let mut stats = DailyStats::default();
        stats.record_study(date(), "Math", 25, at(9));
        stats.record_study(date(), "Math", 25, at(10));
        let stat = stats.record_study(date(), "History", 50, at(11));
        assert_eq!(stat.study_minutes["Math"], 50);
        assert_eq!(stat.total_study_minutes(), 100);
        assert_eq!(stat.completed_sessions, 3);
        assert_eq!(stat.updated_at, at(11));
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn record_break_does_not_count_sessions() {
        let mut stats = DailyStats::default();
        let stat = stats.record_break(date(), "General", 5, at(9));
        assert_eq!(stat.total_break_minutes(), 5);
        assert_eq!(stat.completed_sessions, 0);
    }

    #[test]
    fn merge_keeps_greater_updated_at() {
        let mut a = DailyStat::empty(date(), at(9));
        a.study_minutes.insert("A".into(), 10);
        let mut b = DailyStat::empty(date(), at(12));
        b.study_minutes.insert("B".into(), 20);

        assert_eq!(merge(a.clone(), b.clone()), b);
        assert_eq!(merge(b.clone(), a.clone()), b);

        let tie = DailyStat::empty(date(), at(9));
        assert_eq!(resolve(&a, &tie), MergeDecision::UseLocal);
    }

    #[test]
    fn merge_all_reports_per_date() {
        let d1 = date();
        let d2 = d1.succ_opt().unwrap();
        let d3 = d2.succ_opt().unwrap();

        let mut local = DailyStats::default();
        local.record_study(d1, "A", 25, at(10));
        local.record_study(d2, "A", 25, at(10));

        let remote = vec![
            DailyStat::empty(d1, at(12)),
            DailyStat::empty(d2, at(8)),
            DailyStat::empty(d3, at(8)),
        ];
        let outcome = local.merge_all(remote);
        assert_eq!(outcome.pulled, vec![d1, d3]);
        assert_eq!(outcome.kept_newer, vec![d2]);
        assert_eq!(local.get(d1).unwrap().total_study_minutes(), 0);
        assert_eq!(local.get(d2).unwrap().total_study_minutes(), 25);
    }

    #[test]
    fn local_write_after_pulling_a_future_copy_wins_the_next_merge() {
        let mut local = DailyStats::default();
        let remote = DailyStat::empty(date(), at(12) + Duration::minutes(2));
        local.merge_all(vec![remote.clone()]);

        // Local clock is behind the device that wrote the remote copy.
        let stat = local.record_study(date(), "Math", 25, at(12));
        assert!(stat.updated_at > remote.updated_at);

        let outcome = local.merge_all(vec![remote]);
        assert_eq!(outcome.kept_newer, vec![date()]);
        assert!(outcome.unchanged.is_empty());
        assert_eq!(local.get(date()).unwrap().total_study_minutes(), 25);
    }

    #[test]
    fn repeated_writes_at_the_same_instant_keep_advancing() {
        let mut stats = DailyStats::default();
        let first = stats.record_study(date(), "A", 25, at(9)).updated_at;
        assert_eq!(first, at(9));
        let second = stats.record_break(date(), "A", 5, at(9)).updated_at;
        assert!(second > first);
    }

    #[test]
    fn checklist_add_toggle_remove() {
        let mut stats = DailyStats::default();
        let id = stats.add_checklist_item(date(), " Read ch. 4 ", at(8));
        assert_eq!(stats.get(date()).unwrap().checklist[0].text, "Read ch. 4");
        assert_eq!(stats.toggle_checklist_item(date(), &id, at(9)), Some(true));
        assert_eq!(stats.toggle_checklist_item(date(), &id, at(10)), Some(false));
        assert_eq!(stats.toggle_checklist_item(date(), "nope", at(10)), None);
        assert_eq!(stats.get(date()).unwrap().updated_at, at(10));
        assert!(stats.remove_checklist_item(date(), &id, at(11)));
        assert!(!stats.remove_checklist_item(date(), &id, at(12)));
    }

    #[test]
    fn streak_counts_back_from_today() {
        let today = date();
        let mut stats = DailyStats::default();
        for back in 1..=3 {
            stats.record_study(today - Duration::days(back), "A", 25, at(9));
        }
        assert_eq!(stats.streak(today), 3);
        stats.record_study(today, "A", 25, at(9));
        assert_eq!(stats.streak(today), 4);
        // Break-only day does not extend a streak.
        stats.record_break(today - Duration::days(5), "A", 5, at(9));
        assert_eq!(stats.streak(today), 4);
    }

    #[test]
    fn serializes_as_list_and_back() {
        let mut stats = DailyStats::default();
        stats.record_study(date(), "A", 25, at(9));
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.starts_with('['));
        let back: DailyStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn summary_totals() {
        let mut stats = DailyStats::default();
        stats.record_study(date(), "A", 25, at(9));
        stats.record_study(date().succ_opt().unwrap(), "B", 50, at(9));
        stats.record_break(date(), "A", 5, at(9));
        let summary = stats.summary();
        assert_eq!(summary.days, 2);
        assert_eq!(summary.study_minutes, 75);
        assert_eq!(summary.break_minutes, 5);
        assert_eq!(summary.completed_sessions, 2);
        assert_eq!(summary.by_category["B"], 50);
    }
}
