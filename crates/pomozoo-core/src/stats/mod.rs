//! Study statistics: per-day minutes, session counts and the daily checklist.

mod daily;

pub use daily::{
    day_of, merge, resolve, ChecklistItem, DailyStat, DailyStats, MergeDecision, MergeOutcome,
    StatsSummary,
};
