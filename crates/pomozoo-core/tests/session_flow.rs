//! End-to-end: run study sessions, hit the save point, reopen the store.

use std::sync::Arc;
use std::time::Duration;

use pomozoo_core::events::Event;
use pomozoo_core::stats::day_of;
use pomozoo_core::storage::{keys, KeyValueStore, LocalStore, SqliteStore};
use pomozoo_core::{Action, FocusGuard, Settings, StateHolder, TimerEngine, TimerMode};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tokio::sync::Mutex;

fn one_minute() -> Settings {
    Settings {
        study_minutes: 1,
        short_break_minutes: 1,
        long_break_minutes: 1,
        long_break_interval: 2,
        focus_guard_enabled: true,
        blocked_apps: vec!["com.example.video".into()],
        category: "Science".into(),
        ..Settings::default()
    }
}

#[tokio::test]
async fn completed_sessions_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("pomozoo.db");

    let store = LocalStore::new(SqliteStore::open(&db).unwrap());
    store.save_settings(&one_minute()).await.unwrap();

    let state = store.load_snapshot().await;
    let holder = Arc::new(Mutex::new(StateHolder::with_rng(
        state,
        Box::new(Pcg64::seed_from_u64(42)),
    )));

    // Two full study intervals with a break between them.
    let mut events = Vec::new();
    for _ in 0..3 {
        {
            let mut h = holder.lock().await;
            h.dispatch(Action::Start).unwrap();
            let guard = FocusGuard::decide(&h.state().timer, &h.state().settings, "COM.EXAMPLE.VIDEO");
            assert_eq!(guard.is_blocked(), h.state().timer.mode() == TimerMode::Study);
        }
        TimerEngine::new(holder.clone())
            .with_period(Duration::from_millis(1))
            .run(std::future::pending::<()>(), |e| events.push(e.clone()))
            .await;
    }

    let awarded = events
        .iter()
        .filter(|e| matches!(e, Event::AnimalAwarded { .. }))
        .count();
    assert_eq!(awarded, 2);

    let state = holder.lock().await.state().clone();
    assert_eq!(state.timer.mode(), TimerMode::LongBreak);
    store.save_snapshot(&state).await.unwrap();
    drop(store);

    let reopened = LocalStore::new(SqliteStore::open(&db).unwrap());
    let restored = reopened.load_snapshot().await;
    assert_eq!(restored.settings, one_minute());
    assert_eq!(restored.collected, state.collected);
    assert_eq!(restored.timer, state.timer);
    assert!(restored.active_sprites.is_empty());

    let today = day_of(chrono::Utc::now());
    let stat = restored.daily_stats.get(today).unwrap();
    assert_eq!(stat.study_minutes["Science"], 2);
    assert_eq!(stat.completed_sessions, 2);
}

#[tokio::test]
async fn corrupted_store_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("pomozoo.db");
    {
        let raw = SqliteStore::open(&db).unwrap();
        raw.set(keys::SETTINGS, "\u{0}garbage").unwrap();
        raw.set(keys::DAILY_STATS, "[{\"date\": 7}]").unwrap();
        raw.set(keys::TIMER_STATE, "null").unwrap();
    }

    let store = LocalStore::new(SqliteStore::open(&db).unwrap());
    let state = store.load_snapshot().await;
    assert_eq!(state.settings, Settings::default());
    assert!(state.daily_stats.is_empty());
    assert_eq!(state.timer.time_left(), 25 * 60);
    assert!(!state.timer.is_running());
}
