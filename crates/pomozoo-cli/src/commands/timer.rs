use std::sync::Arc;

use clap::Subcommand;
use pomozoo_core::timer::EngineExit;
use pomozoo_core::{Action, TimerEngine};
use tokio::sync::Mutex;

use crate::context::{print_events, print_json, CliResult, Context};

/// Upper bound for `timer tick --count`: one day of seconds.
const MAX_TICKS: u64 = 24 * 60 * 60;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start the countdown (resumes if paused)
    Start,
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Abandon the countdown and restore its full length
    Stop,
    /// Jump to the next mode without finishing
    Skip,
    /// Advance the countdown by whole seconds
    Tick {
        #[arg(
            long,
            default_value = "1",
            value_parser = clap::value_parser!(u64).range(1..=MAX_TICKS)
        )]
        count: u64,
    },
    /// Run the countdown in the foreground until it stops or Ctrl-C
    Run,
}

pub async fn run(action: TimerAction) -> CliResult {
    let mut ctx = Context::open().await?;

    let simple = match action {
        TimerAction::Status => {
            return print_json(&ctx.holder.state().snapshot(chrono::Utc::now()));
        }
        TimerAction::Start => Some(Action::Start),
        TimerAction::Pause => Some(Action::Pause),
        TimerAction::Resume => Some(Action::Resume),
        TimerAction::Stop => Some(Action::Stop),
        TimerAction::Skip => Some(Action::Skip),
        TimerAction::Tick { count } => {
            let events = ctx.holder.tick_many(count, chrono::Utc::now());
            print_events(&ctx, &events)?;
            None
        }
        TimerAction::Run => {
            return run_foreground(ctx).await;
        }
    };

    if let Some(action) = simple {
        let events = ctx.holder.dispatch(action)?;
        print_events(&ctx, &events)?;
    }
    ctx.save().await
}

async fn run_foreground(mut ctx: Context) -> CliResult {
    if !ctx.holder.state().timer.is_counting() {
        for event in ctx.holder.dispatch(Action::Start)? {
            print_json(&event)?;
        }
    }

    let store = ctx.store.clone();
    let holder = Arc::new(Mutex::new(ctx.holder));
    let engine = TimerEngine::new(holder.clone());

    // Loop across auto-started countdowns; stop on Ctrl-C or when idle.
    let exit = engine
        .run(tokio::signal::ctrl_c(), |event| {
            if let Ok(json) = serde_json::to_string(event) {
                println!("{json}");
            }
        })
        .await;
    if exit == EngineExit::Shutdown {
        holder.lock().await.dispatch(Action::Pause)?;
        eprintln!("paused");
    }

    let mut holder = holder.lock().await;
    // Sprites only live for this run.
    for event in holder.dispatch(Action::ClearSessionSprites)? {
        print_json(&event)?;
    }
    store.save_snapshot(holder.state()).await?;
    Ok(())
}
