use clap::Subcommand;
use pomozoo_core::stats::day_of;
use pomozoo_core::Action;

use crate::context::{print_events, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// All-time totals
    All,
    /// Every recorded day
    Days,
    /// Consecutive days with study time
    Streak,
    /// Today's checklist
    Checklist {
        #[command(subcommand)]
        action: ChecklistAction,
    },
}

#[derive(Subcommand)]
pub enum ChecklistAction {
    /// List today's items
    List,
    /// Add an item to today's checklist
    Add {
        text: String,
    },
    /// Flip an item between done and not done
    Toggle {
        id: String,
    },
    /// Remove an item
    Remove {
        id: String,
    },
}

pub async fn run(action: StatsAction) -> CliResult {
    let mut ctx = Context::open().await?;
    let now = chrono::Utc::now();
    let today = day_of(now);
    let stats = &ctx.holder.state().daily_stats;

    match action {
        StatsAction::Today => match stats.get(today) {
            Some(stat) => print_json(stat),
            None => print_json(&serde_json::json!({ "date": today, "study_minutes": {} })),
        },
        StatsAction::All => print_json(&stats.summary()),
        StatsAction::Days => print_json(&stats.iter().collect::<Vec<_>>()),
        StatsAction::Streak => {
            println!("{}", stats.streak(today));
            Ok(())
        }
        StatsAction::Checklist { action } => {
            let events = match action {
                ChecklistAction::List => {
                    let items = stats.get(today).map(|s| s.checklist.as_slice()).unwrap_or(&[]);
                    return print_json(items);
                }
                ChecklistAction::Add { text } => {
                    ctx.holder.dispatch(Action::AddChecklistItem { text })?
                }
                ChecklistAction::Toggle { id } => {
                    ctx.holder
                        .dispatch(Action::ToggleChecklistItem { item_id: id })?
                }
                ChecklistAction::Remove { id } => ctx
                    .holder
                    .dispatch(Action::RemoveChecklistItem { item_id: id })?,
            };
            print_events(&ctx, &events)?;
            ctx.save().await
        }
    }
}
