use clap::Subcommand;
use pomozoo_core::{Action, Settings};

use crate::context::{print_events, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings as JSON
    Show,
    /// Get a setting (e.g. "study_minutes")
    Get {
        key: String,
    },
    /// Set a setting; lists take JSON or comma-separated values
    Set {
        key: String,
        value: String,
    },
    /// Restore default settings
    Reset,
}

pub async fn run(action: SettingsAction) -> CliResult {
    let mut ctx = Context::open().await?;
    let settings = &ctx.holder.state().settings;

    let updated = match action {
        SettingsAction::Show => return print_json(settings),
        SettingsAction::Get { key } => {
            return match settings.get(&key) {
                Some(value) => {
                    println!("{value}");
                    Ok(())
                }
                None => Err(format!("unknown key: {key}").into()),
            };
        }
        SettingsAction::Set { key, value } => settings.with(&key, &value)?,
        SettingsAction::Reset => Settings::default(),
    };

    let events = ctx.holder.dispatch(Action::UpdateSettings(updated))?;
    print_events(&ctx, &events)?;
    ctx.save().await
}
