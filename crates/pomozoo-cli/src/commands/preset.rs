use clap::Subcommand;
use pomozoo_core::Action;

use crate::context::{print_events, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum PresetAction {
    /// List saved presets
    List,
    /// Save the current settings as a new preset
    Create {
        name: String,
    },
    /// Rename a preset
    Rename {
        id: String,
        name: String,
    },
    /// Overwrite a preset with the current settings
    Update {
        id: String,
    },
    /// Delete a preset
    Delete {
        id: String,
    },
    /// Switch to a preset's settings
    Apply {
        id: String,
    },
}

pub async fn run(action: PresetAction) -> CliResult {
    let mut ctx = Context::open().await?;
    let current = ctx.holder.state().settings.clone();

    let action = match action {
        PresetAction::List => return print_json(ctx.holder.state().presets.list()),
        PresetAction::Create { name } => Action::CreatePreset {
            name,
            settings: current,
        },
        PresetAction::Rename { id, name } => Action::RenamePreset { id, name },
        PresetAction::Update { id } => Action::UpdatePreset {
            id,
            settings: current,
        },
        PresetAction::Delete { id } => Action::DeletePreset { id },
        PresetAction::Apply { id } => Action::ApplyPreset(id),
    };
    let events = ctx.holder.dispatch(action)?;
    print_events(&ctx, &events)?;
    ctx.save().await
}
