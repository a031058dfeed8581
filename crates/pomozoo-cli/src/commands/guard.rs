use clap::Subcommand;
use pomozoo_core::{FocusGuard, GuardDecision};

use crate::context::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum GuardAction {
    /// Whether the guard is armed right now
    Status,
    /// Decide whether an app may come to the foreground
    Check {
        /// App identifier, e.g. "com.example.video"
        app_id: String,
    },
}

pub async fn run(action: GuardAction) -> CliResult {
    let ctx = Context::open().await?;
    let state = ctx.holder.state();

    match action {
        GuardAction::Status => print_json(&serde_json::json!({
            "enabled": state.settings.focus_guard_enabled,
            "active": FocusGuard::is_active(&state.timer, &state.settings),
            "blocked_apps": state.settings.blocked_apps,
        })),
        GuardAction::Check { app_id } => {
            let decision = FocusGuard::decide(&state.timer, &state.settings, &app_id);
            print_json(&decision)?;
            if let GuardDecision::Block { .. } = decision {
                std::process::exit(2);
            }
            Ok(())
        }
    }
}
