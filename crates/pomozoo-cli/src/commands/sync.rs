use clap::Subcommand;
use pomozoo_core::remote::{push_all, sync_daily_stats};

use crate::context::{print_json, signed_in_backend, CliResult, Context};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Pull, merge (newest wins) and push daily stats
    Run,
    /// Upload every local day without pulling
    Push,
}

pub async fn run(action: SyncAction) -> CliResult {
    let mut ctx = Context::open().await?;
    let client = signed_in_backend(&mut ctx).await?;

    match action {
        SyncAction::Run => {
            let report = match sync_daily_stats(&client, &mut ctx.holder).await {
                Ok(report) => report,
                Err(e) => return Err(ctx.core_failed(e)),
            };
            ctx.save().await?;
            print_json(&report)
        }
        SyncAction::Push => {
            let stats = ctx.holder.state().daily_stats.clone();
            let pushed = ctx.remote(push_all(&client, &stats)).await?;
            println!("pushed {pushed} day(s)");
            Ok(())
        }
    }
}
