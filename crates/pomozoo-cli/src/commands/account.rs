use clap::Subcommand;
use pomozoo_core::remote::{session_store, UserRecord};
use pomozoo_core::AuthStatus;

use crate::context::{print_json, signed_in_backend, CliResult, Context};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Show your backend profile
    Show,
    /// Publish your profile (name, avatar, collection size)
    Publish {
        /// Name shown to room members
        #[arg(long)]
        name: String,
        /// Collected animal to show as avatar
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Permanently delete the backend account
    Delete {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: AccountAction) -> CliResult {
    let mut ctx = Context::open().await?;
    let mut client = signed_in_backend(&mut ctx).await?;
    let user_id = client.require_session()?.user_id.clone();

    match action {
        AccountAction::Show => match ctx.remote(client.fetch_user(&user_id)).await? {
            Some(user) => print_json(&user),
            None => Err("no profile published yet (run `pomozoo account publish`)".into()),
        },
        AccountAction::Publish { name, avatar } => {
            let state = ctx.holder.state();
            if let Some(ref id) = avatar {
                if !state.collected.iter().any(|c| &c.animal_id == id) {
                    return Err(format!("avatar must be a collected animal: {id}").into());
                }
            }
            let distinct = pomozoo_core::collection::collected_ids(&state.collected).len();
            let user = UserRecord {
                id: user_id,
                display_name: name.trim().to_string(),
                avatar_animal_id: avatar,
                collected_count: u32::try_from(distinct).unwrap_or(u32::MAX),
                updated_at: chrono::Utc::now(),
            };
            print_json(&ctx.remote(client.upsert_user(&user)).await?)
        }
        AccountAction::Delete { yes } => {
            if !yes {
                return Err("refusing to delete without --yes".into());
            }
            ctx.remote(client.delete_account()).await?;
            session_store::clear()?;
            ctx.set_auth(AuthStatus::Unauthenticated)?;
            println!("account deleted");
            Ok(())
        }
    }
}
