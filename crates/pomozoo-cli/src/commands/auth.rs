use clap::{Args, Subcommand};
use pomozoo_core::remote::{push_all, session_store};
use pomozoo_core::AuthStatus;

use crate::context::{backend, persist_session, print_json, CliResult, Context};

#[derive(Args)]
pub struct Credentials {
    /// Account e-mail
    #[arg(long)]
    email: String,
    /// Password (falls back to POMOZOO_PASSWORD)
    #[arg(long, env = "POMOZOO_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account and upload local stats
    SignUp(Credentials),
    /// Sign in with e-mail and password
    SignIn(Credentials),
    /// Sign out and forget the stored session
    SignOut,
    /// Exchange the refresh token for a new session
    Refresh,
    /// Print the current authentication state
    Status,
}

pub async fn run(action: AuthAction) -> CliResult {
    let mut ctx = Context::open().await?;

    match action {
        AuthAction::SignUp(creds) => {
            let mut client = backend().await?;
            let signed_up = ctx
                .remote(client.sign_up(&creds.email, &creds.password))
                .await?;
            if signed_up.is_none() {
                println!("check your inbox to confirm the account, then sign in");
                return Ok(());
            }
            persist_session(&client)?;
            ctx.set_auth_from(&client)?;
            let stats = ctx.holder.state().daily_stats.clone();
            let pushed = ctx.remote(push_all(&client, &stats)).await?;
            tracing::info!(pushed, "uploaded local stats after sign-up");
            print_json(&ctx.holder.state().auth)
        }
        AuthAction::SignIn(creds) => {
            let mut client = backend().await?;
            match client.sign_in(&creds.email, &creds.password).await {
                Ok(_) => {
                    persist_session(&client)?;
                    ctx.set_auth_from(&client)?;
                    print_json(&ctx.holder.state().auth)
                }
                Err(e) => {
                    let err = ctx.remote_failed(e);
                    print_json(&ctx.holder.state().auth)?;
                    Err(err)
                }
            }
        }
        AuthAction::SignOut => {
            let mut client = backend().await?;
            let result = client.sign_out().await;
            session_store::clear()?;
            ctx.set_auth(AuthStatus::Unauthenticated)?;
            result?;
            print_json(&ctx.holder.state().auth)
        }
        AuthAction::Refresh => {
            let mut client = backend().await?;
            ctx.remote(client.refresh()).await?;
            persist_session(&client)?;
            ctx.set_auth_from(&client)?;
            print_json(&ctx.holder.state().auth)
        }
        AuthAction::Status => {
            let status = match session_store::load()? {
                Some(session) => AuthStatus::from_session(&session),
                None => AuthStatus::Unauthenticated,
            };
            ctx.set_auth(status)?;
            print_json(&ctx.holder.state().auth)
        }
    }
}
