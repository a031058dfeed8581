//! Shared plumbing for commands: the local store, the state holder loaded
//! from it, and a backend client carrying the stored session.

use std::future::Future;

use pomozoo_core::remote::session_store;
use pomozoo_core::storage::{LocalStore, SqliteStore};
use pomozoo_core::{
    Action, AppConfig, AuthStatus, BackendClient, CoreError, Event, RemoteError, StateHolder,
};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub struct Context {
    pub store: LocalStore<SqliteStore>,
    pub holder: StateHolder,
}

impl Context {
    /// Open the default store and load the last save point.
    pub async fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let store = LocalStore::new(SqliteStore::open_default()?);
        let state = store.load_snapshot().await;
        Ok(Self {
            store,
            holder: StateHolder::new(state),
        })
    }

    pub async fn save(&self) -> CliResult {
        self.store.save_snapshot(self.holder.state()).await?;
        Ok(())
    }

    /// Reflect the client's session in the holder's auth state.
    pub fn set_auth_from(&mut self, client: &BackendClient) -> CliResult {
        let status = client
            .session()
            .map_or(AuthStatus::Unauthenticated, AuthStatus::from_session);
        self.set_auth(status)
    }

    pub fn set_auth(&mut self, status: AuthStatus) -> CliResult {
        for event in self.holder.dispatch(Action::SetAuth(status))? {
            tracing::debug!(?event, "auth state changed");
        }
        Ok(())
    }

    /// Record a backend failure as the visible auth state, then hand the
    /// error back.
    pub fn remote_failed(&mut self, err: RemoteError) -> Box<dyn std::error::Error> {
        let status = AuthStatus::from_error(&err);
        if let Ok(events) = self.holder.dispatch(Action::SetAuth(status.clone())) {
            if !events.is_empty() {
                tracing::warn!(?status, "backend call failed");
            }
        }
        match err {
            RemoteError::Unauthenticated => {
                "not signed in or session rejected (run `pomozoo auth sign-in`)".into()
            }
            other => other.into(),
        }
    }

    /// Await a backend call, recording its failure in auth state.
    pub async fn remote<T>(
        &mut self,
        call: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, Box<dyn std::error::Error>> {
        call.await.map_err(|e| self.remote_failed(e))
    }

    /// [`Self::remote_failed`] for errors from calls that also touch local
    /// state.
    pub fn core_failed(&mut self, err: CoreError) -> Box<dyn std::error::Error> {
        match err {
            CoreError::Remote(e) => self.remote_failed(e),
            other => other.into(),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print dispatched events, or the state snapshot when nothing changed.
pub fn print_events(ctx: &Context, events: &[Event]) -> CliResult {
    if events.is_empty() {
        return print_json(&ctx.holder.state().snapshot(chrono::Utc::now()));
    }
    for event in events {
        print_json(event)?;
    }
    Ok(())
}

/// Backend client from config, with the keyring session attached.
///
/// An expired session is refreshed once; if that fails the stored session
/// is dropped and the client continues signed out.
pub async fn backend() -> Result<BackendClient, Box<dyn std::error::Error>> {
    let backend = AppConfig::load_or_default().backend();
    let client = BackendClient::new(
        backend.url.as_deref().unwrap_or_default(),
        backend.anon_key.as_deref().unwrap_or_default(),
    )?;
    let session = session_store::load()?;
    let expired = session
        .as_ref()
        .is_some_and(|s| s.is_expired(chrono::Utc::now()));
    let mut client = client.with_session(session);
    if expired {
        match client.refresh().await {
            Ok(_) => persist_session(&client)?,
            Err(e) => {
                tracing::warn!(error = %e, "session refresh failed, signing out locally");
                client.take_session();
                session_store::clear()?;
            }
        }
    }
    Ok(client)
}

/// Mirror the client's session into the keyring.
pub fn persist_session(client: &BackendClient) -> CliResult {
    match client.session() {
        Some(session) => session_store::save(session)?,
        None => session_store::clear()?,
    }
    Ok(())
}

/// Signed-in client or a clear error. The holder's auth state follows the
/// stored session.
pub async fn signed_in_backend(
    ctx: &mut Context,
) -> Result<BackendClient, Box<dyn std::error::Error>> {
    let client = backend().await?;
    ctx.set_auth_from(&client)?;
    if let Err(e) = client.require_session() {
        return Err(ctx.remote_failed(e));
    }
    Ok(client)
}
