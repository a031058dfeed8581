//! Remote mirror of user, room and habit data on the managed backend.

mod client;
mod sync;
mod types;

pub use client::BackendClient;
pub use sync::{push_all, sync_daily_stats, SyncReport};
pub use types::{
    AuthStatus, HabitSummary, MemberRole, Membership, Session, StudyRoom, UserRecord,
};

/// Backend session persisted in the OS keyring between CLI runs.
pub mod session_store {
    use super::Session;
    use crate::error::Result;

    const SERVICE: &str = "pomozoo";
    const SESSION_KEY: &str = "backend_session";

    fn entry() -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(SERVICE, SESSION_KEY)?)
    }

    /// Stored session, if any. An unreadable entry counts as signed out.
    pub fn load() -> Result<Option<Session>> {
        let raw = match entry()?.get_password() {
            Ok(raw) => raw,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored session");
                Ok(None)
            }
        }
    }

    pub fn save(session: &Session) -> Result<()> {
        entry()?.set_password(&serde_json::to_string(session)?)?;
        Ok(())
    }

    pub fn clear() -> Result<()> {
        match entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
