//! Row types for the backend tables and the auth session.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::stats::{ChecklistItem, DailyStat};

/// Signed-in session returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// UI-visible authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Authenticated {
        user_id: String,
        email: Option<String>,
    },
    Error {
        message: String,
    },
}

impl AuthStatus {
    pub fn from_session(session: &Session) -> Self {
        AuthStatus::Authenticated {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
        }
    }

    /// Map a backend failure to what the user should see.
    pub fn from_error(err: &RemoteError) -> Self {
        match err {
            RemoteError::Unauthenticated => AuthStatus::Unauthenticated,
            other => AuthStatus::Error {
                message: other.to_string(),
            },
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            AuthStatus::Authenticated { user_id, .. } => Some(user_id),
            _ => None,
        }
    }
}

/// `users` table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_animal_id: Option<String>,
    #[serde(default)]
    pub collected_count: u32,
    pub updated_at: DateTime<Utc>,
}

/// `study_rooms` table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRoom {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Member,
}

/// `room_memberships` table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub room_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// `habit_summaries` table row: the remote mirror of one [`DailyStat`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub study_minutes: BTreeMap<String, u32>,
    #[serde(default)]
    pub break_minutes: BTreeMap<String, u32>,
    #[serde(default)]
    pub completed_sessions: u32,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    pub updated_at: DateTime<Utc>,
}

impl HabitSummary {
    pub fn from_daily_stat(user_id: &str, stat: &DailyStat) -> Self {
        Self {
            user_id: user_id.to_string(),
            date: stat.date,
            study_minutes: stat.study_minutes.clone(),
            break_minutes: stat.break_minutes.clone(),
            completed_sessions: stat.completed_sessions,
            checklist: stat.checklist.clone(),
            updated_at: stat.updated_at,
        }
    }

    pub fn into_daily_stat(self) -> DailyStat {
        DailyStat {
            date: self.date,
            study_minutes: self.study_minutes,
            break_minutes: self.break_minutes,
            completed_sessions: self.completed_sessions,
            checklist: self.checklist,
            updated_at: self.updated_at,
        }
    }

    pub fn total_study_minutes(&self) -> u32 {
        self.study_minutes.values().sum()
    }
}
