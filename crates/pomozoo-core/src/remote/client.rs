//! REST client for the managed backend.
//!
//! The backend exposes PostgREST-style table endpoints under `rest/v1/`,
//! password auth under `auth/v1/` and edge functions under `functions/v1/`.
//! Every request carries the project's anon key as `apikey`; the bearer is
//! the session token when signed in, the anon key otherwise.
//!
//! No retries: a failed call surfaces as a [`RemoteError`] and the caller
//! decides what the user sees.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::types::{HabitSummary, MemberRole, Membership, Session, StudyRoom, UserRecord};
use crate::error::RemoteError;

const BODY_PREVIEW_LIMIT: usize = 256;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const USERS: &str = "users";
const ROOMS: &str = "study_rooms";
const MEMBERSHIPS: &str = "room_memberships";
const HABITS: &str = "habit_summaries";
const DELETE_ACCOUNT_FN: &str = "delete-account";

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
}

impl AuthResponse {
    fn into_session(self) -> Option<Session> {
        let user = self.user?;
        Some(Session {
            access_token: self.access_token?,
            refresh_token: self.refresh_token.unwrap_or_default(),
            user_id: user.id,
            email: user.email,
            expires_at: Utc::now() + chrono::Duration::seconds(self.expires_in.unwrap_or(3600)),
        })
    }
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    session: Option<Session>,
}

impl BackendClient {
    /// # Errors
    ///
    /// Fails when the URL or key is empty, the URL does not parse, or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, RemoteError> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(RemoteError::NotConfigured("backend.url is empty".into()));
        }
        if anon_key.trim().is_empty() {
            return Err(RemoteError::NotConfigured("backend.anon_key is empty".into()));
        }
        let mut raw = base_url.to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base: Url::parse(&raw)?,
            anon_key: anon_key.trim().to_string(),
            session: None,
        })
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn take_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Current session, or [`RemoteError::Unauthenticated`].
    pub fn require_session(&self) -> Result<&Session, RemoteError> {
        self.session.as_ref().ok_or(RemoteError::Unauthenticated)
    }

    // ── Auth ─────────────────────────────────────────────────────────

    /// Register a new account. Returns `None` when the backend requires
    /// e-mail confirmation before issuing a session.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Option<Session>, RemoteError> {
        let url = self.url("auth/v1/signup")?;
        let resp = self
            .request(Method::POST, url)
            .json(&Credentials { email, password })
            .send()
            .await?;
        let session = read_json::<AuthResponse>(resp).await?.into_session();
        if let Some(ref s) = session {
            tracing::info!(user_id = %s.user_id, "signed up");
            self.session = Some(s.clone());
        }
        Ok(session)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let mut url = self.url("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let resp = self
            .request(Method::POST, url)
            .json(&Credentials { email, password })
            .send()
            .await?;
        let session = read_json::<AuthResponse>(resp)
            .await?
            .into_session()
            .ok_or_else(|| RemoteError::Decode("sign-in response carried no session".into()))?;
        tracing::info!(user_id = %session.user_id, "signed in");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Exchange the refresh token for a new session.
    pub async fn refresh(&mut self) -> Result<Session, RemoteError> {
        let refresh_token = self.require_session()?.refresh_token.clone();
        let mut url = self.url("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");
        let resp = self
            .request(Method::POST, url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let session = read_json::<AuthResponse>(resp)
            .await?
            .into_session()
            .ok_or(RemoteError::Unauthenticated)?;
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Revoke the session server-side. The local session is dropped even if
    /// the call fails.
    pub async fn sign_out(&mut self) -> Result<(), RemoteError> {
        if self.session.is_none() {
            return Ok(());
        }
        let url = self.url("auth/v1/logout")?;
        let result = match self.request(Method::POST, url).send().await {
            Ok(resp) => ensure_success(resp).await,
            Err(e) => Err(e.into()),
        };
        self.session = None;
        result
    }

    /// Invoke the account-deletion edge function for the signed-in user.
    pub async fn delete_account(&mut self) -> Result<(), RemoteError> {
        let user_id = self.require_session()?.user_id.clone();
        let url = self.url(&format!("functions/v1/{DELETE_ACCOUNT_FN}"))?;
        let resp = self
            .request(Method::POST, url)
            .json(&json!({ "user_id": user_id }))
            .send()
            .await?;
        ensure_success(resp).await?;
        tracing::info!(%user_id, "account deleted");
        self.session = None;
        Ok(())
    }

    // ── Users ────────────────────────────────────────────────────────

    pub async fn upsert_user(&self, user: &UserRecord) -> Result<UserRecord, RemoteError> {
        let rows: Vec<UserRecord> = self
            .insert_rows(USERS, &[user], "resolution=merge-duplicates,return=representation", &[])
            .await?;
        first_row(rows)
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<Option<UserRecord>, RemoteError> {
        let rows: Vec<UserRecord> = self
            .select_rows(USERS, &[("id", format!("eq.{user_id}"))])
            .await?;
        Ok(rows.into_iter().next())
    }

    // ── Rooms ────────────────────────────────────────────────────────

    /// Create a room owned by the signed-in user and join it as owner.
    pub async fn create_room(&self, name: &str) -> Result<StudyRoom, RemoteError> {
        let owner_id = self.require_session()?.user_id.clone();
        let id = Uuid::new_v4();
        let room = StudyRoom {
            id: id.to_string(),
            name: name.trim().to_string(),
            owner_id: owner_id.clone(),
            invite_code: invite_code(&id),
            created_at: Utc::now(),
        };
        let rows: Vec<StudyRoom> = self
            .insert_rows(ROOMS, &[&room], "return=representation", &[])
            .await?;
        let room = first_row(rows)?;
        self.insert_membership(&room.id, &owner_id, MemberRole::Owner)
            .await?;
        Ok(room)
    }

    pub async fn list_rooms(&self) -> Result<Vec<StudyRoom>, RemoteError> {
        self.select_rows(ROOMS, &[("order", "created_at.desc".to_string())])
            .await
    }

    /// Rooms the signed-in user belongs to.
    pub async fn my_rooms(&self) -> Result<Vec<StudyRoom>, RemoteError> {
        let user_id = self.require_session()?.user_id.clone();
        let memberships: Vec<Membership> = self
            .select_rows(MEMBERSHIPS, &[("user_id", format!("eq.{user_id}"))])
            .await?;
        let ids: Vec<&str> = memberships.iter().map(|m| m.room_id.as_str()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select_rows(ROOMS, &[("id", in_filter(&ids))]).await
    }

    pub async fn find_room_by_code(&self, code: &str) -> Result<Option<StudyRoom>, RemoteError> {
        let rows: Vec<StudyRoom> = self
            .select_rows(
                ROOMS,
                &[("invite_code", format!("eq.{}", code.trim().to_uppercase()))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn join_room(&self, room_id: &str) -> Result<Membership, RemoteError> {
        let user_id = self.require_session()?.user_id.clone();
        self.insert_membership(room_id, &user_id, MemberRole::Member)
            .await
    }

    pub async fn leave_room(&self, room_id: &str) -> Result<(), RemoteError> {
        let user_id = self.require_session()?.user_id.clone();
        self.delete_rows(
            MEMBERSHIPS,
            &[
                ("room_id", format!("eq.{room_id}")),
                ("user_id", format!("eq.{user_id}")),
            ],
        )
        .await
    }

    pub async fn list_members(&self, room_id: &str) -> Result<Vec<Membership>, RemoteError> {
        self.select_rows(
            MEMBERSHIPS,
            &[
                ("room_id", format!("eq.{room_id}")),
                ("order", "joined_at.asc".to_string()),
            ],
        )
        .await
    }

    // ── Habit summaries ──────────────────────────────────────────────

    pub async fn upsert_habit_summaries(&self, rows: &[HabitSummary]) -> Result<(), RemoteError> {
        if rows.is_empty() {
            return Ok(());
        }
        let _: Vec<serde_json::Value> = self
            .insert_rows(
                HABITS,
                rows,
                "resolution=merge-duplicates,return=minimal",
                &[("on_conflict", "user_id,date".to_string())],
            )
            .await?;
        Ok(())
    }

    pub async fn upsert_habit_summary(&self, row: &HabitSummary) -> Result<(), RemoteError> {
        self.upsert_habit_summaries(std::slice::from_ref(row)).await
    }

    pub async fn fetch_habit_summaries(
        &self,
        user_id: &str,
    ) -> Result<Vec<HabitSummary>, RemoteError> {
        self.select_rows(
            HABITS,
            &[
                ("user_id", format!("eq.{user_id}")),
                ("order", "date.asc".to_string()),
            ],
        )
        .await
    }

    /// Every member's summary for `date` in a room.
    pub async fn fetch_room_summaries(
        &self,
        room_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<HabitSummary>, RemoteError> {
        let members = self.list_members(room_id).await?;
        let ids: Vec<&str> = members.iter().map(|m| m.user_id.as_str()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select_rows(
            HABITS,
            &[
                ("user_id", in_filter(&ids)),
                ("date", format!("eq.{date}")),
            ],
        )
        .await
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(self.base.join(path)?)
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> Result<Url, RemoteError> {
        let mut url = self.url(&format!("rest/v1/{table}"))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, path = url.path(), "backend request");
        let bearer = self
            .session
            .as_ref()
            .map_or(self.anon_key.as_str(), |s| s.access_token.as_str());
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn insert_membership(
        &self,
        room_id: &str,
        user_id: &str,
        role: MemberRole,
    ) -> Result<Membership, RemoteError> {
        let membership = Membership {
            room_id: room_id.to_string(),
            user_id: user_id.to_string(),
            role,
            joined_at: Utc::now(),
        };
        let rows: Vec<Membership> = self
            .insert_rows(
                MEMBERSHIPS,
                &[&membership],
                "resolution=merge-duplicates,return=representation",
                &[],
            )
            .await?;
        first_row(rows)
    }

    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, RemoteError> {
        let mut query = vec![("select", "*".to_string())];
        query.extend(filters.iter().cloned());
        let url = self.table_url(table, &query)?;
        let resp = self.request(Method::GET, url).send().await?;
        read_json(resp).await
    }

    async fn insert_rows<B, T>(
        &self,
        table: &str,
        body: &B,
        prefer: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, query)?;
        let resp = self
            .request(Method::POST, url)
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        if prefer.contains("return=minimal") {
            ensure_success(resp).await?;
            return Ok(Vec::new());
        }
        read_json(resp).await
    }

    async fn delete_rows(&self, table: &str, filters: &[(&str, String)]) -> Result<(), RemoteError> {
        let url = self.table_url(table, filters)?;
        let resp = self.request(Method::DELETE, url).send().await?;
        ensure_success(resp).await
    }
}

fn in_filter(ids: &[&str]) -> String {
    format!("in.({})", ids.join(","))
}

fn invite_code(id: &Uuid) -> String {
    id.simple().to_string()[..6].to_uppercase()
}

fn first_row<T>(rows: Vec<T>) -> Result<T, RemoteError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| RemoteError::Decode("backend returned no rows".into()))
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}

/// Human-readable message out of a backend error body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    preview_body(body)
}

fn status_error(status: StatusCode, body: &str) -> RemoteError {
    if status == StatusCode::UNAUTHORIZED {
        return RemoteError::Unauthenticated;
    }
    RemoteError::Http {
        status: status.as_u16(),
        message: error_message(body),
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, RemoteError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "backend call failed");
        return Err(status_error(status, &body));
    }
    serde_json::from_str(&body)
        .map_err(|e| RemoteError::Decode(format!("{e} | body={}", preview_body(&body))))
}

async fn ensure_success(resp: Response) -> Result<(), RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "backend call failed");
    Err(status_error(status, &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_missing_configuration() {
        assert!(matches!(
            BackendClient::new("", "key"),
            Err(RemoteError::NotConfigured(_))
        ));
        assert!(matches!(
            BackendClient::new("https://example.test", " "),
            Err(RemoteError::NotConfigured(_))
        ));
        assert!(matches!(
            BackendClient::new("not a url", "key"),
            Err(RemoteError::InvalidUrl(_))
        ));
    }

    #[test]
    fn table_url_encodes_filters() {
        let client = BackendClient::new("https://example.test/base", "key").unwrap();
        let url = client
            .table_url(USERS, &[("id", "in.(a,b)".to_string())])
            .unwrap();
        assert_eq!(url.path(), "/base/rest/v1/users");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("id".to_string(), "in.(a,b)".to_string())]);
    }

    #[test]
    fn invite_codes_are_short_uppercase() {
        let code = invite_code(&Uuid::new_v4());
        assert_eq!(code.len(), 6);
        assert_eq!(code, code.to_uppercase());
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"msg":"Invalid login credentials"}"#), "Invalid login credentials");
        assert_eq!(error_message(""), "<empty body>");
        assert_eq!(error_message("plain"), "plain");
    }

    #[test]
    fn auth_response_without_token_has_no_session() {
        let resp: AuthResponse =
            serde_json::from_str(r#"{"user":{"id":"u1","email":"a@b.c"}}"#).unwrap();
        assert!(resp.into_session().is_none());
    }
}
