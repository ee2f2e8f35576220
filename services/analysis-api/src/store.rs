//! Session storage: uploaded trades and the latest report per session

use async_trait::async_trait;
use bias_engine::{RawTrade, Report};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A stored report with the metadata the engine leaves out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: Report,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub filename: String,
    pub trades: Vec<RawTrade>,
    /// Bumped every time the trades are replaced
    pub revision: u64,
    pub report: Option<SessionReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, filename: String, trades: Vec<RawTrade>) -> Self {
        let now = Utc::now();
        Self {
            id,
            filename,
            trades,
            revision: 0,
            report: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outcome of storing a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWrite {
    Stored,
    /// The trades were replaced after the report's input was read
    Stale,
    Missing,
}

/// Storage backend for analysis sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session by id
    async fn get(&self, id: &str) -> Option<Session>;

    /// Replace a session's trades, creating the session if needed.
    /// Any previous report is dropped since it no longer matches the trades.
    async fn put_trades(&self, id: &str, filename: &str, trades: Vec<RawTrade>);

    /// Store the report computed from the trades at `revision`. Refused
    /// when the session has moved on to a newer revision.
    async fn put_report(&self, id: &str, revision: u64, report: SessionReport) -> ReportWrite;

    /// Number of live sessions
    async fn len(&self) -> usize;
}

/// Process-local store; sessions do not survive a restart
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    async fn put_trades(&self, id: &str, filename: &str, trades: Vec<RawTrade>) {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) => {
                session.trades = trades;
                session.revision += 1;
                session.filename = filename.to_string();
                session.report = None;
                session.updated_at = Utc::now();
            }
            None => {
                sessions.insert(
                    id.to_string(),
                    Session::new(id.to_string(), filename.to_string(), trades),
                );
            }
        }
    }

    async fn put_report(&self, id: &str, revision: u64, report: SessionReport) -> ReportWrite {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if session.revision != revision => ReportWrite::Stale,
            Some(session) => {
                session.report = Some(report);
                session.updated_at = Utc::now();
                ReportWrite::Stored
            }
            None => ReportWrite::Missing,
        }
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
