//! Holds the most recently extracted criteria per session.
//!
//! Criteria are stored behind `Arc` and replaced with a single assignment under
//! the write lock, so a scoring batch that already took its snapshot keeps
//! scoring against the set it started with.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::models::CriteriaSet;

/// Session served by the compatibility routes that carry no session id.
pub const DEFAULT_SESSION: Uuid = Uuid::nil();

#[derive(Debug, Clone)]
struct Session {
    criteria: Arc<CriteriaSet>,
    revision: u64,
    updated_at: DateTime<Utc>,
}

/// Snapshot of a session's criteria as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct CriteriaSnapshot {
    pub session_id: Uuid,
    pub criteria: Arc<CriteriaSet>,
    /// Increments on every replacement, starting at 1.
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the session's criteria wholesale, creating the session if needed.
    pub async fn replace_criteria(
        &self,
        session_id: Uuid,
        criteria: CriteriaSet,
    ) -> CriteriaSnapshot {
        let mut sessions = self.sessions.write().await;
        let revision = sessions.get(&session_id).map_or(0, |s| s.revision) + 1;
        let session = Session {
            criteria: Arc::new(criteria),
            revision,
            updated_at: Utc::now(),
        };
        sessions.insert(session_id, session.clone());

        info!(
            "Session {session_id}: stored {} criteria (revision {revision})",
            session.criteria.len()
        );
        snapshot(session_id, &session)
    }

    /// Current criteria for the session, or `CriteriaNotSet`.
    pub async fn criteria(&self, session_id: Uuid) -> Result<CriteriaSnapshot, PipelineError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .map(|s| snapshot(session_id, s))
            .ok_or(PipelineError::CriteriaNotSet)
    }

    /// Drops the session. Returns whether it existed.
    pub async fn remove(&self, session_id: Uuid) -> bool {
        self.sessions.write().await.remove(&session_id).is_some()
    }
}

fn snapshot(session_id: Uuid, session: &Session) -> CriteriaSnapshot {
    CriteriaSnapshot {
        session_id,
        criteria: Arc::clone(&session.criteria),
        revision: session.revision,
        updated_at: session.updated_at,
    }
}
