// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::services::chat_session::{HealthChatSession, SessionSettings};
use crate::services::health_plan_client::HealthPlanBackend;

struct Entry {
    session: Arc<HealthChatSession>,
    last_active: Instant,
}

/// Live chat sessions keyed by id. Each UI instance owns one session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    backend: Arc<dyn HealthPlanBackend>,
    settings: SessionSettings,
    ttl: Duration,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .field("settings", &self.settings)
            .finish()
    }
}

impl SessionManager {
    pub fn new(backend: Arc<dyn HealthPlanBackend>, settings: SessionSettings, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            backend,
            settings,
            ttl,
        }
    }

    /// Create a fresh session and return it.
    pub async fn create_session(&self) -> Arc<HealthChatSession> {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(HealthChatSession::new(
            id.clone(),
            Arc::clone(&self.backend),
            self.settings.clone(),
        ));

        let mut guard = self.inner.write().await;
        guard.insert(
            id.clone(),
            Entry {
                session: Arc::clone(&session),
                last_active: Instant::now(),
            },
        );
        info!(session = %id, total = guard.len(), "session created");
        session
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, session_id: &str) -> Option<Arc<HealthChatSession>> {
        let mut guard = self.inner.write().await;
        guard.get_mut(session_id).map(|entry| {
            entry.last_active = Instant::now();
            Arc::clone(&entry.session)
        })
    }

    /// Remove a session by id
    pub async fn remove_session(&self, session_id: &str) -> bool {
        let mut guard = self.inner.write().await;
        let removed = guard.remove(session_id).is_some();
        if removed {
            info!(session = %session_id, "session removed");
        }
        removed
    }

    /// Remove sessions idle longer than ttl. Sessions with a request in
    /// flight are kept. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, e| now.duration_since(e.last_active) < self.ttl || e.session.is_request_in_flight());
        let removed = before - guard.len();
        debug!(removed, remaining = guard.len(), "purge_expired");
        removed
    }

    /// Number of sessions
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// List session ids
    pub async fn list_session_ids(&self) -> Vec<String> {
        let guard = self.inner.read().await;
        guard.keys().cloned().collect()
    }

    pub fn backend(&self) -> &Arc<dyn HealthPlanBackend> {
        &self.backend
    }
}
