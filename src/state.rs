// src/state.rs
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ConfigError};
use crate::services::chat_session::SessionSettings;
use crate::services::health_plan_client::{HealthPlanBackend, HealthPlanClient};
use crate::services::session_manager::SessionManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(backend: Arc<dyn HealthPlanBackend>, settings: SessionSettings, session_ttl: Duration) -> Self {
        Self {
            sessions: SessionManager::new(backend, settings, session_ttl),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let backend = Arc::new(HealthPlanClient::from_config(config)?);
        Ok(Self::new(
            backend,
            SessionSettings::from_config(config),
            config.session_ttl,
        ))
    }
}
