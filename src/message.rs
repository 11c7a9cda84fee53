// src/message.rs
use serde::{Deserialize, Serialize};

use crate::services::chat_session::{HealthChatSession, SessionState};
use crate::services::intake::FormatChoice;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Deserialize)]
pub struct FormatRequest {
    pub format: String,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
}

#[derive(Deserialize)]
pub struct CheckInRequest {
    pub responses: Vec<usize>,
}

/// A session's id plus its current state.
#[derive(Serialize)]
pub struct SessionView {
    pub session_id: String,
    #[serde(flatten)]
    pub state: SessionState,
}

impl From<&HealthChatSession> for SessionView {
    fn from(session: &HealthChatSession) -> Self {
        Self {
            session_id: session.id().to_string(),
            state: session.snapshot(),
        }
    }
}

/// One button of the plan-format picker.
#[derive(Serialize)]
pub struct FormatOption {
    pub value: FormatChoice,
    pub label: &'static str,
}

impl From<FormatChoice> for FormatOption {
    fn from(choice: FormatChoice) -> Self {
        Self {
            value: choice,
            label: choice.label(),
        }
    }
}
