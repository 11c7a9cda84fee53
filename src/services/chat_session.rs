// src/services/chat_session.rs
//! One health-plan conversation: the message log, the intake profile and the
//! sequencing of intake -> first reply -> format choice -> free conversation.
//!
//! State lives in a `watch` channel so a presentation layer can subscribe to
//! every change. At most one backend request is in flight per session; the
//! check-and-set happens on the published state itself.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::services::health_plan_client::{BackendError, HealthPlanBackend, HealthPlanRequest};
use crate::services::intake::{FormatChoice, IntakeProfile, format_prompt, initial_prompt};

pub const WELCOME_MESSAGE: &str = "Welcome to LionWell! Please fill out your information to get started with your personalized health plan.";

pub const APOLOGY: &str = "I apologize, but I encountered an error while generating your health plan.\n\
                           Please try again or rephrase your request.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub is_user: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            is_user: true,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            is_user: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    AwaitingIntake,
    AwaitingFirstReply,
    AwaitingFormatChoice,
    Conversing,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionState {
    pub messages: Vec<ChatMessage>,
    pub is_request_in_flight: bool,
    pub awaiting_format_choice: bool,
    pub phase: SessionPhase,
    pub profile: Option<IntakeProfile>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
            is_request_in_flight: false,
            awaiting_format_choice: false,
            phase: SessionPhase::AwaitingIntake,
            profile: None,
        }
    }

    fn current_profile(&self) -> IntakeProfile {
        self.profile.clone().unwrap_or_default()
    }
}

/// Moves a session that is still waiting on its first reply to the format
/// prompt. Returns whether anything changed.
fn enter_format_choice(state: &mut SessionState) -> bool {
    if state.phase != SessionPhase::AwaitingFirstReply {
        return false;
    }
    state.phase = SessionPhase::AwaitingFormatChoice;
    state.awaiting_format_choice = true;
    true
}

/// When the format picker is offered after intake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatPromptPolicy {
    /// Once the initial backend call completes, successfully or not.
    AfterReply,
    /// A timer armed at submission, independent of the call.
    FixedDelay(Duration),
}

#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub campus: String,
    pub format_prompt: FormatPromptPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            campus: config.campus.clone(),
            format_prompt: config.format_prompt,
        }
    }
}

/// Reasons an operation was refused. The session is left untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("A request is already in progress")]
    RequestInFlight,

    #[error("Intake information has already been submitted")]
    IntakeAlreadySubmitted,
}

pub fn error_reply(error: &BackendError) -> String {
    format!("{APOLOGY}\nError: {error}")
}

/// Holds the session's single request slot. Completing it appends the reply
/// and frees the slot in one update; dropping it (a panicked call) only
/// frees the slot.
struct InFlight {
    state: Arc<watch::Sender<SessionState>>,
}

impl InFlight {
    fn complete(self, reply: ChatMessage, opens_format_prompt: bool) {
        self.state.send_modify(|s| {
            s.is_request_in_flight = false;
            s.messages.push(reply);
            if opens_format_prompt {
                enter_format_choice(s);
            }
        });
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.is_request_in_flight, false));
    }
}

pub struct HealthChatSession {
    id: String,
    backend: Arc<dyn HealthPlanBackend>,
    settings: SessionSettings,
    state: Arc<watch::Sender<SessionState>>,
}

impl std::fmt::Debug for HealthChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChatSession")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .finish()
    }
}

impl HealthChatSession {
    pub fn new(id: impl Into<String>, backend: Arc<dyn HealthPlanBackend>, settings: SessionSettings) -> Self {
        let (state, _) = watch::channel(SessionState::new());
        Self {
            id: id.into(),
            backend,
            settings,
            state: Arc::new(state),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.borrow().messages.clone()
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.state.borrow().is_request_in_flight
    }

    pub fn awaiting_format_choice(&self) -> bool {
        self.state.borrow().awaiting_format_choice
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    /// Stores the profile, sends the opening prompt and appends the reply.
    pub async fn submit_intake(&self, profile: IntakeProfile) -> Result<(), SessionError> {
        debug!(session = %self.id, "submit_intake: called");
        let (in_flight, ()) = self.begin(|s| {
            if s.profile.is_some() {
                return Err(SessionError::IntakeAlreadySubmitted);
            }
            s.profile = Some(profile.clone());
            s.phase = SessionPhase::AwaitingFirstReply;
            Ok(())
        })?;

        if let FormatPromptPolicy::FixedDelay(delay) = self.settings.format_prompt {
            self.arm_format_prompt(delay);
        }

        let prompt = initial_prompt(&profile, &self.settings.campus);
        let request = HealthPlanRequest::new(prompt, profile);
        let opens_format_prompt = self.settings.format_prompt == FormatPromptPolicy::AfterReply;
        self.dispatch(in_flight, request, opens_format_prompt).await;
        Ok(())
    }

    /// Appends `text` as a user message, then the backend's reply.
    pub async fn send_message(&self, text: &str) -> Result<(), SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        debug!(session = %self.id, len = text.len(), "send_message: called");

        let (in_flight, profile) = self.begin(|s| {
            s.messages.push(ChatMessage::user(text));
            Ok(s.current_profile())
        })?;

        self.dispatch(in_flight, HealthPlanRequest::new(text, profile), false)
            .await;
        Ok(())
    }

    /// Asks the backend to restate the conversation as a plan in `format`.
    pub async fn generate_plan_with_format(&self, format: FormatChoice) -> Result<(), SessionError> {
        debug!(session = %self.id, %format, "generate_plan_with_format: called");
        let (in_flight, profile) = self.begin(|s| {
            s.awaiting_format_choice = false;
            s.phase = SessionPhase::Conversing;
            Ok(s.current_profile())
        })?;

        let prompt = format_prompt(format, &self.settings.campus);
        let request = HealthPlanRequest::new(prompt, profile).with_format(format);
        self.dispatch(in_flight, request, false).await;
        Ok(())
    }

    /// Claims the single request slot and applies `prepare` in the same
    /// state update. Nothing changes if the slot is taken or `prepare` fails.
    fn begin<T>(
        &self,
        prepare: impl FnOnce(&mut SessionState) -> Result<T, SessionError>,
    ) -> Result<(InFlight, T), SessionError> {
        let mut outcome = Err(SessionError::RequestInFlight);
        self.state.send_if_modified(|s| {
            if s.is_request_in_flight {
                return false;
            }
            outcome = prepare(s);
            if outcome.is_err() {
                return false;
            }
            s.is_request_in_flight = true;
            true
        });

        if let Err(e) = &outcome {
            debug!(session = %self.id, error = %e, "request rejected");
        }
        outcome.map(|value| {
            let in_flight = InFlight {
                state: Arc::clone(&self.state),
            };
            (in_flight, value)
        })
    }

    /// Runs the backend call on its own task so the reply still lands if
    /// the caller goes away, then waits for it.
    async fn dispatch(&self, in_flight: InFlight, request: HealthPlanRequest, opens_format_prompt: bool) {
        let backend = Arc::clone(&self.backend);
        let id = self.id.clone();
        let task = tokio::spawn(async move {
            let reply = match backend.generate_health_plan(&request).await {
                Ok(response) => {
                    info!(session = %id, len = response.len(), "plan service replied");
                    ChatMessage::assistant(response)
                }
                Err(e) => {
                    warn!(session = %id, error = %e, "plan service call failed");
                    ChatMessage::assistant(error_reply(&e))
                }
            };
            in_flight.complete(reply, opens_format_prompt);
        });

        if let Err(e) = task.await {
            warn!(session = %self.id, error = %e, "plan request task failed");
        }
    }

    fn arm_format_prompt(&self, delay: Duration) {
        let state: Weak<watch::Sender<SessionState>> = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(state) = state.upgrade() {
                state.send_if_modified(enter_format_choice);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl HealthPlanBackend for Echo {
        async fn generate_health_plan(&self, request: &HealthPlanRequest) -> Result<String, BackendError> {
            Ok(format!("echo: {}", request.query))
        }

        async fn query(&self, question: &str) -> Result<String, BackendError> {
            Ok(question.to_string())
        }
    }

    fn session() -> HealthChatSession {
        HealthChatSession::new("s1", Arc::new(Echo), SessionSettings::default())
    }

    #[test]
    fn new_session_starts_with_welcome() {
        let s = session();
        let messages = s.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, WELCOME_MESSAGE);
        assert!(!messages[0].is_user);
        assert_eq!(s.phase(), SessionPhase::AwaitingIntake);
    }

    #[test]
    fn rejected_begin_leaves_state_alone() {
        let s = session();
        let mut rx = s.subscribe();
        let err = s
            .begin(|_| Err::<(), _>(SessionError::IntakeAlreadySubmitted))
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, SessionError::IntakeAlreadySubmitted);
        assert!(!s.is_request_in_flight());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().messages.len(), 1);
    }

    #[test]
    fn dropped_request_releases_slot() {
        let s = session();
        let (guard, ()) = s.begin(|_| Ok(())).unwrap();
        assert!(s.is_request_in_flight());
        assert_eq!(s.begin(|_| Ok(())).map(|_| ()).unwrap_err(), SessionError::RequestInFlight);
        drop(guard);
        assert!(!s.is_request_in_flight());
    }

    #[tokio::test]
    async fn message_round_trip() {
        let s = session();
        s.send_message("  hello  ").await.unwrap();
        let messages = s.messages();
        assert_eq!(messages[1].content, "  hello  ");
        assert!(messages[1].is_user);
        assert_eq!(messages[2].content, "echo:   hello  ");
    }
}
