// src/routes/chat.rs
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    error::AppError,
    message::{ChatRequest, FormatOption, FormatRequest, QueryRequest, QueryResponse, SessionView},
    services::{chat_session::HealthChatSession, intake::FormatChoice, intake::IntakeProfile},
    state::SharedState,
};

async fn lookup(state: &SharedState, id: &str) -> Result<Arc<HealthChatSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(id.to_string()))
}

pub async fn create_session_handler(State(state): State<SharedState>) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create_session().await;
    (StatusCode::CREATED, Json(SessionView::from(session.as_ref())))
}

pub async fn get_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let session = lookup(&state, &id).await?;
    Ok(Json(SessionView::from(session.as_ref())))
}

pub async fn delete_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(id))
    }
}

pub async fn intake_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(profile): Json<IntakeProfile>,
) -> Result<Json<SessionView>, AppError> {
    let session = lookup(&state, &id).await?;
    session.submit_intake(profile).await?;
    Ok(Json(SessionView::from(session.as_ref())))
}

pub async fn message_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = lookup(&state, &id).await?;
    session.send_message(&payload.message).await?;
    Ok(Json(SessionView::from(session.as_ref())))
}

pub async fn format_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<FormatRequest>,
) -> Result<Json<SessionView>, AppError> {
    let format: FormatChoice = payload.format.parse()?;
    let session = lookup(&state, &id).await?;
    session.generate_plan_with_format(format).await?;
    Ok(Json(SessionView::from(session.as_ref())))
}

/// Options offered once a session is awaiting its format choice.
pub async fn formats_handler() -> Json<Vec<FormatOption>> {
    Json(FormatChoice::ALL.into_iter().map(FormatOption::from).collect())
}

/// Free-text question to the plan service, outside any session.
pub async fn query_handler(
    State(state): State<SharedState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let question = payload.query.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("Query cannot be empty".to_string()));
    }
    let answer = state.sessions.backend().query(question).await?;
    Ok(Json(QueryResponse { answer }))
}
