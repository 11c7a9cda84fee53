// src/routes/mod.rs
pub mod chat;
pub mod wellness;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use chat::{
    create_session_handler, delete_session_handler, format_handler, formats_handler, get_session_handler, intake_handler,
    message_handler, query_handler,
};
use tower_http::trace::TraceLayer;
use wellness::{checkin_handler, leaderboard_handler, questions_handler, resources_handler};

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/sessions/{id}", get(get_session_handler).delete(delete_session_handler))
        .route("/sessions/{id}/intake", post(intake_handler))
        .route("/sessions/{id}/messages", post(message_handler))
        .route("/sessions/{id}/format", post(format_handler))
        .route("/formats", get(formats_handler))
        .route("/query", post(query_handler))
        .route("/checkin/questions", get(questions_handler))
        .route("/checkin", post(checkin_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/resources", get(resources_handler))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
}
