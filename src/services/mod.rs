// src/services/mod.rs
pub mod chat_session;
pub mod checkin;
pub mod health_plan_client;
pub mod intake;
pub mod resources;
pub mod session_manager;
