// src/routes/wellness.rs
use axum::Json;

use crate::{
    error::AppError,
    message::CheckInRequest,
    services::{
        checkin::{self, CheckIn, CheckInQuestion, CheckInResult, LeaderboardEntry, QUESTIONS},
        resources::{self, ResourceView},
    },
};

pub async fn questions_handler() -> Json<&'static [CheckInQuestion]> {
    Json(&QUESTIONS[..])
}

pub async fn checkin_handler(Json(payload): Json<CheckInRequest>) -> Result<Json<CheckInResult>, AppError> {
    let check_in = CheckIn::from_responses(&payload.responses)?;
    let result = check_in.finish(&mut rand::rng())?;
    Ok(Json(result))
}

pub async fn leaderboard_handler() -> Json<Vec<LeaderboardEntry>> {
    Json(checkin::leaderboard(&mut rand::rng()))
}

pub async fn resources_handler() -> Json<Vec<ResourceView>> {
    Json(resources::directory())
}
