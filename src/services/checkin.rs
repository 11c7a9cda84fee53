// src/services/checkin.rs
//! Daily check-in questionnaire and the mock leaderboard it feeds.
//!
//! Each answer scores its option index (0 is the most positive), so the
//! total ranges 0..=10 and lower is better. Ranks are random within a tier;
//! there is no real competition behind them.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckInQuestion {
    pub question: &'static str,
    pub options: [&'static str; 3],
}

pub static QUESTIONS: [CheckInQuestion; 5] = [
    CheckInQuestion {
        question: "How has the plan been working for you?",
        options: ["Very Effective", "Somewhat Effective", "Not Effective"],
    },
    CheckInQuestion {
        question: "How confident are you in following your plan today?",
        options: ["Very Confident", "Somewhat Confident", "Not Confident"],
    },
    CheckInQuestion {
        question: "How satisfied are you with your progress so far?",
        options: ["Very Satisfied", "Somewhat Satisfied", "Not Satisfied"],
    },
    CheckInQuestion {
        question: "How likely are you to meet your goals this week?",
        options: ["Very Likely", "Somewhat Likely", "Not Likely"],
    },
    CheckInQuestion {
        question: "Have you implemented any part of your plan today?",
        options: ["Yes", "Somewhat", "No"],
    },
];

const TOP_TIER: RangeInclusive<u32> = 1..=5;
const MIDDLE_TIER: RangeInclusive<u32> = 20..=30;
const BOTTOM_TIER: RangeInclusive<u32> = 40..=50;

pub const LEADERBOARD_SIZE: u32 = 50;
/// Ranks up to and including this earn the swag bag and a star on the leaderboard.
pub const REWARD_CUTOFF: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckInError {
    #[error("question {question} has no option {option}")]
    InvalidOption { question: usize, option: usize },

    #[error("all {} questions have already been answered", QUESTIONS.len())]
    AlreadyComplete,

    #[error("check-in incomplete: {answered} of {} questions answered", QUESTIONS.len())]
    Incomplete { answered: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInResult {
    pub score: u32,
    pub rank: u32,
    pub earned_reward: bool,
}

/// Answers collected so far, in question order.
#[derive(Debug, Clone, Default)]
pub struct CheckIn {
    responses: Vec<usize>,
}

impl CheckIn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a check-in from a full list of answers.
    pub fn from_responses(responses: &[usize]) -> Result<Self, CheckInError> {
        let mut check_in = Self::new();
        for &option in responses {
            check_in.answer(option)?;
        }
        Ok(check_in)
    }

    /// The question awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&'static CheckInQuestion> {
        QUESTIONS.get(self.responses.len())
    }

    pub fn answer(&mut self, option: usize) -> Result<(), CheckInError> {
        let question = self.current_question().ok_or(CheckInError::AlreadyComplete)?;
        if option >= question.options.len() {
            return Err(CheckInError::InvalidOption {
                question: self.responses.len(),
                option,
            });
        }
        self.responses.push(option);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.responses.len() == QUESTIONS.len()
    }

    pub fn total_score(&self) -> u32 {
        self.responses.iter().map(|&i| i as u32).sum()
    }

    pub fn reset(&mut self) {
        self.responses.clear();
    }

    pub fn finish<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<CheckInResult, CheckInError> {
        if !self.is_complete() {
            return Err(CheckInError::Incomplete {
                answered: self.responses.len(),
            });
        }
        let score = self.total_score();
        let rank = rank_for_score(score, rng);
        Ok(CheckInResult {
            score,
            rank,
            earned_reward: rank <= REWARD_CUTOFF,
        })
    }
}

pub fn tier_for_score(score: u32) -> RangeInclusive<u32> {
    match score {
        0..=3 => TOP_TIER,
        4..=7 => MIDDLE_TIER,
        _ => BOTTOM_TIER,
    }
}

pub fn rank_for_score<R: Rng + ?Sized>(score: u32, rng: &mut R) -> u32 {
    rng.random_range(tier_for_score(score))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub top: bool,
}

/// Fixed names for the top five, random user numbers below.
pub fn leaderboard<R: Rng + ?Sized>(rng: &mut R) -> Vec<LeaderboardEntry> {
    (1..=LEADERBOARD_SIZE)
        .map(|rank| {
            let number = if rank <= REWARD_CUTOFF {
                1000 + rank
            } else {
                rng.random_range(1000..=9999)
            };
            LeaderboardEntry {
                rank,
                name: format!("User {number}"),
                top: rank <= REWARD_CUTOFF,
            }
        })
        .collect()
}
