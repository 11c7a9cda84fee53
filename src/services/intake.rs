// src/services/intake.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Demographic and health fields collected once by the intake form and
/// forwarded as `health_metrics` on every backend call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeProfile {
    pub height: String,
    pub weight: String,
    pub age: String,
    pub living_location: String,
    pub major: String,
    pub year: String,
    pub health_conditions: String,
    pub health_goals: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    Paragraphs,
    Bullets,
    Schedule,
}

impl FormatChoice {
    pub const ALL: [FormatChoice; 3] = [Self::Paragraphs, Self::Bullets, Self::Schedule];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraphs => "paragraphs",
            Self::Bullets => "bullets",
            Self::Schedule => "schedule",
        }
    }

    /// Button label shown by the format picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Paragraphs => "Detailed Paragraphs",
            Self::Bullets => "Bullet Points",
            Self::Schedule => "Daily Schedule",
        }
    }
}

impl fmt::Display for FormatChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan format '{0}', expected paragraphs, bullets or schedule")]
pub struct UnknownFormat(pub String);

impl FromStr for FormatChoice {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paragraphs" => Ok(Self::Paragraphs),
            "bullets" => Ok(Self::Bullets),
            "schedule" => Ok(Self::Schedule),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// Opening prompt sent right after the intake form is submitted.
pub fn initial_prompt(profile: &IntakeProfile, campus: &str) -> String {
    let conditions = if profile.health_conditions.trim().is_empty() {
        "None"
    } else {
        profile.health_conditions.as_str()
    };

    format!(
        "I am a {age}-year-old {year} studying {major} at {campus}.\n\
         I live {living}.\n\
         Height: {height} inches, Weight: {weight} lbs\n\
         Health Conditions: {conditions}\n\
         Health Goals: {goals}\n\
         \n\
         Please provide initial health recommendations and ask about my preferred format for the detailed plan.",
        age = profile.age,
        year = profile.year,
        major = profile.major,
        living = profile.living_location,
        height = profile.height,
        weight = profile.weight,
        goals = profile.health_goals,
    )
}

/// Prompt asking the backend to restate the conversation as a plan in `format`.
pub fn format_prompt(format: FormatChoice, campus: &str) -> String {
    format!(
        "Please generate a health plan based on our previous conversation in {format} format.\n\
         Include specific {campus} resources and recommendations."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> IntakeProfile {
        IntakeProfile {
            height: "70".into(),
            weight: "160".into(),
            age: "20".into(),
            living_location: "On Campus".into(),
            major: "Biology".into(),
            year: "Sophomore".into(),
            health_conditions: String::new(),
            health_goals: "Sleep more".into(),
        }
    }

    #[test]
    fn initial_prompt_embeds_every_field() {
        let prompt = initial_prompt(&profile(), "Penn State");
        assert!(prompt.starts_with("I am a 20-year-old Sophomore studying Biology at Penn State."));
        assert!(prompt.contains("I live On Campus."));
        assert!(prompt.contains("Height: 70 inches, Weight: 160 lbs"));
        assert!(prompt.contains("Health Conditions: None"));
        assert!(prompt.contains("Health Goals: Sleep more"));
    }

    #[test]
    fn format_prompt_names_format_and_campus() {
        let prompt = format_prompt(FormatChoice::Schedule, "Penn State");
        assert!(prompt.contains("in schedule format"));
        assert!(prompt.contains("Penn State resources"));
    }

    #[test]
    fn format_choice_parses_case_insensitively() {
        assert_eq!("Bullets".parse::<FormatChoice>(), Ok(FormatChoice::Bullets));
        assert!("table".parse::<FormatChoice>().is_err());
    }

    #[test]
    fn profile_deserializes_with_missing_fields() {
        let p: IntakeProfile = serde_json::from_str(r#"{"age": "19"}"#).unwrap();
        assert_eq!(p.age, "19");
        assert_eq!(p.major, "");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["living_location"], "");
    }
}
