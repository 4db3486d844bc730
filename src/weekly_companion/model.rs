//! Core data types.
//!
//! These are the shapes that get persisted locally, exported to JSON and
//! mirrored to the cloud. Field names are snake_case on the wire; the
//! [`PersistedState`] envelope alone uses `schemaVersion`.

use crate::calendar::WeekStartDay;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Current version of the persisted/exported format.
pub const SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_UNIT: &str = "sessions";
pub const DEFAULT_INCREMENT: f64 = 1.0;
pub const DEFAULT_REFLECTION_PROMPTS: [&str; 2] = ["What went well?", "Focus for next week?"];

pub fn default_reflection_prompts() -> Vec<String> {
    DEFAULT_REFLECTION_PROMPTS.iter().map(|p| p.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: String,
    pub week_start_day: WeekStartDay,
    /// IANA timezone name
    pub timezone: String,
    pub reflection_enabled: bool,
    pub reflection_prompts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    #[default]
    Active,
    Paused,
    Archived,
}

impl HabitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HabitStatus::Active => "active",
            HabitStatus::Paused => "paused",
            HabitStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for HabitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub icon: Option<String>,
    /// `None` means count-only: there is no target to reach.
    pub weekly_goal: Option<u32>,
    pub unit: String,
    pub default_increment: f64,
    pub status: HabitStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Paused and archived habits don't offer logging affordances.
    pub fn accepts_progress(&self) -> bool {
        self.status == HabitStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    /// Civil date of `timestamp` in the timezone active when the log was made.
    /// Fixed at creation; later timezone changes don't move it.
    pub target_date: NaiveDate,
    pub amount: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionAnswer {
    pub prompt: String,
    pub answer: String,
}

impl ReflectionAnswer {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReflection {
    pub id: Uuid,
    pub user_id: String,
    pub week_start_date: NaiveDate,
    pub answers: Vec<ReflectionAnswer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The durable envelope written to local storage and export files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub settings: Option<UserSettings>,
    pub habits: Vec<Habit>,
    pub logs: Vec<LogEntry>,
    pub reflections: Vec<WeeklyReflection>,
    #[serde(rename = "schemaVersion", default = "current_schema_version")]
    pub schema_version: u32,
}

fn current_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            settings: None,
            habits: Vec::new(),
            logs: Vec::new(),
            reflections: Vec::new(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

/// Which habits a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    Active,
    Paused,
    Archived,
    #[default]
    All,
}

impl StatusFilter {
    pub fn matches(self, status: HabitStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == HabitStatus::Active,
            StatusFilter::Paused => status == HabitStatus::Paused,
            StatusFilter::Archived => status == HabitStatus::Archived,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(StatusFilter::Active),
            "paused" => Ok(StatusFilter::Paused),
            "archived" => Ok(StatusFilter::Archived),
            "all" => Ok(StatusFilter::All),
            other => Err(format!("unknown status filter '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn habit_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(HabitStatus::Paused).unwrap(),
            json!("paused")
        );
    }

    #[test]
    fn envelope_uses_camel_case_schema_version() {
        let value = serde_json::to_value(PersistedState::default()).unwrap();
        assert_eq!(value["schemaVersion"], json!(SCHEMA_VERSION));
        assert!(value.get("schema_version").is_none());
        assert_eq!(value["settings"], json!(null));
    }

    #[test]
    fn envelope_defaults_missing_schema_version() {
        let state: PersistedState = serde_json::from_value(json!({
            "settings": null,
            "habits": [],
            "logs": [],
            "reflections": []
        }))
        .unwrap();
        assert_eq!(state.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn log_entry_target_date_is_a_plain_date() {
        let log = LogEntry {
            id: Uuid::nil(),
            habit_id: Uuid::nil(),
            user_id: "u".into(),
            timestamp: "2025-01-03T03:00:00Z".parse().unwrap(),
            target_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            amount: 1.0,
            note: None,
            created_at: "2025-01-03T03:00:00Z".parse().unwrap(),
        };
        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["target_date"], json!("2025-01-02"));
        assert_eq!(value["note"], json!(null));
    }

    #[test]
    fn status_filter_matching() {
        assert!(StatusFilter::All.matches(HabitStatus::Archived));
        assert!(StatusFilter::Paused.matches(HabitStatus::Paused));
        assert!(!StatusFilter::Active.matches(HabitStatus::Paused));
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!("Archived".parse::<StatusFilter>(), Ok(StatusFilter::Archived));
        assert!("deleted".parse::<StatusFilter>().is_err());
    }
}
