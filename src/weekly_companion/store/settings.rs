use super::AppStore;
use crate::calendar::{self, WeekStartDay};
use crate::model::UserSettings;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Input for [`AppStore::set_settings`]. `None` fields take the defaults,
/// not the current values; use [`SettingsPatch::from_settings`] to carry the
/// current record forward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub user_id: String,
    pub week_start_day: Option<WeekStartDay>,
    pub timezone: Option<String>,
    pub reflection_enabled: Option<bool>,
    pub reflection_prompts: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl SettingsPatch {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// A patch that reproduces `settings` (apart from `updated_at`).
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self {
            user_id: settings.user_id.clone(),
            week_start_day: Some(settings.week_start_day),
            timezone: Some(settings.timezone.clone()),
            reflection_enabled: Some(settings.reflection_enabled),
            reflection_prompts: Some(settings.reflection_prompts.clone()),
            created_at: Some(settings.created_at),
        }
    }
}

impl AppStore {
    /// Replace the settings with `patch` laid over the defaults: Monday
    /// weeks, the host timezone, reflections off and no custom prompts.
    pub fn set_settings(&mut self, patch: SettingsPatch) -> &UserSettings {
        let now = Utc::now();

        if let Some(tz) = &patch.timezone {
            if calendar::resolve_timezone(tz).is_err() {
                warn!(timezone = %tz, "unknown timezone in settings, weeks will use UTC");
            }
        }

        let merged = UserSettings {
            user_id: patch.user_id,
            week_start_day: patch.week_start_day.unwrap_or_default(),
            timezone: patch.timezone.unwrap_or_else(calendar::detect_timezone),
            reflection_enabled: patch.reflection_enabled.unwrap_or(false),
            reflection_prompts: patch.reflection_prompts.unwrap_or_default(),
            created_at: patch.created_at.unwrap_or(now),
            updated_at: now,
        };
        debug!(user = %merged.user_id, timezone = %merged.timezone, "settings updated");
        self.settings.insert(merged)
    }

    /// Current settings, or freshly created defaults for `user_id`.
    pub fn ensure_settings(&mut self, user_id: &str) -> UserSettings {
        if let Some(existing) = &self.settings {
            return existing.clone();
        }
        self.set_settings(SettingsPatch::new(user_id)).clone()
    }

    /// Prompts for the weekly reflection: the settings' list when it has
    /// any, otherwise `fallback`.
    pub fn active_prompts(&self, fallback: &[String]) -> Vec<String> {
        match &self.settings {
            Some(settings) if !settings.reflection_prompts.is_empty() => {
                settings.reflection_prompts.clone()
            }
            _ => fallback.to_vec(),
        }
    }
}
