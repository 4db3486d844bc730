use super::AppStore;
use crate::model::{HabitStatus, LogEntry};
use chrono::{DateTime, Utc};
use uuid::Uuid;

impl AppStore {
    /// Logs of `habit_id` whose target date falls in the week of `reference`.
    pub fn logs_in_week(
        &self,
        habit_id: Uuid,
        reference: Option<DateTime<Utc>>,
    ) -> Vec<&LogEntry> {
        let week = self.week_range(reference);
        self.logs
            .iter()
            .filter(|log| log.habit_id == habit_id && week.contains(log.target_date))
            .collect()
    }

    /// Sum of logged amounts for the week of `reference`. Paused habits
    /// always report 0; archived ones are counted normally.
    pub fn weekly_progress(&self, habit_id: Uuid, reference: Option<DateTime<Utc>>) -> f64 {
        if self
            .habit(habit_id)
            .is_some_and(|h| h.status == HabitStatus::Paused)
        {
            return 0.0;
        }
        self.logs_in_week(habit_id, reference)
            .iter()
            .map(|log| log.amount)
            .sum()
    }
}
