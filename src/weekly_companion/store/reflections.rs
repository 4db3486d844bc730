use super::AppStore;
use crate::model::{ReflectionAnswer, WeeklyReflection};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct NewReflection {
    pub user_id: String,
    pub week_start_date: NaiveDate,
    pub answers: Vec<ReflectionAnswer>,
}

// Reflections are local only; the cloud mirror carries habits and logs.
impl AppStore {
    pub fn add_reflection(&mut self, input: NewReflection) -> WeeklyReflection {
        let now = Utc::now();
        let reflection = WeeklyReflection {
            id: self.next_id(),
            user_id: input.user_id,
            week_start_date: input.week_start_date,
            answers: input.answers,
            created_at: now,
            updated_at: now,
        };
        info!(reflection = %reflection.id, week = %reflection.week_start_date, "reflection added");
        self.reflections.push(reflection.clone());
        reflection
    }

    /// Replace the answers of an existing reflection. Unknown ids return `None`.
    pub fn update_reflection(
        &mut self,
        id: Uuid,
        answers: Vec<ReflectionAnswer>,
    ) -> Option<WeeklyReflection> {
        let Some(reflection) = self.reflections.iter_mut().find(|r| r.id == id) else {
            debug!(reflection = %id, "update for unknown reflection ignored");
            return None;
        };
        reflection.answers = answers;
        reflection.updated_at = Utc::now();
        Some(reflection.clone())
    }

    pub fn reflection_for_week(&self, week_start: NaiveDate) -> Option<&WeeklyReflection> {
        self.reflections
            .iter()
            .find(|r| r.week_start_date == week_start)
    }

    /// Save answers for the week containing `reference` (default: now),
    /// updating that week's reflection if there is one.
    pub fn save_week_reflection(
        &mut self,
        user_id: &str,
        answers: Vec<ReflectionAnswer>,
        reference: Option<DateTime<Utc>>,
    ) -> WeeklyReflection {
        let week = self.week_range(reference);
        let existing = self.reflection_for_week(week.start).map(|r| r.id);
        match existing.and_then(|id| self.update_reflection(id, answers.clone())) {
            Some(updated) => updated,
            None => self.add_reflection(NewReflection {
                user_id: user_id.to_string(),
                week_start_date: week.start,
                answers,
            }),
        }
    }
}
