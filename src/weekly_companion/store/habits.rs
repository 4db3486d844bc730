use super::{AppStore, MirrorOp};
use crate::cloud::{CloudRecord, Table};
use crate::model::{Habit, HabitStatus, StatusFilter, DEFAULT_INCREMENT, DEFAULT_UNIT};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// Input for [`AppStore::add_habit`]. The name should already be trimmed and
/// non-empty; the store keeps it as given.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub user_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub weekly_goal: Option<u32>,
    pub unit: Option<String>,
    pub default_increment: Option<f64>,
}

impl NewHabit {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            icon: None,
            weekly_goal: None,
            unit: None,
            default_increment: None,
        }
    }
}

/// What [`AppStore::delete_habit`] removed locally.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitRemoval {
    pub habit: Option<Habit>,
    pub logs_removed: usize,
}

impl AppStore {
    pub fn add_habit(&mut self, input: NewHabit) -> Habit {
        let now = Utc::now();
        let habit = Habit {
            id: self.next_id(),
            user_id: input.user_id,
            name: input.name,
            icon: input.icon,
            weekly_goal: input.weekly_goal,
            unit: input.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            default_increment: input.default_increment.unwrap_or(DEFAULT_INCREMENT),
            status: HabitStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.habits.push(habit.clone());
        info!(habit = %habit.id, name = %habit.name, "habit added");

        if self.owned_by_signed_in(&habit.user_id) {
            self.spawn_mirror(MirrorOp::Insert(CloudRecord::Habit(habit.clone())));
        }
        habit
    }

    /// Replace the stored habit with the same id, refreshing `updated_at`.
    /// Unknown ids change nothing and return `None`.
    pub fn update_habit(&mut self, habit: Habit) -> Option<Habit> {
        let Some(slot) = self.habits.iter_mut().find(|h| h.id == habit.id) else {
            debug!(habit = %habit.id, "update for unknown habit ignored");
            return None;
        };
        let merged = Habit {
            updated_at: Utc::now(),
            ..habit
        };
        *slot = merged.clone();

        if self.owned_by_signed_in(&merged.user_id) {
            self.spawn_mirror(MirrorOp::Update(CloudRecord::Habit(merged.clone())));
        }
        Some(merged)
    }

    /// Pause, resume or archive. Goes through [`AppStore::update_habit`].
    pub fn set_habit_status(&mut self, id: Uuid, status: HabitStatus) -> Option<Habit> {
        let habit = self.habit(id)?.clone();
        self.update_habit(Habit { status, ..habit })
    }

    /// Remove the habit and every log that belongs to it.
    pub fn delete_habit(&mut self, id: Uuid) -> HabitRemoval {
        let position = self.habits.iter().position(|h| h.id == id);
        let habit = position.map(|index| self.habits.remove(index));

        let before = self.logs.len();
        self.logs.retain(|log| log.habit_id != id);
        let logs_removed = before - self.logs.len();
        info!(habit = %id, logs_removed, "habit deleted");

        if self.signed_in() {
            self.spawn_mirror(MirrorOp::Delete(Table::Habits, id));
        }
        HabitRemoval {
            habit,
            logs_removed,
        }
    }

    pub fn habit(&self, id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn habits_by_status(&self, filter: StatusFilter) -> Vec<&Habit> {
        self.habits
            .iter()
            .filter(|h| filter.matches(h.status))
            .collect()
    }

    /// Wholesale replacement, used when pulling from the cloud.
    pub fn set_habits(&mut self, habits: Vec<Habit>) {
        self.habits = habits;
    }
}
