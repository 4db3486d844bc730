//! Derived views over the store: per-habit weekly progress for the dashboard
//! and the per-month totals.

use crate::calendar;
use crate::model::HabitStatus;
use crate::store::AppStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitProgress {
    pub habit_id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub status: HabitStatus,
    pub count: f64,
    pub goal: Option<u32>,
    pub percent: u8,
    pub text: String,
    /// One flag per day of the week, true when anything was logged that day.
    pub week_dots: [bool; 7],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitTotal {
    pub habit_id: Uuid,
    /// `None` when the habit no longer exists.
    pub name: Option<String>,
    pub unit: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub log_count: usize,
    /// In order of first appearance in the log.
    pub totals: Vec<HabitTotal>,
}

/// Amounts print without a fractional part when they're whole.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

pub fn progress_text(count: f64, goal: Option<u32>, unit: &str) -> String {
    match goal {
        Some(goal) => format!("{} / {} {}", format_amount(count), goal, unit),
        None => format!("{} entries", format_amount(count)),
    }
}

pub fn progress_percent(count: f64, goal: Option<u32>) -> u8 {
    match goal {
        Some(goal) if goal > 0 => {
            let pct = (count / f64::from(goal) * 100.0).round();
            pct.clamp(0.0, 100.0) as u8
        }
        _ => 0,
    }
}

impl AppStore {
    pub fn habit_progress(
        &self,
        habit_id: Uuid,
        reference: Option<DateTime<Utc>>,
    ) -> Option<HabitProgress> {
        let habit = self.habit(habit_id)?;
        let reference = reference.unwrap_or_else(Utc::now);
        let week = self.week_range(Some(reference));
        let count = self.weekly_progress(habit_id, Some(reference));

        let logged = self.logs_in_week(habit_id, Some(reference));
        let week_dots = week
            .days()
            .map(|day| logged.iter().any(|log| log.target_date == day));

        Some(HabitProgress {
            habit_id,
            name: habit.name.clone(),
            icon: habit.icon.clone(),
            status: habit.status,
            count,
            goal: habit.weekly_goal,
            percent: progress_percent(count, habit.weekly_goal),
            text: progress_text(count, habit.weekly_goal, &habit.unit),
            week_dots,
        })
    }

    /// Progress cards for every habit that isn't archived.
    pub fn dashboard(&self, reference: Option<DateTime<Utc>>) -> Vec<HabitProgress> {
        let reference = reference.unwrap_or_else(Utc::now);
        self.habits()
            .iter()
            .filter(|h| h.status != HabitStatus::Archived)
            .filter_map(|h| self.habit_progress(h.id, Some(reference)))
            .collect()
    }

    /// Totals for the month holding `reference` in the store's timezone.
    pub fn monthly_summary(&self, reference: Option<DateTime<Utc>>) -> MonthlySummary {
        let reference = reference.unwrap_or_else(Utc::now);
        let month = calendar::month_prefix(calendar::target_date(reference, self.timezone()));

        let mut log_count = 0;
        let mut totals: Vec<HabitTotal> = Vec::new();
        for log in self
            .logs()
            .iter()
            .filter(|log| calendar::month_prefix(log.target_date) == month)
        {
            log_count += 1;
            match totals.iter_mut().find(|t| t.habit_id == log.habit_id) {
                Some(total) => total.total += log.amount,
                None => {
                    let habit = self.habit(log.habit_id);
                    totals.push(HabitTotal {
                        habit_id: log.habit_id,
                        name: habit.map(|h| h.name.clone()),
                        unit: habit.map(|h| h.unit.clone()),
                        total: log.amount,
                    });
                }
            }
        }

        MonthlySummary {
            month,
            log_count,
            totals,
        }
    }
}
