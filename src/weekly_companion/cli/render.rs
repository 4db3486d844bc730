//! Terminal output. Layout (widths, padding, bars) is computed here and
//! returned as strings so it can be tested; `commands.rs` does the printing.

use chrono::{DateTime, Utc};
use colored::Colorize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use weekly_companion::calendar::WeekRange;
use weekly_companion::model::{Habit, HabitStatus, UserSettings, WeeklyReflection};
use weekly_companion::progress::{format_amount, HabitProgress, MonthlySummary};

const NAME_WIDTH: usize = 28;
const BAR_WIDTH: usize = 20;
const DEFAULT_ICON: &str = "•";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Message {
    pub level: MessageLevel,
    pub content: String,
}

impl Message {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

pub(super) fn print_messages(messages: &[Message]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

/// Numbered habit list. `entries` pairs each habit with its 1-based number in
/// the full list, so numbers stay stable under filtering.
pub(super) fn render_habit_list(entries: &[(usize, &Habit)], now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return "No habits yet. Add one with `weekly habit add <name>`.\n".to_string();
    }

    let mut out = String::new();
    for (number, habit) in entries {
        let idx = format!("{:>3}. ", number);
        let icon = habit.icon.as_deref().unwrap_or(DEFAULT_ICON);
        let name = pad_to_width(&format!("{} {}", icon, habit.name), NAME_WIDTH);
        let goal = match habit.weekly_goal {
            Some(goal) => format!("{} {}/week", goal, habit.unit),
            None => format!("count only ({})", habit.unit),
        };
        let status = match habit.status {
            HabitStatus::Active => habit.status.as_str().green(),
            HabitStatus::Paused => habit.status.as_str().yellow(),
            HabitStatus::Archived => habit.status.as_str().dimmed(),
        };
        out.push_str(&format!(
            "{}{} {:<9} {:<22} {}\n",
            idx.yellow(),
            name,
            status,
            goal,
            format_time_ago(habit.created_at, now).dimmed()
        ));
    }
    out
}

pub(super) fn render_week(range: WeekRange, cards: &[HabitProgress], is_current: bool) -> String {
    let mut out = String::new();
    let label = if is_current { " (this week)" } else { "" };
    out.push_str(&format!("{}{}\n\n", format!("Week of {}", range).bold(), label));

    if cards.is_empty() {
        out.push_str("Nothing to track this week.\n");
        return out;
    }

    for card in cards {
        let icon = card.icon.as_deref().unwrap_or(DEFAULT_ICON);
        let name = pad_to_width(&format!("{} {}", icon, card.name), NAME_WIDTH);
        let dots: String = card
            .week_dots
            .iter()
            .map(|&hit| if hit { '●' } else { '○' })
            .collect();
        let bar = match card.goal {
            Some(_) => format!("{} {:>3}%", progress_bar(card.percent), card.percent),
            None => " ".repeat(BAR_WIDTH + 7),
        };
        let mut line = format!("{} {}  {}  {}", name, bar, dots, card.text);
        if card.status == HabitStatus::Paused {
            line = format!("{}  {}", line.dimmed(), "(paused)".yellow());
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub(super) fn render_month(summary: &MonthlySummary) -> String {
    let mut out = format!(
        "{}\n{} logs this month\n",
        summary.month.bold(),
        summary.log_count
    );
    if summary.totals.is_empty() {
        out.push_str("No logs yet this month.\n");
        return out;
    }
    out.push('\n');
    for total in &summary.totals {
        let name = total.name.as_deref().unwrap_or("Habit");
        let unit = total.unit.as_deref().unwrap_or("entries");
        out.push_str(&format!(
            "  {} {} {}\n",
            pad_to_width(name, NAME_WIDTH),
            format_amount(total.total),
            unit
        ));
    }
    out
}

pub(super) fn render_reflection(
    week_start: chrono::NaiveDate,
    prompts: &[String],
    reflection: Option<&WeeklyReflection>,
) -> String {
    let mut out = format!("{}\n", format!("Reflection for the week of {}", week_start).bold());
    for prompt in prompts {
        let answer = reflection
            .and_then(|r| r.answers.iter().find(|a| &a.prompt == prompt))
            .map(|a| a.answer.as_str())
            .filter(|a| !a.is_empty());
        out.push_str(&format!("\n{}\n", prompt.cyan()));
        match answer {
            Some(answer) => out.push_str(&format!("  {}\n", answer)),
            None => out.push_str(&format!("  {}\n", "(no answer yet)".dimmed())),
        }
    }
    out
}

pub(super) fn render_settings(settings: &UserSettings) -> String {
    let reflections = if settings.reflection_enabled {
        "on"
    } else {
        "off"
    };
    let prompts = if settings.reflection_prompts.is_empty() {
        "(defaults)".to_string()
    } else {
        settings.reflection_prompts.join(" | ")
    };
    format!(
        "{:<12} {}\n{:<12} {}\n{:<12} {}\n{:<12} {}\n{:<12} {}\n",
        "user",
        settings.user_id,
        "timezone",
        settings.timezone,
        "week start",
        settings.week_start_day,
        "reflections",
        reflections,
        "prompts",
        prompts
    )
}

fn progress_bar(percent: u8) -> String {
    let filled = (usize::from(percent) * BAR_WIDTH + 50) / 100;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{}{}",
        "█".repeat(filled).green(),
        "░".repeat(BAR_WIDTH - filled).dimmed()
    )
}

/// Truncate or pad `s` to exactly `width` columns.
fn pad_to_width(s: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current = 0;
    let truncate = s.width() > width;

    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if truncate && current + w > width.saturating_sub(1) {
            result.push('…');
            current += 1;
            break;
        }
        result.push(c);
        current += w;
    }
    result.push_str(&" ".repeat(width.saturating_sub(current)));
    result
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}
