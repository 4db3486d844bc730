//! # CLI Layer
//!
//! The only place that parses arguments, prints, and decides exit codes.
//!
//! Every invocation loads the state envelope from the data directory, runs one
//! store operation, and writes the envelope back when something changed. The
//! binary never configures a cloud, so it always works in guest mode with the
//! identity from `config.json`.
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_context()`: Resolves the data dir, loads config and state
//! - `handle_*()`: Per-command handlers that call the store and print

use super::render::{
    print_messages, render_habit_list, render_month, render_reflection, render_settings,
    render_week, Message,
};
use super::setup::{Cli, Commands, HabitCommands, Toggle};
use chrono::{DateTime, Utc};
use clap::Parser;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;
use weekly_companion::calendar::{self, WeekStartDay};
use weekly_companion::config::CompanionConfig;
use weekly_companion::error::{CompanionError, Result};
use weekly_companion::model::{HabitStatus, ReflectionAnswer, StatusFilter, SCHEMA_VERSION};
use weekly_companion::persistence::export::{export_to_file, import_from_file};
use weekly_companion::persistence::kv::FileKv;
use weekly_companion::persistence::local::LocalAdapter;
use weekly_companion::progress::format_amount;
use weekly_companion::store::{AppStore, NewHabit, NewLog, SettingsPatch, StoreOptions, UndoLog};

struct AppContext {
    store: AppStore,
    local: LocalAdapter<FileKv>,
    config: CompanionConfig,
}

impl AppContext {
    /// Owner for new records: the settings' user, else the configured one.
    fn user_id(&self) -> String {
        self.store
            .settings()
            .map(|s| s.user_id.clone())
            .unwrap_or_else(|| self.config.user_id.clone())
    }

    fn save(&self) -> Result<()> {
        self.local.save(&self.store.snapshot())
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut ctx = init_context(&cli)?;

    let result = match cli.command {
        Some(Commands::Habit(cmd)) => match cmd {
            HabitCommands::Add {
                name,
                goal,
                unit,
                increment,
                icon,
            } => handle_habit_add(&mut ctx, name.join(" "), goal, unit, increment, icon),
            HabitCommands::List { status } => handle_habit_list(&ctx, status),
            HabitCommands::Pause { habit } => handle_status(&mut ctx, &habit, HabitStatus::Paused),
            HabitCommands::Resume { habit } => {
                handle_status(&mut ctx, &habit, HabitStatus::Active)
            }
            HabitCommands::Archive { habit } => {
                handle_status(&mut ctx, &habit, HabitStatus::Archived)
            }
            HabitCommands::Delete { habit } => handle_habit_delete(&mut ctx, &habit),
        },
        Some(Commands::Log {
            habit,
            amount,
            note,
            at,
        }) => handle_log(&mut ctx, &habit, amount, note, at),
        Some(Commands::Undo { log_id }) => handle_undo(&mut ctx, log_id),
        Some(Commands::Week { offset }) => handle_week(&mut ctx, offset),
        Some(Commands::Month) => handle_month(&ctx),
        Some(Commands::Reflect { answer, offset }) => handle_reflect(&mut ctx, answer, offset),
        Some(Commands::Settings {
            timezone,
            week_start,
            reflections,
        }) => handle_settings(&mut ctx, timezone, week_start, reflections),
        Some(Commands::Export { path }) => handle_export(&ctx, &path),
        Some(Commands::Import { path }) => handle_import(&mut ctx, &path),
        None => handle_week(&mut ctx, 0),
    };

    let flushed = ctx.store.flush_mirrors().await;
    debug!(flushed, "pending cloud mirrors flushed");
    result
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = resolve_data_dir(cli)?;
    debug!(data_dir = %data_dir.display(), "using data directory");

    let config = CompanionConfig::load(&data_dir)?;
    let local = LocalAdapter::with_key(FileKv::new(&data_dir), config.storage_key.clone());
    if let Some(version) = local
        .stored_schema_version()
        .filter(|v| *v > SCHEMA_VERSION)
    {
        return Err(CompanionError::Store(format!(
            "Data in {} was written by a newer version (schema {}); upgrade weekly to use it",
            data_dir.display(),
            version
        )));
    }
    let initial = local.load().unwrap_or_default();

    let mut store = AppStore::new(StoreOptions::default().with_state(initial));
    store.ensure_settings(&config.user_id);

    Ok(AppContext {
        store,
        local,
        config,
    })
}

fn resolve_data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    ProjectDirs::from("com", "weekly-companion", "weekly")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| CompanionError::Store("Could not determine a data directory".into()))
}

/// A habit by 1-based list number, or by exact name.
fn resolve_habit(store: &AppStore, selector: &str) -> Result<Uuid> {
    let habits = store.habits();
    if let Ok(number) = selector.trim().parse::<usize>() {
        if let Some(habit) = number.checked_sub(1).and_then(|i| habits.get(i)) {
            return Ok(habit.id);
        }
    }
    habits
        .iter()
        .find(|h| h.name == selector)
        .map(|h| h.id)
        .ok_or_else(|| CompanionError::Api(format!("No habit matches '{}'", selector)))
}

/// Now, moved by whole weeks.
fn reference_instant(store: &mut AppStore, week_offset: i64) -> DateTime<Utc> {
    store.set_selected_date(Utc::now());
    store.shift_selected_week(week_offset);
    store.selected_date()
}

fn handle_habit_add(
    ctx: &mut AppContext,
    name: String,
    goal: Option<u32>,
    unit: Option<String>,
    increment: Option<f64>,
    icon: Option<String>,
) -> Result<()> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(CompanionError::Api("Habit name cannot be empty".into()));
    }
    if goal == Some(0) {
        return Err(CompanionError::Api("Weekly goal must be at least 1".into()));
    }
    if increment.is_some_and(|i| !i.is_finite() || i <= 0.0) {
        return Err(CompanionError::Api("Increment must be a positive number".into()));
    }

    let input = NewHabit {
        icon,
        weekly_goal: goal,
        unit: unit.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
        default_increment: increment,
        ..NewHabit::new(ctx.user_id(), name)
    };
    let habit = ctx.store.add_habit(input);
    ctx.save()?;

    let number = ctx.store.habits().len();
    print_messages(&[Message::success(format!(
        "Added habit {}. {}",
        number, habit.name
    ))]);
    Ok(())
}

fn handle_habit_list(ctx: &AppContext, status: StatusFilter) -> Result<()> {
    let entries: Vec<_> = ctx
        .store
        .habits()
        .iter()
        .enumerate()
        .filter(|(_, h)| status.matches(h.status))
        .map(|(i, h)| (i + 1, h))
        .collect();
    print!("{}", render_habit_list(&entries, Utc::now()));
    Ok(())
}

fn handle_status(ctx: &mut AppContext, selector: &str, status: HabitStatus) -> Result<()> {
    let id = resolve_habit(&ctx.store, selector)?;
    let habit = ctx
        .store
        .set_habit_status(id, status)
        .ok_or(CompanionError::HabitNotFound(id))?;
    ctx.save()?;

    let verb = match status {
        HabitStatus::Active => "Resumed",
        HabitStatus::Paused => "Paused",
        HabitStatus::Archived => "Archived",
    };
    print_messages(&[Message::success(format!("{} '{}'", verb, habit.name))]);
    Ok(())
}

fn handle_habit_delete(ctx: &mut AppContext, selector: &str) -> Result<()> {
    let id = resolve_habit(&ctx.store, selector)?;
    let removal = ctx.store.delete_habit(id);
    let habit = removal.habit.ok_or(CompanionError::HabitNotFound(id))?;
    ctx.save()?;

    print_messages(&[Message::success(format!(
        "Deleted '{}' and {} log(s)",
        habit.name, removal.logs_removed
    ))]);
    Ok(())
}

fn handle_log(
    ctx: &mut AppContext,
    selector: &str,
    amount: Option<f64>,
    note: Option<String>,
    at: Option<DateTime<Utc>>,
) -> Result<()> {
    let id = resolve_habit(&ctx.store, selector)?;
    let habit = ctx
        .store
        .habit(id)
        .cloned()
        .ok_or(CompanionError::HabitNotFound(id))?;
    if !habit.accepts_progress() {
        return Err(CompanionError::Api(format!(
            "'{}' is {}; resume it before logging",
            habit.name, habit.status
        )));
    }
    let amount = amount.unwrap_or(habit.default_increment);
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CompanionError::Api("Amount must be a positive number".into()));
    }

    let input = NewLog {
        note: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        timestamp: at,
        ..NewLog::new(id, ctx.user_id(), amount)
    };
    let logged = ctx.store.add_log_with_undo(input);
    ctx.save()?;

    let mut messages = vec![Message::success(format!(
        "Logged {} {} of {} on {}",
        format_amount(logged.log.amount),
        habit.unit,
        habit.name,
        logged.log.target_date
    ))];
    if let Some(progress) = ctx.store.habit_progress(id, Some(logged.log.timestamp)) {
        messages.push(Message::info(format!("This week: {}", progress.text)));
    }
    messages.push(Message::info(format!(
        "Undo with `weekly undo {}`",
        logged.undo.log_id()
    )));
    print_messages(&messages);
    Ok(())
}

fn handle_undo(ctx: &mut AppContext, log_id: Option<Uuid>) -> Result<()> {
    let target = match log_id {
        Some(id) => id,
        None => ctx
            .store
            .logs()
            .last()
            .map(|log| log.id)
            .ok_or_else(|| CompanionError::Api("Nothing to undo".into()))?,
    };
    let log = ctx
        .store
        .log(target)
        .cloned()
        .ok_or(CompanionError::LogNotFound(target))?;

    if !UndoLog::for_log(target).undo(&mut ctx.store) {
        return Err(CompanionError::LogNotFound(target));
    }
    ctx.save()?;

    let name = ctx
        .store
        .habit(log.habit_id)
        .map(|h| h.name.clone())
        .unwrap_or_else(|| "habit".to_string());
    print_messages(&[Message::success(format!(
        "Removed {} from {} on {}",
        format_amount(log.amount),
        name,
        log.target_date
    ))]);
    Ok(())
}

fn handle_week(ctx: &mut AppContext, offset: i64) -> Result<()> {
    let reference = reference_instant(&mut ctx.store, offset);
    let range = ctx.store.visible_week();
    let cards = ctx.store.dashboard(Some(reference));
    print!("{}", render_week(range, &cards, offset == 0));

    let reflections_on = ctx
        .store
        .settings()
        .is_some_and(|s| s.reflection_enabled);
    if reflections_on && offset == 0 && ctx.store.reflection_for_week(range.start).is_none() {
        println!();
        print_messages(&[Message::info("Reflect on your week with `weekly reflect`")]);
    }
    Ok(())
}

fn handle_month(ctx: &AppContext) -> Result<()> {
    print!("{}", render_month(&ctx.store.monthly_summary(None)));
    Ok(())
}

fn handle_reflect(ctx: &mut AppContext, answers: Vec<String>, offset: i64) -> Result<()> {
    let reference = reference_instant(&mut ctx.store, offset);
    let week = ctx.store.week_range(Some(reference));
    let prompts = ctx.store.active_prompts(&ctx.config.reflection_prompts);

    if !answers.is_empty() {
        if answers.len() > prompts.len() {
            return Err(CompanionError::Api(format!(
                "{} answers given but there are only {} prompts",
                answers.len(),
                prompts.len()
            )));
        }
        // Prompts without a new answer keep what was saved before
        let previous = ctx.store.reflection_for_week(week.start).cloned();
        let merged: Vec<ReflectionAnswer> = prompts
            .iter()
            .enumerate()
            .map(|(i, prompt)| {
                let answer = answers.get(i).cloned().unwrap_or_else(|| {
                    previous
                        .as_ref()
                        .and_then(|r| r.answers.iter().find(|a| &a.prompt == prompt))
                        .map(|a| a.answer.clone())
                        .unwrap_or_default()
                });
                ReflectionAnswer::new(prompt.clone(), answer.trim())
            })
            .collect();

        let user_id = ctx.user_id();
        ctx.store
            .save_week_reflection(&user_id, merged, Some(reference));
        ctx.save()?;
        print_messages(&[Message::success(format!(
            "Saved reflection for the week of {}",
            week.start
        ))]);
        println!();
    }

    print!(
        "{}",
        render_reflection(
            week.start,
            &prompts,
            ctx.store.reflection_for_week(week.start)
        )
    );
    Ok(())
}

fn handle_settings(
    ctx: &mut AppContext,
    timezone: Option<String>,
    week_start: Option<WeekStartDay>,
    reflections: Option<Toggle>,
) -> Result<()> {
    let current = ctx.store.ensure_settings(&ctx.config.user_id);

    if timezone.is_none() && week_start.is_none() && reflections.is_none() {
        print!("{}", render_settings(&current));
        return Ok(());
    }

    let mut patch = SettingsPatch::from_settings(&current);
    if let Some(tz) = timezone {
        calendar::resolve_timezone(&tz)?;
        patch.timezone = Some(tz.trim().to_string());
    }
    if let Some(day) = week_start {
        patch.week_start_day = Some(day);
    }
    if let Some(toggle) = reflections {
        patch.reflection_enabled = Some(toggle.enabled());
    }

    let updated = ctx.store.set_settings(patch).clone();
    ctx.save()?;
    print_messages(&[Message::success("Settings saved")]);
    print!("{}", render_settings(&updated));
    Ok(())
}

fn handle_export(ctx: &AppContext, path: &Path) -> Result<()> {
    let snapshot = ctx.store.snapshot();
    export_to_file(&snapshot, path)?;
    print_messages(&[Message::success(format!(
        "Exported {} habit(s), {} log(s) and {} reflection(s) to {}",
        snapshot.habits.len(),
        snapshot.logs.len(),
        snapshot.reflections.len(),
        path.display()
    ))]);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, path: &Path) -> Result<()> {
    let state = import_from_file(path)?;
    let (habits, logs) = (state.habits.len(), state.logs.len());
    let had_settings = state.settings.is_some();

    ctx.store.replace_state(state);
    ctx.save()?;

    let mut messages = vec![Message::success(format!(
        "Imported {} habit(s) and {} log(s) from {}",
        habits,
        logs,
        path.display()
    ))];
    if !had_settings {
        messages.push(Message::warning(
            "The file had no settings; defaults will be used",
        ));
    }
    print_messages(&messages);
    Ok(())
}
