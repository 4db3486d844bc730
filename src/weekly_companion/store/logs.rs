use super::{AppStore, MirrorOp};
use crate::calendar;
use crate::cloud::{CloudRecord, Table};
use crate::model::LogEntry;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct NewLog {
    pub habit_id: Uuid,
    pub user_id: String,
    pub amount: f64,
    pub note: Option<String>,
    /// When the progress happened. Defaults to now; set it for backfills.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewLog {
    pub fn new(habit_id: Uuid, user_id: impl Into<String>, amount: f64) -> Self {
        Self {
            habit_id,
            user_id: user_id.into(),
            amount,
            note: None,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Handle that removes one log again.
///
/// Undoing is idempotent: once the log is gone (undone, deleted or replaced
/// by a sync) further calls do nothing and return `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoLog {
    log_id: Uuid,
}

impl UndoLog {
    /// A handle for a log created earlier, e.g. in another session.
    pub fn for_log(log_id: Uuid) -> Self {
        Self { log_id }
    }

    pub fn log_id(&self) -> Uuid {
        self.log_id
    }

    pub fn undo(&self, store: &mut AppStore) -> bool {
        store.delete_log(self.log_id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedWithUndo {
    pub log: LogEntry,
    pub undo: UndoLog,
}

impl AppStore {
    /// Record progress. `target_date` is fixed now, from the timestamp in the
    /// current timezone, and `created_at` is the same instant.
    pub fn add_log(&mut self, input: NewLog) -> LogEntry {
        let timestamp = input.timestamp.unwrap_or_else(Utc::now);
        let log = LogEntry {
            id: self.next_id(),
            habit_id: input.habit_id,
            user_id: input.user_id,
            timestamp,
            target_date: calendar::target_date(timestamp, self.timezone()),
            amount: input.amount,
            note: input.note,
            created_at: timestamp,
        };
        self.logs.push(log.clone());
        info!(log = %log.id, habit = %log.habit_id, amount = log.amount, date = %log.target_date, "progress logged");

        if self.owned_by_signed_in(&log.user_id) {
            self.spawn_mirror(MirrorOp::Insert(CloudRecord::Log(log.clone())));
        }
        log
    }

    pub fn add_log_with_undo(&mut self, input: NewLog) -> LoggedWithUndo {
        let log = self.add_log(input);
        let undo = UndoLog { log_id: log.id };
        LoggedWithUndo { log, undo }
    }

    /// Remove a log. Returns the removed entry, or `None` for unknown ids.
    pub fn delete_log(&mut self, id: Uuid) -> Option<LogEntry> {
        let removed = self
            .logs
            .iter()
            .position(|log| log.id == id)
            .map(|index| self.logs.remove(index));
        match &removed {
            Some(_) => info!(log = %id, "log deleted"),
            None => debug!(log = %id, "delete for unknown log"),
        }

        if self.signed_in() {
            self.spawn_mirror(MirrorOp::Delete(Table::Logs, id));
        }
        removed
    }

    pub fn log(&self, id: Uuid) -> Option<&LogEntry> {
        self.logs.iter().find(|log| log.id == id)
    }

    /// Logs for one habit, in insertion order.
    pub fn logs_for_habit(&self, habit_id: Uuid) -> Vec<&LogEntry> {
        self.logs
            .iter()
            .filter(|log| log.habit_id == habit_id)
            .collect()
    }

    /// Wholesale replacement, used when pulling from the cloud.
    pub fn set_logs(&mut self, logs: Vec<LogEntry>) {
        self.logs = logs;
    }
}
