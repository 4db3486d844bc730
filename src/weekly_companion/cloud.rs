//! # Cloud Sync Collaborator
//!
//! The remote, account-scoped mirror of habits and logs. The store only ever
//! talks to it through [`CloudSync`]:
//!
//! - **Mutations** (`insert`, `update`, `delete`, `upsert`) are pushed
//!   fire-and-forget from the store. Their outcome is logged and otherwise
//!   ignored; local state is already committed.
//! - **Reads** (`select_habits`, `select_logs`) are used by
//!   `AppStore::sync_from_cloud` to pull a full snapshot on sign-in.
//!
//! Every call is scoped to the signed-in account. The store never calls the
//! collaborator while nobody is signed in.
//!
//! [`MemoryCloud`] is an in-process implementation with failure injection,
//! used by tests and by single-process setups that want a mirror without a
//! network.

use crate::model::{Habit, LogEntry};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudUser {
    pub id: String,
    pub email: Option<String>,
}

impl CloudUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Habits,
    Logs,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Habits => "habits",
            Table::Logs => "logs",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CloudRecord {
    Habit(Habit),
    Log(LogEntry),
}

impl CloudRecord {
    pub fn table(&self) -> Table {
        match self {
            CloudRecord::Habit(_) => Table::Habits,
            CloudRecord::Log(_) => Table::Logs,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            CloudRecord::Habit(h) => h.id,
            CloudRecord::Log(l) => l.id,
        }
    }
}

/// Conflict handling for [`CloudSync::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOptions {
    pub on_conflict: String,
    /// Keep the remote row when the key already exists.
    pub ignore_duplicates: bool,
}

impl Default for UpsertOptions {
    fn default() -> Self {
        Self {
            on_conflict: "id".to_string(),
            ignore_duplicates: true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    #[error("cloud unavailable: {0}")]
    Unavailable(String),

    #[error("{table}: duplicate key {id}")]
    Conflict { table: Table, id: Uuid },

    #[error("{table}: request rejected: {message}")]
    Rejected { table: Table, message: String },

    #[error("{table}: {records} records do not belong to this table")]
    MixedBatch { table: Table, records: usize },
}

#[async_trait]
pub trait CloudSync: Send + Sync {
    async fn insert(&self, record: CloudRecord) -> Result<(), CloudError>;

    async fn update(&self, record: CloudRecord, match_id: Uuid) -> Result<(), CloudError>;

    async fn delete(&self, table: Table, match_id: Uuid) -> Result<(), CloudError>;

    async fn select_habits(&self, user_id: &str) -> Result<Vec<Habit>, CloudError>;

    async fn select_logs(&self, user_id: &str) -> Result<Vec<LogEntry>, CloudError>;

    /// Batched insert-or-update. Every record must belong to `table`.
    async fn upsert(
        &self,
        table: Table,
        records: Vec<CloudRecord>,
        options: UpsertOptions,
    ) -> Result<(), CloudError>;
}

#[derive(Default)]
struct Tables {
    habits: Vec<Habit>,
    logs: Vec<LogEntry>,
}

/// In-process cloud mirror.
///
/// Rows keep insertion order. Failures can be injected per table to exercise
/// the store's log-and-continue paths.
#[derive(Default)]
pub struct MemoryCloud {
    tables: Mutex<Tables>,
    failing: Mutex<HashSet<Table>>,
    calls: AtomicUsize,
}

impl MemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call touching `table` fail until [`MemoryCloud::heal`] is called.
    pub fn fail_table(&self, table: Table) {
        self.lock_failing().insert(table);
    }

    pub fn heal(&self) {
        self.lock_failing().clear();
    }

    /// Number of calls received so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.lock_tables().habits.clone()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.lock_tables().logs.clone()
    }

    /// Seed rows directly, bypassing call counting and failure injection.
    pub fn seed(&self, habits: Vec<Habit>, logs: Vec<LogEntry>) {
        let mut tables = self.lock_tables();
        tables.habits.extend(habits);
        tables.logs.extend(logs);
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_failing(&self) -> std::sync::MutexGuard<'_, HashSet<Table>> {
        self.failing.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self, table: Table) -> Result<(), CloudError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.lock_failing().contains(&table) {
            return Err(CloudError::Unavailable(format!(
                "{} table is unreachable",
                table
            )));
        }
        Ok(())
    }

    fn put(tables: &mut Tables, record: CloudRecord, replace: bool) -> bool {
        match record {
            CloudRecord::Habit(habit) => upsert_row(&mut tables.habits, habit, |h| h.id, replace),
            CloudRecord::Log(log) => upsert_row(&mut tables.logs, log, |l| l.id, replace),
        }
    }
}

/// Returns false when the key existed and `replace` was off.
fn upsert_row<T>(rows: &mut Vec<T>, row: T, key: impl Fn(&T) -> Uuid, replace: bool) -> bool {
    let id = key(&row);
    match rows.iter_mut().find(|r| key(r) == id) {
        Some(existing) if replace => {
            *existing = row;
            true
        }
        Some(_) => false,
        None => {
            rows.push(row);
            true
        }
    }
}

#[async_trait]
impl CloudSync for MemoryCloud {
    async fn insert(&self, record: CloudRecord) -> Result<(), CloudError> {
        let table = record.table();
        self.enter(table)?;
        let id = record.id();
        if Self::put(&mut self.lock_tables(), record, false) {
            Ok(())
        } else {
            Err(CloudError::Conflict { table, id })
        }
    }

    async fn update(&self, record: CloudRecord, match_id: Uuid) -> Result<(), CloudError> {
        let table = record.table();
        self.enter(table)?;
        let mut tables = self.lock_tables();
        // No matching row is not an error, the update simply touches nothing
        match record {
            CloudRecord::Habit(habit) => {
                if let Some(row) = tables.habits.iter_mut().find(|h| h.id == match_id) {
                    *row = habit;
                }
            }
            CloudRecord::Log(log) => {
                if let Some(row) = tables.logs.iter_mut().find(|l| l.id == match_id) {
                    *row = log;
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, match_id: Uuid) -> Result<(), CloudError> {
        self.enter(table)?;
        let mut tables = self.lock_tables();
        match table {
            Table::Habits => tables.habits.retain(|h| h.id != match_id),
            Table::Logs => tables.logs.retain(|l| l.id != match_id),
        }
        Ok(())
    }

    async fn select_habits(&self, user_id: &str) -> Result<Vec<Habit>, CloudError> {
        self.enter(Table::Habits)?;
        Ok(self
            .lock_tables()
            .habits
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn select_logs(&self, user_id: &str) -> Result<Vec<LogEntry>, CloudError> {
        self.enter(Table::Logs)?;
        Ok(self
            .lock_tables()
            .logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert(
        &self,
        table: Table,
        records: Vec<CloudRecord>,
        options: UpsertOptions,
    ) -> Result<(), CloudError> {
        self.enter(table)?;
        if options.on_conflict != "id" {
            return Err(CloudError::Rejected {
                table,
                message: format!("unsupported conflict target '{}'", options.on_conflict),
            });
        }
        let foreign = records.iter().filter(|r| r.table() != table).count();
        if foreign > 0 {
            return Err(CloudError::MixedBatch {
                table,
                records: foreign,
            });
        }
        let mut tables = self.lock_tables();
        for record in records {
            Self::put(&mut tables, record, !options.ignore_duplicates);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HabitStatus;
    use chrono::Utc;

    fn habit(id: u128, user: &str, name: &str) -> Habit {
        let now = Utc::now();
        Habit {
            id: Uuid::from_u128(id),
            user_id: user.into(),
            name: name.into(),
            icon: None,
            weekly_goal: None,
            unit: "sessions".into(),
            default_increment: 1.0,
            status: HabitStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_then_select_is_scoped_to_user() {
        let cloud = MemoryCloud::new();
        cloud
            .insert(CloudRecord::Habit(habit(1, "alice", "Run")))
            .await
            .unwrap();
        cloud
            .insert(CloudRecord::Habit(habit(2, "bob", "Read")))
            .await
            .unwrap();

        let alice = cloud.select_habits("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].name, "Run");
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let cloud = MemoryCloud::new();
        cloud
            .insert(CloudRecord::Habit(habit(1, "alice", "Run")))
            .await
            .unwrap();
        let err = cloud
            .insert(CloudRecord::Habit(habit(1, "alice", "Run again")))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CloudError::Conflict {
                table: Table::Habits,
                id: Uuid::from_u128(1)
            }
        );
    }

    #[tokio::test]
    async fn upsert_ignoring_duplicates_keeps_remote_rows() {
        let cloud = MemoryCloud::new();
        cloud.seed(vec![habit(1, "alice", "Remote")], vec![]);

        cloud
            .upsert(
                Table::Habits,
                vec![
                    CloudRecord::Habit(habit(1, "alice", "Local")),
                    CloudRecord::Habit(habit(2, "alice", "New")),
                ],
                UpsertOptions::default(),
            )
            .await
            .unwrap();

        let names: Vec<String> = cloud.habits().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Remote", "New"]);
    }

    #[tokio::test]
    async fn upsert_rejects_foreign_records() {
        let cloud = MemoryCloud::new();
        let err = cloud
            .upsert(
                Table::Logs,
                vec![CloudRecord::Habit(habit(1, "alice", "Run"))],
                UpsertOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::MixedBatch { records: 1, .. }));
    }

    #[tokio::test]
    async fn failing_table_reports_unavailable_and_counts_calls() {
        let cloud = MemoryCloud::new();
        cloud.fail_table(Table::Logs);

        assert!(cloud.select_logs("alice").await.is_err());
        assert!(cloud.select_habits("alice").await.is_ok());
        assert_eq!(cloud.calls(), 2);

        cloud.heal();
        assert!(cloud.select_logs("alice").await.is_ok());
    }

    #[tokio::test]
    async fn delete_and_update_by_id() {
        let cloud = MemoryCloud::new();
        cloud.seed(vec![habit(1, "alice", "Run"), habit(2, "alice", "Swim")], vec![]);

        let mut renamed = habit(1, "alice", "Jog");
        renamed.status = HabitStatus::Paused;
        cloud
            .update(CloudRecord::Habit(renamed), Uuid::from_u128(1))
            .await
            .unwrap();
        cloud.delete(Table::Habits, Uuid::from_u128(2)).await.unwrap();

        let rows = cloud.habits();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Jog");
        assert_eq!(rows[0].status, HabitStatus::Paused);
    }
}
