//! # Application Store
//!
//! [`AppStore`] owns the live copy of everything the user has: settings,
//! habits, logs and reflections, plus the session's signed-in user and the
//! dashboard's selected date. It is the only mutation surface; presentation
//! code reads through the accessors and changes things by calling operations.
//!
//! ## Construction
//!
//! There is no global instance. A store is built from [`StoreOptions`], which
//! carries the initial state and the collaborators:
//!
//! ```rust
//! use std::sync::Arc;
//! use weekly_companion::cloud::MemoryCloud;
//! use weekly_companion::ids::SequentialIds;
//! use weekly_companion::store::{AppStore, StoreOptions};
//!
//! let store = AppStore::new(
//!     StoreOptions::default()
//!         .with_cloud(Arc::new(MemoryCloud::new()))
//!         .with_ids(Arc::new(SequentialIds::new())),
//! );
//! assert!(store.habits().is_empty());
//! ```
//!
//! ## Execution Model
//!
//! Every operation is synchronous and runs to completion; no operation can
//! observe another half-applied. Two things suspend:
//!
//! - **Cloud mirroring**: mutations on habits and logs push a copy to the
//!   [`CloudSync`] collaborator as a spawned tokio task. The caller never waits
//!   for it and a failure only produces a log line. Without a cloud, or outside a
//!   tokio runtime, the change simply stays local.
//! - **[`AppStore::sync_from_cloud`]**: awaited by its caller. Both reads run
//!   concurrently and the result is applied only when both succeed.
//!
//! Pulling from the cloud replaces local habits and logs wholesale, so local
//! additions whose mirror task hasn't landed yet can be overwritten. That
//! ordering is accepted.
//!
//! ## Missing Entities
//!
//! Operations addressing an id that doesn't exist are no-ops. Those that return
//! the touched record return `None` (`update_habit`, `set_habit_status`,
//! `update_reflection`, `delete_log`).

use crate::calendar::{self, WeekRange, WeekStartDay};
use crate::cloud::{CloudRecord, CloudSync, CloudUser, Table, UpsertOptions};
use crate::ids::{IdGenerator, RandomIds};
use crate::model::{Habit, LogEntry, PersistedState, UserSettings, WeeklyReflection};
use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

pub mod habits;
pub mod logs;
pub mod progress;
pub mod reflections;
pub mod settings;
pub mod sync;

pub use habits::{HabitRemoval, NewHabit};
pub use logs::{LoggedWithUndo, NewLog, UndoLog};
pub use reflections::NewReflection;
pub use settings::SettingsPatch;
pub use sync::{GuestMigration, SyncOutcome};

/// Everything needed to build an [`AppStore`].
#[derive(Clone)]
pub struct StoreOptions {
    /// State to start from, usually whatever the local adapter loaded.
    pub initial: PersistedState,
    /// Remote mirror. `None` keeps the store purely local.
    pub cloud: Option<Arc<dyn CloudSync>>,
    /// Id source for new records. Defaults to random v4 UUIDs.
    pub ids: Arc<dyn IdGenerator>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            initial: PersistedState::default(),
            cloud: None,
            ids: Arc::new(RandomIds),
        }
    }
}

impl StoreOptions {
    pub fn with_state(mut self, state: PersistedState) -> Self {
        self.initial = state;
        self
    }

    pub fn with_cloud(mut self, cloud: Arc<dyn CloudSync>) -> Self {
        self.cloud = Some(cloud);
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}

/// A change to push to the cloud mirror.
#[derive(Debug)]
enum MirrorOp {
    Insert(CloudRecord),
    Update(CloudRecord),
    Delete(Table, Uuid),
    Upsert(Table, Vec<CloudRecord>),
}

impl MirrorOp {
    fn describe(&self) -> (&'static str, Table) {
        match self {
            MirrorOp::Insert(record) => ("insert", record.table()),
            MirrorOp::Update(record) => ("update", record.table()),
            MirrorOp::Delete(table, _) => ("delete", *table),
            MirrorOp::Upsert(table, _) => ("upsert", *table),
        }
    }

    /// The record id, or a record count for batches.
    fn target(&self) -> String {
        match self {
            MirrorOp::Insert(record) | MirrorOp::Update(record) => record.id().to_string(),
            MirrorOp::Delete(_, id) => id.to_string(),
            MirrorOp::Upsert(_, records) => format!("{} records", records.len()),
        }
    }

    async fn run(self, cloud: Arc<dyn CloudSync>) {
        let (op, table) = self.describe();
        let id = self.target();
        let result = match self {
            MirrorOp::Insert(record) => cloud.insert(record).await,
            MirrorOp::Update(record) => {
                let id = record.id();
                cloud.update(record, id).await
            }
            MirrorOp::Delete(table, id) => cloud.delete(table, id).await,
            MirrorOp::Upsert(table, records) => {
                cloud.upsert(table, records, UpsertOptions::default()).await
            }
        };
        match result {
            Ok(()) => debug!(op, %table, %id, "cloud mirror applied"),
            Err(err) => error!(op, %table, %id, error = %err, "cloud mirror failed"),
        }
    }
}

pub struct AppStore {
    user: Option<CloudUser>,
    selected_date: DateTime<Utc>,
    settings: Option<UserSettings>,
    habits: Vec<Habit>,
    logs: Vec<LogEntry>,
    reflections: Vec<WeeklyReflection>,
    cloud: Option<Arc<dyn CloudSync>>,
    ids: Arc<dyn IdGenerator>,
    pending_mirrors: Vec<JoinHandle<()>>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl AppStore {
    pub fn new(options: StoreOptions) -> Self {
        let StoreOptions {
            initial,
            cloud,
            ids,
        } = options;
        Self {
            user: None,
            selected_date: Utc::now(),
            settings: initial.settings,
            habits: initial.habits,
            logs: initial.logs,
            reflections: initial.reflections,
            cloud,
            ids,
            pending_mirrors: Vec::new(),
        }
    }

    // --- Read model ---

    pub fn user(&self) -> Option<&CloudUser> {
        self.user.as_ref()
    }

    pub fn selected_date(&self) -> DateTime<Utc> {
        self.selected_date
    }

    pub fn settings(&self) -> Option<&UserSettings> {
        self.settings.as_ref()
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn reflections(&self) -> &[WeeklyReflection] {
        &self.reflections
    }

    pub fn has_cloud(&self) -> bool {
        self.cloud.is_some()
    }

    /// A copy of the durable part of the state, ready for the local adapter.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            settings: self.settings.clone(),
            habits: self.habits.clone(),
            logs: self.logs.clone(),
            reflections: self.reflections.clone(),
            ..PersistedState::default()
        }
    }

    // --- Session ---

    pub fn set_user(&mut self, user: Option<CloudUser>) {
        self.user = user;
    }

    pub fn set_selected_date(&mut self, date: DateTime<Utc>) {
        self.selected_date = date;
    }

    /// Move the selected date by whole weeks (negative goes back).
    pub fn shift_selected_week(&mut self, weeks: i64) {
        let delta = TimeDelta::try_days(weeks.saturating_mul(7)).unwrap_or(TimeDelta::zero());
        self.selected_date = self
            .selected_date
            .checked_add_signed(delta)
            .unwrap_or(self.selected_date);
    }

    /// The week around the selected date.
    pub fn visible_week(&self) -> WeekRange {
        self.week_range(Some(self.selected_date))
    }

    /// Import path: discard everything and take `state` as is.
    pub fn replace_state(&mut self, state: PersistedState) {
        self.settings = state.settings;
        self.habits = state.habits;
        self.logs = state.logs;
        self.reflections = state.reflections;
    }

    // --- Calendar context ---

    /// Active timezone: the settings' zone, or UTC.
    pub fn timezone(&self) -> Tz {
        match &self.settings {
            Some(settings) => calendar::resolve_timezone_or_utc(&settings.timezone),
            None => Tz::UTC,
        }
    }

    pub fn week_start(&self) -> WeekStartDay {
        self.settings
            .as_ref()
            .map(|s| s.week_start_day)
            .unwrap_or_default()
    }

    pub fn week_range(&self, reference: Option<DateTime<Utc>>) -> WeekRange {
        calendar::week_range(
            reference.unwrap_or_else(Utc::now),
            self.timezone(),
            self.week_start(),
        )
    }

    // --- Internals shared by the operation modules ---

    fn next_id(&self) -> Uuid {
        self.ids.next_id()
    }

    /// True when a user is signed in and `owner` is that user.
    fn owned_by_signed_in(&self, owner: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.id == owner)
    }

    fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Push `op` to the cloud without waiting for it.
    fn spawn_mirror(&mut self, op: MirrorOp) {
        let Some(cloud) = self.cloud.clone() else {
            debug!(op = op.describe().0, "cloud not configured, change stays local");
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                op = op.describe().0,
                "no async runtime available, skipping cloud mirror"
            );
            return;
        };
        self.pending_mirrors.retain(|task| !task.is_finished());
        self.pending_mirrors.push(runtime.spawn(op.run(cloud)));
    }

    /// Number of mirror tasks spawned and not yet finished.
    pub fn pending_mirrors(&self) -> usize {
        self.pending_mirrors
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Wait for every in-flight mirror task. Meant for shutdown and tests;
    /// regular operations never wait on the cloud.
    pub async fn flush_mirrors(&mut self) -> usize {
        let tasks = std::mem::take(&mut self.pending_mirrors);
        let count = tasks.len();
        for task in tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "cloud mirror task did not complete");
            }
        }
        count
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn new_store_starts_from_initial_state() {
        let mut seed = AppStore::default();
        seed.set_settings(SettingsPatch::new(USER));
        seed.add_habit(NewHabit::new(USER, "Run"));

        let store = AppStore::new(StoreOptions::default().with_state(seed.snapshot()));
        assert_eq!(store.habits().len(), 1);
        assert_eq!(store.settings().unwrap().user_id, USER);
        assert!(store.user().is_none());
        assert!(!store.has_cloud());
    }

    #[test]
    fn stores_are_isolated() {
        let mut a = AppStore::default();
        let b = AppStore::default();
        a.add_habit(NewHabit::new(USER, "Run"));
        assert_eq!(a.habits().len(), 1);
        assert!(b.habits().is_empty());
    }

    #[test]
    fn replace_state_discards_everything() {
        let mut store = store_in("UTC", WeekStartDay::Monday);
        let habit = store.add_habit(NewHabit::new(USER, "Run"));
        store.add_log(NewLog::new(habit.id, USER, 1.0));

        store.replace_state(PersistedState::default());
        assert!(store.settings().is_none());
        assert!(store.habits().is_empty());
        assert!(store.logs().is_empty());
        assert!(store.reflections().is_empty());
    }

    #[test]
    fn snapshot_is_stamped_with_current_schema() {
        let store = store_in("UTC", WeekStartDay::Monday);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.schema_version, crate::model::SCHEMA_VERSION);
        assert!(snapshot.settings.is_some());
    }

    #[test]
    fn returns_a_consistent_week_range_from_settings() {
        let store = store_in("Asia/Tokyo", WeekStartDay::Sunday);
        let range = store.week_range(Some(instant("2025-01-03T03:00:00Z")));
        assert_eq!(range.start, date("2024-12-29"));
        assert_eq!(range.end, date("2025-01-04"));
    }

    #[test]
    fn week_range_defaults_to_utc_monday_without_settings() {
        let store = AppStore::default();
        let range = store.week_range(Some(instant("2025-01-01T02:30:00Z")));
        assert_eq!(range.start, date("2024-12-30"));
        assert_eq!(store.timezone(), Tz::UTC);
        assert_eq!(store.week_start(), WeekStartDay::Monday);
    }

    #[test]
    fn unknown_settings_timezone_falls_back_to_utc() {
        let store = store_in("Nowhere/Special", WeekStartDay::Monday);
        assert_eq!(store.timezone(), Tz::UTC);
    }

    #[test]
    fn selected_week_navigation() {
        let mut store = store_in("UTC", WeekStartDay::Monday);
        store.set_selected_date(instant("2025-01-01T12:00:00Z"));
        assert_eq!(store.visible_week().start, date("2024-12-30"));

        store.shift_selected_week(1);
        assert_eq!(store.visible_week().start, date("2025-01-06"));

        store.shift_selected_week(-2);
        assert_eq!(store.visible_week().start, date("2024-12-23"));
    }

    #[test]
    fn mirror_without_runtime_is_skipped() {
        let cloud = Arc::new(crate::cloud::MemoryCloud::new());
        let mut store = cloud_store(cloud.clone());
        store.set_user(Some(CloudUser::new(USER)));

        // Not inside a tokio runtime: the change stays local
        store.add_habit(NewHabit::new(USER, "Run"));
        assert_eq!(store.habits().len(), 1);
        assert_eq!(store.pending_mirrors(), 0);
        assert_eq!(cloud.calls(), 0);
    }
}
