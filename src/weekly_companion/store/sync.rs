use super::{AppStore, MirrorOp};
use crate::cloud::{CloudRecord, CloudUser, Table};
use tracing::{debug, error, info, warn};

/// Result of [`AppStore::sync_from_cloud`]. Informational: failures are
/// logged and leave local state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    SignedOut,
    NoCloud,
    Synced { habits: usize, logs: usize },
    Failed,
}

/// How many local records [`AppStore::migrate_guest_data`] reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuestMigration {
    pub habits: usize,
    pub logs: usize,
}

impl AppStore {
    /// Hand every local habit and log over to `user_id`, then upload them.
    ///
    /// The reassignment happens immediately. The uploads are upserts that keep
    /// rows already present remotely, and run in the background. Nothing is
    /// uploaded while nobody is signed in.
    pub fn migrate_guest_data(&mut self, user_id: &str) -> GuestMigration {
        for habit in &mut self.habits {
            habit.user_id = user_id.to_string();
        }
        for log in &mut self.logs {
            log.user_id = user_id.to_string();
        }
        let migration = GuestMigration {
            habits: self.habits.len(),
            logs: self.logs.len(),
        };
        info!(user = %user_id, habits = migration.habits, logs = migration.logs, "guest data migrated");

        if !self.signed_in() {
            debug!(user = %user_id, "not signed in, migrated data stays local");
            return migration;
        }
        if !self.habits.is_empty() {
            let records = self.habits.iter().cloned().map(CloudRecord::Habit).collect();
            self.spawn_mirror(MirrorOp::Upsert(Table::Habits, records));
        }
        if !self.logs.is_empty() {
            let records = self.logs.iter().cloned().map(CloudRecord::Log).collect();
            self.spawn_mirror(MirrorOp::Upsert(Table::Logs, records));
        }
        migration
    }

    /// Take over the session for `user`: on the account's first sign-in the
    /// guest data is migrated and uploaded, then the cloud rows are pulled.
    ///
    /// Pending uploads are awaited before the pull so it sees them.
    pub async fn sign_in(&mut self, user: CloudUser, first_sign_in: bool) -> SyncOutcome {
        let user_id = user.id.clone();
        self.set_user(Some(user));
        if first_sign_in {
            self.migrate_guest_data(&user_id);
            self.flush_mirrors().await;
        }
        self.sync_from_cloud().await
    }

    /// Replace local habits and logs with the signed-in user's cloud rows.
    ///
    /// Both reads run concurrently; nothing changes unless both succeed.
    pub async fn sync_from_cloud(&mut self) -> SyncOutcome {
        let Some(user) = self.user.clone() else {
            return SyncOutcome::SignedOut;
        };
        let Some(cloud) = self.cloud.clone() else {
            warn!("cloud sync requested but no cloud is configured");
            return SyncOutcome::NoCloud;
        };

        let (habits, logs) = tokio::join!(cloud.select_habits(&user.id), cloud.select_logs(&user.id));
        match (habits, logs) {
            (Ok(habits), Ok(logs)) => {
                let outcome = SyncOutcome::Synced {
                    habits: habits.len(),
                    logs: logs.len(),
                };
                self.set_habits(habits);
                self.set_logs(logs);
                info!(user = %user.id, ?outcome, "pulled from cloud");
                outcome
            }
            (habits, logs) => {
                if let Err(err) = habits {
                    error!(user = %user.id, error = %err, "failed to fetch habits");
                }
                if let Err(err) = logs {
                    error!(user = %user.id, error = %err, "failed to fetch logs");
                }
                SyncOutcome::Failed
            }
        }
    }
}
