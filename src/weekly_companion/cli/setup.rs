use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;
use weekly_companion::calendar::WeekStartDay;
use weekly_companion::model::StatusFilter;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2025-01-15" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("WEEKLY_GIT_HASH");
    const COMMIT_DATE: &str = env!("WEEKLY_COMMIT_DATE");
    const IS_RELEASE: &str = env!("WEEKLY_IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "weekly", bin_name = "weekly", version = get_version())]
#[command(about = "Weekly habit tracking with goals, progress and reflections", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Where data and config live
    #[arg(long, global = true, env = "WEEKLY_HOME", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add, list and change habits
    #[command(subcommand)]
    Habit(HabitCommands),

    /// Log progress on a habit (by list number or name)
    Log {
        habit: String,

        /// Amount to log (defaults to the habit's increment)
        #[arg(short, long)]
        amount: Option<f64>,

        #[arg(short, long)]
        note: Option<String>,

        /// When it happened, as RFC 3339 (defaults to now)
        #[arg(long, value_name = "TIMESTAMP")]
        at: Option<DateTime<Utc>>,
    },

    /// Remove a log again (the most recent one when no id is given)
    Undo { log_id: Option<Uuid> },

    /// Show progress for a week
    Week {
        /// Weeks relative to the current one (-1 is last week)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
    },

    /// Show this month's totals
    Month,

    /// Show or answer the weekly reflection
    Reflect {
        /// One answer per prompt, in order
        #[arg(short, long)]
        answer: Vec<String>,

        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
    },

    /// Show or change settings
    Settings {
        /// IANA timezone, e.g. Europe/Lisbon
        #[arg(long)]
        timezone: Option<String>,

        /// monday, sunday or saturday
        #[arg(long)]
        week_start: Option<WeekStartDay>,

        #[arg(long, value_enum)]
        reflections: Option<Toggle>,
    },

    /// Write all data to a JSON file
    Export { path: PathBuf },

    /// Replace all data with the contents of an exported JSON file
    Import { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum HabitCommands {
    /// Create a habit
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,

        /// Target per week; omit for count-only habits
        #[arg(short, long)]
        goal: Option<u32>,

        #[arg(short, long)]
        unit: Option<String>,

        /// Amount logged when none is given
        #[arg(short, long)]
        increment: Option<f64>,

        #[arg(long)]
        icon: Option<String>,
    },

    /// List habits
    List {
        /// active, paused, archived or all
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },

    /// Stop counting progress for a habit
    Pause { habit: String },

    /// Make a paused or archived habit active again
    Resume { habit: String },

    /// Hide a habit from the week view
    Archive { habit: String },

    /// Delete a habit and all of its logs
    Delete { habit: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}
