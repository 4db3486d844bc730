//! # Weekly Companion Architecture
//!
//! Weekly Companion is a **UI-agnostic habit tracking library**. Habits have a weekly
//! goal, progress is logged against them, and once a week the user writes a short
//! reflection. The `weekly` binary is one client of the library; nothing in here
//! assumes a terminal.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (the `weekly` binary, or any other UI)              │
//! │  - Loads state, calls store operations, renders read models │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Application Store (store/, progress.rs)                    │
//! │  - Owns settings, habits, logs and reflections              │
//! │  - Mirrors habit/log changes to the cloud in the background │
//! │  - Derives weekly progress, dashboard and monthly views     │
//! └─────────────────────────────────────────────────────────────┘
//!                │                                │
//!                ▼                                ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Calendar (calendar.rs)       │ │  Cloud (cloud.rs)         │
//! │  - Civil dates in a timezone  │ │  - CloudSync trait        │
//! │  - Week ranges                │ │  - MemoryCloud for tests  │
//! └───────────────────────────────┘ └───────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence (persistence/)                                 │
//! │  - KeyValueStore trait: FileKv (production), MemoryKv       │
//! │  - LocalAdapter: load/save/clear of the state envelope      │
//! │  - Export, import and payload validation                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dates
//!
//! Every log carries a `target_date`: the civil date of its timestamp in the
//! timezone that was active when it was recorded. Week membership is decided on
//! those dates alone, so changing the timezone later never moves old logs into
//! another week.
//!
//! ## Testing Strategy
//!
//! 1. **Store operations** (`store/*.rs`): unit tests with [`ids::SequentialIds`]
//!    for stable ids and [`cloud::MemoryCloud`] to observe mirroring.
//! 2. **Calendar** (`calendar.rs`): fixed instants across DST changes and zones.
//! 3. **Persistence**: `MemoryKv` for the adapter, temp dirs for `FileKv`.
//! 4. **CLI** (`tests/`): drives the real binary against a temp data dir.
//!
//! ## Module Overview
//!
//! - [`store`]: The application store and its operations
//! - [`progress`]: Dashboard cards and monthly totals
//! - [`calendar`]: Timezones, civil dates and week ranges
//! - [`model`]: Persisted data types
//! - [`ids`]: Id generation
//! - [`cloud`]: The remote mirror interface
//! - [`persistence`]: Local storage, export and import
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod calendar;
pub mod cloud;
pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod persistence;
pub mod progress;
pub mod store;
