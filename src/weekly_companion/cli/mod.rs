//! # CLI Behavior
//!
//! This is **one possible UI client** for weekly-companion, not the application itself.
//! For the overall architecture, see the library documentation.
//!
//! ## Naked Execution (`weekly`)
//!
//! Running `weekly` with no arguments shows the current week, the same as `weekly week`.
//! Checking progress is what the tool is used for most.
//!
//! ## Picking Habits
//!
//! Commands that act on one habit take either its number from `weekly habit list`
//! or its exact name: `weekly log 2`, `weekly pause "Music practice"`.
//! Numbers follow creation order and don't change when other habits are paused
//! or archived.
//!
//! ## Undo
//!
//! `weekly log` prints the new log's id. `weekly undo <id>` removes it again, and
//! plain `weekly undo` removes the most recently created log. Undoing a log that
//! is already gone is an error here, though the store treats it as a no-op.
//!
//! ## Module Structure
//!
//! - `commands`: Dispatch and per-command handlers
//! - `render`: Output formatting (lists, week view, colors)
//! - `setup`: Argument parsing via clap

mod commands;
mod render;
pub mod setup;

pub use commands::run;
