//! # Persistence
//!
//! Everything that turns a [`PersistedState`](crate::model::PersistedState)
//! into bytes and back.
//!
//! ## Local Durable Storage
//!
//! The [`local::LocalAdapter`] keeps the whole state as one JSON blob under a
//! single well-known key of a [`kv::KeyValueStore`]:
//!
//! - [`kv::FileKv`]: production backend, one file per key in the data directory.
//!   Writes go to a temp file first and are renamed into place.
//! - [`kv::MemoryKv`]: in-memory backend for tests.
//!
//! Loading never fails: a missing or unreadable blob loads as `None` and the
//! caller starts fresh.
//!
//! ## Export / Import
//!
//! [`export`] is the only user-facing file format. Exports are stamped with the
//! current [`SCHEMA_VERSION`](crate::model::SCHEMA_VERSION); imports are
//! checked by [`validation`] and rejected wholesale on any error.

pub mod export;
pub mod kv;
pub mod local;
pub mod validation;

/// Key under which the whole persisted state lives.
pub const STORAGE_KEY: &str = "weekly-companion:v1";
