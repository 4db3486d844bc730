use super::validation::validate_import_payload;
use crate::error::{CompanionError, Result};
use crate::model::{PersistedState, SCHEMA_VERSION};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Result of parsing an import file. `state` is `Some` only when `errors` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub state: Option<PersistedState>,
    pub errors: Vec<String>,
}

impl ImportOutcome {
    fn rejected(errors: Vec<String>) -> Self {
        Self {
            state: None,
            errors,
        }
    }

    /// Collapse into a `Result`, for callers that only want the state.
    pub fn into_result(self) -> Result<PersistedState> {
        match self.state {
            Some(state) => Ok(state),
            None => Err(CompanionError::Import(self.errors)),
        }
    }
}

/// JSON-encodes the state, always stamped with the current schema version.
pub fn serialize_state(state: &PersistedState) -> Result<String> {
    let stamped = PersistedState {
        schema_version: SCHEMA_VERSION,
        ..state.clone()
    };
    serde_json::to_string_pretty(&stamped).map_err(CompanionError::Serialization)
}

pub fn parse_imported_state(json: &str) -> ImportOutcome {
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(err) => return ImportOutcome::rejected(vec!["Invalid JSON".into(), err.to_string()]),
    };

    let validation = validate_import_payload(&value);
    if !validation.valid {
        return ImportOutcome::rejected(validation.errors);
    }

    // The envelope passed the shape checks, the records themselves still have to decode
    match serde_json::from_value::<PersistedState>(value) {
        Ok(state) => ImportOutcome {
            state: Some(state),
            errors: Vec::new(),
        },
        Err(err) => ImportOutcome::rejected(vec!["Invalid state".into(), err.to_string()]),
    }
}

pub fn export_to_file(state: &PersistedState, path: &Path) -> Result<()> {
    let json = serialize_state(state)?;
    fs::write(path, json).map_err(CompanionError::Io)
}

pub fn import_from_file(path: &Path) -> Result<PersistedState> {
    let json = fs::read_to_string(path).map_err(CompanionError::Io)?;
    parse_imported_state(&json).into_result()
}
