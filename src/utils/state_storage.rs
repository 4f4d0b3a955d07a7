// board-collab-service/src/utils/state_storage.rs
use crate::models::{Collaboration, ServiceError};
use crate::services::BoardState;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "board_state.json";

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PersistedState {
    pub board: BoardState,
    pub collaborations: Vec<Collaboration>,
}

// Whole-state JSON snapshot under the storage directory
#[derive(Clone, Debug)]
pub struct StateStorage {
    path: PathBuf,
}

impl StateStorage {
    pub fn new(storage_dir: &Path) -> std::io::Result<Self> {
        if !storage_dir.exists() {
            info!("Creating storage directory {}", storage_dir.display());
            fs::create_dir_all(storage_dir)?;
        }
        Ok(Self {
            path: storage_dir.join(STATE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<PersistedState>, ServiceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            error!("Failed to read state file: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let state: PersistedState = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse state JSON: {:?}", e);
            ServiceError::InternalServerError
        })?;

        Ok(Some(state))
    }

    // Write to a sibling temp file, then rename over the old snapshot
    pub fn save(&self, state: &PersistedState) -> Result<(), ServiceError> {
        let json = serde_json::to_string_pretty(state).map_err(|e| {
            error!("Failed to serialize board state: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| {
            error!("Failed to write state file: {:?}", e);
            ServiceError::InternalServerError
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            error!("Failed to replace state file: {:?}", e);
            ServiceError::InternalServerError
        })?;

        Ok(())
    }
}
