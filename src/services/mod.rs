// board-collab-service/src/services/mod.rs
use crate::config::AppConfig;
use crate::models::{DomainEvent, DEFAULT_INVITATION_TTL_DAYS};
use crate::utils::state_storage::{PersistedState, StateStorage};
use chrono::Duration;
use log::{error, info};
use std::sync::Arc;

pub mod board_service;
pub mod collaboration_service;
pub mod comment_service;
pub mod move_service;
pub mod notification_service;
pub mod permission_service;

pub use board_service::{BoardState, BoardStore};
pub use collaboration_service::CollaborationStore;
pub use notification_service::{LogNotifier, NotificationSink, OutboxNotifier, RecordingNotifier};

// Shared handles to the two mutable stores plus outbound collaborators.
// Cloning is cheap; every clone sees the same state.
#[derive(Clone)]
pub struct AppState {
    pub boards: BoardStore,
    pub collaborations: CollaborationStore,
    pub notifier: Arc<dyn NotificationSink>,
    pub invitation_ttl: Duration,
    storage: Option<StateStorage>,
}

impl AppState {
    pub fn new(notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            boards: BoardStore::new(),
            collaborations: CollaborationStore::new(),
            notifier,
            invitation_ttl: Duration::days(DEFAULT_INVITATION_TTL_DAYS),
            storage: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(LogNotifier))
    }

    pub fn with_invitation_ttl(mut self, ttl: Duration) -> Self {
        self.invitation_ttl = ttl;
        self
    }

    pub fn with_storage(mut self, storage: StateStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    // Wires outbox notifications and, when enabled, the JSON snapshot
    pub fn from_config(config: &AppConfig) -> std::io::Result<Self> {
        let notifier = OutboxNotifier::new(&config.storage_dir)?;
        let mut state = Self::new(Arc::new(notifier)).with_invitation_ttl(config.invitation_ttl);

        if config.persist_state {
            let storage = StateStorage::new(&config.storage_dir)?;
            match storage.load() {
                Ok(Some(persisted)) => {
                    info!(
                        "📂 Restored {} projects and {} collaborations from {}",
                        persisted.board.projects.len(),
                        persisted.collaborations.len(),
                        storage.path().display()
                    );
                    state.boards = BoardStore::from_state(persisted.board);
                    state.collaborations = CollaborationStore::from_records(persisted.collaborations);
                }
                Ok(None) => info!("No saved board state, starting empty"),
                Err(e) => {
                    error!("❌ Failed to load saved board state: {}", e);
                    return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()));
                }
            }
            state = state.with_storage(storage);
        }

        Ok(state)
    }

    pub fn publish(&self, event: DomainEvent) {
        notification_service::notify(self.notifier.as_ref(), event);
    }

    // Flush the snapshot after a committed mutation. Failures are logged only;
    // the in-memory state stays authoritative.
    pub fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };

        let board = match self.boards.snapshot_state() {
            Ok(board) => board,
            Err(e) => {
                error!("❌ Could not snapshot board state: {}", e);
                return;
            }
        };
        let collaborations = match self.collaborations.all() {
            Ok(records) => records,
            Err(e) => {
                error!("❌ Could not snapshot collaborations: {}", e);
                return;
            }
        };

        if let Err(e) = storage.save(&PersistedState { board, collaborations }) {
            error!("❌ Failed to persist board state: {}", e);
        }
    }
}
