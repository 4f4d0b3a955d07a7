// board-collab-service/src/services/notification_service.rs
use crate::models::{DomainEvent, EventEnvelope};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// Outbound domain events; delivery is best effort
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: &DomainEvent) -> Result<(), String>;
}

// Publish after commit. A failed delivery never undoes the mutation.
pub fn notify(sink: &dyn NotificationSink, event: DomainEvent) {
    if let Err(e) = sink.publish(&event) {
        warn!("⚠️ Failed to deliver {} notification: {}", event.name(), e);
    }
}

pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn publish(&self, event: &DomainEvent) -> Result<(), String> {
        let payload = serde_json::to_string(event).map_err(|e| e.to_string())?;
        info!("📣 {} {}", event.name(), payload);
        Ok(())
    }
}

// Appends one JSON line per event for the notification service to drain
pub struct OutboxNotifier {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl OutboxNotifier {
    pub fn new(storage_dir: &Path) -> std::io::Result<Self> {
        let dir = storage_dir.join("outbox");
        if !dir.exists() {
            info!("Creating outbox directory {}", dir.display());
            fs::create_dir_all(&dir)?;
        }
        Ok(Self {
            path: dir.join("events.jsonl"),
            write_guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NotificationSink for OutboxNotifier {
    fn publish(&self, event: &DomainEvent) -> Result<(), String> {
        let line = serde_json::to_string(&EventEnvelope::now(event.clone()))
            .map_err(|e| format!("serialize: {}", e))?;

        let _guard = self.write_guard.lock().map_err(|e| format!("Lock error: {:?}", e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("open {}: {}", self.path.display(), e))?;
        writeln!(file, "{}", line).map_err(|e| format!("write: {}", e))
    }
}

// Keeps every event in memory; used by tests and local tooling
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<DomainEvent>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    // Records nothing and reports every delivery as failed
    pub fn failing() -> Self {
        Self {
            events: Arc::default(),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(DomainEvent::name).collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn publish(&self, event: &DomainEvent) -> Result<(), String> {
        if self.fail {
            return Err("notification transport unavailable".to_string());
        }
        let mut events = self.events.lock().map_err(|e| format!("Lock error: {:?}", e))?;
        events.push(event.clone());
        Ok(())
    }
}
