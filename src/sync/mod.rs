// board-collab-service/src/sync/mod.rs
pub mod optimistic;

pub use optimistic::{OptimisticBoard, PendingToken, Reconciled};
