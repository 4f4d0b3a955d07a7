// board-collab-service/src/sync/optimistic.rs
use crate::models::{BoardSnapshot, ColumnView, MoveTaskRequest, ServiceError};
use crate::utils::ordering;
use log::{debug, warn};
use std::collections::HashMap;

// Identifies one optimistic move. Sequences grow per board, so a later
// token for the same task always wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToken {
    pub task_id: String,
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    // Canonical board adopted; `changed` when it differed from the local guess
    Applied { changed: bool },
    // A newer move for the task was issued; this response was discarded
    Superseded,
    RolledBack,
    // Transient failure; optimistic state kept so the move can be resent
    Retry,
    // Terminal failure; state rolled back and the caller should refetch
    NeedsRefetch,
}

#[derive(Debug, Clone)]
struct InFlight {
    sequence: u64,
    request: MoveTaskRequest,
}

/// Client-side cache of a board that applies moves before the server
/// confirms them.
///
/// The cache keeps the last confirmed board (`base`) and the moves still
/// awaiting a response. What callers see is always `base` with the pending
/// moves replayed in issue order, so confirming or dropping one move never
/// disturbs another. Only the most recent move per task is tracked;
/// responses to earlier ones are ignored.
#[derive(Debug, Clone)]
pub struct OptimisticBoard {
    base: BoardSnapshot,
    view: BoardSnapshot,
    next_sequence: u64,
    in_flight: HashMap<String, InFlight>,
}

impl OptimisticBoard {
    pub fn new(board: BoardSnapshot) -> Self {
        Self {
            view: board.clone(),
            base: board,
            next_sequence: 1,
            in_flight: HashMap::new(),
        }
    }

    pub fn board(&self) -> &BoardSnapshot {
        &self.view
    }

    // Last board the server confirmed
    pub fn confirmed(&self) -> &BoardSnapshot {
        &self.base
    }

    pub fn is_pending(&self, task_id: &str) -> bool {
        self.in_flight.contains_key(task_id)
    }

    pub fn apply_optimistic(
        &mut self,
        request: MoveTaskRequest,
    ) -> Result<PendingToken, ServiceError> {
        // reject locally before anything is recorded
        apply_move(&mut self.view.clone(), &request)?;

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if let Some(previous) = self.in_flight.get(&request.task_id) {
            debug!(
                "Move {} of task {} supersedes {}",
                sequence, request.task_id, previous.sequence
            );
        }

        let token = PendingToken {
            task_id: request.task_id.clone(),
            sequence,
        };
        self.in_flight
            .insert(request.task_id.clone(), InFlight { sequence, request });
        self.rebuild();
        Ok(token)
    }

    // Server accepted the move; its board becomes the new base
    pub fn commit(&mut self, token: &PendingToken, canonical: BoardSnapshot) -> Reconciled {
        if !self.is_latest(token) {
            debug!("Discarding stale response for task {}", token.task_id);
            return Reconciled::Superseded;
        }

        self.in_flight.remove(&token.task_id);
        self.base = canonical;
        let guess = self.view.clone();
        self.rebuild();

        Reconciled::Applied {
            changed: guess != self.view,
        }
    }

    pub fn rollback(&mut self, token: &PendingToken) -> Reconciled {
        if !self.is_latest(token) {
            return Reconciled::Superseded;
        }

        self.in_flight.remove(&token.task_id);
        self.rebuild();
        Reconciled::RolledBack
    }

    pub fn fail(&mut self, token: &PendingToken, error: &ServiceError) -> Reconciled {
        if !self.is_latest(token) {
            return Reconciled::Superseded;
        }

        if error.is_retryable() {
            warn!("⚠️ Move of task {} failed, retrying: {}", token.task_id, error);
            return Reconciled::Retry;
        }

        self.rollback(token);
        if error.requires_refetch() {
            warn!("⚠️ Move of task {} rejected: {}", token.task_id, error);
            Reconciled::NeedsRefetch
        } else {
            Reconciled::RolledBack
        }
    }

    // Result of a full refetch; every pending move is forgotten
    pub fn replace(&mut self, canonical: BoardSnapshot) {
        self.view = canonical.clone();
        self.base = canonical;
        self.in_flight.clear();
    }

    fn is_latest(&self, token: &PendingToken) -> bool {
        self.in_flight
            .get(&token.task_id)
            .map(|in_flight| in_flight.sequence == token.sequence)
            .unwrap_or(false)
    }

    fn rebuild(&mut self) {
        let mut pending: Vec<&InFlight> = self.in_flight.values().collect();
        pending.sort_by_key(|in_flight| in_flight.sequence);

        let mut view = self.base.clone();
        for in_flight in pending {
            if let Err(e) = apply_move(&mut view, &in_flight.request) {
                debug!(
                    "Pending move of task {} no longer applies: {}",
                    in_flight.request.task_id, e
                );
            }
        }
        self.view = view;
    }
}

// Same clamped relocation the server performs, run against the cached board
pub fn apply_move(board: &mut BoardSnapshot, request: &MoveTaskRequest) -> Result<usize, ServiceError> {
    let (source, from) = board
        .locate_task(&request.task_id)
        .ok_or_else(|| ServiceError::not_found("Task", &request.task_id))?;
    let target = board
        .columns
        .iter()
        .position(|column| column.id == request.target_column_id)
        .ok_or_else(|| ServiceError::not_found("Column", &request.target_column_id))?;

    let relocated = if source == target {
        ordering::relocate_within(&mut board.columns[source].tasks, from, request.target_position)
    } else {
        let (source_column, target_column) = pair_mut(&mut board.columns, source, target);
        ordering::relocate_between(
            &mut source_column.tasks,
            from,
            &mut target_column.tasks,
            request.target_position,
        )
    };
    let position = relocated.ok_or(ServiceError::InternalServerError)?;

    renumber(&mut board.columns[source]);
    if source != target {
        renumber(&mut board.columns[target]);
    }
    Ok(position)
}

fn pair_mut(columns: &mut [ColumnView], a: usize, b: usize) -> (&mut ColumnView, &mut ColumnView) {
    if a < b {
        let (left, right) = columns.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = columns.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

fn renumber(column: &mut ColumnView) {
    for (index, task) in column.tasks.iter_mut().enumerate() {
        task.position = index;
        task.column_id = column.id.clone();
    }
}
