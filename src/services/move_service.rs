// board-collab-service/src/services/move_service.rs
use crate::models::{BoardSnapshot, DomainEvent, MoveTaskRequest, ServiceError, Task};
use crate::services::{permission_service, AppState, BoardState};
use crate::utils::ordering;
use chrono::Utc;
use log::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from_column_id: String,
    pub to_column_id: String,
    pub position: usize,
}

// Relocate a task and return the canonical board. Out-of-range target
// positions are clamped, never rejected.
pub fn move_task(
    state: &AppState,
    principal_id: &str,
    request: &MoveTaskRequest,
) -> Result<BoardSnapshot, ServiceError> {
    info!(
        "🔀 Moving task {} to column {} at {} for user {}",
        request.task_id, request.target_column_id, request.target_position, principal_id
    );

    let project_id = state.boards.project_of_task(&request.task_id)?;
    permission_service::authorize_write(state, &project_id, principal_id)?;

    let (outcome, snapshot) = {
        let mut board = state.boards.lock()?;
        let outcome = apply_move(&mut board, &project_id, request)?;
        let snapshot = board.board_snapshot(&project_id)?;
        (outcome, snapshot)
    };

    info!(
        "✅ Task {} now at {} in column {}",
        request.task_id, outcome.position, outcome.to_column_id
    );
    state.publish(DomainEvent::TaskMoved {
        task_id: request.task_id.clone(),
        project_id,
        from_column_id: outcome.from_column_id,
        to_column_id: outcome.to_column_id,
        position: outcome.position,
        moved_by: principal_id.to_string(),
    });
    state.persist();
    Ok(snapshot)
}

// Runs under the board lock. Work happens on copies of the affected lists,
// which replace the live ones only after they pass verification.
pub(crate) fn apply_move(
    board: &mut BoardState,
    project_id: &str,
    request: &MoveTaskRequest,
) -> Result<MoveOutcome, ServiceError> {
    let source_id = board.task(&request.task_id)?.column_id.clone();
    let target_id = request.target_column_id.clone();

    // A column from another project is as good as missing
    let target = board.column(&target_id)?;
    if target.project_id != project_id {
        return Err(ServiceError::not_found("Column", &target_id));
    }

    let mut source_order = board.column(&source_id)?.task_ids.clone();
    let from = source_order
        .iter()
        .position(|id| *id == request.task_id)
        .ok_or_else(|| {
            error!(
                "🚨 Task {} is not listed in its column {}",
                request.task_id, source_id
            );
            ServiceError::InternalServerError
        })?;

    let position = if source_id == target_id {
        let before = source_order.len();
        let position = ordering::relocate_within(&mut source_order, from, request.target_position)
            .ok_or(ServiceError::InternalServerError)?;
        verify_lists(&[&source_order], before)?;
        commit_list(board, &source_id, source_order)?;
        position
    } else {
        let mut target_order = board.column(&target_id)?.task_ids.clone();
        let before = source_order.len() + target_order.len();
        let position = ordering::relocate_between(
            &mut source_order,
            from,
            &mut target_order,
            request.target_position,
        )
        .ok_or(ServiceError::InternalServerError)?;
        verify_lists(&[&source_order, &target_order], before)?;
        commit_list(board, &source_id, source_order)?;
        commit_list(board, &target_id, target_order)?;
        position
    };

    if let Some(task) = board.tasks.get_mut(&request.task_id) {
        task.updated_at = Utc::now();
    }
    board.renumber_column(&source_id);
    board.verify_column(&source_id)?;
    if source_id != target_id {
        board.renumber_column(&target_id);
        board.verify_column(&target_id)?;
    }

    Ok(MoveOutcome {
        from_column_id: source_id,
        to_column_id: target_id,
        position,
    })
}

// A new task enters its column like a move from nowhere
pub(crate) fn insert_task(
    board: &mut BoardState,
    task: Task,
    column_id: &str,
    requested: i64,
) -> Result<Task, ServiceError> {
    let mut order = board.column(column_id)?.task_ids.clone();
    let before = order.len() + 1;
    ordering::insert_clamped(&mut order, task.id.clone(), requested);
    verify_lists(&[&order], before)?;

    let task_id = task.id.clone();
    board.tasks.insert(task_id.clone(), task);
    commit_list(board, column_id, order)?;
    board.renumber_column(column_id);
    board.verify_column(column_id)?;

    Ok(board.task(&task_id)?.clone())
}

// Nothing lost, nothing duplicated
fn verify_lists(lists: &[&Vec<String>], expected: usize) -> Result<(), ServiceError> {
    let combined: Vec<&String> = lists.iter().flat_map(|list| list.iter()).collect();
    if combined.len() != expected || ordering::has_duplicates(&combined) {
        error!(
            "🚨 Reordering produced {} entries, expected {} unique",
            combined.len(),
            expected
        );
        return Err(ServiceError::InternalServerError);
    }
    Ok(())
}

fn commit_list(
    board: &mut BoardState,
    column_id: &str,
    order: Vec<String>,
) -> Result<(), ServiceError> {
    let column = board
        .columns
        .get_mut(column_id)
        .ok_or_else(|| ServiceError::not_found("Column", column_id))?;
    column.task_ids = order;
    Ok(())
}
