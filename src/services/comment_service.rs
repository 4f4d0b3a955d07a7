// board-collab-service/src/services/comment_service.rs
use crate::models::{CommentRequest, DomainEvent, ServiceError, TaskComment};
use crate::services::board_service::required_text;
use crate::services::{permission_service, AppState};
use chrono::Utc;
use log::{debug, error, info};
use regex::Regex;
use std::collections::BTreeSet;
use uuid::Uuid;

const MAX_COMMENT_LEN: usize = 2000;

lazy_static::lazy_static! {
    static ref MENTION_PATTERN: Regex = Regex::new(r"@([A-Za-z0-9_]+)")
        .expect("mention pattern compiles");
}

// Distinct `@name` mentions in first-seen order
pub fn extract_mentions(content: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    MENTION_PATTERN
        .captures_iter(content)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

pub fn add_comment(
    state: &AppState,
    task_id: &str,
    author_id: &str,
    request: &CommentRequest,
) -> Result<TaskComment, ServiceError> {
    let project_id = state.boards.project_of_task(task_id)?;
    permission_service::authorize_write(state, &project_id, author_id)?;
    let content = required_text(&request.content, "content", MAX_COMMENT_LEN)?;

    let comment = {
        let mut board = state.boards.lock()?;
        // the task may have gone between the checks and the lock
        board.task(task_id)?;
        let comment = TaskComment {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            author_id: author_id.to_string(),
            content,
            created_at: Utc::now(),
        };
        board.comments.insert(comment.id.clone(), comment.clone());
        comment
    };

    info!("💬 Comment {} added to task {}", comment.id, task_id);
    state.publish(DomainEvent::TaskCommented {
        comment_id: comment.id.clone(),
        task_id: task_id.to_string(),
        project_id,
        author_id: author_id.to_string(),
        mentions: extract_mentions(&comment.content),
    });
    state.persist();
    Ok(comment)
}

// Oldest first
pub fn list_comments(
    state: &AppState,
    task_id: &str,
    principal_id: &str,
) -> Result<Vec<TaskComment>, ServiceError> {
    let project_id = state.boards.project_of_task(task_id)?;
    permission_service::authorize_read(state, &project_id, principal_id)?;

    let board = state.boards.lock()?;
    let mut comments: Vec<TaskComment> = board
        .comments
        .values()
        .filter(|comment| comment.task_id == task_id)
        .cloned()
        .collect();
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    debug!("Found {} comments on task {}", comments.len(), task_id);
    Ok(comments)
}

// The author or the project owner may delete a comment
pub fn delete_comment(
    state: &AppState,
    task_id: &str,
    comment_id: &str,
    principal_id: &str,
) -> Result<(), ServiceError> {
    let mut board = state.boards.lock()?;
    let comment = board
        .comments
        .get(comment_id)
        .filter(|comment| comment.task_id == task_id)
        .ok_or_else(|| ServiceError::not_found("Comment", comment_id))?;
    let project_id = board.project_of_task(task_id)?;
    let owner_id = &board.project(&project_id)?.owner_id;

    if comment.author_id != principal_id && owner_id != principal_id {
        error!(
            "❌ User {} may not delete comment {} by {}",
            principal_id, comment_id, comment.author_id
        );
        return Err(ServiceError::Forbidden);
    }

    board.comments.remove(comment_id);
    drop(board);

    info!("🗑️ Comment {} deleted from task {}", comment_id, task_id);
    state.persist();
    Ok(())
}
