// board-collab-service/src/services/board_service.rs
use crate::models::{
    BoardSnapshot, Column, ColumnRequest, ColumnView, DomainEvent, MoveColumnRequest, Project,
    ProjectListing, ProjectRequest, ProjectSearchQuery, ServiceError, Task, TaskComment,
    TaskRequest, TaskUpdateRequest, Visibility, DEFAULT_COLUMNS,
};
use crate::services::{collaboration_service, move_service, permission_service, AppState};
use crate::utils::ordering;
use chrono::Utc;
use log::{debug, error, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 200;
const MAX_NAME_LEN: usize = 100;

lazy_static::lazy_static! {
    static ref LABEL_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _.#/+-]{0,31}$")
        .expect("label pattern compiles");
    static ref URL_PATTERN: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$")
        .expect("url pattern compiles");
}

// Projects, columns and tasks. Ordering lives in the id lists
// (`Project::column_ids`, `Column::task_ids`); the numeric positions are
// renumbered from those lists after every structural change.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BoardState {
    pub(crate) projects: HashMap<String, Project>,
    pub(crate) columns: HashMap<String, Column>,
    pub(crate) tasks: HashMap<String, Task>,
    #[serde(default)]
    pub(crate) comments: HashMap<String, TaskComment>,
}

impl BoardState {
    pub(crate) fn project(&self, project_id: &str) -> Result<&Project, ServiceError> {
        self.projects
            .get(project_id)
            .ok_or_else(|| ServiceError::not_found("Project", project_id))
    }

    pub(crate) fn column(&self, column_id: &str) -> Result<&Column, ServiceError> {
        self.columns
            .get(column_id)
            .ok_or_else(|| ServiceError::not_found("Column", column_id))
    }

    pub(crate) fn task(&self, task_id: &str) -> Result<&Task, ServiceError> {
        self.tasks
            .get(task_id)
            .ok_or_else(|| ServiceError::not_found("Task", task_id))
    }

    pub(crate) fn project_of_column(&self, column_id: &str) -> Result<String, ServiceError> {
        Ok(self.column(column_id)?.project_id.clone())
    }

    pub(crate) fn project_of_task(&self, task_id: &str) -> Result<String, ServiceError> {
        let column_id = &self.task(task_id)?.column_id;
        self.project_of_column(column_id)
    }

    // Rewrite each listed task's position and owning column from the list order
    pub(crate) fn renumber_column(&mut self, column_id: &str) {
        let Some(column) = self.columns.get(column_id) else {
            return;
        };
        for (index, task_id) in column.task_ids.iter().enumerate() {
            if let Some(task) = self.tasks.get_mut(task_id) {
                task.position = index;
                task.column_id = column_id.to_string();
            }
        }
    }

    pub(crate) fn renumber_project_columns(&mut self, project_id: &str) {
        let Some(project) = self.projects.get(project_id) else {
            return;
        };
        for (index, column_id) in project.column_ids.iter().enumerate() {
            if let Some(column) = self.columns.get_mut(column_id) {
                column.position = index;
            }
        }
    }

    // Density check run after every structural mutation. A failure is a bug,
    // never a user error.
    pub(crate) fn verify_column(&self, column_id: &str) -> Result<(), ServiceError> {
        let column = self.column(column_id)?;
        let mut positions = Vec::with_capacity(column.task_ids.len());

        for task_id in &column.task_ids {
            match self.tasks.get(task_id) {
                Some(task) if task.column_id == column.id => positions.push(task.position),
                _ => {
                    error!(
                        "🚨 Column {} lists task {} which does not belong to it",
                        column_id, task_id
                    );
                    return Err(ServiceError::InternalServerError);
                }
            }
        }

        if ordering::has_duplicates(&column.task_ids) || !ordering::is_dense(positions) {
            error!("🚨 Task positions in column {} are not dense", column_id);
            return Err(ServiceError::InternalServerError);
        }
        Ok(())
    }

    pub fn board_snapshot(&self, project_id: &str) -> Result<BoardSnapshot, ServiceError> {
        let project = self.project(project_id)?;

        let columns = project
            .column_ids
            .iter()
            .filter_map(|column_id| self.columns.get(column_id))
            .map(|column| ColumnView {
                id: column.id.clone(),
                name: column.name.clone(),
                position: column.position,
                tasks: column
                    .task_ids
                    .iter()
                    .filter_map(|task_id| self.tasks.get(task_id))
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(BoardSnapshot {
            project_id: project.id.clone(),
            owner_id: project.owner_id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            visibility: project.visibility,
            columns,
        })
    }

    // Tasks of a column in display order
    pub(crate) fn column_tasks(&self, column_id: &str) -> Result<Vec<Task>, ServiceError> {
        Ok(self
            .column(column_id)?
            .task_ids
            .iter()
            .filter_map(|task_id| self.tasks.get(task_id))
            .cloned()
            .collect())
    }

    pub(crate) fn remove_task_comments(&mut self, task_id: &str) -> usize {
        let before = self.comments.len();
        self.comments.retain(|_, comment| comment.task_id != task_id);
        before - self.comments.len()
    }

    fn remove_column_cascade(&mut self, column_id: &str) {
        if let Some(column) = self.columns.remove(column_id) {
            for task_id in column.task_ids {
                self.tasks.remove(&task_id);
                self.remove_task_comments(&task_id);
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct BoardStore {
    state: Arc<Mutex<BoardState>>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: BoardState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, BoardState>, ServiceError> {
        self.state.lock().map_err(|e| {
            error!("Board store lock error: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    pub fn snapshot_state(&self) -> Result<BoardState, ServiceError> {
        Ok(self.lock()?.clone())
    }

    // Owner and visibility, the two facts permission checks need
    pub fn project_access(&self, project_id: &str) -> Result<(String, Visibility), ServiceError> {
        let board = self.lock()?;
        let project = board.project(project_id)?;
        Ok((project.owner_id.clone(), project.visibility))
    }

    pub fn project_of_task(&self, task_id: &str) -> Result<String, ServiceError> {
        self.lock()?.project_of_task(task_id)
    }

    pub fn project_of_column(&self, column_id: &str) -> Result<String, ServiceError> {
        self.lock()?.project_of_column(column_id)
    }

    pub fn board_snapshot(&self, project_id: &str) -> Result<BoardSnapshot, ServiceError> {
        self.lock()?.board_snapshot(project_id)
    }
}

pub(crate) fn required_text(value: &str, field: &str, max_len: usize) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::BadRequest(format!("{} must not be blank", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(ServiceError::BadRequest(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

// Trim, drop blanks, reject anything outside the label alphabet
pub fn normalize_labels(labels: &[String]) -> Result<BTreeSet<String>, ServiceError> {
    let mut normalized = BTreeSet::new();
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        if !LABEL_PATTERN.is_match(label) {
            return Err(ServiceError::BadRequest(format!("Invalid label: '{}'", label)));
        }
        normalized.insert(label.to_string());
    }
    Ok(normalized)
}

fn normalize_repository_url(value: &Option<String>) -> Result<Option<String>, ServiceError> {
    match optional_text(value) {
        Some(url) if !URL_PATTERN.is_match(&url) => Err(ServiceError::BadRequest(format!(
            "Invalid repository URL: '{}'",
            url
        ))),
        url => Ok(url),
    }
}

fn new_column(project_id: &str, name: &str, position: usize) -> Column {
    Column {
        id: Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        name: name.to_string(),
        position,
        task_ids: Vec::new(),
        created_at: Utc::now(),
    }
}

// Projects

pub fn create_project(
    state: &AppState,
    owner_id: &str,
    request: &ProjectRequest,
) -> Result<Project, ServiceError> {
    let name = required_text(&request.name, "name", MAX_NAME_LEN)?;
    let tags = normalize_labels(request.tags.as_deref().unwrap_or_default())?;
    let technologies = normalize_labels(request.technologies.as_deref().unwrap_or_default())?;
    let repository_url = normalize_repository_url(&request.repository_url)?;
    info!("📝 Creating new project: {} for user: {}", name, owner_id);

    let now = Utc::now();
    let project_id = Uuid::new_v4().to_string();
    let columns: Vec<Column> = DEFAULT_COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column_name)| new_column(&project_id, column_name, index))
        .collect();

    let project = Project {
        id: project_id.clone(),
        owner_id: owner_id.to_string(),
        name,
        description: optional_text(&request.description),
        visibility: request.visibility.unwrap_or_default(),
        tags,
        technologies,
        repository_url,
        column_ids: columns.iter().map(|column| column.id.clone()).collect(),
        created_at: now,
        updated_at: now,
    };

    {
        let mut board = state.boards.lock()?;
        for column in columns {
            board.columns.insert(column.id.clone(), column);
        }
        board.projects.insert(project_id.clone(), project.clone());
    }

    info!("✅ Project created successfully: {}", project_id);
    state.persist();
    Ok(project)
}

pub fn get_board(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
) -> Result<BoardSnapshot, ServiceError> {
    debug!("Fetching board {} for user {}", project_id, principal_id);
    permission_service::authorize_read(state, project_id, principal_id)?;
    state.boards.board_snapshot(project_id)
}

pub fn list_projects(state: &AppState, principal_id: &str) -> Result<ProjectListing, ServiceError> {
    let collaborated_ids = collaboration_service::collaborated_project_ids(state, principal_id)?;
    let board = state.boards.lock()?;

    let mut owned: Vec<Project> = board
        .projects
        .values()
        .filter(|project| project.owner_id == principal_id)
        .cloned()
        .collect();
    owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let collaborated = collaborated_ids
        .iter()
        .filter_map(|project_id| board.projects.get(project_id))
        .cloned()
        .collect();

    Ok(ProjectListing {
        owned,
        collaborated,
    })
}

pub fn list_public_projects(state: &AppState) -> Result<Vec<Project>, ServiceError> {
    let board = state.boards.lock()?;
    let mut projects: Vec<Project> = board
        .projects
        .values()
        .filter(|project| project.visibility == Visibility::Public)
        .cloned()
        .collect();
    projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(projects)
}

fn contains_all(set: &BTreeSet<String>, wanted: &[String]) -> bool {
    wanted
        .iter()
        .all(|item| set.iter().any(|value| value.eq_ignore_ascii_case(item)))
}

// PUBLIC projects whose name or description contains `q` (any case) and
// that carry every requested tag and technology
pub fn search_projects(
    state: &AppState,
    query: &ProjectSearchQuery,
) -> Result<Vec<Project>, ServiceError> {
    let term = query
        .q
        .as_deref()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty());
    let tags = query.tag_list();
    let technologies = query.technology_list();
    debug!(
        "Searching projects: term={:?} tags={:?} technologies={:?}",
        term, tags, technologies
    );

    let mut projects: Vec<Project> = list_public_projects(state)?
        .into_iter()
        .filter(|project| {
            term.as_ref().map_or(true, |term| {
                project.name.to_lowercase().contains(term)
                    || project
                        .description
                        .as_ref()
                        .map_or(false, |description| description.to_lowercase().contains(term))
            })
        })
        .filter(|project| contains_all(&project.tags, &tags))
        .filter(|project| contains_all(&project.technologies, &technologies))
        .collect();
    projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(projects)
}

pub fn update_project(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
    request: &ProjectRequest,
) -> Result<Project, ServiceError> {
    permission_service::authorize_write(state, project_id, principal_id)?;
    let name = required_text(&request.name, "name", MAX_NAME_LEN)?;
    let tags = request.tags.as_deref().map(normalize_labels).transpose()?;
    let technologies = request
        .technologies
        .as_deref()
        .map(normalize_labels)
        .transpose()?;
    let repository_url = normalize_repository_url(&request.repository_url)?;

    let updated = {
        let mut board = state.boards.lock()?;
        let project = board
            .projects
            .get_mut(project_id)
            .ok_or_else(|| ServiceError::not_found("Project", project_id))?;

        project.name = name;
        project.description = optional_text(&request.description);
        if let Some(visibility) = request.visibility {
            project.visibility = visibility;
        }
        if let Some(tags) = tags {
            project.tags = tags;
        }
        if let Some(technologies) = technologies {
            project.technologies = technologies;
        }
        if repository_url.is_some() {
            project.repository_url = repository_url;
        }
        project.updated_at = Utc::now();
        project.clone()
    };

    info!("✅ Project updated: {}", project_id);
    state.persist();
    Ok(updated)
}

// Owner only; removes columns, tasks and every collaboration record
pub fn delete_project(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
) -> Result<(), ServiceError> {
    info!("🗑️ Deleting project: {}", project_id);
    permission_service::authorize_delete(state, project_id, principal_id)?;

    {
        let mut board = state.boards.lock()?;
        let project = board
            .projects
            .remove(project_id)
            .ok_or_else(|| ServiceError::not_found("Project", project_id))?;
        for column_id in &project.column_ids {
            board.remove_column_cascade(column_id);
        }
    }

    let removed = state.collaborations.remove_for_project(project_id)?;
    info!(
        "✅ Project {} deleted with {} collaboration records",
        project_id, removed
    );
    state.persist();
    Ok(())
}

// Columns

pub fn create_column(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
    request: &ColumnRequest,
) -> Result<Column, ServiceError> {
    permission_service::authorize_write(state, project_id, principal_id)?;
    let name = required_text(&request.name, "name", MAX_NAME_LEN)?;

    let column = {
        let mut board = state.boards.lock()?;
        let project = board
            .projects
            .get_mut(project_id)
            .ok_or_else(|| ServiceError::not_found("Project", project_id))?;

        let column = new_column(project_id, &name, project.column_ids.len());
        project.column_ids.push(column.id.clone());
        board.columns.insert(column.id.clone(), column.clone());
        column
    };

    info!("✅ Column {} added to project {}", column.id, project_id);
    state.persist();
    Ok(column)
}

pub fn rename_column(
    state: &AppState,
    column_id: &str,
    principal_id: &str,
    request: &ColumnRequest,
) -> Result<Column, ServiceError> {
    let project_id = state.boards.project_of_column(column_id)?;
    permission_service::authorize_write(state, &project_id, principal_id)?;
    let name = required_text(&request.name, "name", MAX_NAME_LEN)?;

    let column = {
        let mut board = state.boards.lock()?;
        let column = board
            .columns
            .get_mut(column_id)
            .ok_or_else(|| ServiceError::not_found("Column", column_id))?;
        column.name = name;
        column.clone()
    };

    info!("✅ Column {} renamed", column_id);
    state.persist();
    Ok(column)
}

// Reorder a column within its project; the index is clamped like task moves
pub fn move_column(
    state: &AppState,
    column_id: &str,
    principal_id: &str,
    request: &MoveColumnRequest,
) -> Result<BoardSnapshot, ServiceError> {
    let project_id = state.boards.project_of_column(column_id)?;
    permission_service::authorize_write(state, &project_id, principal_id)?;

    let snapshot = {
        let mut board = state.boards.lock()?;
        let project = board
            .projects
            .get_mut(&project_id)
            .ok_or_else(|| ServiceError::not_found("Project", &project_id))?;

        let from = project
            .column_ids
            .iter()
            .position(|id| id == column_id)
            .ok_or_else(|| ServiceError::not_found("Column", column_id))?;
        let mut order = project.column_ids.clone();
        ordering::relocate_within(&mut order, from, request.position)
            .ok_or(ServiceError::InternalServerError)?;
        project.column_ids = order;
        project.updated_at = Utc::now();

        board.renumber_project_columns(&project_id);
        board.board_snapshot(&project_id)?
    };

    info!("✅ Column {} moved to {}", column_id, request.position);
    state.persist();
    Ok(snapshot)
}

// Removes the column together with its tasks
pub fn delete_column(
    state: &AppState,
    column_id: &str,
    principal_id: &str,
) -> Result<BoardSnapshot, ServiceError> {
    let project_id = state.boards.project_of_column(column_id)?;
    permission_service::authorize_write(state, &project_id, principal_id)?;

    let snapshot = {
        let mut board = state.boards.lock()?;
        board.remove_column_cascade(column_id);
        if let Some(project) = board.projects.get_mut(&project_id) {
            project.column_ids.retain(|id| id != column_id);
            project.updated_at = Utc::now();
        }
        board.renumber_project_columns(&project_id);
        board.board_snapshot(&project_id)?
    };

    info!("✅ Column {} deleted from project {}", column_id, project_id);
    state.persist();
    Ok(snapshot)
}

// Tasks

pub fn create_task(
    state: &AppState,
    principal_id: &str,
    request: &TaskRequest,
) -> Result<Task, ServiceError> {
    let project_id = state.boards.project_of_column(&request.column_id)?;
    permission_service::authorize_write(state, &project_id, principal_id)?;

    let title = required_text(&request.title, "title", MAX_TITLE_LEN)?;
    let labels = normalize_labels(request.labels.as_deref().unwrap_or_default())?;

    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4().to_string(),
        column_id: request.column_id.clone(),
        title,
        description: optional_text(&request.description),
        priority: request.priority.unwrap_or_default(),
        status: request.status.unwrap_or_default(),
        labels,
        due_date: request.due_date,
        assignee_id: optional_text(&request.assignee_id),
        position: 0,
        creator_id: principal_id.to_string(),
        created_at: now,
        updated_at: now,
    };

    let created = {
        let mut board = state.boards.lock()?;
        // Appending is an insert at the current count
        let requested = request.position.unwrap_or(i64::MAX);
        move_service::insert_task(&mut board, task, &request.column_id, requested)?
    };

    info!("✅ Task {} created in column {} at {}", created.id, created.column_id, created.position);
    state.publish(DomainEvent::TaskCreated {
        task_id: created.id.clone(),
        project_id,
        column_id: created.column_id.clone(),
        created_by: principal_id.to_string(),
    });
    state.persist();
    Ok(created)
}

pub fn get_task(state: &AppState, task_id: &str, principal_id: &str) -> Result<Task, ServiceError> {
    let project_id = state.boards.project_of_task(task_id)?;
    permission_service::authorize_read(state, &project_id, principal_id)?;
    Ok(state.boards.lock()?.task(task_id)?.clone())
}

pub fn list_tasks_by_column(
    state: &AppState,
    column_id: &str,
    principal_id: &str,
) -> Result<Vec<Task>, ServiceError> {
    let project_id = state.boards.project_of_column(column_id)?;
    permission_service::authorize_read(state, &project_id, principal_id)?;
    debug!("Fetching tasks for column: {}", column_id);
    state.boards.lock()?.column_tasks(column_id)
}

// Every task of the project, column by column in board order
pub fn list_tasks_by_project(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
) -> Result<Vec<Task>, ServiceError> {
    permission_service::authorize_read(state, project_id, principal_id)?;
    debug!("Fetching tasks for project: {}", project_id);

    let board = state.boards.lock()?;
    let mut tasks = Vec::new();
    for column_id in &board.project(project_id)?.column_ids {
        tasks.extend(board.column_tasks(column_id)?);
    }
    Ok(tasks)
}

// Replaces the editable fields; column and position change only through moves
pub fn update_task(
    state: &AppState,
    task_id: &str,
    principal_id: &str,
    request: &TaskUpdateRequest,
) -> Result<Task, ServiceError> {
    let project_id = state.boards.project_of_task(task_id)?;
    permission_service::authorize_write(state, &project_id, principal_id)?;

    let title = required_text(&request.title, "title", MAX_TITLE_LEN)?;
    let labels = normalize_labels(&request.labels)?;

    let updated = {
        let mut board = state.boards.lock()?;
        let task = board
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| ServiceError::not_found("Task", task_id))?;

        task.title = title;
        task.description = optional_text(&request.description);
        task.priority = request.priority;
        task.status = request.status;
        task.labels = labels;
        task.due_date = request.due_date;
        task.assignee_id = optional_text(&request.assignee_id);
        task.updated_at = Utc::now();
        task.clone()
    };

    info!("✅ Task updated: {}", task_id);
    state.publish(DomainEvent::TaskUpdated {
        task_id: task_id.to_string(),
        project_id,
        updated_by: principal_id.to_string(),
    });
    state.persist();
    Ok(updated)
}

// Write capability suffices; later tasks in the column shift up by one
pub fn delete_task(state: &AppState, task_id: &str, principal_id: &str) -> Result<(), ServiceError> {
    let project_id = state.boards.project_of_task(task_id)?;
    permission_service::authorize_write(state, &project_id, principal_id)?;

    {
        let mut board = state.boards.lock()?;
        let task = board
            .tasks
            .remove(task_id)
            .ok_or_else(|| ServiceError::not_found("Task", task_id))?;

        if let Some(column) = board.columns.get_mut(&task.column_id) {
            column.task_ids.retain(|id| id != task_id);
        }
        board.remove_task_comments(task_id);
        board.renumber_column(&task.column_id);
        board.verify_column(&task.column_id)?;
    }

    info!("✅ Task deleted: {}", task_id);
    state.publish(DomainEvent::TaskDeleted {
        task_id: task_id.to_string(),
        project_id,
        deleted_by: principal_id.to_string(),
    });
    state.persist();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommentRequest, CreateInvitationRequest, Decision, TaskPriority, TaskStatus};
    use crate::services::comment_service;
    use chrono::NaiveDate;

    fn project(state: &AppState, visibility: Visibility) -> BoardSnapshot {
        let project = create_project(
            state,
            "owner",
            &ProjectRequest {
                name: "  Launch  ".to_string(),
                description: Some("   ".to_string()),
                visibility: Some(visibility),
                tags: None,
                technologies: None,
                repository_url: None,
            },
        )
        .unwrap();
        state.boards.board_snapshot(&project.id).unwrap()
    }

    fn task_request(column_id: &str, title: &str) -> TaskRequest {
        TaskRequest {
            column_id: column_id.to_string(),
            title: title.to_string(),
            description: None,
            priority: None,
            status: None,
            labels: None,
            due_date: None,
            assignee_id: None,
            position: None,
        }
    }

    fn join(state: &AppState, project_id: &str, user: &str, role: &str) {
        let invitation = collaboration_service::create_invitation(
            state,
            "owner",
            &CreateInvitationRequest {
                project_id: project_id.to_string(),
                invitee_id: user.to_string(),
                role: role.to_string(),
            },
            Utc::now(),
        )
        .unwrap();
        collaboration_service::respond(state, &invitation.id, user, Decision::Accept, Utc::now())
            .unwrap();
    }

    fn positions(state: &AppState, project_id: &str, column_id: &str) -> Vec<usize> {
        let snapshot = state.boards.board_snapshot(project_id).unwrap();
        snapshot
            .column(column_id)
            .unwrap()
            .tasks
            .iter()
            .map(|task| task.position)
            .collect()
    }

    #[test]
    fn new_project_has_default_columns() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);

        assert_eq!(board.name, "Launch");
        assert_eq!(board.description, None);
        let names: Vec<&str> = board.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["To Do", "In Progress", "Done"]);
        let column_positions: Vec<usize> = board.columns.iter().map(|c| c.position).collect();
        assert_eq!(column_positions, vec![0, 1, 2]);
    }

    #[test]
    fn blank_project_name_is_rejected() {
        let state = AppState::in_memory();
        let result = create_project(
            &state,
            "owner",
            &ProjectRequest {
                name: "   ".to_string(),
                description: None,
                visibility: None,
                tags: None,
                technologies: None,
                repository_url: None,
            },
        );
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    }

    #[test]
    fn tasks_append_and_defaults_apply() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let todo = &board.columns[0].id;

        let first = create_task(&state, "owner", &task_request(todo, "First")).unwrap();
        let second = create_task(&state, "owner", &task_request(todo, "Second")).unwrap();

        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);
        assert_eq!(first.priority, TaskPriority::Medium);
        assert_eq!(first.status, TaskStatus::Todo);
        assert_eq!(first.creator_id, "owner");
    }

    #[test]
    fn explicit_create_position_inserts_and_clamps() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let todo = &board.columns[0].id;

        let a = create_task(&state, "owner", &task_request(todo, "A")).unwrap();
        let b = create_task(&state, "owner", &task_request(todo, "B")).unwrap();
        let mut front = task_request(todo, "Front");
        front.position = Some(0);
        let front = create_task(&state, "owner", &front).unwrap();
        let mut far = task_request(todo, "Far");
        far.position = Some(500);
        let far = create_task(&state, "owner", &far).unwrap();

        let snapshot = state.boards.board_snapshot(&board.project_id).unwrap();
        assert_eq!(snapshot.task_order(todo), vec![front.id, a.id, b.id, far.id]);
        assert_eq!(positions(&state, &board.project_id, todo), vec![0, 1, 2, 3]);
    }

    #[test]
    fn delete_task_compacts_positions() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let todo = &board.columns[0].id;
        let ids: Vec<String> = ["A", "B", "C", "D"]
            .iter()
            .map(|title| create_task(&state, "owner", &task_request(todo, title)).unwrap().id)
            .collect();

        delete_task(&state, &ids[1], "owner").unwrap();

        let snapshot = state.boards.board_snapshot(&board.project_id).unwrap();
        assert_eq!(
            snapshot.task_order(todo),
            vec![ids[0].clone(), ids[2].clone(), ids[3].clone()]
        );
        assert_eq!(positions(&state, &board.project_id, todo), vec![0, 1, 2]);
        assert!(matches!(
            get_task(&state, &ids[1], "owner"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn labels_are_normalized_and_validated() {
        let labels = normalize_labels(&[
            " backend ".to_string(),
            "".to_string(),
            "backend".to_string(),
            "v1.2".to_string(),
        ])
        .unwrap();
        assert_eq!(labels.into_iter().collect::<Vec<_>>(), vec!["backend", "v1.2"]);
        assert!(normalize_labels(&["<script>".to_string()]).is_err());
    }

    #[test]
    fn update_task_replaces_fields_but_not_position() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let todo = &board.columns[0].id;
        create_task(&state, "owner", &task_request(todo, "A")).unwrap();
        let task = create_task(&state, "owner", &task_request(todo, "B")).unwrap();

        let due = NaiveDate::from_ymd_opt(2030, 1, 15).unwrap();
        let updated = update_task(
            &state,
            &task.id,
            "owner",
            &TaskUpdateRequest {
                title: "B renamed".to_string(),
                description: Some("details".to_string()),
                priority: TaskPriority::High,
                status: TaskStatus::InProgress,
                labels: vec!["ui".to_string()],
                due_date: Some(due),
                assignee_id: Some(" editor ".to_string()),
            },
        )
        .unwrap();

        assert_eq!(updated.title, "B renamed");
        assert_eq!(updated.assignee_id.as_deref(), Some("editor"));
        assert_eq!(updated.priority, TaskPriority::High);
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.due_date, Some(due));
        assert_eq!(updated.position, 1);
        assert_eq!(updated.column_id, *todo);
    }

    #[test]
    fn viewer_cannot_mutate_editor_can() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let todo = &board.columns[0].id;
        join(&state, &board.project_id, "viewer", "VIEWER");
        join(&state, &board.project_id, "editor", "EDITOR");

        assert_eq!(
            create_task(&state, "viewer", &task_request(todo, "Nope")),
            Err(ServiceError::Forbidden)
        );
        let task = create_task(&state, "editor", &task_request(todo, "Yes")).unwrap();
        assert!(get_task(&state, &task.id, "viewer").is_ok());
        assert_eq!(
            delete_task(&state, &task.id, "viewer"),
            Err(ServiceError::Forbidden)
        );
        // task deletion is not owner-restricted
        delete_task(&state, &task.id, "editor").unwrap();
    }

    #[test]
    fn private_board_hidden_public_board_readable() {
        let state = AppState::in_memory();
        let private = project(&state, Visibility::Private);
        let public = project(&state, Visibility::Public);

        assert_eq!(
            get_board(&state, &private.project_id, "stranger"),
            Err(ServiceError::Forbidden)
        );
        assert!(get_board(&state, &public.project_id, "stranger").is_ok());
        assert_eq!(
            create_column(
                &state,
                &public.project_id,
                "stranger",
                &ColumnRequest { name: "Mine".to_string() }
            ),
            Err(ServiceError::Forbidden)
        );
        assert_eq!(list_public_projects(&state).unwrap().len(), 1);
    }

    #[test]
    fn delete_project_is_owner_only_and_cascades() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let todo = &board.columns[0].id;
        let task = create_task(&state, "owner", &task_request(todo, "A")).unwrap();
        join(&state, &board.project_id, "editor", "EDITOR");

        assert_eq!(
            delete_project(&state, &board.project_id, "editor"),
            Err(ServiceError::Forbidden)
        );

        delete_project(&state, &board.project_id, "owner").unwrap();

        let snapshot = state.boards.snapshot_state().unwrap();
        assert!(snapshot.projects.is_empty());
        assert!(snapshot.columns.is_empty());
        assert!(!snapshot.tasks.contains_key(&task.id));
        assert!(state.collaborations.all().unwrap().is_empty());
    }

    #[test]
    fn column_lifecycle_keeps_positions_dense() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let review = create_column(
            &state,
            &board.project_id,
            "owner",
            &ColumnRequest { name: "Review".to_string() },
        )
        .unwrap();
        assert_eq!(review.position, 3);

        let moved = move_column(&state, &review.id, "owner", &MoveColumnRequest { position: 1 })
            .unwrap();
        let names: Vec<&str> = moved.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["To Do", "Review", "In Progress", "Done"]);

        let renamed = rename_column(
            &state,
            &review.id,
            "owner",
            &ColumnRequest { name: "QA".to_string() },
        )
        .unwrap();
        assert_eq!(renamed.name, "QA");

        let todo = &board.columns[0].id;
        create_task(&state, "owner", &task_request(todo, "A")).unwrap();
        let after = delete_column(&state, todo, "owner").unwrap();
        let column_positions: Vec<usize> = after.columns.iter().map(|c| c.position).collect();
        assert_eq!(column_positions, vec![0, 1, 2]);
        assert!(state.boards.snapshot_state().unwrap().tasks.is_empty());
    }

    #[test]
    fn listing_splits_owned_and_collaborated() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        join(&state, &board.project_id, "editor", "EDITOR");

        let owner_view = list_projects(&state, "owner").unwrap();
        assert_eq!(owner_view.owned.len(), 1);
        assert!(owner_view.collaborated.is_empty());

        let editor_view = list_projects(&state, "editor").unwrap();
        assert!(editor_view.owned.is_empty());
        assert_eq!(editor_view.collaborated[0].id, board.project_id);
    }

    fn tagged(name: &str, description: &str, tags: &[&str], technologies: &[&str]) -> ProjectRequest {
        ProjectRequest {
            name: name.to_string(),
            description: Some(description.to_string()),
            visibility: Some(Visibility::Public),
            tags: Some(tags.iter().map(|tag| tag.to_string()).collect()),
            technologies: Some(technologies.iter().map(|tech| tech.to_string()).collect()),
            repository_url: None,
        }
    }

    #[test]
    fn search_matches_public_projects_by_text_and_sets() {
        let state = AppState::in_memory();
        let compiler = create_project(
            &state,
            "owner",
            &tagged("Compiler", "A toy LANGUAGE", &["education"], &["Rust", "LLVM"]),
        )
        .unwrap();
        create_project(&state, "owner", &tagged("Website", "Landing page", &["web"], &["React"]))
            .unwrap();
        let mut hidden = tagged("Secret compiler", "", &["education"], &["Rust"]);
        hidden.visibility = Some(Visibility::Private);
        create_project(&state, "owner", &hidden).unwrap();

        let search = |q: Option<&str>, tags: Option<&str>, technologies: Option<&str>| {
            search_projects(
                &state,
                &ProjectSearchQuery {
                    q: q.map(str::to_string),
                    tags: tags.map(str::to_string),
                    technologies: technologies.map(str::to_string),
                },
            )
            .unwrap()
            .into_iter()
            .map(|project| project.name)
            .collect::<Vec<_>>()
        };

        assert_eq!(search(None, None, None), vec!["Compiler", "Website"]);
        assert_eq!(search(Some("language"), None, None), vec!["Compiler"]);
        assert_eq!(search(Some("compiler"), None, None), vec!["Compiler"]);
        assert_eq!(search(None, Some("education"), Some("rust, llvm")), vec!["Compiler"]);
        assert!(search(None, None, Some("Rust,React")).is_empty());
        assert_eq!(compiler.technologies.len(), 2);
    }

    #[test]
    fn project_metadata_updates_only_when_given() {
        let state = AppState::in_memory();
        let created = create_project(
            &state,
            "owner",
            &ProjectRequest {
                repository_url: Some("https://git.example.com/board".to_string()),
                ..tagged("Board", "", &["kanban"], &["Rust"])
            },
        )
        .unwrap();
        assert_eq!(created.repository_url.as_deref(), Some("https://git.example.com/board"));

        let renamed = update_project(
            &state,
            &created.id,
            "owner",
            &ProjectRequest {
                name: "Board v2".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(renamed.tags, created.tags);
        assert_eq!(renamed.repository_url, created.repository_url);

        let retagged = update_project(
            &state,
            &created.id,
            "owner",
            &ProjectRequest {
                name: "Board v2".to_string(),
                tags: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(retagged.tags.is_empty());

        assert!(matches!(
            create_project(
                &state,
                "owner",
                &ProjectRequest {
                    repository_url: Some("not a url".to_string()),
                    ..tagged("Bad", "", &[], &[])
                },
            ),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn task_listings_follow_board_order() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let todo = &board.columns[0].id;
        let done = &board.columns[2].id;
        let a = create_task(&state, "owner", &task_request(todo, "A")).unwrap();
        let b = create_task(&state, "owner", &task_request(todo, "B")).unwrap();
        let c = create_task(&state, "owner", &task_request(done, "C")).unwrap();
        let first = create_task(
            &state,
            "owner",
            &TaskRequest {
                position: Some(0),
                ..task_request(todo, "First")
            },
        )
        .unwrap();

        let column: Vec<String> = list_tasks_by_column(&state, todo, "owner")
            .unwrap()
            .into_iter()
            .map(|task| task.id)
            .collect();
        assert_eq!(column, vec![first.id.clone(), a.id.clone(), b.id.clone()]);

        let all: Vec<String> = list_tasks_by_project(&state, &board.project_id, "owner")
            .unwrap()
            .into_iter()
            .map(|task| task.id)
            .collect();
        assert_eq!(all, vec![first.id, a.id, b.id, c.id]);

        assert_eq!(
            list_tasks_by_column(&state, todo, "stranger"),
            Err(ServiceError::Forbidden)
        );
        assert!(matches!(
            list_tasks_by_project(&state, "missing", "owner"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn column_and_project_deletes_drop_comments() {
        let state = AppState::in_memory();
        let board = project(&state, Visibility::Private);
        let todo = &board.columns[0].id;
        let done = &board.columns[2].id;
        let in_todo = create_task(&state, "owner", &task_request(todo, "A")).unwrap();
        let in_done = create_task(&state, "owner", &task_request(done, "B")).unwrap();
        for task_id in [&in_todo.id, &in_done.id] {
            comment_service::add_comment(
                &state,
                task_id,
                "owner",
                &CommentRequest {
                    content: "note".to_string(),
                },
            )
            .unwrap();
        }

        delete_column(&state, todo, "owner").unwrap();
        let remaining: Vec<String> = state
            .boards
            .snapshot_state()
            .unwrap()
            .comments
            .values()
            .map(|comment| comment.task_id.clone())
            .collect();
        assert_eq!(remaining, vec![in_done.id.clone()]);

        delete_project(&state, &board.project_id, "owner").unwrap();
        assert!(state.boards.snapshot_state().unwrap().comments.is_empty());
    }
}
