// board-collab-service/src/models/board.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// Columns seeded into every new project
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub technologies: BTreeSet<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
    // Display order; index == column position
    pub column_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Column {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub position: usize,
    // Display order; index == task position
    pub task_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub column_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub labels: BTreeSet<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    pub position: usize,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Request payloads

// Absent optional fields keep their current value on update
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub technologies: Option<Vec<String>>,
    #[serde(default)]
    pub repository_url: Option<String>,
}

// Public project search; list parameters are comma separated
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProjectSearchQuery {
    pub q: Option<String>,
    pub tags: Option<String>,
    pub technologies: Option<String>,
}

impl ProjectSearchQuery {
    pub fn tag_list(&self) -> Vec<String> {
        split_list(self.tags.as_deref())
    }

    pub fn technology_list(&self) -> Vec<String> {
        split_list(self.technologies.as_deref())
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ColumnRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MoveColumnRequest {
    pub position: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TaskRequest {
    pub column_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub labels: Option<Vec<String>>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    // Explicit destination index; appended when absent
    pub position: Option<i64>,
}

// Full replacement of a task's editable fields
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskUpdateRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub labels: Vec<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskComment {
    pub id: String,
    pub task_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommentRequest {
    pub content: String,
}

// HTTP body of a move; the task id travels in the path
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskMoveBody {
    pub target_column_id: String,
    pub target_position: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveTaskRequest {
    pub task_id: String,
    pub target_column_id: String,
    pub target_position: i64,
}

impl MoveTaskRequest {
    pub fn new(task_id: &str, target_column_id: &str, target_position: i64) -> Self {
        Self {
            task_id: task_id.to_string(),
            target_column_id: target_column_id.to_string(),
            target_position,
        }
    }
}

// Canonical board state returned to clients

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub id: String,
    pub name: String,
    pub position: usize,
    pub tasks: Vec<Task>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub project_id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub columns: Vec<ColumnView>,
}

impl BoardSnapshot {
    pub fn column(&self, column_id: &str) -> Option<&ColumnView> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    // Task ids of a column in display order
    pub fn task_order(&self, column_id: &str) -> Vec<String> {
        self.column(column_id)
            .map(|column| column.tasks.iter().map(|task| task.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn locate_task(&self, task_id: &str) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(column_index, column)| {
            column
                .tasks
                .iter()
                .position(|task| task.id == task_id)
                .map(|task_index| (column_index, task_index))
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProjectListing {
    pub owned: Vec<Project>,
    pub collaborated: Vec<Project>,
}
