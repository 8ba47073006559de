use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{PlannerError, Result};
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Project,
    Study,
    Event,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Project, TaskType::Study, TaskType::Event];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Study => "study",
            Self::Event => "event",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "project" => Ok(Self::Project),
            "study" => Ok(Self::Study),
            "event" => Ok(Self::Event),
            _ => Err(PlannerError::InvalidInput(format!(
                "Invalid task type '{}'. Valid values: project, study, event",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_recall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recalls: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_main(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl AsRef<Task> for Task {
    fn as_ref(&self) -> &Task {
        self
    }
}

/// Raw `tasks` row. Status and type stay textual until converted so that
/// legacy values never fail decoding.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    #[sqlx(rename = "type")]
    pub task_type: String,
    pub parent_id: Option<i64>,
    pub category_id: Option<i64>,
    pub due_date: Option<String>,
    pub last_recall: Option<String>,
    pub recalls: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRow> for Task {
    type Error = PlannerError;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            status: Status::normalize(&row.status),
            category_id: row.category_id,
            parent_id: row.parent_id,
            due_date: row.due_date,
            task_type: TaskType::parse(&row.task_type)?,
            last_recall: row.last_recall,
            recalls: row.recalls,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub due_date: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn due(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }
}

/// Partial update. `None` leaves a field unchanged; `Some(None)` clears a
/// nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<i64>>,
    pub parent_id: Option<Option<i64>>,
    pub due_date: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.parent_id.is_none()
            && self.due_date.is_none()
    }

    /// Apply to an in-memory task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(category_id) = self.category_id {
            task.category_id = category_id;
        }
        if let Some(parent_id) = self.parent_id {
            task.parent_id = parent_id;
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = due_date.clone();
        }
    }
}

/// A task with its ordered subtasks, as shown in tree views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<TaskNode>,
    pub is_expanded: bool,
}

impl TaskNode {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            subtasks: Vec::new(),
            is_expanded: false,
        }
    }

    pub fn id(&self) -> i64 {
        self.task.id
    }
}

impl AsRef<Task> for TaskNode {
    fn as_ref(&self) -> &Task {
        &self.task
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Project,
    Study,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Study => "study",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "project" => Ok(Self::Project),
            "study" => Ok(Self::Study),
            _ => Err(PlannerError::InvalidInput(format!(
                "Invalid category type '{}'. Valid values: project, study",
                s
            ))),
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            Self::Project => TaskType::Project,
            Self::Study => TaskType::Study,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Active,
    Pending,
    Completed,
    OnHold,
    Archived,
}

impl CategoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            "archived" => Ok(Self::Archived),
            _ => Err(PlannerError::InvalidInput(format!(
                "Invalid category status '{}'. Valid values: active, pending, completed, on_hold, archived",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub status: CategoryStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    pub category_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = PlannerError;

    fn try_from(row: CategoryRow) -> Result<Self> {
        Ok(Category {
            id: row.id,
            name: row.name,
            description: row.description,
            category_type: CategoryType::parse(&row.category_type)?,
            status: CategoryStatus::parse(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category_type: Option<CategoryType>,
    pub status: Option<CategoryStatus>,
}
