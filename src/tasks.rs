use chrono::{Local, Utc};
use sqlx::SqlitePool;

use crate::backend::TaskStore;
use crate::categories::CategoryRepository;
use crate::dates::normalize_due_date;
use crate::db::models::{Task, TaskDraft, TaskPatch, TaskRow, TaskType};
use crate::error::{PlannerError, Result};
use crate::recall::{encode_schedule, format_timestamp, initial_schedule};
use crate::status::Status;
use crate::tree::check_placement;

const TASK_COLUMNS: &str = "id, title, description, status, type, parent_id, category_id, \
                            due_date, last_recall, recalls, created_at, updated_at";

/// Fully resolved insert, derived from a draft and its category.
struct NewTask {
    title: String,
    description: Option<String>,
    status: Status,
    task_type: TaskType,
    parent_id: Option<i64>,
    category_id: Option<i64>,
    due_date: Option<String>,
    last_recall: Option<String>,
    recalls: Option<String>,
}

/// SQLite-backed task store.
pub struct TaskRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_task(&self, id: i64) -> Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE id = ?",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(PlannerError::TaskNotFound(id))?;

        Task::try_from(row)
    }

    pub async fn list_all(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    pub async fn list_by_category(&self, category_id: i64) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE category_id = ? ORDER BY id ASC",
            TASK_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    /// Look up a prospective parent. A missing one is bad input, not a
    /// missing target.
    async fn parent(&self, parent_id: i64) -> Result<Task> {
        self.get_task(parent_id).await.map_err(|e| match e {
            PlannerError::TaskNotFound(id) => {
                PlannerError::InvalidInput(format!("Parent task with id {} does not exist", id))
            },
            other => other,
        })
    }

    async fn has_subtasks(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE parent_id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Resolve type, initial status and recall schedule for a draft.
    async fn prepare(&self, draft: TaskDraft) -> Result<NewTask> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(PlannerError::InvalidInput(
                "Task title cannot be empty".to_string(),
            ));
        }

        let due_date = draft
            .due_date
            .as_deref()
            .map(normalize_due_date)
            .transpose()?;

        let task_type = match draft.category_id {
            Some(category_id) => CategoryRepository::new(self.pool)
                .get(category_id)
                .await?
                .category_type
                .task_type(),
            None => TaskType::Event,
        };

        if let Some(parent_id) = draft.parent_id {
            let parent = self.parent(parent_id).await?;
            check_placement(None, draft.category_id, &parent, false)?;
        }

        let base = NewTask {
            title,
            description: draft.description,
            status: Status::ToDo,
            task_type,
            parent_id: draft.parent_id,
            category_id: draft.category_id,
            due_date,
            last_recall: None,
            recalls: None,
        };

        match task_type {
            TaskType::Project if draft.parent_id.is_none() => Ok(NewTask {
                status: Status::NotInitialized,
                ..base
            }),
            TaskType::Project => Ok(base),
            TaskType::Study => {
                let now = Local::now().naive_local();
                Ok(NewTask {
                    last_recall: Some(format_timestamp(now)),
                    recalls: Some(encode_schedule(&initial_schedule(now))?),
                    ..base
                })
            },
            TaskType::Event => {
                if base.due_date.is_none() {
                    return Err(PlannerError::InvalidInput(
                        "Due date is required for event tasks".to_string(),
                    ));
                }
                Ok(NewTask {
                    parent_id: None,
                    category_id: None,
                    ..base
                })
            },
        }
    }

    pub async fn create(&self, draft: TaskDraft) -> Result<Task> {
        let new_task = self.prepare(draft).await?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, status, type, parent_id, category_id,
                               due_date, last_recall, recalls, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.status.as_str())
        .bind(new_task.task_type.as_str())
        .bind(new_task.parent_id)
        .bind(new_task.category_id)
        .bind(&new_task.due_date)
        .bind(&new_task.last_recall)
        .bind(&new_task.recalls)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        let task = self.get_task(result.last_insert_rowid()).await?;
        crate::log_task_operation!("task_created", task.id);
        Ok(task)
    }

    pub async fn update(&self, id: i64, patch: TaskPatch) -> Result<Task> {
        let task = self.get_task(id).await?;
        if patch.is_empty() {
            return Ok(task);
        }

        let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("UPDATE tasks SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(title) = &patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(PlannerError::InvalidInput(
                    "Task title cannot be empty".to_string(),
                ));
            }
            builder.push(", title = ").push_bind(title.to_string());
        }

        if let Some(description) = &patch.description {
            builder
                .push(", description = ")
                .push_bind(description.clone());
        }

        let category_id = patch.category_id.unwrap_or(task.category_id);
        let parent_id = patch.parent_id.unwrap_or(task.parent_id);
        let moved = patch.category_id.is_some() || patch.parent_id.is_some();
        let has_subtasks = moved && self.has_subtasks(id).await?;

        if let Some(Some(cid)) = patch.category_id {
            CategoryRepository::new(self.pool).get(cid).await?;
        }
        if let (true, Some(pid)) = (moved, parent_id) {
            let parent = self.parent(pid).await?;
            check_placement(Some(id), category_id, &parent, has_subtasks)?;
        }

        if let Some(category_id) = patch.category_id {
            builder.push(", category_id = ").push_bind(category_id);
        }
        if let Some(parent_id) = patch.parent_id {
            builder.push(", parent_id = ").push_bind(parent_id);
        }

        if let Some(due_date) = &patch.due_date {
            let due_date = due_date.as_deref().map(normalize_due_date).transpose()?;
            builder.push(", due_date = ").push_bind(due_date);
        }

        builder.push(" WHERE id = ").push_bind(task.id);

        let mut tx = self.pool.begin().await?;
        builder.build().execute(&mut *tx).await?;

        // Subtasks follow their main task into a new category.
        if has_subtasks && patch.category_id.is_some() {
            sqlx::query("UPDATE tasks SET category_id = ?, updated_at = ? WHERE parent_id = ?")
                .bind(category_id)
                .bind(Utc::now())
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        let task = self.get_task(id).await?;
        crate::log_task_operation!("task_updated", task.id);
        Ok(task)
    }

    pub async fn set_status(&self, id: i64, status: Status) -> Result<Task> {
        let result = sqlx::query("UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlannerError::TaskNotFound(id));
        }

        let task = self.get_task(id).await?;
        crate::log_task_operation!("task_status_changed", task.id, status.as_str());
        Ok(task)
    }

    pub async fn update_recall(
        &self,
        id: i64,
        last_recall: Option<String>,
        recalls: Option<String>,
    ) -> Result<Task> {
        let result = sqlx::query(
            "UPDATE tasks SET last_recall = ?, recalls = ?, updated_at = ? WHERE id = ?",
        )
        .bind(last_recall)
        .bind(recalls)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PlannerError::TaskNotFound(id));
        }

        self.get_task(id).await
    }

    /// Delete a task and its subtasks.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE parent_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(PlannerError::TaskNotFound(id));
        }

        tx.commit().await?;
        crate::log_task_operation!("task_deleted", id);
        Ok(())
    }
}

impl TaskStore for TaskRepository<'_> {
    fn list_all(&self) -> impl std::future::Future<Output = Result<Vec<Task>>> + Send {
        self.list_all()
    }

    fn list_by_category(
        &self,
        category_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Task>>> + Send {
        self.list_by_category(category_id)
    }

    fn create(&self, draft: TaskDraft) -> impl std::future::Future<Output = Result<Task>> + Send {
        self.create(draft)
    }

    fn update(
        &self,
        id: i64,
        patch: TaskPatch,
    ) -> impl std::future::Future<Output = Result<Task>> + Send {
        self.update(id, patch)
    }

    fn set_status(
        &self,
        id: i64,
        status: Status,
    ) -> impl std::future::Future<Output = Result<Task>> + Send {
        self.set_status(id, status)
    }

    fn delete(&self, id: i64) -> impl std::future::Future<Output = Result<()>> + Send {
        self.delete(id)
    }

    fn update_recall(
        &self,
        id: i64,
        last_recall: Option<String>,
        recalls: Option<String>,
    ) -> impl std::future::Future<Output = Result<Task>> + Send {
        self.update_recall(id, last_recall, recalls)
    }
}
