//! In-memory task store.
//!
//! Used by the facade tests and for embedding the engine without a
//! database. Applies the same creation and placement rules as the SQLite
//! store. Failures can be injected with [`MemoryTaskStore::fail_next`].

use std::collections::HashMap;

use chrono::{Local, Utc};
use tokio::sync::Mutex;

use crate::backend::TaskStore;
use crate::dates::normalize_due_date;
use crate::db::models::{Task, TaskDraft, TaskPatch, TaskType};
use crate::error::{PlannerError, Result};
use crate::recall::{encode_schedule, format_timestamp, initial_schedule};
use crate::status::Status;
use crate::tree::check_placement;

#[derive(Default)]
struct Inner {
    tasks: Vec<Task>,
    next_id: i64,
    /// Task type of each known category. Unlisted categories are projects.
    categories: HashMap<i64, TaskType>,
    /// Injected failures keyed by the call number they fire on.
    failures: Vec<(usize, String)>,
    calls: usize,
}

impl Inner {
    /// Count the call and fire an injected failure scheduled for it.
    fn begin(&mut self) -> Result<()> {
        self.calls += 1;
        match self.failures.iter().position(|(at, _)| *at == self.calls) {
            Some(pos) => Err(PlannerError::Transport(self.failures.remove(pos).1)),
            None => Ok(()),
        }
    }

    fn position(&self, id: i64) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(PlannerError::TaskNotFound(id))
    }

    fn parent(&self, parent_id: i64) -> Result<&Task> {
        self.tasks.iter().find(|t| t.id == parent_id).ok_or_else(|| {
            PlannerError::InvalidInput(format!("Parent task with id {} does not exist", parent_id))
        })
    }

    fn has_subtasks(&self, id: i64) -> bool {
        self.tasks.iter().any(|t| t.parent_id == Some(id))
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    inner: Mutex<Inner>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing tasks. New ids continue after the
    /// highest seeded id.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            inner: Mutex::new(Inner {
                tasks,
                next_id,
                ..Default::default()
            }),
        }
    }

    /// Register a category so tasks created in it get its type.
    pub fn with_category(mut self, category_id: i64, task_type: TaskType) -> Self {
        self.inner.get_mut().categories.insert(category_id, task_type);
        self
    }

    /// Make the next store call fail with a transport error.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.fail_after(0, message).await;
    }

    /// Let `skip` calls through, then fail the one after.
    pub async fn fail_after(&self, skip: usize, message: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        let at = inner.calls + skip + 1;
        inner.failures.push((at, message.into()));
    }

    /// Number of store calls made so far, failed ones included.
    pub async fn calls(&self) -> usize {
        self.inner.lock().await.calls
    }

    pub async fn snapshot(&self) -> Vec<Task> {
        self.inner.lock().await.tasks.clone()
    }

    pub async fn list_all(&self) -> Result<Vec<Task>> {
        let mut inner = self.inner.lock().await;
        inner.begin()?;
        Ok(inner.tasks.clone())
    }

    pub async fn list_by_category(&self, category_id: i64) -> Result<Vec<Task>> {
        let mut inner = self.inner.lock().await;
        inner.begin()?;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.category_id == Some(category_id))
            .cloned()
            .collect())
    }

    pub async fn create(&self, draft: TaskDraft) -> Result<Task> {
        let mut inner = self.inner.lock().await;
        inner.begin()?;

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
            Some(category_id) => inner
                .categories
                .get(&category_id)
                .copied()
                .unwrap_or(TaskType::Project),
            None => TaskType::Event,
        };
        if let Some(parent_id) = draft.parent_id {
            check_placement(None, draft.category_id, inner.parent(parent_id)?, false)?;
        }

        let mut status = Status::ToDo;
        let mut parent_id = draft.parent_id;
        let mut category_id = draft.category_id;
        let (mut last_recall, mut recalls) = (None, None);
        match task_type {
            TaskType::Project if parent_id.is_none() => status = Status::NotInitialized,
            TaskType::Project => {},
            TaskType::Study => {
                let now = Local::now().naive_local();
                last_recall = Some(format_timestamp(now));
                recalls = Some(encode_schedule(&initial_schedule(now))?);
            },
            TaskType::Event => {
                if due_date.is_none() {
                    return Err(PlannerError::InvalidInput(
                        "Due date is required for event tasks".to_string(),
                    ));
                }
                parent_id = None;
                category_id = None;
            },
        }

        inner.next_id += 1;
        let task = Task {
            id: inner.next_id,
            title,
            description: draft.description,
            status,
            category_id,
            parent_id,
            due_date,
            task_type,
            last_recall,
            recalls,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.tasks.push(task.clone());
        Ok(task)
    }

    pub async fn update(&self, id: i64, patch: TaskPatch) -> Result<Task> {
        let mut inner = self.inner.lock().await;
        inner.begin()?;
        let pos = inner.position(id)?;

        let mut patch = patch;
        if let Some(Some(due)) = &patch.due_date {
            patch.due_date = Some(Some(normalize_due_date(due)?));
        }

        let current = &inner.tasks[pos];
        let category_id = patch.category_id.unwrap_or(current.category_id);
        let parent_id = patch.parent_id.unwrap_or(current.parent_id);
        let moved = patch.category_id.is_some() || patch.parent_id.is_some();
        let has_subtasks = inner.has_subtasks(id);
        if let (true, Some(pid)) = (moved, parent_id) {
            check_placement(Some(id), category_id, inner.parent(pid)?, has_subtasks)?;
        }

        let now = Utc::now();
        if has_subtasks && patch.category_id.is_some() {
            for sub in inner.tasks.iter_mut().filter(|t| t.parent_id == Some(id)) {
                sub.category_id = category_id;
                sub.updated_at = Some(now);
            }
        }

        let task = &mut inner.tasks[pos];
        patch.apply_to(task);
        task.updated_at = Some(now);
        Ok(task.clone())
    }

    pub async fn set_status(&self, id: i64, status: Status) -> Result<Task> {
        let mut inner = self.inner.lock().await;
        inner.begin()?;
        let pos = inner.position(id)?;

        let task = &mut inner.tasks[pos];
        task.status = status;
        task.updated_at = Some(Utc::now());
        Ok(task.clone())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.begin()?;
        inner.position(id)?;
        inner
            .tasks
            .retain(|t| t.id != id && t.parent_id != Some(id));
        Ok(())
    }

    pub async fn update_recall(
        &self,
        id: i64,
        last_recall: Option<String>,
        recalls: Option<String>,
    ) -> Result<Task> {
        let mut inner = self.inner.lock().await;
        inner.begin()?;
        let pos = inner.position(id)?;

        let task = &mut inner.tasks[pos];
        task.last_recall = last_recall;
        task.recalls = recalls;
        task.updated_at = Some(Utc::now());
        Ok(task.clone())
    }
}

impl TaskStore for MemoryTaskStore {
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
