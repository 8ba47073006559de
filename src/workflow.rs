//! Workflow facade.
//!
//! Owns the in-memory task collection for the loaded scope and is its only
//! writer. Mutations go to the store first, are applied locally, and are then
//! reconciled by reloading the scope. Failures never escape: they are kept as
//! an [`ErrorResponse`] readable through [`Workflow::error`].

use chrono::{NaiveDate, NaiveDateTime};

use crate::backend::TaskStore;
use crate::dates::{bucket, overdue, upcoming, Buckets, DEFAULT_UPCOMING_DAYS};
use crate::db::models::{Task, TaskDraft, TaskNode, TaskPatch, TaskType};
use crate::error::{ErrorResponse, PlannerError, Result};
use crate::filter::{filter, group_by_status, DashboardFilter, FilterSpec};
use crate::recall::{due_for_recall, format_timestamp};
use crate::report::{dashboard, overview, Overview};
use crate::status::{self, legal_next_statuses, Role, Status};
use crate::tree::organize;

/// Which slice of the store the facade mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    Category(i64),
}

pub struct Workflow<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
    scope: Scope,
    error: Option<ErrorResponse>,
    upcoming_days: u32,
}

impl<S: TaskStore> Workflow<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            scope: Scope::All,
            error: None,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
        }
    }

    pub fn with_upcoming_days(mut self, days: u32) -> Self {
        self.upcoming_days = days;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Error left by the last failed operation, if any.
    pub fn error(&self) -> Option<&ErrorResponse> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn fail(&mut self, context: &str, err: PlannerError) {
        let err = if err.is_transport() {
            PlannerError::Transport(format!("Error {}: {}", context, err))
        } else {
            err
        };
        crate::log_error!(err, context);
        self.error = Some(err.to_error_response());
    }

    fn replace(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.push(task),
        }
    }

    fn require(&self, id: i64) -> Result<&Task> {
        self.task(id).ok_or(PlannerError::TaskNotFound(id))
    }

    // ── Loading ─────────────────────────────────────────────────────

    async fn fetch(&self, scope: Scope) -> Result<Vec<Task>> {
        match scope {
            Scope::All => self.store.list_all().await,
            Scope::Category(id) => self.store.list_by_category(id).await,
        }
    }

    async fn load(&mut self, scope: Scope) -> bool {
        self.error = None;
        match self.fetch(scope).await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), ?scope, "Tasks loaded");
                self.tasks = tasks;
                self.scope = scope;
                true
            },
            Err(e) => {
                self.fail("loading tasks", e);
                false
            },
        }
    }

    /// Replace the collection with every task. On failure the previous
    /// collection and scope are kept.
    pub async fn load_all(&mut self) -> bool {
        self.load(Scope::All).await
    }

    pub async fn load_by_category(&mut self, category_id: i64) -> bool {
        self.load(Scope::Category(category_id)).await
    }

    /// Re-fetch the active scope.
    pub async fn reload(&mut self) -> bool {
        self.load(self.scope).await
    }

    /// Reconcile after a mutation. A failed refresh keeps the optimistic state.
    async fn reconcile(&mut self) {
        match self.fetch(self.scope).await {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => self.fail("refreshing tasks", e),
        }
    }

    // ── Mutations ───────────────────────────────────────────────────

    async fn create(&mut self, draft: TaskDraft) -> Option<Task> {
        self.error = None;
        match self.store.create(draft).await {
            Ok(task) => {
                crate::log_task_operation!("create", task.id);
                self.tasks.push(task.clone());
                self.reconcile().await;
                Some(task)
            },
            Err(e) => {
                self.fail("creating task", e);
                None
            },
        }
    }

    pub async fn create_main(&mut self, draft: TaskDraft) -> Option<Task> {
        self.create(TaskDraft {
            parent_id: None,
            ..draft
        })
        .await
    }

    pub async fn create_subtask(
        &mut self,
        parent_id: i64,
        category_id: i64,
        draft: TaskDraft,
    ) -> Option<Task> {
        self.create(TaskDraft {
            parent_id: Some(parent_id),
            category_id: Some(category_id),
            ..draft
        })
        .await
    }

    pub async fn update(&mut self, id: i64, patch: TaskPatch) -> Option<Task> {
        self.error = None;
        match self.store.update(id, patch).await {
            Ok(task) => {
                crate::log_task_operation!("update", task.id);
                self.replace(task.clone());
                self.reconcile().await;
                Some(task)
            },
            Err(e) => {
                self.fail("updating task", e);
                None
            },
        }
    }

    async fn write_status(&mut self, id: i64, to: Status) -> Option<Task> {
        match self.store.set_status(id, to).await {
            Ok(task) => {
                crate::log_task_operation!("change_status", task.id, to.as_str());
                self.replace(task.clone());
                self.reconcile().await;
                Some(task)
            },
            Err(e) => {
                self.fail("changing task status", e);
                None
            },
        }
    }

    /// Move a task to `to` if the transition table allows it. Unknown tasks
    /// and illegal requests are rejected without touching the store.
    pub async fn change_status(&mut self, id: i64, to: Status) -> Option<Task> {
        self.error = None;
        let checked = self.require(id).and_then(|task| status::transition(task, to));
        if let Err(e) = checked {
            self.fail("changing task status", e);
            return None;
        }
        self.write_status(id, to).await
    }

    /// Flip between `done` and `to_do`, for any role.
    pub async fn toggle_complete(&mut self, id: i64) -> Option<Task> {
        self.error = None;
        let to = match self.require(id) {
            Ok(task) => status::toggle_complete(task.status),
            Err(e) => {
                self.fail("changing task status", e);
                return None;
            },
        };
        self.write_status(id, to).await
    }

    /// Delete a task; its subtasks leave the collection with it.
    pub async fn remove(&mut self, id: i64) -> bool {
        self.error = None;
        match self.store.delete(id).await {
            Ok(()) => {
                crate::log_task_operation!("remove", id);
                self.tasks.retain(|t| t.id != id && t.parent_id != Some(id));
                self.reconcile().await;
                true
            },
            Err(e) => {
                self.fail("deleting task", e);
                false
            },
        }
    }

    /// Mark a study task as reviewed at `now`. The schedule is kept.
    pub async fn record_recall(&mut self, id: i64, now: NaiveDateTime) -> Option<Task> {
        self.error = None;
        let recalls = match self.require(id) {
            Ok(task) if task.task_type == TaskType::Study => task.recalls.clone(),
            Ok(_) => {
                self.fail(
                    "recording recall",
                    PlannerError::InvalidInput(format!("Task {} is not a study task", id)),
                );
                return None;
            },
            Err(e) => {
                self.fail("recording recall", e);
                return None;
            },
        };

        match self
            .store
            .update_recall(id, Some(format_timestamp(now)), recalls)
            .await
        {
            Ok(task) => {
                crate::log_task_operation!("record_recall", task.id);
                self.replace(task.clone());
                self.reconcile().await;
                Some(task)
            },
            Err(e) => {
                self.fail("recording recall", e);
                None
            },
        }
    }

    // ── Derived views ───────────────────────────────────────────────

    /// Statuses the task may move to next; empty for unknown ids.
    pub fn available_transitions(&self, id: i64) -> Vec<Status> {
        self.task(id)
            .map(|task| legal_next_statuses(Role::of(task), task.status).to_vec())
            .unwrap_or_default()
    }

    pub fn tree(&self) -> Vec<TaskNode> {
        organize(&self.tasks)
    }

    pub fn filtered(&self, spec: &FilterSpec) -> Vec<Task> {
        filter(&self.tasks, spec)
    }

    /// Filter first, then organize what is left.
    pub fn filtered_tree(&self, spec: &FilterSpec) -> Vec<TaskNode> {
        organize(&filter(&self.tasks, spec))
    }

    pub fn buckets(&self) -> Buckets<Task> {
        bucket(&self.tasks)
    }

    pub fn overdue(&self, today: NaiveDate) -> Vec<Task> {
        overdue(&self.tasks, today)
    }

    pub fn upcoming(&self, today: NaiveDate) -> Vec<Task> {
        upcoming(&self.tasks, today, self.upcoming_days)
    }

    pub fn dashboard(&self, filter: &DashboardFilter) -> Buckets<TaskNode> {
        dashboard(&self.tasks, filter)
    }

    pub fn overview(&self, today: NaiveDate) -> Overview {
        overview(&self.tasks, today, self.upcoming_days)
    }

    pub fn by_status(&self) -> Vec<(Status, Vec<Task>)> {
        group_by_status(&self.tasks)
    }

    pub fn due_for_recall(&self, now: NaiveDateTime) -> Vec<Task> {
        due_for_recall(&self.tasks, now)
    }
}
