//! Output helpers shared by the command handlers.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::backend::TaskStore;
use crate::context::PlannerContext;
use crate::db::models::{Task, TaskNode};
use crate::error::ErrorResponse;
use crate::status::Status;
use crate::tasks::TaskRepository;
use crate::workflow::Workflow;

pub type CliResult = std::result::Result<(), ErrorResponse>;

/// Build the facade and load one category, or every task.
pub async fn open_workflow(
    ctx: &PlannerContext,
    category: Option<i64>,
) -> std::result::Result<Workflow<TaskRepository<'_>>, ErrorResponse> {
    let mut wf = ctx.workflow();
    let loaded = match category {
        Some(category_id) => wf.load_by_category(category_id).await,
        None => wf.load_all().await,
    };
    settle(&wf, loaded.then_some(()))?;
    Ok(wf)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Get a status badge icon for task status
pub fn status_badge(status: Status) -> &'static str {
    match status {
        Status::Done => "✓",
        Status::InProgress => "→",
        Status::Recall => "↻",
        Status::Backlog => "…",
        Status::ToDo | Status::NotInitialized => "○",
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    let rendered = serde_json::to_string_pretty(value).map_err(crate::error::PlannerError::from)?;
    println!("{}", rendered);
    Ok(())
}

pub fn task_line(task: &Task) -> String {
    let mut line = format!(
        "{} #{} {} [{}]",
        status_badge(task.status),
        task.id,
        task.title,
        task.status
    );
    if let Some(due) = &task.due_date {
        line.push_str(&format!(" due {}", due));
    }
    line
}

pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("  (none)");
    }
    for task in tasks {
        println!("  {}", task_line(task));
    }
}

pub fn print_tree(roots: &[TaskNode]) {
    if roots.is_empty() {
        println!("No tasks.");
    }
    for root in roots {
        println!("{}", task_line(&root.task));
        let count = root.subtasks.len();
        for (i, sub) in root.subtasks.iter().enumerate() {
            let branch = if i + 1 == count { "└─" } else { "├─" };
            println!("  {} {}", branch, task_line(&sub.task));
        }
    }
}

/// Turn a facade outcome into a command result. A present outcome with a
/// pending error means only the refresh failed; that is reported as a
/// warning.
pub fn settle<S: TaskStore, T>(
    wf: &Workflow<S>,
    outcome: Option<T>,
) -> std::result::Result<T, ErrorResponse> {
    match (outcome, wf.error()) {
        (Some(value), None) => Ok(value),
        (Some(value), Some(err)) => {
            tracing::warn!(error = %err.error, "Task list may be stale");
            Ok(value)
        },
        (None, Some(err)) => Err(err.clone()),
        (None, None) => Err(ErrorResponse {
            error: "Operation failed".to_string(),
            code: "TRANSPORT_ERROR".to_string(),
        }),
    }
}
