use chrono::Local;

use super::utils::{open_workflow, print_json, settle, task_line, CliResult};
use crate::context::PlannerContext;
use crate::db::models::{Task, TaskDraft, TaskPatch};
use crate::error::PlannerError;
use crate::status::Status;

fn report(task: &Task, verb: &str, json: bool) -> CliResult {
    if json {
        print_json(task)
    } else {
        println!("{} {}", verb, task_line(task));
        Ok(())
    }
}

pub async fn handle_add(
    ctx: &PlannerContext,
    title: String,
    description: Option<String>,
    category: Option<i64>,
    parent: Option<i64>,
    due: Option<String>,
    json: bool,
) -> CliResult {
    let mut wf = open_workflow(ctx, None).await?;
    let draft = TaskDraft {
        title,
        description,
        category_id: category,
        parent_id: None,
        due_date: due,
    };

    let created = match parent {
        Some(parent_id) => {
            let parent = wf.task(parent_id).ok_or_else(|| {
                PlannerError::InvalidInput(format!(
                    "Parent task with id {} does not exist",
                    parent_id
                ))
            })?;
            let category_id = category.or(parent.category_id).ok_or_else(|| {
                PlannerError::InvalidInput("A subtask needs a category".to_string())
            })?;
            wf.create_subtask(parent_id, category_id, draft).await
        },
        None => wf.create_main(draft).await,
    };

    let task = settle(&wf, created)?;
    report(&task, "Created", json)
}

pub async fn handle_edit(
    ctx: &PlannerContext,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    clear_due: bool,
    json: bool,
) -> CliResult {
    let patch = TaskPatch {
        title,
        description: description.map(Some),
        due_date: if clear_due { Some(None) } else { due.map(Some) },
        ..Default::default()
    };
    if patch.is_empty() {
        return Err(PlannerError::InvalidInput("Nothing to update".to_string()).into());
    }

    let mut wf = open_workflow(ctx, None).await?;
    let updated = wf.update(id, patch).await;
    let task = settle(&wf, updated)?;
    report(&task, "Updated", json)
}

pub async fn handle_status(ctx: &PlannerContext, id: i64, status: &str, json: bool) -> CliResult {
    let status = Status::parse(status)?;
    let mut wf = open_workflow(ctx, None).await?;
    let changed = wf.change_status(id, status).await;
    let task = settle(&wf, changed)?;
    report(&task, "Moved", json)
}

pub async fn handle_toggle(ctx: &PlannerContext, id: i64, json: bool) -> CliResult {
    let mut wf = open_workflow(ctx, None).await?;
    let toggled = wf.toggle_complete(id).await;
    let task = settle(&wf, toggled)?;
    report(&task, "Toggled", json)
}

pub async fn handle_next(ctx: &PlannerContext, id: i64, json: bool) -> CliResult {
    let wf = open_workflow(ctx, None).await?;
    let task = wf.task(id).ok_or(PlannerError::TaskNotFound(id))?;
    let next = wf.available_transitions(id);

    if json {
        return print_json(&serde_json::json!({
            "id": id,
            "status": task.status,
            "next": next,
        }));
    }

    println!("{}", task_line(task));
    if next.is_empty() {
        println!("No further transitions.");
    } else {
        let names: Vec<&str> = next.iter().map(|s| s.as_str()).collect();
        println!("Next: {}", names.join(", "));
    }
    Ok(())
}

pub async fn handle_recall(ctx: &PlannerContext, id: i64, json: bool) -> CliResult {
    let mut wf = open_workflow(ctx, None).await?;
    let recorded = wf.record_recall(id, Local::now().naive_local()).await;
    let task = settle(&wf, recorded)?;
    report(&task, "Reviewed", json)
}

pub async fn handle_rm(ctx: &PlannerContext, id: i64, json: bool) -> CliResult {
    let mut wf = open_workflow(ctx, None).await?;
    let removed = wf.remove(id).await;
    settle(&wf, removed.then_some(()))?;

    if json {
        print_json(&serde_json::json!({ "deleted": id }))
    } else {
        println!("Deleted task #{}", id);
        Ok(())
    }
}
