//! Two-level task tree built from the flat task list.
//!
//! Roots live in an arena (`Vec<TaskNode>`) with an id -> index map, so
//! attaching a subtask is a single lookup and a corrupted `parent_id` can
//! never produce a cycle: only main tasks are ever indexed as parents.

use std::collections::{HashMap, HashSet};

use crate::db::models::{Task, TaskNode};
use crate::error::{PlannerError, Result};

/// Result of organizing a task list, with the subtasks that were left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    pub roots: Vec<TaskNode>,
    /// Ids of subtasks whose parent is not a main task in the input.
    pub orphans: Vec<i64>,
}

/// Organize tasks into main tasks with their subtasks. Orphans are dropped.
pub fn organize(tasks: &[Task]) -> Vec<TaskNode> {
    organize_with_orphans(tasks).roots
}

pub fn organize_with_orphans(tasks: &[Task]) -> Forest {
    let mut roots: Vec<TaskNode> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut seen: HashSet<i64> = HashSet::new();

    for task in tasks.iter().filter(|t| t.is_main()) {
        if !seen.insert(task.id) {
            tracing::warn!(task_id = task.id, "Duplicate task id ignored while organizing");
            continue;
        }
        index.insert(task.id, roots.len());
        roots.push(TaskNode::new(task.clone()));
    }

    let mut orphans = Vec::new();
    for task in tasks.iter().filter(|t| t.is_subtask()) {
        if !seen.insert(task.id) {
            tracing::warn!(task_id = task.id, "Duplicate task id ignored while organizing");
            continue;
        }
        let parent_id = task.parent_id.unwrap_or_default();
        match index.get(&parent_id) {
            Some(&slot) => roots[slot].subtasks.push(TaskNode::new(task.clone())),
            None => {
                tracing::debug!(
                    task_id = task.id,
                    parent_id,
                    "Orphan subtask excluded from tree"
                );
                orphans.push(task.id);
            },
        }
    }

    Forest { roots, orphans }
}

/// Flatten a forest back to tasks: each main task followed by its subtasks.
pub fn flatten(roots: &[TaskNode]) -> Vec<Task> {
    let mut out = Vec::new();
    for root in roots {
        out.push(root.task.clone());
        out.extend(root.subtasks.iter().map(|s| s.task.clone()));
    }
    out
}

/// Carry `is_expanded` over from a set of expanded main-task ids.
pub fn expand(roots: &mut [TaskNode], expanded: &HashSet<i64>) {
    for root in roots.iter_mut() {
        root.is_expanded = expanded.contains(&root.task.id);
    }
}

pub fn find<'a>(roots: &'a [TaskNode], id: i64) -> Option<&'a TaskNode> {
    roots.iter().find_map(|root| {
        if root.task.id == id {
            Some(root)
        } else {
            root.subtasks.iter().find(|s| s.task.id == id)
        }
    })
}

/// Check that a task may sit under `parent` with the given category.
///
/// `task_id` is `None` for a task that does not exist yet. Keeps the tree at
/// two levels and subtasks in their parent's category, so nothing written
/// through a store can become an orphan.
pub fn check_placement(
    task_id: Option<i64>,
    category_id: Option<i64>,
    parent: &Task,
    has_subtasks: bool,
) -> Result<()> {
    if task_id == Some(parent.id) {
        return Err(PlannerError::InvalidInput(
            "A task cannot be its own parent".to_string(),
        ));
    }
    if parent.is_subtask() {
        return Err(PlannerError::InvalidInput(format!(
            "Task {} is a subtask and cannot have subtasks",
            parent.id
        )));
    }
    if has_subtasks {
        return Err(PlannerError::InvalidInput(format!(
            "Task {} has subtasks and cannot become a subtask",
            task_id.unwrap_or_default()
        )));
    }
    if category_id != parent.category_id {
        return Err(PlannerError::InvalidInput(format!(
            "Subtask category must match its parent task {}",
            parent.id
        )));
    }
    Ok(())
}
