use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{bucket, overdue, upcoming, Buckets};
use crate::db::models::{Task, TaskNode};
use crate::filter::DashboardFilter;
use crate::status::Status;
use crate::tree::organize;

/// Summary counters shown above the study and project boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub recall: usize,
    pub pending: usize,
    /// Rounded percentage of done tasks.
    pub completion_rate: u32,
    pub overdue: usize,
    pub upcoming: usize,
}

pub fn overview(tasks: &[Task], today: NaiveDate, horizon_days: u32) -> Overview {
    let total = tasks.len();
    let count = |status: Status| tasks.iter().filter(|t| t.status == status).count();
    let done = count(Status::Done);

    let completion_rate = if total == 0 {
        0
    } else {
        ((done as f64 / total as f64) * 100.0).round() as u32
    };

    Overview {
        total,
        done,
        in_progress: count(Status::InProgress),
        recall: count(Status::Recall),
        pending: total - done,
        completion_rate,
        overdue: overdue(tasks, today).len(),
        upcoming: upcoming(tasks, today, horizon_days).len(),
    }
}

/// Pending-work view: main tasks passing the membership maps, each with its
/// subtasks, split by due date.
pub fn dashboard(tasks: &[Task], filter: &DashboardFilter) -> Buckets<TaskNode> {
    let roots: Vec<TaskNode> = organize(tasks)
        .into_iter()
        .filter(|node| filter.matches(&node.task))
        .collect();
    bucket(&roots)
}
