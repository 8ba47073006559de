//! Task list filtering.
//!
//! Predicates run in a fixed order: category, date, status, search term,
//! then the dashboard type/status membership maps. Each one can only reject.
//! A search term, when present, is the last predicate consulted: its verdict
//! is final and the membership maps are skipped for that task.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{due_date_of, parse_due_date};
use crate::db::models::{Task, TaskType};
use crate::status::Status;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub without_date: bool,
}

impl DateFilter {
    pub fn is_empty(&self) -> bool {
        !self.without_date && self.start_date.is_none() && self.end_date.is_none()
    }

    fn bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (
            self.start_date.as_deref().and_then(parse_due_date),
            self.end_date.as_deref().and_then(parse_due_date),
        )
    }
}

/// Boolean membership maps used by the dashboard. Keys missing from a map
/// count as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilter {
    pub types: HashMap<TaskType, bool>,
    pub statuses: HashMap<Status, bool>,
}

impl Default for DashboardFilter {
    fn default() -> Self {
        Self {
            types: TaskType::ALL.iter().map(|t| (*t, true)).collect(),
            statuses: Status::ALL.iter().map(|s| (*s, !s.is_done())).collect(),
        }
    }
}

impl DashboardFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.types.get(&task.task_type).copied().unwrap_or(false)
            && self.statuses.get(&task.status).copied().unwrap_or(false)
    }

    pub fn toggle_type(&mut self, task_type: TaskType) {
        let entry = self.types.entry(task_type).or_insert(false);
        *entry = !*entry;
    }

    pub fn toggle_status(&mut self, status: Status) {
        let entry = self.statuses.entry(status).or_insert(false);
        *entry = !*entry;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub date_filter: DateFilter,
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub dashboard: Option<DashboardFilter>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.status.is_none()
            && self.date_filter.is_empty()
            && self.search_term().is_none()
            && self.dashboard.is_none()
    }

    fn search_term(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_with(task, self.search_term().as_deref())
    }

    fn matches_with(&self, task: &Task, search: Option<&str>) -> bool {
        if let Some(category_id) = self.category_id {
            if task.category_id != Some(category_id) {
                return false;
            }
        }

        // Without-date, like a search term, decides on its own.
        if self.date_filter.without_date {
            return task.due_date.is_none();
        }

        if !matches_dates(&self.date_filter, task) {
            return false;
        }

        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }

        if let Some(needle) = search {
            return matches_search(task, needle);
        }

        self.dashboard.as_ref().is_none_or(|d| d.matches(task))
    }
}

fn matches_dates(filter: &DateFilter, task: &Task) -> bool {
    let (start, end) = filter.bounds();
    if filter.start_date.is_none() && filter.end_date.is_none() {
        return true;
    }

    let Some(due) = due_date_of(task) else {
        return false;
    };
    start.is_none_or(|s| due >= s) && end.is_none_or(|e| due <= e)
}

/// `needle` must already be lowercased.
fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

pub fn filter(tasks: &[Task], spec: &FilterSpec) -> Vec<Task> {
    let search = spec.search_term();
    tasks
        .iter()
        .filter(|t| spec.matches_with(t, search.as_deref()))
        .cloned()
        .collect()
}

/// Tasks split by type, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeGroups {
    pub project: Vec<Task>,
    pub study: Vec<Task>,
    pub event: Vec<Task>,
}

pub fn group_by_type(tasks: &[Task]) -> TypeGroups {
    let mut groups = TypeGroups::default();
    for task in tasks {
        match task.task_type {
            TaskType::Project => groups.project.push(task.clone()),
            TaskType::Study => groups.study.push(task.clone()),
            TaskType::Event => groups.event.push(task.clone()),
        }
    }
    groups
}

/// Board column order.
pub const STATUS_COLUMNS: [Status; 5] = [
    Status::ToDo,
    Status::InProgress,
    Status::Recall,
    Status::Done,
    Status::Backlog,
];

/// Tasks grouped into board columns; `not_initialized` lands in `to_do`.
pub fn group_by_status(tasks: &[Task]) -> Vec<(Status, Vec<Task>)> {
    STATUS_COLUMNS
        .iter()
        .map(|column| {
            let members = tasks
                .iter()
                .filter(|t| t.status.group() == *column)
                .cloned()
                .collect();
            (*column, members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{ids, task};

    fn sample() -> Vec<Task> {
        vec![
            task(1)
                .title("Quarterly report")
                .category(1)
                .due("2024-03-10")
                .build(),
            task(2)
                .title("Groceries")
                .description("milk, REPORT card")
                .category(2)
                .status(Status::Done)
                .build(),
            task(3)
                .title("Exam prep")
                .category(2)
                .kind(TaskType::Study)
                .status(Status::InProgress)
                .due("2024-04-01")
                .build(),
            task(4).title("Dentist").kind(TaskType::Event).due("2024-02-01").build(),
            task(5).title("Broken date").category(1).due("someday").build(),
        ]
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let tasks = sample();
        assert!(FilterSpec::default().is_empty());
        assert_eq!(filter(&tasks, &FilterSpec::default()), tasks);
    }

    #[test]
    fn test_category_filter() {
        let spec = FilterSpec {
            category_id: Some(2),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![2, 3]);
    }

    #[test]
    fn test_status_filter_is_exact() {
        let spec = FilterSpec {
            status: Some(Status::InProgress),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![3]);
    }

    #[test]
    fn test_without_date_ignores_bounds() {
        let spec = FilterSpec {
            date_filter: DateFilter {
                start_date: Some("2030-01-01".into()),
                end_date: None,
                without_date: true,
            },
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![2]);
    }

    #[test]
    fn test_without_date_verdict_skips_status_and_search() {
        // Task 2 is undated, done, and matches neither term.
        let spec = FilterSpec {
            status: Some(Status::InProgress),
            search_term: Some("dentist".into()),
            date_filter: DateFilter {
                without_date: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![2]);

        let other_category = FilterSpec {
            category_id: Some(1),
            ..spec
        };
        assert!(filter(&sample(), &other_category).is_empty());
    }

    #[test]
    fn test_date_range_drops_undated_and_out_of_range() {
        let spec = FilterSpec {
            date_filter: DateFilter {
                start_date: Some("2024-02-01".into()),
                end_date: Some("2024-03-10".into()),
                without_date: false,
            },
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![1, 4]);
    }

    #[test]
    fn test_open_ended_range() {
        let spec = FilterSpec {
            date_filter: DateFilter {
                start_date: Some("2024-03-01".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![1, 3]);
    }

    #[test]
    fn test_search_matches_title_or_description_case_insensitively() {
        let spec = FilterSpec {
            search_term: Some("report".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![1, 2]);
    }

    #[test]
    fn test_search_overrides_dashboard_maps() {
        // Pins current behavior: the search verdict is final, so the
        // membership maps that follow it are never consulted.
        let mut dashboard = DashboardFilter::default();
        dashboard.types.insert(TaskType::Project, false);
        let spec = FilterSpec {
            search_term: Some("REPORT".into()),
            dashboard: Some(dashboard.clone()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![1, 2]);

        let without_search = FilterSpec {
            dashboard: Some(dashboard),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &without_search)), vec![3, 4]);
    }

    #[test]
    fn test_search_still_gated_by_earlier_predicates() {
        let spec = FilterSpec {
            category_id: Some(1),
            search_term: Some("report".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample(), &spec)), vec![1]);
    }

    #[test]
    fn test_empty_search_term_ignored() {
        let spec = FilterSpec {
            search_term: Some(String::new()),
            ..Default::default()
        };
        assert!(spec.is_empty());
        assert_eq!(filter(&sample(), &spec).len(), 5);
    }

    #[test]
    fn test_dashboard_default_hides_done() {
        let filter_maps = DashboardFilter::default();
        let tasks = sample();
        let visible: Vec<i64> = tasks
            .iter()
            .filter(|t| filter_maps.matches(t))
            .map(|t| t.id)
            .collect();
        assert_eq!(visible, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_dashboard_toggle() {
        let mut maps = DashboardFilter::default();
        maps.toggle_status(Status::Done);
        maps.toggle_type(TaskType::Event);
        assert!(maps.statuses[&Status::Done]);
        assert_eq!(maps.types[&TaskType::Event], false);
    }

    #[test]
    fn test_group_by_type() {
        let groups = group_by_type(&sample());
        assert_eq!(ids(&groups.project), vec![1, 2, 5]);
        assert_eq!(ids(&groups.study), vec![3]);
        assert_eq!(ids(&groups.event), vec![4]);
    }

    #[test]
    fn test_group_by_status_folds_not_initialized() {
        let tasks = vec![
            task(1).status(Status::NotInitialized).build(),
            task(2).status(Status::Recall).build(),
            task(3).build(),
        ];
        let columns = group_by_status(&tasks);
        assert_eq!(columns[0].0, Status::ToDo);
        assert_eq!(ids(&columns[0].1), vec![1, 3]);
        assert_eq!(ids(&columns[2].1), vec![2]);
    }
}
