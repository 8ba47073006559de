//! Due-date parsing, bucketing and the overdue/upcoming views.
//!
//! Due dates are calendar dates (`yyyy-MM-dd`). Values carrying a time of day
//! are accepted and truncated to their date. Anything that fails to parse is
//! treated as "no due date".

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::db::models::Task;
use crate::error::{PlannerError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_UPCOMING_DAYS: u32 = 7;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a stored due date into a calendar date.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Validate user input and return it in canonical `yyyy-MM-dd` form.
pub fn normalize_due_date(raw: &str) -> Result<String> {
    parse_due_date(raw)
        .map(format_due_date)
        .ok_or_else(|| PlannerError::InvalidInput(format!("Invalid due date '{}'", raw)))
}

/// Parsed due date of a task, if it has a valid one.
pub fn due_date_of(task: &Task) -> Option<NaiveDate> {
    let raw = task.due_date.as_deref()?;
    let parsed = parse_due_date(raw);
    if parsed.is_none() {
        tracing::debug!(task_id = task.id, due_date = raw, "Unparseable due date treated as absent");
    }
    parsed
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Buckets<T> {
    pub with_date: Vec<T>,
    pub without_date: Vec<T>,
}

impl<T> Buckets<T> {
    pub fn len(&self) -> usize {
        self.with_date.len() + self.without_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split into tasks with a valid due date (sorted ascending, stable) and the
/// rest.
pub fn bucket<T: AsRef<Task> + Clone>(items: &[T]) -> Buckets<T> {
    let mut dated: Vec<(NaiveDate, T)> = Vec::new();
    let mut without_date = Vec::new();

    for item in items {
        match due_date_of(item.as_ref()) {
            Some(date) => dated.push((date, item.clone())),
            None => without_date.push(item.clone()),
        }
    }

    dated.sort_by_key(|(date, _)| *date);

    Buckets {
        with_date: dated.into_iter().map(|(_, item)| item).collect(),
        without_date,
    }
}

/// Unfinished tasks due strictly before `today`.
pub fn overdue(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| !t.status.is_done())
        .filter(|t| due_date_of(t).is_some_and(|d| d < today))
        .cloned()
        .collect()
}

/// Unfinished tasks due within `[today, today + horizon_days]`.
pub fn upcoming(tasks: &[Task], today: NaiveDate, horizon_days: u32) -> Vec<Task> {
    let horizon = today
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .unwrap_or(NaiveDate::MAX);
    tasks
        .iter()
        .filter(|t| !t.status.is_done())
        .filter(|t| due_date_of(t).is_some_and(|d| d >= today && d <= horizon))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use crate::test_utils::test_helpers::{ids, task};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_due_date_formats() {
        assert_eq!(parse_due_date("2024-05-06"), Some(date("2024-05-06")));
        assert_eq!(parse_due_date("2024-05-06T12:00:00"), Some(date("2024-05-06")));
        assert_eq!(parse_due_date("2024-05-06T12:00:00.000Z"), Some(date("2024-05-06")));
        assert_eq!(
            parse_due_date("2024-05-06 09:30:00.123456"),
            Some(date("2024-05-06"))
        );
        assert_eq!(parse_due_date("next tuesday"), None);
        assert_eq!(parse_due_date("2024-02-30"), None);
        assert_eq!(parse_due_date("   "), None);
    }

    #[test]
    fn test_normalize_due_date() {
        assert_eq!(normalize_due_date("2024-05-06T12:00:00").unwrap(), "2024-05-06");
        assert!(matches!(
            normalize_due_date("soon"),
            Err(PlannerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_bucket_partitions_and_sorts() {
        let tasks = vec![
            task(1).due("2024-03-01").build(),
            task(2).build(),
            task(3).due("2024-01-15").build(),
            task(4).due("garbage").build(),
            task(5).due("2024-03-01").build(),
        ];
        let buckets = bucket(&tasks);
        assert_eq!(ids(&buckets.with_date), vec![3, 1, 5]);
        assert_eq!(ids(&buckets.without_date), vec![2, 4]);
        assert_eq!(buckets.len(), tasks.len());
    }

    #[test]
    fn test_bucket_with_date_is_sorted() {
        let tasks: Vec<Task> = [
            "2025-01-09", "2023-12-31", "2024-06-01", "2024-06-01", "2020-02-29",
        ]
        .iter()
        .enumerate()
        .map(|(i, d)| task(i as i64).due(d).build())
        .collect();
        let buckets = bucket(&tasks);
        let dates: Vec<NaiveDate> = buckets
            .with_date
            .iter()
            .filter_map(due_date_of)
            .collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        assert!(buckets.without_date.is_empty());
    }

    #[test]
    fn test_done_task_not_overdue() {
        let tasks = vec![
            task(1).status(Status::Done).due("2024-01-01").build(),
            task(2).build(),
        ];
        let today = date("2024-06-01");
        assert!(overdue(&tasks, today).is_empty());
        assert_eq!(ids(&bucket(&tasks).without_date), vec![2]);
    }

    #[test]
    fn test_overdue_is_strictly_before_today() {
        let tasks = vec![
            task(1).due("2024-05-31").build(),
            task(2).due("2024-06-01").build(),
            task(3).due("not a date").build(),
        ];
        assert_eq!(ids(&overdue(&tasks, date("2024-06-01"))), vec![1]);
    }

    #[test]
    fn test_upcoming_window_is_inclusive() {
        let tasks = vec![
            task(1).due("2024-06-01").build(),
            task(2).due("2024-06-08").build(),
            task(3).due("2024-06-09").build(),
            task(4).due("2024-05-31").build(),
            task(5).due("2024-06-03").status(Status::Done).build(),
        ];
        let today = date("2024-06-01");
        assert_eq!(
            ids(&upcoming(&tasks, today, DEFAULT_UPCOMING_DAYS)),
            vec![1, 2]
        );
        assert_eq!(ids(&upcoming(&tasks, today, 0)), vec![1]);
    }
}
