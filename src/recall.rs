//! Spaced-repetition bookkeeping for study tasks.
//!
//! A study task stores its schedule as a JSON array of timestamps in
//! `recalls` and the last review time in `last_recall`.

use chrono::{Duration, NaiveDateTime};

use crate::dates::parse_due_date;
use crate::db::models::{Task, TaskType};
use crate::error::Result;

/// Day offsets of the schedule generated for a new study task.
pub const RECALL_OFFSETS_DAYS: [i64; 3] = [0, 2, 5];

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_due_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

pub fn initial_schedule(now: NaiveDateTime) -> Vec<NaiveDateTime> {
    RECALL_OFFSETS_DAYS
        .iter()
        .map(|days| now + Duration::days(*days))
        .collect()
}

pub fn encode_schedule(schedule: &[NaiveDateTime]) -> Result<String> {
    let raw: Vec<String> = schedule.iter().map(|at| format_timestamp(*at)).collect();
    Ok(serde_json::to_string(&raw)?)
}

/// Decode a task's schedule. Missing or malformed data yields an empty
/// schedule; individual unparseable entries are skipped.
pub fn parse_schedule(task: &Task) -> Vec<NaiveDateTime> {
    let Some(raw) = task.recalls.as_deref() else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(entries) => {
            let mut schedule: Vec<NaiveDateTime> =
                entries.iter().filter_map(|e| parse_timestamp(e)).collect();
            schedule.sort();
            schedule
        },
        Err(e) => {
            tracing::debug!(task_id = task.id, error = %e, "Malformed recall schedule ignored");
            Vec::new()
        },
    }
}

/// The first scheduled recall after the last one performed.
pub fn next_recall(task: &Task) -> Option<NaiveDateTime> {
    let last = task.last_recall.as_deref().and_then(parse_timestamp);
    parse_schedule(task)
        .into_iter()
        .find(|at| last.is_none_or(|l| *at > l))
}

/// Unfinished study tasks whose next recall is due at or before `now`.
pub fn due_for_recall(tasks: &[Task], now: NaiveDateTime) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.task_type == TaskType::Study && !t.status.is_done())
        .filter(|t| next_recall(t).is_some_and(|at| at <= now))
        .cloned()
        .collect()
}
