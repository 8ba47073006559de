//! Task store abstraction.
//!
//! The workflow facade only talks to storage through this trait. The SQLite
//! repository and the in-memory store both implement it; any other
//! persistence service can be plugged in the same way.

use std::future::Future;

use crate::db::models::{Task, TaskDraft, TaskPatch};
use crate::error::Result;
use crate::status::Status;

/// Asynchronous task persistence. Every call may fail; the facade treats all
/// failures uniformly as transport errors.
pub trait TaskStore: Send + Sync {
    // ── Read ────────────────────────────────────────────────────────

    fn list_all(&self) -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn list_by_category(&self, category_id: i64)
        -> impl Future<Output = Result<Vec<Task>>> + Send;

    // ── Write ───────────────────────────────────────────────────────

    fn create(&self, draft: TaskDraft) -> impl Future<Output = Result<Task>> + Send;

    fn update(&self, id: i64, patch: TaskPatch) -> impl Future<Output = Result<Task>> + Send;

    fn set_status(&self, id: i64, status: Status) -> impl Future<Output = Result<Task>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<()>> + Send;

    // ── Study ───────────────────────────────────────────────────────

    fn update_recall(
        &self,
        id: i64,
        last_recall: Option<String>,
        recalls: Option<String>,
    ) -> impl Future<Output = Result<Task>> + Send;
}
