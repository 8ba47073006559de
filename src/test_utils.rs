#[cfg(test)]
pub mod test_helpers {
    use crate::db::models::{Task, TaskType};
    use crate::db::{create_pool, run_migrations};
    use crate::status::Status;
    use chrono::{TimeZone, Utc};
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    pub struct TestContext {
        pub pool: SqlitePool,
        pub _temp_dir: TempDir,
    }

    impl TestContext {
        pub async fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let db_path = temp_dir.path().join("planner.db");

            let pool = create_pool(&db_path).await.unwrap();
            run_migrations(&pool).await.unwrap();

            Self {
                pool,
                _temp_dir: temp_dir,
            }
        }

        pub fn pool(&self) -> &SqlitePool {
            &self.pool
        }
    }

    /// Fixture builder for in-memory tasks.
    pub struct TaskBuilder {
        task: Task,
    }

    pub fn task(id: i64) -> TaskBuilder {
        TaskBuilder {
            task: Task {
                id,
                title: format!("Task {}", id),
                description: None,
                status: Status::ToDo,
                category_id: None,
                parent_id: None,
                due_date: None,
                task_type: TaskType::Project,
                last_recall: None,
                recalls: None,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                updated_at: None,
            },
        }
    }

    impl TaskBuilder {
        pub fn title(mut self, title: &str) -> Self {
            self.task.title = title.to_string();
            self
        }

        pub fn description(mut self, description: &str) -> Self {
            self.task.description = Some(description.to_string());
            self
        }

        pub fn status(mut self, status: Status) -> Self {
            self.task.status = status;
            self
        }

        pub fn parent(mut self, parent_id: i64) -> Self {
            self.task.parent_id = Some(parent_id);
            self
        }

        pub fn category(mut self, category_id: i64) -> Self {
            self.task.category_id = Some(category_id);
            self
        }

        pub fn due(mut self, due_date: &str) -> Self {
            self.task.due_date = Some(due_date.to_string());
            self
        }

        pub fn kind(mut self, task_type: TaskType) -> Self {
            self.task.task_type = task_type;
            self
        }

        pub fn recalls(mut self, last_recall: &str, recalls: &str) -> Self {
            self.task.last_recall = Some(last_recall.to_string());
            self.task.recalls = Some(recalls.to_string());
            self
        }

        pub fn build(self) -> Task {
            self.task
        }
    }

    pub fn ids<T: AsRef<Task>>(items: &[T]) -> Vec<i64> {
        items.iter().map(|t| t.as_ref().id).collect()
    }
}
