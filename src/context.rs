use std::path::PathBuf;

use sqlx::SqlitePool;

use crate::config::PlannerConfig;
use crate::db::{create_pool, run_migrations};
use crate::error::Result;
use crate::tasks::TaskRepository;
use crate::workflow::Workflow;

/// Open database plus the configuration it was opened with.
pub struct PlannerContext {
    pub config: PlannerConfig,
    pub pool: SqlitePool,
}

impl PlannerContext {
    /// Load configuration from the environment, apply a database path
    /// override, then open and migrate the database.
    pub async fn load(db_override: Option<PathBuf>) -> Result<Self> {
        let mut config = PlannerConfig::from_env()?;
        if let Some(path) = db_override {
            config.db_path = path;
        }
        Self::open(config).await
    }

    pub async fn open(config: PlannerConfig) -> Result<Self> {
        let pool = create_pool(&config.db_path).await?;
        run_migrations(&pool).await?;
        tracing::debug!(db_path = %config.db_path.display(), "Database ready");
        Ok(Self { config, pool })
    }

    pub fn workflow(&self) -> Workflow<TaskRepository<'_>> {
        Workflow::new(TaskRepository::new(&self.pool))
            .with_upcoming_days(self.config.upcoming_days)
    }
}
