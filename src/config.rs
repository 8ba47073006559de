//! Runtime configuration from the environment.

use std::path::PathBuf;

use crate::dates::DEFAULT_UPCOMING_DAYS;
use crate::error::{PlannerError, Result};

pub const DB_PATH_ENV: &str = "PLANNER_DB_PATH";
pub const UPCOMING_DAYS_ENV: &str = "PLANNER_UPCOMING_DAYS";
pub const DEFAULT_CATEGORY_ENV: &str = "PLANNER_DEFAULT_CATEGORY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub db_path: PathBuf,
    /// Horizon of the upcoming view, in days.
    pub upcoming_days: u32,
    /// Category loaded when a command gives none.
    pub default_category: Option<i64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            upcoming_days: DEFAULT_UPCOMING_DAYS,
            default_category: None,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self> {
        let db_path = match std::env::var(DB_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path(),
        };

        let upcoming_days = match std::env::var(UPCOMING_DAYS_ENV) {
            Ok(raw) => raw.trim().parse::<u32>().map_err(|_| {
                PlannerError::InvalidInput(format!(
                    "{} must be a non-negative number of days, got '{}'",
                    UPCOMING_DAYS_ENV, raw
                ))
            })?,
            Err(_) => DEFAULT_UPCOMING_DAYS,
        };

        let default_category = match std::env::var(DEFAULT_CATEGORY_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<i64>().map_err(|_| {
                PlannerError::InvalidInput(format!(
                    "{} must be a category id, got '{}'",
                    DEFAULT_CATEGORY_ENV, raw
                ))
            })?),
            _ => None,
        };

        tracing::debug!(db_path = %db_path.display(), upcoming_days, "Configuration loaded");

        Ok(Self {
            db_path,
            upcoming_days,
            default_category,
        })
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("planner-engine"))
        .unwrap_or_else(|| PathBuf::from(".planner"))
        .join("planner.db")
}
