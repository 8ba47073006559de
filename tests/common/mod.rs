//! Common utilities for integration tests

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to the `planner` binary
///
/// Checks `CARGO_BIN_EXE_planner` first (set when building with a custom
/// target directory) and falls back to `cargo_bin`.
#[allow(deprecated)]
pub fn planner_binary() -> PathBuf {
    std::env::var("CARGO_BIN_EXE_planner")
        .map(PathBuf::from)
        .unwrap_or_else(|_| assert_cmd::cargo::cargo_bin("planner"))
}

/// An isolated database directory for CLI runs.
pub struct TestEnv {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("planner.db")
    }

    /// A `planner` command bound to this environment's database.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(planner_binary());
        cmd.env("PLANNER_DB_PATH", self.db_path())
            .env_remove("PLANNER_DEFAULT_CATEGORY")
            .env_remove("PLANNER_UPCOMING_DAYS")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run with `--json` and parse stdout. Panics if the command fails.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().arg("--json").args(args).output().unwrap();
        assert!(
            output.status.success(),
            "planner {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Create a category and return its id.
    pub fn category(&self, name: &str, kind: &str) -> i64 {
        self.json(&["category", "add", name, "--type", kind])["id"]
            .as_i64()
            .unwrap()
    }

    /// Create a task and return its id.
    pub fn add(&self, args: &[&str]) -> i64 {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        self.json(&full)["id"].as_i64().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_binary_exists() {
        let binary = planner_binary();
        assert!(binary.exists(), "planner binary should exist at {:?}", binary);
    }
}
