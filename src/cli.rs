use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

const LONG_ABOUT: &str = r#"
Planner - hierarchical tasks with a status workflow

Tasks are grouped into categories (project or study). Tasks without a
category are dated events. A main task may own subtasks; deeper nesting
is not allowed.

Common commands:
  planner tree                 Show the task hierarchy
  planner agenda               Overdue and upcoming work
  planner add "Title" --category 1
  planner status 4 in_progress
  planner next 4               Statuses task 4 may move to

Environment:
  PLANNER_DB_PATH              Database file
  PLANNER_UPCOMING_DAYS        Agenda horizon (default 7)
  PLANNER_DEFAULT_CATEGORY     Category shown when none is given
"#;

#[derive(Parser, Clone)]
#[command(name = "planner")]
#[command(about = "Hierarchical task planner with status workflow and date views")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results and logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Database file (overrides PLANNER_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Show main tasks with their subtasks
    Tree {
        #[arg(short, long)]
        category: Option<i64>,
    },

    /// List tasks matching filters
    ///
    /// Examples:
    ///   planner list --status in_progress
    ///   planner list --from 2024-06-01 --to 2024-06-30
    ///   planner list --search report
    List {
        #[arg(short, long)]
        category: Option<i64>,

        /// Only tasks in this status
        #[arg(short, long)]
        status: Option<String>,

        /// Earliest due date (yyyy-MM-dd)
        #[arg(long)]
        from: Option<String>,

        /// Latest due date (yyyy-MM-dd)
        #[arg(long)]
        to: Option<String>,

        /// Only tasks without a due date
        #[arg(long)]
        without_date: bool,

        /// Case-insensitive match on title or description
        #[arg(long)]
        search: Option<String>,
    },

    /// Overdue and upcoming tasks
    Agenda {
        #[arg(short, long)]
        category: Option<i64>,

        /// Upcoming horizon in days (overrides PLANNER_UPCOMING_DAYS)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Completion statistics
    Overview {
        #[arg(short, long)]
        category: Option<i64>,
    },

    /// Create a task
    ///
    /// Without --category the task is an event and needs --due.
    Add {
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        category: Option<i64>,

        /// Parent main task; creates a subtask
        #[arg(short, long)]
        parent: Option<i64>,

        /// Due date (yyyy-MM-dd)
        #[arg(long)]
        due: Option<String>,
    },

    /// Edit task fields
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Move a task to a new status
    Status { id: i64, status: String },

    /// Toggle a task between done and to_do
    Toggle { id: i64 },

    /// Show the statuses a task may move to
    Next { id: i64 },

    /// Record a study review now
    Recall { id: i64 },

    /// Delete a task and its subtasks
    Rm { id: i64 },

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommands),
}

#[derive(Subcommand, Clone)]
pub enum CategoryCommands {
    /// Create a category
    Add {
        name: String,

        #[arg(short = 't', long = "type", value_enum, default_value = "project")]
        category_type: CategoryKind,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// List categories
    List,

    /// Delete a category and all of its tasks
    Rm { id: i64 },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryKind {
    Project,
    Study,
}
