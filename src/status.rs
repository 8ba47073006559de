//! Task statuses and the role-dependent transition tables.
//!
//! Legality checks and the "available actions" list shown to users both read
//! the same tables, so they cannot drift apart.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::db::models::{Task, TaskType};
use crate::error::{PlannerError, Result};

/// Canonical task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    NotInitialized,
    ToDo,
    InProgress,
    Backlog,
    Done,
    Recall,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::NotInitialized,
        Status::ToDo,
        Status::InProgress,
        Status::Backlog,
        Status::Done,
        Status::Recall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::ToDo => "to_do",
            Self::InProgress => "in_progress",
            Self::Backlog => "backlog",
            Self::Done => "done",
            Self::Recall => "recall",
        }
    }

    /// Strict parse: only canonical spellings are accepted.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "not_initialized" => Ok(Self::NotInitialized),
            "to_do" => Ok(Self::ToDo),
            "in_progress" => Ok(Self::InProgress),
            "backlog" => Ok(Self::Backlog),
            "done" => Ok(Self::Done),
            "recall" => Ok(Self::Recall),
            _ => Err(PlannerError::InvalidInput(format!(
                "Invalid status '{}'. Valid values: not_initialized, to_do, in_progress, backlog, done, recall",
                s
            ))),
        }
    }

    /// Lenient parse for values coming back from the store. Legacy aliases
    /// map to their closest canonical status and anything unknown becomes
    /// `to_do`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "not_initialized" => Self::NotInitialized,
            "to_do" | "todo" | "pending" => Self::ToDo,
            "in_progress" | "doing" => Self::InProgress,
            "backlog" | "on_hold" => Self::Backlog,
            "done" | "completed" => Self::Done,
            "recall" => Self::Recall,
            other => {
                tracing::debug!(status = other, "Unknown status normalized to to_do");
                Self::ToDo
            },
        }
    }

    /// Column used when grouping tasks on a board.
    pub fn group(&self) -> Status {
        match self {
            Self::NotInitialized => Self::ToDo,
            other => *other,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Status::normalize(&raw))
    }
}

/// Position of a task in the two-level hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Main,
    Subtask,
    /// Subtask of a study task; may additionally enter `recall`.
    StudySubtask,
}

impl Role {
    pub fn of(task: &Task) -> Self {
        match (task.parent_id, task.task_type) {
            (None, _) => Role::Main,
            (Some(_), TaskType::Study) => Role::StudySubtask,
            (Some(_), _) => Role::Subtask,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Subtask => "subtask",
            Self::StudySubtask => "study subtask",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type TransitionTable = &'static [(Status, &'static [Status])];

use Status::{Backlog, Done, InProgress, NotInitialized, Recall, ToDo};

const MAIN_TRANSITIONS: TransitionTable = &[
    (ToDo, &[InProgress]),
    (InProgress, &[Backlog, Done]),
    (Backlog, &[ToDo, InProgress]),
    (NotInitialized, &[ToDo]),
    (Done, &[]),
];

const SUBTASK_TRANSITIONS: TransitionTable = &[
    (ToDo, &[InProgress, Backlog, Done]),
    (InProgress, &[ToDo, Backlog, Done]),
    (Backlog, &[ToDo, InProgress]),
    (Done, &[ToDo, InProgress, Backlog]),
];

const STUDY_SUBTASK_TRANSITIONS: TransitionTable = &[
    (ToDo, &[InProgress, Backlog, Done]),
    (InProgress, &[ToDo, Backlog, Done, Recall]),
    (Backlog, &[ToDo, InProgress]),
    (Done, &[ToDo, InProgress, Backlog, Recall]),
    (Recall, &[InProgress, Done]),
];

fn table(role: Role) -> TransitionTable {
    match role {
        Role::Main => MAIN_TRANSITIONS,
        Role::Subtask => SUBTASK_TRANSITIONS,
        Role::StudySubtask => STUDY_SUBTASK_TRANSITIONS,
    }
}

fn lookup(role: Role, status: Status) -> Option<&'static [Status]> {
    table(role)
        .iter()
        .find(|(from, _)| *from == status)
        .map(|(_, next)| *next)
}

/// Statuses a task with `role` may move to from `status`. Rows missing from
/// the role's table fall back to the `to_do` row.
pub fn legal_next_statuses(role: Role, status: Status) -> &'static [Status] {
    lookup(role, status)
        .or_else(|| lookup(role, ToDo))
        .unwrap_or(&[])
}

pub fn is_legal(role: Role, from: Status, to: Status) -> bool {
    legal_next_statuses(role, from).contains(&to)
}

/// Validate a transition request, returning the target status when legal.
pub fn check_transition(role: Role, from: Status, to: Status) -> Result<Status> {
    if is_legal(role, from, to) {
        Ok(to)
    } else {
        Err(PlannerError::InvalidTransition { role, from, to })
    }
}

/// Validate a transition request for a concrete task.
pub fn transition(task: &Task, to: Status) -> Result<Status> {
    check_transition(Role::of(task), task.status, to)
}

/// Quick checkbox toggle. Bypasses the transition tables.
pub fn toggle_complete(status: Status) -> Status {
    if status.is_done() {
        Status::ToDo
    } else {
        Status::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::task;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(Status::normalize("pending"), Status::ToDo);
        assert_eq!(Status::normalize("completed"), Status::Done);
        assert_eq!(Status::normalize("IN_PROGRESS"), Status::InProgress);
        assert_eq!(Status::normalize("not_initialized"), Status::NotInitialized);
        assert_eq!(Status::normalize("whatever"), Status::ToDo);
        assert_eq!(Status::normalize(""), Status::ToDo);
    }

    #[test]
    fn test_parse_is_strict() {
        assert_eq!(Status::parse("backlog").unwrap(), Status::Backlog);
        assert!(Status::parse("pending").is_err());
        assert!(Status::parse("").is_err());
    }

    #[test]
    fn test_serde_round_trips_through_normalization() {
        let status: Status = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, Status::Done);
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"in_progress\"");
    }

    #[test]
    fn test_main_task_table() {
        assert_eq!(legal_next_statuses(Role::Main, ToDo), &[InProgress]);
        assert_eq!(legal_next_statuses(Role::Main, InProgress), &[Backlog, Done]);
        assert_eq!(legal_next_statuses(Role::Main, Backlog), &[ToDo, InProgress]);
        assert_eq!(legal_next_statuses(Role::Main, NotInitialized), &[ToDo]);
        assert!(legal_next_statuses(Role::Main, Done).is_empty());
    }

    #[test]
    fn test_subtask_table() {
        assert_eq!(
            legal_next_statuses(Role::Subtask, Done),
            &[ToDo, InProgress, Backlog]
        );
        assert_eq!(legal_next_statuses(Role::Subtask, Backlog), &[ToDo, InProgress]);
    }

    #[test]
    fn test_uncovered_status_uses_to_do_row() {
        assert_eq!(legal_next_statuses(Role::Main, Recall), &[InProgress]);
        assert_eq!(
            legal_next_statuses(Role::Subtask, NotInitialized),
            &[InProgress, Backlog, Done]
        );
    }

    #[test]
    fn test_next_statuses_never_include_current() {
        for role in [Role::Main, Role::Subtask, Role::StudySubtask] {
            for status in Status::ALL {
                assert!(
                    !legal_next_statuses(role, status).contains(&status),
                    "{role} {status} lists itself"
                );
            }
        }
    }

    #[test]
    fn test_recall_only_for_study_subtasks() {
        for status in Status::ALL {
            assert!(!legal_next_statuses(Role::Main, status).contains(&Recall));
            assert!(!legal_next_statuses(Role::Subtask, status).contains(&Recall));
        }
        assert!(is_legal(Role::StudySubtask, InProgress, Recall));
        assert!(is_legal(Role::StudySubtask, Recall, Done));
    }

    #[test]
    fn test_main_in_progress_to_do_rejected() {
        let main = task(10).status(InProgress).build();
        let err = transition(&main, ToDo).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InvalidTransition {
                role: Role::Main,
                from: InProgress,
                to: ToDo
            }
        ));
    }

    #[test]
    fn test_subtask_done_to_backlog_accepted() {
        let sub = task(11).parent(5).status(Done).build();
        assert_eq!(transition(&sub, Backlog).unwrap(), Backlog);
    }

    #[test]
    fn test_role_of() {
        assert_eq!(Role::of(&task(1).build()), Role::Main);
        assert_eq!(Role::of(&task(2).parent(1).build()), Role::Subtask);
        assert_eq!(
            Role::of(&task(3).parent(1).kind(TaskType::Study).build()),
            Role::StudySubtask
        );
        assert_eq!(Role::of(&task(4).kind(TaskType::Study).build()), Role::Main);
    }

    #[test]
    fn test_toggle_complete() {
        assert_eq!(toggle_complete(Done), ToDo);
        assert_eq!(toggle_complete(Backlog), Done);
        assert_eq!(toggle_complete(NotInitialized), Done);
    }

    #[test]
    fn test_group_folds_not_initialized() {
        assert_eq!(NotInitialized.group(), ToDo);
        assert_eq!(Recall.group(), Recall);
    }
}
