//! Workflow facade over the SQLite store.

use chrono::NaiveDate;
use planner_engine::categories::CategoryRepository;
use planner_engine::config::PlannerConfig;
use planner_engine::context::PlannerContext;
use planner_engine::db::models::{CategoryStatus, CategoryType, TaskDraft, TaskPatch, TaskType};
use planner_engine::filter::{DashboardFilter, FilterSpec};
use planner_engine::status::Status;
use planner_engine::workflow::Scope;
use tempfile::TempDir;

async fn setup() -> (TempDir, PlannerContext) {
    let dir = TempDir::new().unwrap();
    let config = PlannerConfig {
        db_path: dir.path().join("planner.db"),
        upcoming_days: 7,
        default_category: None,
    };
    let ctx = PlannerContext::open(config).await.unwrap();
    (dir, ctx)
}

async fn category(ctx: &PlannerContext, name: &str, kind: CategoryType) -> i64 {
    CategoryRepository::new(&ctx.pool)
        .create(name, kind, CategoryStatus::Active, None)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_project_lifecycle() {
    let (_dir, ctx) = setup().await;
    let cat = category(&ctx, "Website", CategoryType::Project).await;
    let mut wf = ctx.workflow();
    assert!(wf.load_by_category(cat).await);

    let main = wf
        .create_main(TaskDraft::new("Launch").category(cat))
        .await
        .unwrap();
    let sub = wf
        .create_subtask(main.id, cat, TaskDraft::new("Copy"))
        .await
        .unwrap();
    assert_eq!(main.status, Status::NotInitialized);
    assert_eq!(sub.status, Status::ToDo);

    // not_initialized only moves to to_do
    assert!(wf.change_status(main.id, Status::Done).await.is_none());
    assert_eq!(wf.error().unwrap().code, "INVALID_TRANSITION");

    for status in [Status::ToDo, Status::InProgress, Status::Done] {
        assert_eq!(
            wf.change_status(main.id, status).await.unwrap().status,
            status
        );
    }
    assert!(wf.available_transitions(main.id).is_empty());

    let tree = wf.tree();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].subtasks[0].id(), sub.id);
    assert_eq!(tree[0].task.status, Status::Done);
}

#[tokio::test]
async fn test_scope_reload_drops_other_categories() {
    let (_dir, ctx) = setup().await;
    let a = category(&ctx, "A", CategoryType::Project).await;
    let b = category(&ctx, "B", CategoryType::Project).await;
    let mut wf = ctx.workflow();
    assert!(wf.load_by_category(a).await);

    wf.create_main(TaskDraft::new("In A").category(a))
        .await
        .unwrap();
    // Created optimistically, then gone after reconciling the A scope.
    wf.create_main(TaskDraft::new("In B").category(b))
        .await
        .unwrap();

    assert_eq!(wf.scope(), Scope::Category(a));
    let titles: Vec<&str> = wf.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["In A"]);

    assert!(wf.load_all().await);
    assert_eq!(wf.tasks().len(), 2);
}

#[tokio::test]
async fn test_remove_cascades() {
    let (_dir, ctx) = setup().await;
    let cat = category(&ctx, "Website", CategoryType::Project).await;
    let mut wf = ctx.workflow();

    let main = wf
        .create_main(TaskDraft::new("Launch").category(cat))
        .await
        .unwrap();
    wf.create_subtask(main.id, cat, TaskDraft::new("Copy"))
        .await
        .unwrap();
    let other = wf
        .create_main(TaskDraft::new("Other").category(cat))
        .await
        .unwrap();

    assert!(wf.remove(main.id).await);
    assert_eq!(wf.tasks().len(), 1);
    assert_eq!(wf.tasks()[0].id, other.id);

    assert!(wf.load_all().await);
    assert_eq!(wf.tasks().len(), 1);
}

#[tokio::test]
async fn test_update_and_views() {
    let (_dir, ctx) = setup().await;
    let mut wf = ctx.workflow();

    let bill = wf
        .create_main(TaskDraft::new("Pay bill").due("2024-05-20"))
        .await
        .unwrap();
    wf.create_main(TaskDraft::new("Quarterly report").due("2024-06-04"))
        .await
        .unwrap();
    assert_eq!(bill.task_type, TaskType::Event);

    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert_eq!(wf.overdue(today).len(), 1);
    assert_eq!(wf.upcoming(today).len(), 1);

    wf.update(
        bill.id,
        TaskPatch {
            due_date: Some(Some("2024-06-02".into())),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(wf.overdue(today).is_empty());
    assert_eq!(wf.upcoming(today).len(), 2);

    let buckets = wf.buckets();
    assert_eq!(buckets.with_date[0].title, "Pay bill");
    assert!(buckets.without_date.is_empty());

    let spec = FilterSpec {
        search_term: Some("report".into()),
        status: Some(Status::Done),
        ..Default::default()
    };
    assert!(wf.filtered(&spec).is_empty());

    let dashboard = wf.dashboard(&DashboardFilter::default());
    assert_eq!(dashboard.with_date.len(), 2);

    let stats = wf.overview(today);
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completion_rate, 0);
}

#[tokio::test]
async fn test_study_subtask_recall_status() {
    let (_dir, ctx) = setup().await;
    let cat = category(&ctx, "Algebra", CategoryType::Study).await;
    let mut wf = ctx.workflow();

    let main = wf
        .create_main(TaskDraft::new("Chapter 1").category(cat))
        .await
        .unwrap();
    let sub = wf
        .create_subtask(main.id, cat, TaskDraft::new("Exercises"))
        .await
        .unwrap();
    assert_eq!(sub.task_type, TaskType::Study);

    wf.change_status(sub.id, Status::InProgress).await.unwrap();
    let recalled = wf.change_status(sub.id, Status::Recall).await.unwrap();
    assert_eq!(recalled.status, Status::Recall);

    // Main study tasks follow the main table, which has no recall.
    wf.change_status(main.id, Status::InProgress).await.unwrap();
    assert!(wf.change_status(main.id, Status::Recall).await.is_none());

    let columns = wf.by_status();
    let recall_column = columns
        .iter()
        .find(|(status, _)| *status == Status::Recall)
        .unwrap();
    assert_eq!(recall_column.1.len(), 1);
}

#[tokio::test]
async fn test_store_error_codes_surface() {
    let (_dir, ctx) = setup().await;
    let mut wf = ctx.workflow();

    assert!(wf
        .create_main(TaskDraft::new("Loose").category(999))
        .await
        .is_none());
    assert_eq!(wf.error().unwrap().code, "CATEGORY_NOT_FOUND");

    assert!(wf
        .update(
            12,
            TaskPatch {
                title: Some("x".into()),
                ..Default::default()
            }
        )
        .await
        .is_none());
    assert_eq!(wf.error().unwrap().code, "TASK_NOT_FOUND");
}

#[tokio::test]
async fn test_subtasks_stay_in_parent_category() {
    let (_dir, ctx) = setup().await;
    let project = category(&ctx, "Website", CategoryType::Project).await;
    let study = category(&ctx, "Algebra", CategoryType::Study).await;
    let mut wf = ctx.workflow();

    let main = wf
        .create_main(TaskDraft::new("Launch").category(project))
        .await
        .unwrap();
    assert!(wf
        .create_subtask(main.id, study, TaskDraft::new("Notes"))
        .await
        .is_none());
    assert_eq!(wf.error().unwrap().code, "INVALID_INPUT");

    let other = wf
        .create_main(TaskDraft::new("Other").category(project))
        .await
        .unwrap();
    let child = wf
        .create_subtask(other.id, project, TaskDraft::new("Copy"))
        .await
        .unwrap();
    assert!(wf
        .update(
            other.id,
            TaskPatch {
                parent_id: Some(Some(main.id)),
                ..Default::default()
            },
        )
        .await
        .is_none());
    assert_eq!(wf.error().unwrap().code, "INVALID_INPUT");

    assert!(wf.load_by_category(study).await);
    assert!(wf.tasks().is_empty());

    assert!(wf.load_by_category(project).await);
    let tree = wf.tree();
    assert_eq!(tree.len(), 2);
    assert_eq!(wf.tasks().len(), 3);
    assert_eq!(tree[1].subtasks[0].id(), child.id);
}
