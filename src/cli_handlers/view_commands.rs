use super::utils::{open_workflow, print_json, print_tasks, print_tree, today, CliResult};
use crate::context::PlannerContext;
use crate::filter::{DateFilter, FilterSpec};
use crate::status::Status;

pub async fn handle_tree(ctx: &PlannerContext, category: Option<i64>, json: bool) -> CliResult {
    let wf = open_workflow(ctx, category).await?;
    let tree = wf.tree();

    if json {
        return print_json(&tree);
    }
    print_tree(&tree);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_list(
    ctx: &PlannerContext,
    category: Option<i64>,
    status: Option<String>,
    from: Option<String>,
    to: Option<String>,
    without_date: bool,
    search: Option<String>,
    json: bool,
) -> CliResult {
    let spec = FilterSpec {
        status: status.as_deref().map(Status::parse).transpose()?,
        date_filter: DateFilter {
            start_date: from,
            end_date: to,
            without_date,
        },
        search_term: search,
        ..Default::default()
    };

    let wf = open_workflow(ctx, category).await?;
    let tasks = wf.filtered(&spec);

    if json {
        return print_json(&tasks);
    }
    print_tasks(&tasks);
    Ok(())
}

pub async fn handle_agenda(
    ctx: &PlannerContext,
    category: Option<i64>,
    days: Option<u32>,
    json: bool,
) -> CliResult {
    let days = days.unwrap_or(ctx.config.upcoming_days);
    let wf = open_workflow(ctx, category).await?.with_upcoming_days(days);
    let today = today();
    let overdue = wf.overdue(today);
    let upcoming = wf.upcoming(today);

    if json {
        return print_json(&serde_json::json!({
            "today": today.to_string(),
            "days": days,
            "overdue": overdue,
            "upcoming": upcoming,
        }));
    }

    println!("Overdue:");
    print_tasks(&overdue);
    println!("Upcoming (next {} days):", days);
    print_tasks(&upcoming);
    Ok(())
}

pub async fn handle_overview(
    ctx: &PlannerContext,
    category: Option<i64>,
    json: bool,
) -> CliResult {
    let wf = open_workflow(ctx, category).await?;
    let stats = wf.overview(today());

    if json {
        return print_json(&stats);
    }

    println!("Total:       {}", stats.total);
    println!("Done:        {}", stats.done);
    println!("In progress: {}", stats.in_progress);
    println!("Recall:      {}", stats.recall);
    println!("Pending:     {}", stats.pending);
    println!("Completion:  {}%", stats.completion_rate);
    println!("Overdue:     {}", stats.overdue);
    println!("Upcoming:    {}", stats.upcoming);
    Ok(())
}
