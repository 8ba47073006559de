// CLI command handlers
//
// Views: tree, list, agenda, overview
// Tasks: add, edit, status, toggle, next, recall, rm
// Categories: category add|list|rm

pub mod category_commands;
pub mod task_commands;
pub mod utils;
pub mod view_commands;

pub use category_commands::handle_category_command;
pub use utils::{print_json, status_badge, CliResult};

use crate::cli::Commands;
use crate::context::PlannerContext;

/// Dispatch one parsed command.
pub async fn handle_command(ctx: &PlannerContext, command: Commands, json: bool) -> CliResult {
    // Views fall back to the configured default category.
    let scope = |category: Option<i64>| category.or(ctx.config.default_category);

    match command {
        Commands::Tree { category } => view_commands::handle_tree(ctx, scope(category), json).await,

        Commands::List {
            category,
            status,
            from,
            to,
            without_date,
            search,
        } => {
            view_commands::handle_list(
                ctx,
                scope(category),
                status,
                from,
                to,
                without_date,
                search,
                json,
            )
            .await
        },

        Commands::Agenda { category, days } => {
            view_commands::handle_agenda(ctx, scope(category), days, json).await
        },

        Commands::Overview { category } => {
            view_commands::handle_overview(ctx, scope(category), json).await
        },

        Commands::Add {
            title,
            description,
            category,
            parent,
            due,
        } => task_commands::handle_add(ctx, title, description, category, parent, due, json).await,

        Commands::Edit {
            id,
            title,
            description,
            due,
            clear_due,
        } => task_commands::handle_edit(ctx, id, title, description, due, clear_due, json).await,

        Commands::Status { id, status } => {
            task_commands::handle_status(ctx, id, &status, json).await
        },

        Commands::Toggle { id } => task_commands::handle_toggle(ctx, id, json).await,

        Commands::Next { id } => task_commands::handle_next(ctx, id, json).await,

        Commands::Recall { id } => task_commands::handle_recall(ctx, id, json).await,

        Commands::Rm { id } => task_commands::handle_rm(ctx, id, json).await,

        Commands::Category(cmd) => handle_category_command(ctx, cmd, json).await,
    }
}
