use super::utils::{print_json, CliResult};
use crate::categories::CategoryRepository;
use crate::cli::{CategoryCommands, CategoryKind};
use crate::context::PlannerContext;
use crate::db::models::{CategoryStatus, CategoryType};

impl From<CategoryKind> for CategoryType {
    fn from(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Project => CategoryType::Project,
            CategoryKind::Study => CategoryType::Study,
        }
    }
}

/// Handle all `planner category` subcommands
pub async fn handle_category_command(
    ctx: &PlannerContext,
    cmd: CategoryCommands,
    json: bool,
) -> CliResult {
    let repo = CategoryRepository::new(&ctx.pool);

    match cmd {
        CategoryCommands::Add {
            name,
            category_type,
            description,
        } => {
            let category = repo
                .create(
                    &name,
                    category_type.into(),
                    CategoryStatus::Active,
                    description.as_deref(),
                )
                .await?;

            if json {
                return print_json(&category);
            }
            println!(
                "Created category #{} {} ({})",
                category.id,
                category.name,
                category.category_type.as_str()
            );
        },

        CategoryCommands::List => {
            let categories = repo.list().await?;

            if json {
                return print_json(&categories);
            }
            if categories.is_empty() {
                println!("No categories.");
            }
            for category in &categories {
                println!(
                    "#{} {} ({}, {})",
                    category.id,
                    category.name,
                    category.category_type.as_str(),
                    category.status.as_str()
                );
            }
        },

        CategoryCommands::Rm { id } => {
            repo.delete(id).await?;

            if json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("Deleted category #{}", id);
        },
    }

    Ok(())
}
