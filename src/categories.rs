use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::{Category, CategoryPatch, CategoryRow, CategoryStatus, CategoryType};
use crate::error::{PlannerError, Result};

const CATEGORY_COLUMNS: &str =
    "id, name, description, type, status, created_at, updated_at";

pub struct CategoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        category_type: CategoryType,
        status: CategoryStatus,
        description: Option<&str>,
    ) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::InvalidInput(
                "Category name cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, description, type, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(category_type.as_str())
        .bind(status.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        let category = self.get(result.last_insert_rowid()).await?;
        crate::log_task_operation!("category_created", category.id, category.name.as_str());
        Ok(category)
    }

    pub async fn get(&self, id: i64) -> Result<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories WHERE id = ?",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(PlannerError::CategoryNotFound(id))?;

        Category::try_from(row)
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories ORDER BY name ASC, id ASC",
            CATEGORY_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    pub async fn list_by_type(&self, category_type: CategoryType) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories WHERE type = ? ORDER BY name ASC, id ASC",
            CATEGORY_COLUMNS
        ))
        .bind(category_type.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    pub async fn update(&self, id: i64, patch: CategoryPatch) -> Result<Category> {
        let current = self.get(id).await?;

        let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("UPDATE categories SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(PlannerError::InvalidInput(
                    "Category name cannot be empty".to_string(),
                ));
            }
            builder.push(", name = ").push_bind(name.to_string());
        }
        if let Some(description) = &patch.description {
            builder
                .push(", description = ")
                .push_bind(description.clone());
        }
        if let Some(category_type) = patch.category_type {
            builder.push(", type = ").push_bind(category_type.as_str());
        }
        if let Some(status) = patch.status {
            builder.push(", status = ").push_bind(status.as_str());
        }

        builder.push(" WHERE id = ").push_bind(current.id);
        builder.build().execute(self.pool).await?;

        self.get(id).await
    }

    /// Delete a category together with all of its tasks.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM tasks WHERE category_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        crate::log_task_operation!("category_deleted", id);
        Ok(())
    }
}
