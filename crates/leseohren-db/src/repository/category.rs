//! SurrealDB implementation of [`CategoryRepository`].

use chrono::{DateTime, Utc};
use leseohren_core::error::RegistryResult;
use leseohren_core::models::category::{Category, CreateCategory, UpdateCategory};
use leseohren_core::repository::CategoryRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CategoryRow {
    name: String,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CategoryRowWithId {
    record_id: String,
    name: String,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRowWithId {
    fn try_into_category(self) -> Result<Category, DbError> {
        let id = parse_uuid("category", &self.record_id)?;
        row_to_category(
            CategoryRow {
                name: self.name,
                parent_id: self.parent_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

fn row_to_category(row: CategoryRow, id: Uuid) -> Result<Category, DbError> {
    Ok(Category {
        id,
        parent_id: parse_optional_uuid("parent", row.parent_id)?,
        name: row.name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn into_categories(rows: Vec<CategoryRowWithId>) -> Result<Vec<Category>, DbError> {
    rows.into_iter()
        .map(CategoryRowWithId::try_into_category)
        .collect()
}

/// SurrealDB implementation of the Category repository.
#[derive(Clone)]
pub struct SurrealCategoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCategoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CategoryRepository for SurrealCategoryRepository<C> {
    async fn create(&self, input: CreateCategory) -> RegistryResult<Category> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('category', $id) SET \
                 name = $name, parent_id = $parent_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("parent_id", input.parent_id.map(|p| p.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: id_str,
        })?;

        Ok(row_to_category(row, id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RegistryResult<Category> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('category', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: id_str,
        })?;

        Ok(row_to_category(row, id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> RegistryResult<Category> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.parent_id.is_some() {
            sets.push("parent_id = $parent_id");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('category', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(parent_id) = input.parent_id {
            builder = builder.bind(("parent_id", parent_id.map(|p| p.to_string())));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: id_str,
        })?;

        Ok(row_to_category(row, id)?)
    }

    async fn delete(&self, id: Uuid) -> RegistryResult<()> {
        // Detach children and strip the tag from every classified record
        // before removing the category itself.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE category SET parent_id = NONE WHERE parent_id = $id; \
                 UPDATE person SET categories -= $id WHERE categories CONTAINS $id; \
                 UPDATE organization SET categories -= $id \
                     WHERE categories CONTAINS $id; \
                 DELETE type::record('category', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(&self) -> RegistryResult<Vec<Category>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM category \
                 ORDER BY name ASC, created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_categories(rows)?)
    }

    async fn get_children(&self, parent_id: Uuid) -> RegistryResult<Vec<Category>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM category \
                 WHERE parent_id = $parent_id \
                 ORDER BY name ASC, created_at ASC",
            )
            .bind(("parent_id", parent_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(into_categories(rows)?)
    }
}
