// SQLite InventoryRepository Implementation

use crate::error::{is_unique_violation, map_sqlx_error};
use async_trait::async_trait;
use playdeck_core::domain::{Inventory, InventoryId};
use playdeck_core::error::{AppError, Result};
use playdeck_core::port::InventoryRepository;
use sqlx::SqlitePool;

const INVENTORY_COLUMNS: &str = "id, name, content, created_at, updated_at";

pub struct SqliteInventoryRepository {
    pool: SqlitePool,
}

impl SqliteInventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryRepository for SqliteInventoryRepository {
    async fn create(&self, name: &str, content: &str, now_millis: i64) -> Result<Inventory> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO inventories (name, content, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(content)
        .bind(now_millis)
        .bind(now_millis)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Inventory {} already exists", name))
            } else {
                map_sqlx_error(e)
            }
        })?;

        Ok(Inventory {
            id,
            name: name.to_string(),
            content: content.to_string(),
            created_at: now_millis,
            updated_at: now_millis,
        })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Inventory>> {
        sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {} FROM inventories WHERE name = ?",
            INVENTORY_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(InventoryRow::into_inventory))
        .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: InventoryId) -> Result<Option<Inventory>> {
        sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {} FROM inventories WHERE id = ?",
            INVENTORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(InventoryRow::into_inventory))
        .map_err(map_sqlx_error)
    }

    async fn list(&self) -> Result<Vec<Inventory>> {
        let rows = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {} FROM inventories ORDER BY name ASC",
            INVENTORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(InventoryRow::into_inventory).collect())
    }

    async fn update_content(
        &self,
        name: &str,
        content: &str,
        now_millis: i64,
    ) -> Result<Inventory> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "UPDATE inventories SET content = ?, updated_at = ? WHERE name = ? RETURNING {}",
            INVENTORY_COLUMNS
        ))
        .bind(content)
        .bind(now_millis)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(InventoryRow::into_inventory)
            .ok_or_else(|| AppError::NotFound(format!("Inventory {} not found", name)))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inventories WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    id: i64,
    name: String,
    content: String,
    created_at: i64,
    updated_at: i64,
}

impl InventoryRow {
    fn into_inventory(self) -> Inventory {
        Inventory {
            id: self.id,
            name: self.name,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    const HOSTS: &str = "[web]\nweb1 ansible_host=10.0.0.1\n";

    async fn setup_test_db() -> SqliteInventoryRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteInventoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = setup_test_db().await;

        let created = repo.create("production", HOSTS, 1_000).await.unwrap();
        let by_name = repo.find_by_name("production").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_name.content, HOSTS);

        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "production");

        assert!(repo.find_by_name("staging").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let repo = setup_test_db().await;

        repo.create("production", HOSTS, 1_000).await.unwrap();
        let err = repo.create("production", "", 2_000).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_list_delete() {
        let repo = setup_test_db().await;

        repo.create("staging", HOSTS, 1_000).await.unwrap();
        repo.create("production", HOSTS, 1_000).await.unwrap();

        let updated = repo
            .update_content("staging", "[db]\ndb1\n", 5_000)
            .await
            .unwrap();
        assert_eq!(updated.content, "[db]\ndb1\n");
        assert_eq!(updated.created_at, 1_000);
        assert_eq!(updated.updated_at, 5_000);

        let missing = repo.update_content("qa", "", 5_000).await.unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["production", "staging"]);

        assert!(repo.delete("staging").await.unwrap());
        assert!(!repo.delete("staging").await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
