use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySqlPool};
use std::marker::PhantomData;
use tracing::debug;

use super::Repository;
use crate::model::Record;
use crate::utils::db_utils::{SqlValue, build_insert_sql, build_update_sql, execute};

/// A record that maps onto one MySQL table with an `id` primary key.
pub trait SqlRecord: Record + for<'r> FromRow<'r, MySqlRow> + Unpin {
    const TABLE: &'static str;

    /// Every column except `id`, in a stable order.
    fn columns(&self) -> Vec<(&'static str, SqlValue)>;
}

pub struct MySqlRepository<T> {
    pool: MySqlPool,
    _record: PhantomData<fn() -> T>,
}

impl<T> MySqlRepository<T> {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T: SqlRecord> Repository<T> for MySqlRepository<T> {
    async fn find_all(&self) -> anyhow::Result<Vec<T>> {
        let sql = format!("SELECT * FROM {} ORDER BY id", T::TABLE);
        let rows = sqlx::query_as::<_, T>(&sql)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to list {}", T::TABLE))?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: u64) -> anyhow::Result<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch {} {}", T::ENTITY, id))?;
        Ok(row)
    }

    async fn exists_by_id(&self, id: u64) -> anyhow::Result<bool> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?", T::TABLE);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to check {} {}", T::ENTITY, id))?;
        Ok(count > 0)
    }

    async fn save(&self, record: T) -> anyhow::Result<T> {
        let id = match record.id() {
            None => {
                let statement = build_insert_sql(T::TABLE, record.columns());
                debug!(sql = %statement.sql, "Inserting row");
                let result = execute(&self.pool, statement)
                    .await
                    .with_context(|| format!("Failed to insert {}", T::ENTITY))?;
                result.last_insert_id()
            }
            Some(id) => {
                let statement = build_update_sql(T::TABLE, record.columns(), "id", id);
                debug!(sql = %statement.sql, id, "Updating row");
                execute(&self.pool, statement)
                    .await
                    .with_context(|| format!("Failed to update {} {}", T::ENTITY, id))?;
                id
            }
        };

        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("{} {} missing after save", T::ENTITY, id))
    }

    async fn delete_by_id(&self, id: u64) -> anyhow::Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
        sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete {} {}", T::ENTITY, id))?;
        Ok(())
    }
}
