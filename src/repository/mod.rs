pub mod memory;
pub mod mysql;

use async_trait::async_trait;

pub use memory::MemoryRepository;
pub use mysql::{MySqlRepository, SqlRecord};

/// Contract every record store honours.
///
/// `save` inserts and assigns an id when the record has none, otherwise it
/// overwrites the row with that id. `delete_by_id` is not required to be
/// idempotent; callers check existence first.
#[async_trait]
pub trait Repository<T>: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<T>>;

    async fn find_by_id(&self, id: u64) -> anyhow::Result<Option<T>>;

    async fn exists_by_id(&self, id: u64) -> anyhow::Result<bool>;

    async fn save(&self, record: T) -> anyhow::Result<T>;

    async fn delete_by_id(&self, id: u64) -> anyhow::Result<()>;
}
