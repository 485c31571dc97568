use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::Repository;
use crate::model::Record;

/// Process-local store; one lock guards both the rows and the id counter.
pub struct MemoryRepository<T> {
    state: RwLock<State<T>>,
}

struct State<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            state: RwLock::new(State {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn find_all(&self) -> anyhow::Result<Vec<T>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: u64) -> anyhow::Result<Option<T>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: u64) -> anyhow::Result<bool> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.rows.contains_key(&id))
    }

    async fn save(&self, mut record: T) -> anyhow::Result<T> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = state.next_id;
                record.set_id(Some(id));
                id
            }
        };
        state.next_id = state.next_id.max(id + 1);
        state.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: u64) -> anyhow::Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.rows.remove(&id);
        Ok(())
    }
}
