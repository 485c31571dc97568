pub mod department;
pub mod employee;
pub mod patch;
pub mod rules;

use chrono::{DateTime, Utc};
use validator::ValidationErrors;

/// A persisted entity with a store-assigned identifier.
pub trait Record: Clone + Send + Sync + 'static {
    /// Human readable entity name used in messages.
    const ENTITY: &'static str;

    fn id(&self) -> Option<u64>;

    fn set_id(&mut self, id: Option<u64>);

    /// Called once before the first save.
    fn on_create(&mut self, _now: DateTime<Utc>) {}

    /// Copies attributes that must survive a full replace from the stored row.
    fn keep_immutable(&mut self, _stored: &Self) {}

    fn check_constraints(&self) -> Result<(), ValidationErrors>;
}
