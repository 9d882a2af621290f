//! Ledger store boundary.
//!
//! Engines never reach a store through global state: callers hand a
//! `&dyn LedgerStore` (or any `impl LedgerStore`) into each call.

pub mod memory;

use crate::core::participant::Day;
use crate::core::record::{PurchaseRecord, RecordDraft, RecordId};
use crate::error::Result;

/// A keyed table of purchase records.
///
/// Implementations serialize conflicting writes to the same record and
/// give read-after-write consistency to a single caller.
pub trait LedgerStore: Send + Sync {
    /// All records filed under `day` (every record when `None`), ordered
    /// by id ascending.
    fn fetch(&self, day: Option<&Day>) -> Result<Vec<PurchaseRecord>>;

    /// Insert a new pending record and return it with its assigned id.
    fn insert(&self, draft: RecordDraft) -> Result<PurchaseRecord>;

    fn get(&self, id: RecordId) -> Result<PurchaseRecord>;

    /// Replace the editable fields of an existing record.
    fn update(&self, id: RecordId, draft: RecordDraft) -> Result<PurchaseRecord>;

    /// Remove a record, returning the removed row.
    fn delete(&self, id: RecordId) -> Result<PurchaseRecord>;

    /// Complete or un-complete a record (see
    /// [`PurchaseRecord::set_completed`]).
    fn set_completed(&self, id: RecordId, completed: bool) -> Result<PurchaseRecord>;
}
