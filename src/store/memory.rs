use crate::core::participant::Day;
use crate::core::record::{PurchaseRecord, RecordDraft, RecordId};
use crate::error::{Result, SettlementError};
use crate::store::LedgerStore;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Serializable image of a store: its rows plus the next id to hand out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub next_id: u64,
    pub records: Vec<PurchaseRecord>,
}

#[derive(Debug)]
struct StoreState {
    next_id: u64,
    records: BTreeMap<RecordId, PurchaseRecord>,
}

/// Mutex-guarded in-process ledger table.
///
/// Ids are sequential starting at 1 and never reused. Every write takes the
/// single lock, so concurrent completion toggles on one record are applied
/// one after the other.
///
/// # Examples
///
/// ```
/// use circle_settlement::core::record::RecordDraft;
/// use circle_settlement::store::LedgerStore;
/// use circle_settlement::store::memory::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// let record = store
///     .insert(RecordDraft::new().registrant("alice").amount(500))
///     .unwrap();
///
/// let done = store.set_completed(record.id(), true).unwrap();
/// assert_eq!(done.actual_amount(), Some(500));
/// ```
#[derive(Debug)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }

    /// Rebuild a store from a snapshot.
    ///
    /// Fails with `MalformedInput` if two rows share an id. The next id is
    /// raised past the largest stored id if the snapshot lags behind.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self> {
        let mut records = BTreeMap::new();
        let mut next_id = snapshot.next_id.max(1);
        for record in snapshot.records {
            let id = record.id();
            next_id = next_id.max(id.get() + 1);
            if records.insert(id, record).is_some() {
                return Err(SettlementError::MalformedInput {
                    field: "snapshot record id",
                    value: id.to_string(),
                });
            }
        }
        Ok(Self {
            state: Mutex::new(StoreState { next_id, records }),
        })
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        let state = self.lock()?;
        Ok(LedgerSnapshot {
            next_id: state.next_id,
            records: state.records.values().cloned().collect(),
        })
    }

    /// Load a JSON snapshot from `path`; a missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no ledger at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let snapshot: LedgerSnapshot = serde_json::from_str(&content)?;
        debug!(
            "loaded {} records from {}",
            snapshot.records.len(),
            path.display()
        );
        Self::from_snapshot(snapshot)
    }

    /// Write the current contents to `path` as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot()?;
        fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        debug!("saved {} records to {}", snapshot.records.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| SettlementError::Store("ledger lock poisoned".to_string()))
    }

    fn modify<F>(&self, id: RecordId, f: F) -> Result<PurchaseRecord>
    where
        F: FnOnce(&mut PurchaseRecord),
    {
        let mut state = self.lock()?;
        let record = state
            .records
            .get_mut(&id)
            .ok_or(SettlementError::NotFound(id))?;
        f(record);
        Ok(record.clone())
    }
}

impl LedgerStore for InMemoryStore {
    fn fetch(&self, day: Option<&Day>) -> Result<Vec<PurchaseRecord>> {
        let state = self.lock()?;
        Ok(state
            .records
            .values()
            .filter(|r| Day::matches(day, r.day()))
            .cloned()
            .collect())
    }

    fn insert(&self, draft: RecordDraft) -> Result<PurchaseRecord> {
        let mut state = self.lock()?;
        let id = RecordId::new(state.next_id);
        state.next_id += 1;
        let record = PurchaseRecord::new(id, draft, Utc::now());
        state.records.insert(id, record.clone());
        info!("inserted purchase record {}", id);
        Ok(record)
    }

    fn get(&self, id: RecordId) -> Result<PurchaseRecord> {
        self.lock()?
            .records
            .get(&id)
            .cloned()
            .ok_or(SettlementError::NotFound(id))
    }

    fn update(&self, id: RecordId, draft: RecordDraft) -> Result<PurchaseRecord> {
        let record = self.modify(id, |r| r.apply_edit(draft, Utc::now()))?;
        info!("updated purchase record {}", id);
        Ok(record)
    }

    fn delete(&self, id: RecordId) -> Result<PurchaseRecord> {
        let record = self
            .lock()?
            .records
            .remove(&id)
            .ok_or(SettlementError::NotFound(id))?;
        info!("deleted purchase record {}", id);
        Ok(record)
    }

    fn set_completed(&self, id: RecordId, completed: bool) -> Result<PurchaseRecord> {
        let record = self.modify(id, |r| r.set_completed(completed, Utc::now()))?;
        info!(
            "purchase record {} marked {}",
            id,
            if completed { "completed" } else { "pending" }
        );
        Ok(record)
    }
}
