//! # circle-settlement
//!
//! Purchase ledger and settlement netting for convention circle runs.
//!
//! Participants log the circles (vendor booths) they bought from on behalf
//! of others. This crate works out who owes whom: per-registrant totals
//! grouped by buyer, and the net balance between any two participants.
//!
//! ## Architecture
//!
//! - **core** — Participants, days, purchase records, input normalization
//! - **store** — The injected ledger store trait and its in-memory table
//! - **settlement** — Aggregation and pairwise netting engines
//! - **simulation** — Random ledger generation for benches and stress tests

pub mod core;
pub mod error;
pub mod settlement;
pub mod simulation;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::normalize::RawRecord;
    pub use crate::core::participant::{Day, ParticipantId};
    pub use crate::core::record::{apply_completion, PurchaseRecord, RecordDraft, RecordId};
    pub use crate::error::SettlementError;
    pub use crate::settlement::aggregation::{
        aggregate, aggregate_from_store, RegistrantSettlementSummary, SettlementReport,
    };
    pub use crate::settlement::netting::{NettingEngine, PairwiseGross, PairwiseNetResult};
    pub use crate::store::memory::InMemoryStore;
    pub use crate::store::LedgerStore;
}
