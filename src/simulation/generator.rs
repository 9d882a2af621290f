//! Random ledger generation for benchmarks and stress tests.
//!
//! Produces purchase records across a pool of participants and event days,
//! including the awkward cases the engines must skip: unassigned buyers and
//! self-purchases.

use crate::core::participant::{Day, ParticipantId};
use crate::core::record::{PurchaseRecord, RecordDraft, RecordId};
use rand::Rng;

/// Configuration for generating a random purchase ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Number of participants in the pool.
    pub participant_count: usize,
    /// Number of records to generate.
    pub record_count: usize,
    /// Day labels records are spread over.
    pub days: Vec<Day>,
    /// Minimum estimated amount.
    pub min_amount: i64,
    /// Maximum estimated amount (exclusive).
    pub max_amount: i64,
    /// Share of records left without a buyer.
    pub unassigned_ratio: f64,
    /// Share of records that are marked completed.
    pub completed_ratio: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            participant_count: 10,
            record_count: 30,
            days: vec![Day::new("1"), Day::new("2")],
            min_amount: 100,
            max_amount: 10_000,
            unassigned_ratio: 0.1,
            completed_ratio: 0.5,
        }
    }
}

/// Generate a random purchase ledger. Ids run from 1 to `record_count`.
pub fn generate_random_ledger(config: &LedgerConfig) -> Vec<PurchaseRecord> {
    let mut rng = rand::thread_rng();

    let participants: Vec<ParticipantId> = (0..config.participant_count.max(1))
        .map(|i| ParticipantId::new(format!("P-{:03}", i)))
        .collect();

    let mut records = Vec::with_capacity(config.record_count);
    for i in 0..config.record_count {
        let registrant = &participants[rng.gen_range(0..participants.len())];
        let mut draft = RecordDraft::new()
            .name(format!("Circle {}", i))
            .registrant(registrant.as_str());

        if !rng.gen_bool(config.unassigned_ratio.clamp(0.0, 1.0)) {
            // Buyer may equal the registrant; the engines skip those.
            let buyer = &participants[rng.gen_range(0..participants.len())];
            draft.buyer = Some(buyer.clone());
        }
        if !config.days.is_empty() {
            draft.day = Some(config.days[rng.gen_range(0..config.days.len())].clone());
        }
        if config.max_amount > config.min_amount {
            let amount = rng.gen_range(config.min_amount..config.max_amount);
            draft.amount = Some(amount);
            if rng.gen_bool(0.3) {
                // Settled price drifts from the estimate.
                let drift = rng.gen_range(-(amount / 10)..=amount / 10);
                draft.actual_amount = Some((amount + drift).max(0));
            }
        }

        let mut record = draft.into_record(RecordId::new(i as u64 + 1));
        if rng.gen_bool(config.completed_ratio.clamp(0.0, 1.0)) {
            let now = record.updated_at();
            record.set_completed(true, now);
        }
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::aggregation::aggregate;

    #[test]
    fn test_random_ledger_generation() {
        let config = LedgerConfig {
            participant_count: 5,
            record_count: 40,
            ..Default::default()
        };

        let records = generate_random_ledger(&config);
        assert_eq!(records.len(), 40);
        assert!(records.iter().all(|r| r.registrant().is_some()));
        assert!(records.iter().all(|r| r.amount().unwrap_or(0) >= 0));
    }

    #[test]
    fn test_random_ledger_aggregates() {
        let config = LedgerConfig {
            participant_count: 8,
            record_count: 200,
            ..Default::default()
        };

        let records = generate_random_ledger(&config);
        let report = aggregate(&records, None);
        let included: i64 = records
            .iter()
            .filter(|r| r.settlement_pair().is_some())
            .map(|r| r.actual_amount().unwrap_or(0))
            .sum();
        assert_eq!(report.actual_total(), included);
    }
}
