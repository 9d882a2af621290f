use crate::core::participant::{Day, ParticipantId};
use crate::core::record::{PurchaseRecord, RecordId};
use crate::error::Result;
use crate::store::LedgerStore;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One purchase a registrant is owed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntry {
    /// Record the entry was taken from.
    pub record: RecordId,
    /// The buyer who owes the registrant.
    pub to: ParticipantId,
    pub actual_amount: Option<i64>,
    pub amount: Option<i64>,
    pub day: Option<Day>,
}

/// Everything owed to one registrant, in record order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantSettlementSummary {
    pub registrant: ParticipantId,
    pub payments: Vec<PaymentEntry>,
    /// Sum of settled amounts; absent amounts count as zero. Saturates at
    /// `i64::MAX`.
    pub actual_total: i64,
    /// Sum of estimated amounts; absent amounts count as zero. Saturates at
    /// `i64::MAX`.
    pub estimated_total: i64,
}

impl RegistrantSettlementSummary {
    fn new(registrant: ParticipantId) -> Self {
        Self {
            registrant,
            payments: Vec::new(),
            actual_total: 0,
            estimated_total: 0,
        }
    }

    fn push(&mut self, entry: PaymentEntry) {
        self.actual_total = self
            .actual_total
            .saturating_add(entry.actual_amount.unwrap_or(0));
        self.estimated_total = self
            .estimated_total
            .saturating_add(entry.amount.unwrap_or(0));
        self.payments.push(entry);
    }

    /// Settled total owed by one buyer.
    pub fn actual_owed_by(&self, buyer: &ParticipantId) -> i64 {
        self.payments
            .iter()
            .filter(|p| &p.to == buyer)
            .map(|p| p.actual_amount.unwrap_or(0))
            .fold(0, i64::saturating_add)
    }
}

/// Result of aggregating a record set: one summary per registrant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementReport {
    summaries: HashMap<ParticipantId, RegistrantSettlementSummary>,
}

impl SettlementReport {
    pub fn summary(&self, registrant: &ParticipantId) -> Option<&RegistrantSettlementSummary> {
        self.summaries.get(registrant)
    }

    pub fn summaries(&self) -> &HashMap<ParticipantId, RegistrantSettlementSummary> {
        &self.summaries
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Grand settled total across all registrants.
    pub fn actual_total(&self) -> i64 {
        self.summaries
            .values()
            .map(|s| s.actual_total)
            .fold(0, i64::saturating_add)
    }

    /// Grand estimated total across all registrants.
    pub fn estimated_total(&self) -> i64 {
        self.summaries
            .values()
            .map(|s| s.estimated_total)
            .fold(0, i64::saturating_add)
    }

    /// Summaries as an array, sorted by registrant for stable output.
    pub fn to_vec(&self) -> Vec<RegistrantSettlementSummary> {
        let mut out: Vec<_> = self.summaries.values().cloned().collect();
        out.sort_by(|a, b| a.registrant.cmp(&b.registrant));
        out
    }
}

impl std::fmt::Display for SettlementReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Summary ===")?;
        writeln!(f, "Registrants:     {}", self.len())?;
        writeln!(f, "Actual Total:    {}", self.actual_total())?;
        writeln!(f, "Estimated Total: {}", self.estimated_total())?;

        for summary in self.to_vec() {
            writeln!(f, "\n--- {} ---", summary.registrant)?;
            for payment in &summary.payments {
                writeln!(
                    f,
                    "  #{:<5} {:<15} actual {:>8}  est {:>8}  day {}",
                    payment.record.get(),
                    payment.to.as_str(),
                    display_amount(payment.actual_amount),
                    display_amount(payment.amount),
                    payment.day.as_ref().map(Day::as_str).unwrap_or("-"),
                )?;
            }
            writeln!(f, "  Actual:    {}", summary.actual_total)?;
            writeln!(f, "  Estimated: {}", summary.estimated_total)?;
        }
        Ok(())
    }
}

fn display_amount(amount: Option<i64>) -> String {
    amount.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Group what each registrant is owed, by buyer.
///
/// Records outside `day` (when given), records missing a buyer or
/// registrant, and records where buyer and registrant are the same person
/// are skipped. Within a registrant, payments keep input order.
pub fn aggregate(records: &[PurchaseRecord], day: Option<&Day>) -> SettlementReport {
    let mut summaries: HashMap<ParticipantId, RegistrantSettlementSummary> = HashMap::new();
    let mut included = 0usize;

    for record in records {
        if !Day::matches(day, record.day()) {
            continue;
        }
        let Some((buyer, registrant)) = record.settlement_pair() else {
            continue;
        };

        summaries
            .entry(registrant.clone())
            .or_insert_with(|| RegistrantSettlementSummary::new(registrant.clone()))
            .push(PaymentEntry {
                record: record.id(),
                to: buyer.clone(),
                actual_amount: record.actual_amount(),
                amount: record.amount(),
                day: record.day().cloned(),
            });
        included += 1;
    }

    debug!(
        "aggregated {} of {} records into {} registrants",
        included,
        records.len(),
        summaries.len()
    );
    SettlementReport { summaries }
}

/// Fetch the (optionally day-scoped) snapshot from `store` and aggregate it.
pub fn aggregate_from_store(store: &dyn LedgerStore, day: Option<&Day>) -> Result<SettlementReport> {
    let records = store.fetch(day)?;
    Ok(aggregate(&records, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RecordDraft;

    fn record(id: u64, registrant: &str, buyer: &str, amount: i64, actual: Option<i64>, day: &str) -> PurchaseRecord {
        let mut draft = RecordDraft::new()
            .registrant(registrant)
            .buyer(buyer)
            .amount(amount)
            .day(day);
        draft.actual_amount = actual;
        draft.into_record(RecordId::new(id))
    }

    #[test]
    fn test_groups_by_registrant() {
        let records = vec![
            record(1, "R", "B", 1000, Some(900), "1"),
            record(2, "R", "C", 500, None, "1"),
            record(3, "S", "B", 300, Some(300), "2"),
        ];
        let report = aggregate(&records, None);
        assert_eq!(report.len(), 2);

        let r = report.summary(&ParticipantId::new("R")).unwrap();
        assert_eq!(r.payments.len(), 2);
        assert_eq!(r.actual_total, 900);
        assert_eq!(r.estimated_total, 1500);
        assert_eq!(r.payments[0].to.as_str(), "B");
        assert_eq!(r.payments[1].to.as_str(), "C");
        assert_eq!(r.payments[1].actual_amount, None);

        let s = report.summary(&ParticipantId::new("S")).unwrap();
        assert_eq!(s.actual_total, 300);
    }

    #[test]
    fn test_skips_self_pairs_and_missing_parties() {
        let records = vec![
            record(1, "R", "R", 1000, Some(1000), "1"),
            RecordDraft::new().registrant("R").amount(200).into_record(RecordId::new(2)),
            RecordDraft::new().buyer("B").amount(200).into_record(RecordId::new(3)),
        ];
        let report = aggregate(&records, None);
        assert!(report.is_empty());
    }

    #[test]
    fn test_day_filter() {
        let records = vec![
            record(1, "R", "B", 100, Some(100), "1"),
            record(2, "R", "B", 200, Some(200), "2"),
        ];
        let report = aggregate(&records, Some(&Day::new("2")));
        let r = report.summary(&ParticipantId::new("R")).unwrap();
        assert_eq!(r.payments.len(), 1);
        assert_eq!(r.payments[0].record, RecordId::new(2));
        assert_eq!(r.actual_total, 200);
    }

    #[test]
    fn test_payment_order_is_stable() {
        let records: Vec<_> = (1..=5)
            .map(|i| record(i, "R", "B", i as i64 * 10, None, "1"))
            .collect();
        let report = aggregate(&records, None);
        let ids: Vec<u64> = report
            .summary(&ParticipantId::new("R"))
            .unwrap()
            .payments
            .iter()
            .map(|p| p.record.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_actual_owed_by() {
        let records = vec![
            record(1, "R", "B", 100, Some(90), "1"),
            record(2, "R", "C", 100, Some(70), "1"),
            record(3, "R", "B", 100, Some(10), "2"),
        ];
        let report = aggregate(&records, None);
        let r = report.summary(&ParticipantId::new("R")).unwrap();
        assert_eq!(r.actual_owed_by(&ParticipantId::new("B")), 100);
        assert_eq!(r.actual_owed_by(&ParticipantId::new("C")), 70);
    }

    #[test]
    fn test_empty_input() {
        let report = aggregate(&[], None);
        assert!(report.is_empty());
        assert_eq!(report.actual_total(), 0);
        assert!(report.to_vec().is_empty());
    }

    #[test]
    fn test_to_vec_sorted() {
        let records = vec![
            record(1, "zed", "B", 1, None, "1"),
            record(2, "amy", "B", 1, None, "1"),
        ];
        let names: Vec<String> = aggregate(&records, None)
            .to_vec()
            .into_iter()
            .map(|s| s.registrant.to_string())
            .collect();
        assert_eq!(names, vec!["amy", "zed"]);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let records = vec![
            record(1, "R", "B", i64::MAX, Some(i64::MAX), "1"),
            record(2, "R", "B", i64::MAX, Some(i64::MAX), "1"),
            record(3, "S", "B", i64::MAX, None, "1"),
        ];
        let report = aggregate(&records, None);
        let r = report.summary(&ParticipantId::new("R")).unwrap();
        assert_eq!(r.payments.len(), 2);
        assert_eq!(r.actual_total, i64::MAX);
        assert_eq!(r.estimated_total, i64::MAX);
        assert_eq!(r.actual_owed_by(&ParticipantId::new("B")), i64::MAX);
        assert_eq!(report.actual_total(), i64::MAX);
        assert_eq!(report.estimated_total(), i64::MAX);
    }
}
