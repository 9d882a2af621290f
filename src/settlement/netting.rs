use crate::core::participant::{Day, ParticipantId};
use crate::core::record::PurchaseRecord;
use crate::error::{Result, SettlementError};
use crate::store::LedgerStore;
use log::debug;
use serde::{Deserialize, Serialize};

/// Gross sums in both directions between a buyer and a registrant.
///
/// Sums saturate at `i64::MAX` instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseGross {
    /// Settled amount the buyer owes the registrant.
    pub actual_owed: i64,
    /// Estimated amount the buyer owes the registrant.
    pub estimated_owed: i64,
    /// Settled amount the registrant owes the buyer.
    pub actual_reverse: i64,
    /// Estimated amount the registrant owes the buyer.
    pub estimated_reverse: i64,
}

impl PairwiseGross {
    /// Signed settled net, positive when the buyer owes the registrant.
    pub fn net_actual(&self) -> i64 {
        self.actual_owed.saturating_sub(self.actual_reverse)
    }

    /// Signed estimated net, positive when the buyer owes the registrant.
    pub fn net_estimated(&self) -> i64 {
        self.estimated_owed.saturating_sub(self.estimated_reverse)
    }
}

/// Net amount the buyer (`to`) owes the registrant (`from`).
///
/// Both amounts are clamped at zero. A buyer who is owed more than they
/// owe shows up as zero here, not as a debt in the other direction; query
/// the reversed pair to see that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseNetResult {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub actual_amount: i64,
    pub amount: i64,
}

impl PairwiseNetResult {
    pub fn is_zero(&self) -> bool {
        self.actual_amount == 0 && self.amount == 0
    }
}

impl std::fmt::Display for PairwiseNetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Net Balance ===")?;
        writeln!(f, "{} owes {}", self.to, self.from)?;
        writeln!(f, "Actual:    {}", self.actual_amount)?;
        writeln!(f, "Estimated: {}", self.amount)
    }
}

/// Pairwise netting of purchase records between two participants.
pub struct NettingEngine;

impl NettingEngine {
    /// Sum both directions of debt between `buyer` and `registrant`.
    ///
    /// Only records inside `day` (when given) whose buyer and registrant are
    /// present and distinct count. Absent amounts count as zero.
    pub fn pairwise_gross(
        records: &[PurchaseRecord],
        buyer: &ParticipantId,
        registrant: &ParticipantId,
        day: Option<&Day>,
    ) -> PairwiseGross {
        let mut gross = PairwiseGross::default();

        for record in records {
            if !Day::matches(day, record.day()) {
                continue;
            }
            let Some((b, r)) = record.settlement_pair() else {
                continue;
            };
            let actual = record.actual_amount().unwrap_or(0);
            let estimated = record.amount().unwrap_or(0);

            if b == buyer && r == registrant {
                gross.actual_owed = gross.actual_owed.saturating_add(actual);
                gross.estimated_owed = gross.estimated_owed.saturating_add(estimated);
            } else if b == registrant && r == buyer {
                gross.actual_reverse = gross.actual_reverse.saturating_add(actual);
                gross.estimated_reverse = gross.estimated_reverse.saturating_add(estimated);
            }
        }

        gross
    }

    /// Net what `buyer` owes `registrant` over `records`.
    ///
    /// Offsetting purchases in the other direction are subtracted, and a
    /// negative net on either amount is reported as zero.
    ///
    /// Fails with `InvalidArgument` if either identity is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use circle_settlement::prelude::*;
    ///
    /// let records = vec![
    ///     RecordDraft::new().buyer("B").registrant("R").amount(1000).actual_amount(1000)
    ///         .into_record(RecordId::new(1)),
    ///     RecordDraft::new().buyer("R").registrant("B").amount(400).actual_amount(400)
    ///         .into_record(RecordId::new(2)),
    /// ];
    ///
    /// let net = NettingEngine::net_balance(&records, &"B".into(), &"R".into(), None).unwrap();
    /// assert_eq!((net.actual_amount, net.amount), (600, 600));
    ///
    /// let reverse = NettingEngine::net_balance(&records, &"R".into(), &"B".into(), None).unwrap();
    /// assert!(reverse.is_zero());
    /// ```
    pub fn net_balance(
        records: &[PurchaseRecord],
        buyer: &ParticipantId,
        registrant: &ParticipantId,
        day: Option<&Day>,
    ) -> Result<PairwiseNetResult> {
        Self::check_identities(buyer, registrant)?;

        let gross = Self::pairwise_gross(records, buyer, registrant, day);
        debug!(
            "net {} -> {} over {} records: {:?}",
            buyer,
            registrant,
            records.len(),
            gross
        );

        Ok(PairwiseNetResult {
            from: registrant.clone(),
            to: buyer.clone(),
            actual_amount: gross.net_actual().max(0),
            amount: gross.net_estimated().max(0),
        })
    }

    /// Same as [`NettingEngine::net_balance`], reading the snapshot from
    /// `store`. Identities are checked before the store is touched.
    pub fn net_balance_in(
        store: &dyn LedgerStore,
        buyer: &ParticipantId,
        registrant: &ParticipantId,
        day: Option<&Day>,
    ) -> Result<PairwiseNetResult> {
        Self::check_identities(buyer, registrant)?;
        let records = store.fetch(day)?;
        Self::net_balance(&records, buyer, registrant, day)
    }

    fn check_identities(buyer: &ParticipantId, registrant: &ParticipantId) -> Result<()> {
        if buyer.is_blank() {
            return Err(SettlementError::InvalidArgument(
                "buyer must not be empty".to_string(),
            ));
        }
        if registrant.is_blank() {
            return Err(SettlementError::InvalidArgument(
                "registrant must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{RecordDraft, RecordId};
    use crate::store::memory::InMemoryStore;

    fn purchase(id: u64, buyer: &str, registrant: &str, amount: i64, actual: i64, day: &str) -> PurchaseRecord {
        RecordDraft::new()
            .buyer(buyer)
            .registrant(registrant)
            .amount(amount)
            .actual_amount(actual)
            .day(day)
            .into_record(RecordId::new(id))
    }

    fn p(name: &str) -> ParticipantId {
        ParticipantId::new(name)
    }

    #[test]
    fn test_offsetting_debts_net_out() {
        let records = vec![
            purchase(1, "B", "R", 1000, 1000, "1"),
            purchase(2, "R", "B", 400, 400, "1"),
        ];
        let net = NettingEngine::net_balance(&records, &p("B"), &p("R"), None).unwrap();
        assert_eq!(net.from, p("R"));
        assert_eq!(net.to, p("B"));
        assert_eq!(net.actual_amount, 600);
        assert_eq!(net.amount, 600);
    }

    #[test]
    fn test_reverse_direction_clamps_to_zero() {
        let records = vec![
            purchase(1, "B", "R", 1000, 1000, "1"),
            purchase(2, "R", "B", 400, 400, "1"),
        ];
        let net = NettingEngine::net_balance(&records, &p("R"), &p("B"), None).unwrap();
        assert_eq!(net.from, p("B"));
        assert_eq!(net.to, p("R"));
        assert_eq!(net.actual_amount, 0);
        assert_eq!(net.amount, 0);
    }

    #[test]
    fn test_actual_and_estimate_clamp_independently() {
        // Estimates say B owes R, settled amounts say the reverse.
        let records = vec![
            purchase(1, "B", "R", 1000, 300, "1"),
            purchase(2, "R", "B", 200, 500, "1"),
        ];
        let net = NettingEngine::net_balance(&records, &p("B"), &p("R"), None).unwrap();
        assert_eq!(net.amount, 800);
        assert_eq!(net.actual_amount, 0);
    }

    #[test]
    fn test_missing_amounts_count_as_zero() {
        let records = vec![
            RecordDraft::new().buyer("B").registrant("R").amount(700).into_record(RecordId::new(1)),
            RecordDraft::new().buyer("B").registrant("R").into_record(RecordId::new(2)),
        ];
        let net = NettingEngine::net_balance(&records, &p("B"), &p("R"), None).unwrap();
        assert_eq!(net.amount, 700);
        assert_eq!(net.actual_amount, 0);
    }

    #[test]
    fn test_day_filter_scopes_netting() {
        let records = vec![
            purchase(1, "B", "R", 1000, 1000, "1"),
            purchase(2, "B", "R", 250, 250, "2"),
        ];
        let day_two = Day::new("2");
        let net = NettingEngine::net_balance(&records, &p("B"), &p("R"), Some(&day_two)).unwrap();
        assert_eq!(net.actual_amount, 250);
    }

    #[test]
    fn test_third_parties_ignored() {
        let records = vec![
            purchase(1, "B", "R", 1000, 1000, "1"),
            purchase(2, "C", "R", 5000, 5000, "1"),
            purchase(3, "B", "C", 5000, 5000, "1"),
        ];
        let gross = NettingEngine::pairwise_gross(&records, &p("B"), &p("R"), None);
        assert_eq!(gross.actual_owed, 1000);
        assert_eq!(gross.actual_reverse, 0);
    }

    #[test]
    fn test_self_pair_is_zero() {
        let records = vec![purchase(1, "R", "R", 1000, 1000, "1")];
        let net = NettingEngine::net_balance(&records, &p("R"), &p("R"), None).unwrap();
        assert!(net.is_zero());
    }

    #[test]
    fn test_empty_records_all_zero() {
        let net = NettingEngine::net_balance(&[], &p("B"), &p("R"), None).unwrap();
        assert!(net.is_zero());
    }

    #[test]
    fn test_blank_identity_is_invalid() {
        let err = NettingEngine::net_balance(&[], &p(""), &p("R"), None).unwrap_err();
        assert!(matches!(err, SettlementError::InvalidArgument(_)));
        let err = NettingEngine::net_balance(&[], &p("B"), &p("  "), None).unwrap_err();
        assert!(matches!(err, SettlementError::InvalidArgument(_)));
    }

    #[test]
    fn test_store_backed_netting() {
        let store = InMemoryStore::new();
        store
            .insert(RecordDraft::new().buyer("B").registrant("R").amount(900).actual_amount(850))
            .unwrap();
        let net = NettingEngine::net_balance_in(&store, &p("B"), &p("R"), None).unwrap();
        assert_eq!(net.actual_amount, 850);
        assert_eq!(net.amount, 900);

        let err = NettingEngine::net_balance_in(&store, &p(""), &p("R"), None).unwrap_err();
        assert!(matches!(err, SettlementError::InvalidArgument(_)));
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let records = vec![
            purchase(1, "B", "R", i64::MAX, i64::MAX, "1"),
            purchase(2, "B", "R", i64::MAX, i64::MAX, "1"),
            purchase(3, "R", "B", 1000, 1000, "1"),
        ];
        let gross = NettingEngine::pairwise_gross(&records, &p("B"), &p("R"), None);
        assert_eq!(gross.actual_owed, i64::MAX);
        assert_eq!(gross.estimated_owed, i64::MAX);
        assert_eq!(gross.actual_reverse, 1000);

        let net = NettingEngine::net_balance(&records, &p("B"), &p("R"), None).unwrap();
        assert_eq!(net.actual_amount, i64::MAX - 1000);
        assert_eq!(net.amount, i64::MAX - 1000);

        let reverse = NettingEngine::net_balance(&records, &p("R"), &p("B"), None).unwrap();
        assert!(reverse.is_zero());
    }
}
