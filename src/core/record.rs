use crate::core::participant::{Day, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a purchase record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The editable, already-normalized fields of a purchase record.
///
/// A draft is what gets submitted on create and on edit. On edit every
/// field of the stored record is replaced by the draft's value, so a field
/// left as `None` clears it.
///
/// # Examples
///
/// ```
/// use circle_settlement::core::record::{RecordDraft, RecordId};
///
/// let record = RecordDraft::new()
///     .registrant("alice")
///     .buyer("bob")
///     .amount(1500)
///     .day("1")
///     .into_record(RecordId::new(1));
///
/// assert_eq!(record.amount(), Some(1500));
/// assert!(!record.completed());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordDraft {
    /// Circle (vendor) name.
    pub name: Option<String>,
    /// Booth placement inside the hall.
    pub place: Option<String>,
    /// Hall area.
    pub area: Option<String>,
    pub memo: Option<String>,
    pub buyer: Option<ParticipantId>,
    pub registrant: Option<ParticipantId>,
    pub amount: Option<i64>,
    pub actual_amount: Option<i64>,
    pub day: Option<Day>,
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    pub fn area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = Some(ParticipantId::new(buyer));
        self
    }

    pub fn registrant(mut self, registrant: impl Into<String>) -> Self {
        self.registrant = Some(ParticipantId::new(registrant));
        self
    }

    pub fn amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn actual_amount(mut self, actual_amount: i64) -> Self {
        self.actual_amount = Some(actual_amount);
        self
    }

    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(Day::new(day));
        self
    }

    /// Materialize the draft as a fresh, pending record.
    pub fn into_record(self, id: RecordId) -> PurchaseRecord {
        PurchaseRecord::new(id, self, Utc::now())
    }
}

/// One vendor ("circle") transaction entered by a participant.
///
/// The `registrant` logged the purchase and is owed for it; the `buyer`
/// owes the registrant. `amount` is the estimate known at registration,
/// `actual_amount` the settled cost once reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    id: RecordId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    memo: Option<String>,
    #[serde(default)]
    buyer: Option<ParticipantId>,
    #[serde(default)]
    registrant: Option<ParticipantId>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    actual_amount: Option<i64>,
    #[serde(default)]
    day: Option<Day>,
    #[serde(default)]
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Create a pending record from a draft.
    pub fn new(id: RecordId, draft: RecordDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            place: draft.place,
            area: draft.area,
            memo: draft.memo,
            buyer: draft.buyer,
            registrant: draft.registrant,
            amount: draft.amount,
            actual_amount: draft.actual_amount,
            day: draft.day,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field with the draft's value.
    ///
    /// `id`, `completed` and `created_at` are left untouched.
    pub fn apply_edit(&mut self, draft: RecordDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.place = draft.place;
        self.area = draft.area;
        self.memo = draft.memo;
        self.buyer = draft.buyer;
        self.registrant = draft.registrant;
        self.amount = draft.amount;
        self.actual_amount = draft.actual_amount;
        self.day = draft.day;
        self.updated_at = now;
    }

    /// Move the record into or out of the completed state.
    ///
    /// Completing backfills a missing `actual_amount` from `amount`.
    /// Un-completing keeps whatever `actual_amount` holds.
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if completed && self.actual_amount.is_none() {
            self.actual_amount = self.amount;
        }
        self.completed = completed;
        self.updated_at = now;
    }

    /// The `(buyer, registrant)` pair when the record takes part in
    /// settlement: both present and distinct.
    pub fn settlement_pair(&self) -> Option<(&ParticipantId, &ParticipantId)> {
        match (&self.buyer, &self.registrant) {
            (Some(buyer), Some(registrant)) if buyer != registrant => Some((buyer, registrant)),
            _ => None,
        }
    }

    /// Editable fields as a draft, e.g. to tweak one field and resubmit.
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            name: self.name.clone(),
            place: self.place.clone(),
            area: self.area.clone(),
            memo: self.memo.clone(),
            buyer: self.buyer.clone(),
            registrant: self.registrant.clone(),
            amount: self.amount,
            actual_amount: self.actual_amount,
            day: self.day.clone(),
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn place(&self) -> Option<&str> {
        self.place.as_deref()
    }

    pub fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    pub fn buyer(&self) -> Option<&ParticipantId> {
        self.buyer.as_ref()
    }

    pub fn registrant(&self) -> Option<&ParticipantId> {
        self.registrant.as_ref()
    }

    pub fn amount(&self) -> Option<i64> {
        self.amount
    }

    pub fn actual_amount(&self) -> Option<i64> {
        self.actual_amount
    }

    pub fn day(&self) -> Option<&Day> {
        self.day.as_ref()
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Return `record` moved into (`to_complete = true`) or out of the
/// completed state, applying the `actual_amount` backfill on completion.
pub fn apply_completion(mut record: PurchaseRecord, to_complete: bool) -> PurchaseRecord {
    record.set_completed(to_complete, Utc::now());
    record
}
