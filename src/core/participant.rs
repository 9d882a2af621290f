use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a participant in a convention purchase run.
///
/// A participant is either the registrant of a purchase record (the person
/// who logged it and fronted the money) or its buyer (the person who owes
/// the registrant for it). Identities are compared as exact strings.
///
/// # Examples
///
/// ```
/// use circle_settlement::core::participant::ParticipantId;
///
/// let alice = ParticipantId::new("alice");
/// let bob = ParticipantId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identity is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Categorical partition key for purchase records, usually the event day.
///
/// Days are opaque labels (`"1"`, `"2"`, `"sat"`); they are never parsed as
/// dates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Day(String);

impl Day {
    pub fn new(day: impl Into<String>) -> Self {
        Self(day.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a record filed under `day` passes the optional `filter`.
    ///
    /// No filter matches every record. A filter never matches a record
    /// without a day.
    pub fn matches(filter: Option<&Day>, day: Option<&Day>) -> bool {
        match filter {
            None => true,
            Some(wanted) => day == Some(wanted),
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Day {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
