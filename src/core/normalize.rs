//! Normalization boundary between raw submissions and the ledger.
//!
//! Raw form values arrive as strings, numbers or nothing at all. Everything
//! past this module sees strict `Option<i64>` amounts and trimmed,
//! non-empty text. Bad input degrades to absence and is logged; it is never
//! an error.

use crate::core::participant::{Day, ParticipantId};
use crate::core::record::RecordDraft;
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// An un-normalized record submission, every field of unknown type.
///
/// # Examples
///
/// ```
/// use circle_settlement::core::normalize::RawRecord;
/// use serde_json::json;
///
/// let raw: RawRecord = serde_json::from_value(json!({
///     "registrant": " alice ",
///     "amount": "1500円",
///     "actualAmount": "",
///     "day": 1
/// })).unwrap();
///
/// let draft = raw.normalize();
/// assert_eq!(draft.registrant.unwrap().as_str(), "alice");
/// assert_eq!(draft.amount, Some(1500));
/// assert_eq!(draft.actual_amount, None);
/// assert_eq!(draft.day.unwrap().as_str(), "1");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub name: Value,
    pub place: Value,
    pub area: Value,
    pub memo: Value,
    pub buyer: Value,
    pub registrant: Value,
    pub amount: Value,
    pub actual_amount: Value,
    pub day: Value,
}

impl RawRecord {
    /// Coerce every field into its canonical form.
    pub fn normalize(&self) -> RecordDraft {
        RecordDraft {
            name: normalize_text(&self.name),
            place: normalize_text(&self.place),
            area: normalize_text(&self.area),
            memo: normalize_text(&self.memo),
            buyer: normalize_participant(&self.buyer),
            registrant: normalize_participant(&self.registrant),
            amount: normalize_amount("amount", &self.amount),
            actual_amount: normalize_amount("actualAmount", &self.actual_amount),
            day: normalize_day(&self.day),
        }
    }
}

/// Parse an integer out of a raw value.
///
/// Strings contribute their longest leading decimal prefix, so `"1500"`,
/// `" 1500.0 "`, `"1.5e3"` and `"1500円"` all give 1500. Fractions round
/// half away from zero. Anything without a numeric reading, or too large
/// for an `i64`, is `None`.
pub fn parse_integer(value: &Value) -> Option<i64> {
    let decimal = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            Decimal::from_f64_retain(n.as_f64()?)?
        }
        Value::String(s) => {
            let (mantissa, exponent) = numeric_prefix(s)?;
            scale_by_power_of_ten(Decimal::from_str(&mantissa).ok()?, exponent)?
        }
        _ => return None,
    };
    decimal
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Parse a monetary field. Negative or unreadable values become `None`.
pub fn normalize_amount(field: &'static str, value: &Value) -> Option<i64> {
    if is_blank(value) {
        return None;
    }
    match parse_integer(value) {
        Some(amount) if amount >= 0 => Some(amount),
        Some(amount) => {
            warn!("negative {} {} treated as absent", field, amount);
            None
        }
        None => {
            warn!("unparseable {} {} treated as absent", field, value);
            None
        }
    }
}

/// Trim text; numbers are rendered as text. Empty means absent.
pub fn normalize_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => return None,
        other => {
            warn!("non-text value {} treated as absent", other);
            return None;
        }
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn normalize_participant(value: &Value) -> Option<ParticipantId> {
    normalize_text(value).map(ParticipantId::new)
}

pub fn normalize_day(value: &Value) -> Option<Day> {
    normalize_text(value).map(Day::new)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Multiply `value` by `10^exponent`; `None` on overflow.
fn scale_by_power_of_ten(mut value: Decimal, exponent: i32) -> Option<Decimal> {
    if value.is_zero() {
        return Some(value);
    }
    if exponent >= 0 {
        for _ in 0..exponent.min(MAX_EXPONENT) {
            value = value.checked_mul(Decimal::TEN)?;
        }
        if exponent > MAX_EXPONENT {
            return None;
        }
    } else {
        for _ in 0..exponent.unsigned_abs().min(MAX_EXPONENT as u32) {
            value = value.checked_div(Decimal::TEN)?;
            if value.is_zero() {
                break;
            }
        }
    }
    Some(value)
}

/// Past this, any non-zero mantissa is out of `i64` range or rounds to 0.
const MAX_EXPONENT: i32 = 40;

/// Longest prefix of the trimmed input that reads as a decimal number, the
/// way `parseFloat` reads it: sign, digits, fraction, then an optional
/// `e`/`E` exponent. Returns the mantissa in a form `Decimal` accepts
/// (`".5"` becomes `"0.5"`) and the exponent.
fn numeric_prefix(s: &str) -> Option<(String, i32)> {
    let mut chars = s.trim_start().chars().peekable();
    let mut out = String::new();

    match chars.peek() {
        Some('-') => {
            out.push('-');
            chars.next();
        }
        Some('+') => {
            chars.next();
        }
        _ => {}
    }

    let mut int_part = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        int_part.push(c);
        chars.next();
    }

    let mut frac_part = String::new();
    if chars.peek() == Some(&'.') {
        chars.next();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            frac_part.push(c);
            chars.next();
        }
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if int_part.is_empty() {
        int_part.push('0');
    }
    out.push_str(&int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }

    let rest: String = chars.collect();
    Some((out, exponent_prefix(&rest)))
}

/// Exponent of a leading `e[+-]digits`; 0 when absent or incomplete
/// (`"1e"` reads as 1).
fn exponent_prefix(rest: &str) -> i32 {
    let Some(after_e) = rest.strip_prefix(['e', 'E']) else {
        return 0;
    };
    let (negative, digits) = match after_e.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, after_e.strip_prefix('+').unwrap_or(after_e)),
    };
    let digits: String = digits.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    let magnitude = digits
        .parse::<i32>()
        .map(|m| m.min(MAX_EXPONENT + 1))
        .unwrap_or(MAX_EXPONENT + 1);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_and_padded_strings() {
        assert_eq!(parse_integer(&json!("1500")), Some(1500));
        assert_eq!(parse_integer(&json!("  1500  ")), Some(1500));
        assert_eq!(parse_integer(&json!("1500.0")), Some(1500));
    }

    #[test]
    fn test_parse_takes_numeric_prefix() {
        assert_eq!(parse_integer(&json!("1500円")), Some(1500));
        assert_eq!(parse_integer(&json!("300 yen")), Some(300));
        assert_eq!(parse_integer(&json!("12.")), Some(12));
        assert_eq!(parse_integer(&json!(".5")), Some(1));
    }

    #[test]
    fn test_parse_exponent_like_parse_float() {
        assert_eq!(parse_integer(&json!("1.5e3")), Some(1500));
        assert_eq!(parse_integer(&json!("2E2円")), Some(200));
        assert_eq!(parse_integer(&json!("15e-1")), Some(2));
        assert_eq!(parse_integer(&json!("7e+1")), Some(70));
        assert_eq!(parse_integer(&json!("1e")), Some(1));
        assert_eq!(parse_integer(&json!("3e-x")), Some(3));
        assert_eq!(parse_integer(&json!("5e-300")), Some(0));
    }

    #[test]
    fn test_parse_out_of_range_is_absent() {
        assert_eq!(parse_integer(&json!("9e99")), None);
        assert_eq!(parse_integer(&json!("99999999999999999999")), None);
        assert_eq!(parse_integer(&json!("0e999")), Some(0));
    }

    #[test]
    fn test_parse_rounds_half_away_from_zero() {
        assert_eq!(parse_integer(&json!("2.5")), Some(3));
        assert_eq!(parse_integer(&json!("2.4")), Some(2));
        assert_eq!(parse_integer(&json!(-2.5)), Some(-3));
        assert_eq!(parse_integer(&json!(99.5)), Some(100));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_integer(&json!(700)), Some(700));
        assert_eq!(parse_integer(&json!(0)), Some(0));
    }

    #[test]
    fn test_parse_non_numeric_is_absent() {
        assert_eq!(parse_integer(&json!("abc")), None);
        assert_eq!(parse_integer(&json!("")), None);
        assert_eq!(parse_integer(&json!("-")), None);
        assert_eq!(parse_integer(&json!(".")), None);
        assert_eq!(parse_integer(&json!(true)), None);
        assert_eq!(parse_integer(&json!([1])), None);
        assert_eq!(parse_integer(&Value::Null), None);
    }

    #[test]
    fn test_amount_rejects_negative() {
        assert_eq!(normalize_amount("amount", &json!("-100")), None);
        assert_eq!(normalize_amount("amount", &json!(-1)), None);
        assert_eq!(normalize_amount("amount", &json!("0")), Some(0));
    }

    #[test]
    fn test_amount_blank_and_garbage() {
        assert_eq!(normalize_amount("amount", &json!("2000")), Some(2000));
        assert_eq!(normalize_amount("amount", &json!("   ")), None);
        assert_eq!(normalize_amount("amount", &json!("n/a")), None);
    }

    #[test]
    fn test_text_normalization() {
        assert_eq!(normalize_text(&json!("  Hall East ")), Some("Hall East".into()));
        assert_eq!(normalize_text(&json!("   ")), None);
        assert_eq!(normalize_text(&json!(2)), Some("2".into()));
        assert_eq!(normalize_text(&json!({"a": 1})), None);
        assert_eq!(normalize_day(&json!("")), None);
    }

    #[test]
    fn test_raw_record_missing_fields() {
        let raw: RawRecord = serde_json::from_value(json!({ "registrant": "R" })).unwrap();
        let draft = raw.normalize();
        assert_eq!(draft.registrant, Some(ParticipantId::new("R")));
        assert_eq!(draft.buyer, None);
        assert_eq!(draft.amount, None);
        assert_eq!(draft.day, None);
    }
}
