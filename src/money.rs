// 💵 Money - Exact decimal amounts for the host ledger
//
// Amounts are read from JSON without passing through binary floating point
// (serde_json is built with `arbitrary_precision`) and always written back
// with exactly two decimal places, rounded half-to-even.

use crate::error::{Result, SplitterError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::str::FromStr;

/// Number of decimal places in every serialized amount
pub const AMOUNT_SCALE: u32 = 2;

/// Parse the exact decimal value of a JSON number.
pub fn from_number(number: &Number) -> Result<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| SplitterError::format("amount", text))
}

/// Round to two places (half-to-even) and pad so the scale is always two.
pub fn round_amount(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(AMOUNT_SCALE);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Text form used in JSON output and ledger lines, e.g. `-25.00`.
pub fn format_amount(amount: Decimal) -> String {
    round_amount(amount).to_string()
}

/// JSON number carrying the two-place text verbatim.
pub fn to_number(amount: Decimal) -> std::result::Result<Number, serde_json::Error> {
    Number::from_str(&format_amount(amount))
}

// ============================================================================
// SERDE ADAPTER (#[serde(with = "crate::money")])
// ============================================================================

pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    to_number(*amount)
        .map_err(S::Error::custom)?
        .serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Decimal, D::Error> {
    let number = Number::deserialize(deserializer)?;
    from_number(&number).map_err(D::Error::custom)
}
