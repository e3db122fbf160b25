//! Money on the wire.
//!
//! Amounts are exact `BigDecimal`s inside the service. Clients read them as
//! plain JSON numbers, and may send either a number or a decimal string.
//! Incoming numbers are parsed from their shortest text form, so `299.99`
//! stays `299.99` rather than the nearest binary fraction.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::de::{Deserializer, Error};
use serde::Deserialize;
use serde_json::{Number, Value};

/// JSON number for `amount`: an integer when it has no fractional part,
/// otherwise the closest double, which prints back as the same decimal for
/// cent-scale prices.
pub fn to_json(amount: &BigDecimal) -> Number {
    let whole = amount.with_scale(0);
    if &whole == amount {
        if let Ok(n) = whole.to_string().parse::<i64>() {
            return Number::from(n);
        }
    }
    amount
        .to_string()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .unwrap_or_else(|| Number::from(0))
}

/// `deserialize_with` helper accepting `299.99` or `"299.99"`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(D::Error::custom(format!(
                "expected a decimal number, got {other}"
            )))
        }
    };
    BigDecimal::from_str(&text)
        .map_err(|_| D::Error::custom(format!("'{text}' is not a decimal number")))
}
