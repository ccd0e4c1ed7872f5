//! Source normalizers.
//!
//! Each normalizer is a total function from whatever JSON a source returned
//! (including `null`, arrays, or error documents) to its canonical record.
//! Missing or unparseable leaves read as zero or empty; nothing here fails.

pub mod ads;
pub mod ga4;
pub mod meta;
pub mod types;

pub use ads::normalize_ads;
pub use ga4::normalize_ga4;
pub use meta::{normalize_meta, DEFAULT_META_CONVERSION_EVENTS};
pub use types::*;

use serde_json::Value;

/// Read a float from a JSON number or numeric string. Non-finite values read as 0.
pub(crate) fn num(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    finite(n)
}

/// `n` if finite, else 0. Applied to sums as well as leaves.
pub(crate) fn finite(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Read a non-negative integer counter. Strings are read by their leading
/// digits (`"12.7"` is 12); fractional numbers truncate; negatives read as 0.
pub(crate) fn count(v: Option<&Value>) -> u64 {
    match v {
        Some(Value::Number(n)) => n
            .as_u64()
            .unwrap_or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map_or(0, |f| f as u64)),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim()
                .trim_start_matches('+')
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

pub(crate) fn text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Array at `pointer`, or an empty slice.
pub(crate) fn rows<'a>(payload: &'a Value, pointer: &str) -> &'a [Value] {
    payload
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Top-level `error` marker carried by failure payloads.
pub(crate) fn error_marker(payload: &Value) -> Option<String> {
    match payload.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `a / b`, or 0 when `b` is not positive.
pub(crate) fn ratio(a: f64, b: f64) -> f64 {
    if b > 0.0 {
        let r = a / b;
        if r.is_finite() {
            return r;
        }
    }
    0.0
}
