//! Helpers for reading typed options out of a `serde_json::Value` object.
//!
//! Every helper takes the options object, a key, and a default. Missing keys,
//! wrong JSON types and non-finite numbers all produce the default, so option
//! parsing never fails. Range checks happen here too: engines read their
//! options through the `_clamped` variants and never see out-of-range values.

use serde_json::Value;

/// Reads a finite `f64`, returning `default` if missing, mistyped, or non-finite.
///
/// JSON integers are accepted and converted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Reads an `f64` and clamps it into `[min, max]`.
pub fn param_f64_clamped(params: &Value, name: &str, default: f64, min: f64, max: f64) -> f64 {
    param_f64(params, name, default).clamp(min, max)
}

/// Reads a non-negative integer as `usize`.
///
/// Floats with no fractional part (`12.0`) are accepted since slider
/// controls tend to emit them; negative or fractional values fall back.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    match params.get(name) {
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .or_else(|| {
                v.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as usize)
            })
            .unwrap_or(default),
        None => default,
    }
}

/// Reads a `usize` and clamps it into `[min, max]`.
pub fn param_usize_clamped(
    params: &Value,
    name: &str,
    default: usize,
    min: usize,
    max: usize,
) -> usize {
    param_usize(params, name, default).clamp(min, max)
}

/// Reads a `bool`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Reads a `String`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Reads an array of small integers (neighbor counts, for instance).
///
/// Entries that are not integers in `0..=max` are skipped. Returns `default`
/// when the key is missing or not an array; an empty array is a valid value.
pub fn param_usize_list(params: &Value, name: &str, default: &[usize], max: usize) -> Vec<usize> {
    match params.get(name).and_then(Value::as_array) {
        Some(items) => {
            let mut out: Vec<usize> = items
                .iter()
                .filter_map(Value::as_u64)
                .map(|n| n as usize)
                .filter(|&n| n <= max)
                .collect();
            out.sort_unstable();
            out.dedup();
            out
        }
        None => default.to_vec(),
    }
}

/// Reads a two-element numeric array `[a, b]`.
pub fn param_pair(params: &Value, name: &str) -> Option<(f64, f64)> {
    let items = params.get(name)?.as_array()?;
    match items.as_slice() {
        [a, b] => {
            let a = a.as_f64().filter(|v| v.is_finite())?;
            let b = b.as_f64().filter(|v| v.is_finite())?;
            Some((a, b))
        }
        _ => None,
    }
}
