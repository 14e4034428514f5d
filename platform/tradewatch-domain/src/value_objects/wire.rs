use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A payload field exactly as the transport delivered it: either the expected type or the raw
/// JSON value that arrived in its place.
///
/// Absent fields default to `Invalid(Value::Null)`, so payload structs built from `Wire<T>`
/// fields accept any JSON object and a single bad field never rejects the whole event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Wire<T> {
    Valid(T),
    Invalid(Value),
}

impl<T> Default for Wire<T> {
    fn default() -> Self {
        Wire::Invalid(Value::Null)
    }
}

impl<T> From<T> for Wire<T> {
    fn from(value: T) -> Self {
        Wire::Valid(value)
    }
}

impl<T> Wire<T> {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn invalid(raw: Value) -> Self {
        Wire::Invalid(raw)
    }

    /// True when the field was missing or explicitly `null`.
    pub fn is_absent(&self) -> bool {
        matches!(self, Wire::Invalid(Value::Null))
    }

    pub fn valid(&self) -> Option<&T> {
        match self {
            Wire::Valid(value) => Some(value),
            Wire::Invalid(_) => None,
        }
    }
}

impl Wire<f64> {
    pub fn finite(&self) -> Option<f64> {
        match self {
            Wire::Valid(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Wire;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        amount: Wire<f64>,
        label: Wire<String>,
        open: Wire<bool>,
    }

    #[test]
    fn numbers_and_integers_are_valid() {
        let sample: Sample = serde_json::from_value(json!({ "amount": 12 })).expect("sample");
        assert_eq!(sample.amount.finite(), Some(12.0));
        assert!(sample.label.is_absent());
        assert!(sample.open.is_absent());
    }

    #[test]
    fn mistyped_fields_keep_raw_value() {
        let sample: Sample = serde_json::from_value(json!({
            "amount": "1000.50",
            "label": 7,
            "open": "yes"
        }))
        .expect("sample");
        assert_eq!(sample.amount, Wire::Invalid(json!("1000.50")));
        assert_eq!(sample.label, Wire::Invalid(json!(7)));
        assert_eq!(sample.open, Wire::Invalid(json!("yes")));
        assert!(!sample.amount.is_absent());
    }

    #[test]
    fn explicit_null_counts_as_absent() {
        let sample: Sample = serde_json::from_value(json!({ "amount": null })).expect("sample");
        assert!(sample.amount.is_absent());
        assert_eq!(sample.amount.finite(), None);
    }

    #[test]
    fn non_finite_values_are_not_finite() {
        assert_eq!(Wire::Valid(f64::NAN).finite(), None);
        assert_eq!(Wire::Valid(f64::INFINITY).finite(), None);
        assert_eq!(Wire::Valid(-3.5).finite(), Some(-3.5));
    }
}
