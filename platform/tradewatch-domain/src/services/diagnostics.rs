use crate::repositories::render_surface::Mount;
use crate::value_objects::side::Side;
use crate::value_objects::wire::Wire;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingField,
    MalformedField,
    SkippedEvent,
    MissingMount,
}

/// A recoverable problem noticed while applying an event or painting a surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub context: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn missing_mount(mount: Mount) -> Self {
        Self::new(
            DiagnosticKind::MissingMount,
            "paint",
            format!("mount '{}' is not available; skipped", mount.name()),
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}

/// Defensive field access for one event payload. Every rejection is recorded as a
/// [`Diagnostic`] tagged with the event name.
pub struct FieldCheck<'a> {
    context: &'static str,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> FieldCheck<'a> {
    pub fn new(context: &'static str, diagnostics: &'a mut Vec<Diagnostic>) -> Self {
        Self {
            context,
            diagnostics,
        }
    }

    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(kind, self.context, message));
    }

    pub fn number(&mut self, field: &str, value: &Wire<f64>) -> Option<f64> {
        match value {
            Wire::Valid(v) if v.is_finite() => Some(*v),
            Wire::Valid(v) => {
                self.report(
                    DiagnosticKind::MalformedField,
                    format!("{field} is not a finite number ({v})"),
                );
                None
            }
            Wire::Invalid(Value::Null) => {
                self.report(DiagnosticKind::MissingField, format!("{field} is missing"));
                None
            }
            Wire::Invalid(raw) => {
                self.report(
                    DiagnosticKind::MalformedField,
                    format!("{field} is not a number: {raw}"),
                );
                None
            }
        }
    }

    /// Required number; the neutral value is zero.
    pub fn number_or_zero(&mut self, field: &str, value: &Wire<f64>) -> f64 {
        self.number(field, value).unwrap_or(0.0)
    }

    /// Absence is fine, a present but mistyped value is reported.
    pub fn optional_number(&mut self, field: &str, value: &Wire<f64>) -> Option<f64> {
        if value.is_absent() {
            return None;
        }
        self.number(field, value)
    }

    pub fn text(&mut self, field: &str, value: &Wire<String>) -> Option<String> {
        match value {
            Wire::Valid(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
            Wire::Valid(_) | Wire::Invalid(Value::Null) => {
                self.report(DiagnosticKind::MissingField, format!("{field} is missing"));
                None
            }
            Wire::Invalid(raw) => {
                self.report(
                    DiagnosticKind::MalformedField,
                    format!("{field} is not a string: {raw}"),
                );
                None
            }
        }
    }

    /// A buy/sell field; anything else is reported and yields `None`.
    pub fn side(&mut self, field: &str, value: &Wire<String>) -> Option<Side> {
        let raw = self.text(field, value)?;
        let side = Side::parse(&raw);
        if side.is_none() {
            self.report(
                DiagnosticKind::MalformedField,
                format!("{field} '{raw}' is neither buy nor sell"),
            );
        }
        side
    }

    pub fn optional_text(&mut self, field: &str, value: &Wire<String>) -> Option<String> {
        match value {
            Wire::Valid(v) if v.trim().is_empty() => None,
            Wire::Invalid(Value::Null) => None,
            _ => self.text(field, value),
        }
    }

    pub fn optional_flag(&mut self, field: &str, value: &Wire<bool>) -> Option<bool> {
        match value {
            Wire::Valid(v) => Some(*v),
            Wire::Invalid(Value::Null) => None,
            Wire::Invalid(raw) => {
                self.report(
                    DiagnosticKind::MalformedField,
                    format!("{field} is not a boolean: {raw}"),
                );
                None
            }
        }
    }

    /// A list field; absence yields `None` silently, a malformed list is reported.
    pub fn optional_list<'w, T>(&mut self, field: &str, value: &'w Wire<Vec<T>>) -> Option<&'w [T]> {
        match value {
            Wire::Valid(items) => Some(items.as_slice()),
            Wire::Invalid(Value::Null) => None,
            Wire::Invalid(raw) => {
                let kind = match raw {
                    Value::Array(_) => "list with malformed items",
                    _ => "not a list",
                };
                self.report(DiagnosticKind::MalformedField, format!("{field} is {kind}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticKind, FieldCheck};
    use crate::value_objects::wire::Wire;
    use serde_json::json;

    #[test]
    fn number_reports_missing_and_malformed_separately() {
        let mut diagnostics = Vec::new();
        let mut check = FieldCheck::new("balance_update", &mut diagnostics);

        assert_eq!(check.number("cash_balance", &Wire::Valid(5.0)), Some(5.0));
        assert_eq!(check.number_or_zero("total_equity", &Wire::absent()), 0.0);
        assert_eq!(
            check.number("buying_power", &Wire::invalid(json!("lots"))),
            None
        );

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingField);
        assert_eq!(diagnostics[1].kind, DiagnosticKind::MalformedField);
        assert_eq!(diagnostics[1].context, "balance_update");
        assert!(diagnostics[1].message.contains("buying_power"));
    }

    #[test]
    fn optional_fields_stay_quiet_when_absent() {
        let mut diagnostics = Vec::new();
        let mut check = FieldCheck::new("orders_update", &mut diagnostics);

        assert_eq!(check.optional_number("limit_price", &Wire::absent()), None);
        assert_eq!(check.optional_text("side", &Wire::Valid("  ".to_string())), None);
        assert_eq!(check.optional_flag("is_market_open", &Wire::absent()), None);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn text_is_trimmed_and_blank_is_missing() {
        let mut diagnostics = Vec::new();
        let mut check = FieldCheck::new("trade_update", &mut diagnostics);

        assert_eq!(
            check.text("symbol", &Wire::Valid(" AAPL ".to_string())),
            Some("AAPL".to_string())
        );
        assert_eq!(check.text("symbol", &Wire::Valid(String::new())), None);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingField);
    }
}
