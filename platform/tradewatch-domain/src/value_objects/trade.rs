use crate::services::diagnostics::{DiagnosticKind, FieldCheck};
use crate::services::keyed_rows::KeyedRow;
use crate::value_objects::side::Side;
use crate::value_objects::wire::Wire;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradePayload {
    pub symbol: Wire<String>,
    pub action: Wire<String>,
    pub price: Wire<f64>,
    pub quantity: Wire<f64>,
    pub timestamp: Wire<String>,
}

/// Latest fill seen for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub symbol: String,
    pub side: Option<Side>,
    pub price: f64,
    pub quantity: f64,
    pub timestamp: Option<String>,
}

impl TradeRow {
    /// `None` when the payload has no usable symbol; such events cannot be keyed.
    pub fn from_payload(payload: &TradePayload, check: &mut FieldCheck<'_>) -> Option<Self> {
        let Some(symbol) = check.text("symbol", &payload.symbol) else {
            check.report(DiagnosticKind::SkippedEvent, "trade without symbol dropped");
            return None;
        };
        let side = check.side("action", &payload.action);
        Some(Self {
            symbol,
            side,
            price: check.number_or_zero("price", &payload.price),
            quantity: check.number_or_zero("quantity", &payload.quantity),
            timestamp: check.optional_text("timestamp", &payload.timestamp),
        })
    }
}

impl KeyedRow for TradeRow {
    fn key(&self) -> &str {
        &self.symbol
    }

    fn side(&self) -> Option<Side> {
        self.side
    }
}
