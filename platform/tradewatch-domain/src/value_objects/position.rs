use crate::services::diagnostics::{DiagnosticKind, FieldCheck};
use crate::services::keyed_rows::KeyedRow;
use crate::value_objects::side::Side;
use crate::value_objects::wire::Wire;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionPayload {
    pub symbol: Wire<String>,
    pub side: Wire<String>,
    pub qty: Wire<f64>,
    pub avg_entry_price: Wire<f64>,
    pub current_price: Wire<f64>,
    pub unrealized_pl: Wire<f64>,
    pub unrealized_plpc: Wire<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRow {
    pub symbol: String,
    pub side: Option<Side>,
    pub qty: f64,
    pub avg_entry_price: f64,
    pub current_price: f64,
    pub unrealized_pl: f64,
    pub unrealized_plpc: f64,
}

impl PositionRow {
    /// Without an explicit side, a negative quantity classifies the position as a sell (short).
    pub fn from_payload(payload: &PositionPayload, check: &mut FieldCheck<'_>) -> Option<Self> {
        let Some(symbol) = check.text("symbol", &payload.symbol) else {
            check.report(DiagnosticKind::SkippedEvent, "position without symbol dropped");
            return None;
        };
        let qty = check.number_or_zero("qty", &payload.qty);
        let side = match check.optional_text("side", &payload.side) {
            Some(raw) => Side::parse(&raw).or_else(|| {
                check.report(
                    DiagnosticKind::MalformedField,
                    format!("side '{raw}' is neither long nor short"),
                );
                None
            }),
            None if qty < 0.0 => Some(Side::Sell),
            None => Some(Side::Buy),
        };
        Some(Self {
            symbol,
            side,
            qty,
            avg_entry_price: check.number_or_zero("avg_entry_price", &payload.avg_entry_price),
            current_price: check.number_or_zero("current_price", &payload.current_price),
            unrealized_pl: check.number_or_zero("unrealized_pl", &payload.unrealized_pl),
            unrealized_plpc: check.number_or_zero("unrealized_plpc", &payload.unrealized_plpc),
        })
    }
}

impl KeyedRow for PositionRow {
    fn key(&self) -> &str {
        &self.symbol
    }

    fn side(&self) -> Option<Side> {
        self.side
    }
}
