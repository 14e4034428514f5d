use crate::services::diagnostics::FieldCheck;
use crate::value_objects::side::Side;
use crate::value_objects::wire::Wire;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPayload {
    pub symbol: Wire<String>,
    pub side: Wire<String>,
    pub qty: Wire<f64>,
    #[serde(rename = "type")]
    pub order_type: Wire<String>,
    pub limit_price: Wire<f64>,
    pub submitted_at: Wire<String>,
}

/// An open order. Orders carry no stable key in the feed, so the list is replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub symbol: Option<String>,
    pub side: Option<Side>,
    pub qty: f64,
    pub order_type: Option<String>,
    pub limit_price: Option<f64>,
    pub submitted_at: Option<String>,
}

impl OrderRow {
    pub fn from_payload(payload: &OrderPayload, check: &mut FieldCheck<'_>) -> Self {
        Self {
            symbol: check.text("symbol", &payload.symbol),
            side: check.side("side", &payload.side),
            qty: check.number_or_zero("qty", &payload.qty),
            order_type: check.optional_text("type", &payload.order_type),
            limit_price: check.optional_number("limit_price", &payload.limit_price),
            submitted_at: check.optional_text("submitted_at", &payload.submitted_at),
        }
    }
}
