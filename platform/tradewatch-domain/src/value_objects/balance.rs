use crate::services::diagnostics::FieldCheck;
use crate::value_objects::order::OrderPayload;
use crate::value_objects::position::PositionPayload;
use crate::value_objects::wire::Wire;
use serde::{Deserialize, Serialize};

/// `balance_update` as pushed by the server. Positions and orders ride along when the server
/// has them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancePayload {
    pub total_equity: Wire<f64>,
    pub cash_balance: Wire<f64>,
    pub buying_power: Wire<f64>,
    pub hourly_change: Wire<f64>,
    pub hourly_change_pct: Wire<f64>,
    pub daily_change: Wire<f64>,
    pub daily_change_pct: Wire<f64>,
    pub is_market_open: Wire<bool>,
    pub timestamp: Wire<String>,
    pub positions: Wire<Vec<PositionPayload>>,
    pub orders: Wire<Vec<Wire<OrderPayload>>>,
}

/// The current account balance. Replaced wholesale by every balance event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceSnapshot {
    pub total_equity: f64,
    pub cash_balance: f64,
    pub buying_power: f64,
    pub hourly_change: f64,
    pub hourly_change_pct: f64,
    pub daily_change: f64,
    pub daily_change_pct: f64,
    pub is_market_open: Option<bool>,
    pub timestamp: Option<String>,
}

impl BalanceSnapshot {
    pub fn from_payload(payload: &BalancePayload, check: &mut FieldCheck<'_>) -> Self {
        Self {
            total_equity: check.number_or_zero("total_equity", &payload.total_equity),
            cash_balance: check.number_or_zero("cash_balance", &payload.cash_balance),
            buying_power: check.number_or_zero("buying_power", &payload.buying_power),
            hourly_change: check.number_or_zero("hourly_change", &payload.hourly_change),
            hourly_change_pct: check
                .number_or_zero("hourly_change_pct", &payload.hourly_change_pct),
            daily_change: check.number_or_zero("daily_change", &payload.daily_change),
            daily_change_pct: check.number_or_zero("daily_change_pct", &payload.daily_change_pct),
            is_market_open: check.optional_flag("is_market_open", &payload.is_market_open),
            timestamp: check.text("timestamp", &payload.timestamp),
        }
    }
}
