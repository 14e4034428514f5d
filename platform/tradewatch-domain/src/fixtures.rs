//! Well-formed payload builders for tests.

use crate::value_objects::balance::BalancePayload;
use crate::value_objects::log_entry::LogPayload;
use crate::value_objects::order::OrderPayload;
use crate::value_objects::position::PositionPayload;
use crate::value_objects::trade::TradePayload;
use crate::value_objects::wire::Wire;

pub fn balance(total_equity: f64) -> BalancePayload {
    BalancePayload {
        total_equity: Wire::Valid(total_equity),
        ..BalancePayload::default()
    }
}

pub fn trade(symbol: &str, action: &str, price: f64, quantity: f64) -> TradePayload {
    TradePayload {
        symbol: Wire::Valid(symbol.to_string()),
        action: Wire::Valid(action.to_string()),
        price: Wire::Valid(price),
        quantity: Wire::Valid(quantity),
        timestamp: Wire::absent(),
    }
}

pub fn position(symbol: &str, qty: f64, avg_entry_price: f64, current_price: f64) -> PositionPayload {
    let unrealized_pl = (current_price - avg_entry_price) * qty;
    let unrealized_plpc = if avg_entry_price != 0.0 {
        (current_price - avg_entry_price) / avg_entry_price * 100.0
    } else {
        0.0
    };
    PositionPayload {
        symbol: Wire::Valid(symbol.to_string()),
        side: Wire::absent(),
        qty: Wire::Valid(qty),
        avg_entry_price: Wire::Valid(avg_entry_price),
        current_price: Wire::Valid(current_price),
        unrealized_pl: Wire::Valid(unrealized_pl),
        unrealized_plpc: Wire::Valid(unrealized_plpc),
    }
}

pub fn order(symbol: &str, side: &str, qty: f64, order_type: &str) -> OrderPayload {
    OrderPayload {
        symbol: Wire::Valid(symbol.to_string()),
        side: Wire::Valid(side.to_string()),
        qty: Wire::Valid(qty),
        order_type: Wire::Valid(order_type.to_string()),
        limit_price: Wire::absent(),
        submitted_at: Wire::absent(),
    }
}

pub fn log(level: &str, message: &str) -> LogPayload {
    LogPayload {
        timestamp: Wire::absent(),
        level: Wire::Valid(level.to_string()),
        message: Wire::Valid(message.to_string()),
    }
}
