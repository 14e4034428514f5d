use crate::services::format::{
    format_money, format_percent, format_quantity, format_timestamp, gauge_ratio, tone,
    NEUTRAL_TIME,
};
use crate::value_objects::balance::BalanceSnapshot;
use crate::value_objects::equity_sample::EquitySample;
use crate::value_objects::log_entry::{LogEntry, LogLevel};
use crate::value_objects::market::MarketState;
use crate::value_objects::order::OrderRow;
use crate::value_objects::position::PositionRow;
use crate::value_objects::side::Side;
use crate::value_objects::trade::TradeRow;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

/// Hourly or daily change line with its gauge fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeView {
    pub amount: String,
    pub percent: String,
    pub text: String,
    pub tone: Tone,
    pub gauge: f64,
}

impl ChangeView {
    pub fn new(amount: f64, pct: f64) -> Self {
        let amount_text = format_money(amount);
        let percent = format_percent(pct);
        Self {
            text: format!("{amount_text} ({percent}%)"),
            amount: amount_text,
            percent,
            tone: tone(amount),
            gauge: gauge_ratio(pct),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceView {
    pub total_equity: String,
    pub cash_balance: String,
    pub buying_power: String,
    pub hourly: ChangeView,
    pub daily: ChangeView,
    pub market: MarketState,
    pub last_update: String,
}

impl BalanceView {
    pub fn new(snapshot: &BalanceSnapshot, market: MarketState) -> Self {
        Self {
            total_equity: format_money(snapshot.total_equity),
            cash_balance: format_money(snapshot.cash_balance),
            buying_power: format_money(snapshot.buying_power),
            hourly: ChangeView::new(snapshot.hourly_change, snapshot.hourly_change_pct),
            daily: ChangeView::new(snapshot.daily_change, snapshot.daily_change_pct),
            market,
            last_update: time_or_dash(snapshot.timestamp.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeView {
    pub symbol: String,
    pub side: String,
    pub price: String,
    pub quantity: String,
    pub time: String,
    pub tone: Tone,
}

impl From<&TradeRow> for TradeView {
    fn from(row: &TradeRow) -> Self {
        Self {
            symbol: row.symbol.clone(),
            side: side_label(row.side),
            price: format_money(row.price),
            quantity: format_quantity(row.quantity),
            time: time_or_dash(row.timestamp.as_deref()),
            tone: side_tone(row.side),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionView {
    pub symbol: String,
    pub side: String,
    pub qty: String,
    pub avg_entry_price: String,
    pub current_price: String,
    pub unrealized_pl: String,
    pub unrealized_plpc: String,
    pub tone: Tone,
    pub gauge: f64,
}

impl From<&PositionRow> for PositionView {
    fn from(row: &PositionRow) -> Self {
        Self {
            symbol: row.symbol.clone(),
            side: side_label(row.side),
            qty: format_quantity(row.qty),
            avg_entry_price: format_money(row.avg_entry_price),
            current_price: format_money(row.current_price),
            unrealized_pl: format_money(row.unrealized_pl),
            unrealized_plpc: format!("{}%", format_percent(row.unrealized_plpc)),
            tone: tone(row.unrealized_pl),
            gauge: gauge_ratio(row.unrealized_plpc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub symbol: String,
    pub side: String,
    pub qty: String,
    pub order_type: String,
    pub limit_price: String,
    pub submitted_at: String,
}

impl From<&OrderRow> for OrderView {
    fn from(row: &OrderRow) -> Self {
        Self {
            symbol: row.symbol.clone().unwrap_or_else(|| "-".to_string()),
            side: side_label(row.side),
            qty: format_quantity(row.qty),
            order_type: row
                .order_type
                .as_deref()
                .map(str::to_ascii_uppercase)
                .unwrap_or_else(|| "-".to_string()),
            limit_price: row
                .limit_price
                .map(format_money)
                .unwrap_or_else(|| "N/A".to_string()),
            submitted_at: row.submitted_at.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogView {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

impl From<&LogEntry> for LogView {
    fn from(entry: &LogEntry) -> Self {
        Self {
            time: format!("[{}]", format_timestamp(&entry.timestamp)),
            level: entry.level,
            message: entry.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPointView {
    pub label: String,
    pub value: f64,
}

impl From<&EquitySample> for EquityPointView {
    fn from(sample: &EquitySample) -> Self {
        Self {
            label: sample.label.clone(),
            value: sample.value,
        }
    }
}

fn side_label(side: Option<Side>) -> String {
    side.map(Side::label).unwrap_or("-").to_string()
}

fn side_tone(side: Option<Side>) -> Tone {
    match side {
        Some(Side::Buy) => Tone::Positive,
        Some(Side::Sell) => Tone::Negative,
        None => Tone::Neutral,
    }
}

fn time_or_dash(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => format_timestamp(raw),
        None => NEUTRAL_TIME.to_string(),
    }
}
