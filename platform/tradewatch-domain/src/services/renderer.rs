//! Bounded, ordered projections of the live feed.
//!
//! [`FeedRenderer`] is the single owner of dashboard state. Every inbound [`FeedEvent`] is
//! applied to completion and answered with the [`RenderInstruction`]s that describe what
//! changed, so a surface can repaint only what it needs. Nothing here blocks, retries or fails:
//! malformed input degrades to neutral values plus [`Diagnostic`]s.

use crate::events::feed_event::FeedEvent;
use crate::services::bounded::BoundedSeq;
use crate::services::diagnostics::{Diagnostic, DiagnosticKind, FieldCheck};
use crate::services::keyed_rows::{KeyedRows, Upserted};
use crate::services::views::{
    BalanceView, EquityPointView, LogView, OrderView, PositionView, TradeView,
};
use crate::value_objects::balance::{BalancePayload, BalanceSnapshot};
use crate::value_objects::connection::ConnectionState;
use crate::value_objects::equity_sample::EquitySample;
use crate::value_objects::filter::SideFilter;
use crate::value_objects::log_entry::{LogEntry, LogPayload};
use crate::value_objects::market::{MarketState, MarketStatusPayload};
use crate::value_objects::order::{OrderPayload, OrderRow};
use crate::value_objects::position::{PositionPayload, PositionRow};
use crate::value_objects::trade::{TradePayload, TradeRow};
use crate::value_objects::wire::Wire;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const LOG_CAPACITY: usize = 100;
pub const EQUITY_WINDOW: usize = 20;

/// User-initiated view changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    SetFilter(SideFilter),
    ClearLog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderInstruction {
    ReplaceBalance,
    PushEquitySample { evicted: usize },
    AppendLog { evicted: usize },
    ClearLog { removed: usize },
    UpsertTrade { symbol: String, row: usize, inserted: bool },
    UpsertPosition { symbol: String, row: usize, inserted: bool },
    ReplaceOrders { count: usize },
    SetConnection { state: ConnectionState },
    SetMarketStatus { state: MarketState },
    ApplyFilter { filter: SideFilter },
}

/// Outcome of one event or command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    pub instructions: Vec<RenderInstruction>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Applied {
    pub fn is_noop(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FeedRenderer {
    balance: Option<BalanceSnapshot>,
    market: MarketState,
    connection: ConnectionState,
    equity: BoundedSeq<EquitySample>,
    log: BoundedSeq<LogEntry>,
    trades: KeyedRows<TradeRow>,
    positions: KeyedRows<PositionRow>,
    orders: Vec<OrderRow>,
    filter: SideFilter,
}

impl Default for FeedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedRenderer {
    pub fn new() -> Self {
        Self {
            balance: None,
            market: MarketState::Unknown,
            connection: ConnectionState::Connecting,
            equity: BoundedSeq::new(EQUITY_WINDOW),
            log: BoundedSeq::new(LOG_CAPACITY),
            trades: KeyedRows::default(),
            positions: KeyedRows::default(),
            orders: Vec::new(),
            filter: SideFilter::All,
        }
    }

    pub fn apply(&mut self, event: FeedEvent, received_at: DateTime<Utc>) -> Applied {
        let mut applied = Applied::default();
        match event {
            FeedEvent::Balance(payload) => self.apply_balance(&payload, received_at, &mut applied),
            FeedEvent::Trade(payload) => self.upsert_trade(&payload, &mut applied),
            FeedEvent::Position(payload) => {
                self.upsert_position(&payload, "position_update", &mut applied)
            }
            FeedEvent::Orders(list) => self.set_orders(&list, "orders_update", &mut applied),
            FeedEvent::Log(payload) => self.append_log(&payload, received_at, &mut applied),
            FeedEvent::Connection(state) => {
                self.connection = state;
                applied
                    .instructions
                    .push(RenderInstruction::SetConnection { state });
            }
            FeedEvent::MarketStatus(payload) => self.set_market_status(&payload, &mut applied),
        }
        applied
    }

    pub fn handle(&mut self, command: ViewCommand) -> Applied {
        let mut applied = Applied::default();
        match command {
            ViewCommand::SetFilter(filter) => {
                self.filter = filter;
                applied
                    .instructions
                    .push(RenderInstruction::ApplyFilter { filter });
            }
            ViewCommand::ClearLog => {
                let removed = self.log.clear();
                applied
                    .instructions
                    .push(RenderInstruction::ClearLog { removed });
            }
        }
        applied
    }

    fn apply_balance(
        &mut self,
        payload: &BalancePayload,
        received_at: DateTime<Utc>,
        applied: &mut Applied,
    ) {
        let mut check = FieldCheck::new("balance_update", &mut applied.diagnostics);
        let snapshot = BalanceSnapshot::from_payload(payload, &mut check);
        let positions = check.optional_list("positions", &payload.positions);
        let orders = check.optional_list("orders", &payload.orders);

        let market = snapshot.is_market_open.map(MarketState::from_flag);
        let equity = snapshot.total_equity;
        self.balance = Some(snapshot);
        applied.instructions.push(RenderInstruction::ReplaceBalance);

        // Every balance is plotted, with the neutral zero when the equity was unusable.
        let evicted = self.equity.push(EquitySample::new(received_at, equity));
        applied
            .instructions
            .push(RenderInstruction::PushEquitySample { evicted });

        if let Some(state) = market {
            self.market = state;
            applied
                .instructions
                .push(RenderInstruction::SetMarketStatus { state });
        }

        for position in positions.unwrap_or_default() {
            self.upsert_position(position, "balance_update.positions", applied);
        }
        if let Some(orders) = orders {
            self.set_orders(orders, "balance_update.orders", applied);
        }
    }

    fn upsert_trade(&mut self, payload: &TradePayload, applied: &mut Applied) {
        let mut check = FieldCheck::new("trade_update", &mut applied.diagnostics);
        let Some(row) = TradeRow::from_payload(payload, &mut check) else {
            return;
        };
        let symbol = row.symbol.clone();
        let Upserted { row, inserted } = self.trades.upsert(row);
        applied.instructions.push(RenderInstruction::UpsertTrade {
            symbol,
            row,
            inserted,
        });
    }

    fn upsert_position(
        &mut self,
        payload: &PositionPayload,
        context: &'static str,
        applied: &mut Applied,
    ) {
        let mut check = FieldCheck::new(context, &mut applied.diagnostics);
        let Some(row) = PositionRow::from_payload(payload, &mut check) else {
            return;
        };
        let symbol = row.symbol.clone();
        let Upserted { row, inserted } = self.positions.upsert(row);
        applied.instructions.push(RenderInstruction::UpsertPosition {
            symbol,
            row,
            inserted,
        });
    }

    fn set_orders(
        &mut self,
        list: &[Wire<OrderPayload>],
        context: &'static str,
        applied: &mut Applied,
    ) {
        let mut check = FieldCheck::new(context, &mut applied.diagnostics);
        let mut rows = Vec::with_capacity(list.len());
        for (idx, item) in list.iter().enumerate() {
            match item {
                Wire::Valid(payload) => rows.push(OrderRow::from_payload(payload, &mut check)),
                Wire::Invalid(raw) => check.report(
                    DiagnosticKind::MalformedField,
                    format!("order #{idx} is not an object and was dropped: {raw}"),
                ),
            }
        }
        self.orders = rows;
        applied.instructions.push(RenderInstruction::ReplaceOrders {
            count: self.orders.len(),
        });
    }

    fn append_log(&mut self, payload: &LogPayload, received_at: DateTime<Utc>, applied: &mut Applied) {
        let mut check = FieldCheck::new("log_message", &mut applied.diagnostics);
        let entry = LogEntry::from_payload(payload, received_at, &mut check);
        let evicted = self.log.push(entry);
        applied
            .instructions
            .push(RenderInstruction::AppendLog { evicted });
    }

    fn set_market_status(&mut self, payload: &MarketStatusPayload, applied: &mut Applied) {
        let mut check = FieldCheck::new("market_status", &mut applied.diagnostics);
        let Some(raw) = check.text("status", &payload.status) else {
            return;
        };
        match MarketState::parse(&raw) {
            Some(state) => {
                self.market = state;
                applied
                    .instructions
                    .push(RenderInstruction::SetMarketStatus { state });
            }
            None => check.report(
                DiagnosticKind::MalformedField,
                format!("unknown market status '{raw}'"),
            ),
        }
    }

    pub fn balance(&self) -> Option<&BalanceSnapshot> {
        self.balance.as_ref()
    }

    pub fn market(&self) -> MarketState {
        self.market
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn filter(&self) -> SideFilter {
        self.filter
    }

    pub fn equity(&self) -> &BoundedSeq<EquitySample> {
        &self.equity
    }

    pub fn log(&self) -> &BoundedSeq<LogEntry> {
        &self.log
    }

    pub fn trades(&self) -> &KeyedRows<TradeRow> {
        &self.trades
    }

    pub fn positions(&self) -> &KeyedRows<PositionRow> {
        &self.positions
    }

    pub fn orders(&self) -> &[OrderRow] {
        &self.orders
    }

    pub fn visible_trades(&self) -> impl Iterator<Item = &TradeRow> + '_ {
        self.trades.filtered(self.filter)
    }

    pub fn visible_positions(&self) -> impl Iterator<Item = &PositionRow> + '_ {
        self.positions.filtered(self.filter)
    }

    pub fn balance_view(&self) -> Option<BalanceView> {
        self.balance
            .as_ref()
            .map(|snapshot| BalanceView::new(snapshot, self.market))
    }

    pub fn trade_views(&self) -> Vec<TradeView> {
        self.visible_trades().map(TradeView::from).collect()
    }

    pub fn position_views(&self) -> Vec<PositionView> {
        self.visible_positions().map(PositionView::from).collect()
    }

    pub fn order_views(&self) -> Vec<OrderView> {
        self.orders.iter().map(OrderView::from).collect()
    }

    pub fn log_views(&self) -> Vec<LogView> {
        self.log.iter().map(LogView::from).collect()
    }

    pub fn equity_points(&self) -> Vec<EquityPointView> {
        self.equity.iter().map(EquityPointView::from).collect()
    }
}
