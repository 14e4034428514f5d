use std::collections::{HashMap, HashSet};
use tradewatch_domain::repositories::render_surface::{Mount, RenderSurface};
use tradewatch_domain::services::views::{
    BalanceView, EquityPointView, LogView, OrderView, PositionView, TradeView,
};
use tradewatch_domain::value_objects::connection::ConnectionState;
use tradewatch_domain::value_objects::filter::SideFilter;
use tradewatch_domain::value_objects::market::MarketState;

/// Plain-text surface: each mount renders to a block of lines. Used by headless replay and tests.
#[derive(Debug, Clone)]
pub struct TextSurface {
    mounts: HashSet<Mount>,
    sections: HashMap<Mount, Vec<String>>,
}

impl Default for TextSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSurface {
    pub fn new() -> Self {
        Self {
            mounts: Mount::ALL.into_iter().collect(),
            sections: HashMap::new(),
        }
    }

    pub fn without(mut self, mount: Mount) -> Self {
        self.mounts.remove(&mount);
        self
    }

    /// Painted sections in mount order, each under a `[name]` header.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for mount in Mount::ALL {
            if let Some(section) = self.sections.get(&mount) {
                out.push(format!("[{}]", mount.name()));
                out.extend(section.iter().cloned());
            }
        }
        out
    }

    fn set(&mut self, mount: Mount, lines: Vec<String>) {
        self.sections.insert(mount, lines);
    }
}

impl RenderSurface for TextSurface {
    fn has_mount(&self, mount: Mount) -> bool {
        self.mounts.contains(&mount)
    }

    fn paint_connection(&mut self, state: ConnectionState, market: MarketState) {
        self.set(
            Mount::Connection,
            vec![format!("{} | {}", state.label(), market.label())],
        );
    }

    fn paint_balance(&mut self, balance: Option<&BalanceView>) {
        let lines = match balance {
            Some(view) => vec![
                format!("equity {}", view.total_equity),
                format!("cash {}", view.cash_balance),
                format!("buying power {}", view.buying_power),
                format!("hourly {}", view.hourly.text),
                format!("daily {}", view.daily.text),
                format!("last update {}", view.last_update),
            ],
            None => vec!["waiting for balance".to_string()],
        };
        self.set(Mount::Balance, lines);
    }

    fn paint_equity(&mut self, points: &[EquityPointView]) {
        let lines = points
            .iter()
            .map(|point| format!("{} {:.2}", point.label, point.value))
            .collect();
        self.set(Mount::EquityChart, lines);
    }

    fn paint_trades(&mut self, rows: &[TradeView], filter: SideFilter) {
        let mut lines = vec![format!("filter {}", filter.label())];
        lines.extend(rows.iter().map(|row| {
            format!(
                "{} {} {} {} @ {}",
                row.time, row.symbol, row.side, row.quantity, row.price
            )
        }));
        self.set(Mount::Trades, lines);
    }

    fn paint_positions(&mut self, rows: &[PositionView], filter: SideFilter) {
        let mut lines = vec![format!("filter {}", filter.label())];
        lines.extend(rows.iter().map(|row| {
            format!(
                "{} {} {} avg {} now {} P/L {} ({})",
                row.symbol,
                row.side,
                row.qty,
                row.avg_entry_price,
                row.current_price,
                row.unrealized_pl,
                row.unrealized_plpc
            )
        }));
        self.set(Mount::Positions, lines);
    }

    fn paint_orders(&mut self, rows: &[OrderView]) {
        let lines = rows
            .iter()
            .map(|row| {
                format!(
                    "{} {} {} {} limit {} at {}",
                    row.symbol, row.side, row.qty, row.order_type, row.limit_price, row.submitted_at
                )
            })
            .collect();
        self.set(Mount::Orders, lines);
    }

    fn paint_log(&mut self, entries: &[LogView]) {
        let lines = entries
            .iter()
            .map(|entry| format!("{} {} {}", entry.time, entry.level.label(), entry.message))
            .collect();
        self.set(Mount::Log, lines);
    }

    fn paint_filters(&mut self, active: SideFilter) {
        let tabs = SideFilter::ALL
            .iter()
            .map(|filter| {
                if *filter == active {
                    format!("<{}>", filter.label())
                } else {
                    filter.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        self.set(Mount::Filters, vec![tabs]);
    }
}
