use crate::services::views::{
    BalanceView, EquityPointView, LogView, OrderView, PositionView, TradeView,
};
use crate::value_objects::connection::ConnectionState;
use crate::value_objects::filter::SideFilter;
use crate::value_objects::market::MarketState;

/// Named regions a surface may or may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mount {
    Connection,
    Balance,
    EquityChart,
    Trades,
    Positions,
    Orders,
    Log,
    Filters,
}

impl Mount {
    pub const ALL: [Mount; 8] = [
        Mount::Connection,
        Mount::Balance,
        Mount::EquityChart,
        Mount::Trades,
        Mount::Positions,
        Mount::Orders,
        Mount::Log,
        Mount::Filters,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mount::Connection => "connection",
            Mount::Balance => "balance",
            Mount::EquityChart => "equity_chart",
            Mount::Trades => "trades",
            Mount::Positions => "positions",
            Mount::Orders => "orders",
            Mount::Log => "log",
            Mount::Filters => "filters",
        }
    }
}

/// Drawing side of the dashboard. Paint methods are only called for mounts the surface reports
/// as present.
pub trait RenderSurface {
    fn has_mount(&self, mount: Mount) -> bool;

    fn paint_connection(&mut self, state: ConnectionState, market: MarketState);
    fn paint_balance(&mut self, balance: Option<&BalanceView>);
    fn paint_equity(&mut self, points: &[EquityPointView]);
    fn paint_trades(&mut self, rows: &[TradeView], filter: SideFilter);
    fn paint_positions(&mut self, rows: &[PositionView], filter: SideFilter);
    fn paint_orders(&mut self, rows: &[OrderView]);
    fn paint_log(&mut self, entries: &[LogView]);
    fn paint_filters(&mut self, active: SideFilter);
}
