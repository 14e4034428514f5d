use crate::value_objects::balance::BalancePayload;
use crate::value_objects::connection::ConnectionState;
use crate::value_objects::log_entry::LogPayload;
use crate::value_objects::market::MarketStatusPayload;
use crate::value_objects::order::OrderPayload;
use crate::value_objects::position::PositionPayload;
use crate::value_objects::trade::TradePayload;
use crate::value_objects::wire::Wire;

/// One server push (or transport lifecycle change), in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Balance(BalancePayload),
    Trade(TradePayload),
    Position(PositionPayload),
    /// Items that are not order objects stay raw so they can be reported one by one.
    Orders(Vec<Wire<OrderPayload>>),
    Log(LogPayload),
    Connection(ConnectionState),
    MarketStatus(MarketStatusPayload),
}

impl FeedEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::Balance(_) => "balance",
            FeedEvent::Trade(_) => "trade",
            FeedEvent::Position(_) => "position",
            FeedEvent::Orders(_) => "orders",
            FeedEvent::Log(_) => "log",
            FeedEvent::Connection(_) => "connection",
            FeedEvent::MarketStatus(_) => "market_status",
        }
    }
}
