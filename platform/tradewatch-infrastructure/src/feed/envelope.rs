use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use tradewatch_domain::events::feed_event::FeedEvent;
use tradewatch_domain::repositories::feed_stream::StreamError;
use tradewatch_domain::value_objects::order::OrderPayload;
use tradewatch_domain::value_objects::wire::Wire;

pub const BALANCE_UPDATE: &str = "balance_update";
pub const TRADE_UPDATE: &str = "trade_update";
pub const POSITION_UPDATE: &str = "position_update";
pub const ORDERS_UPDATE: &str = "orders_update";
pub const LOG_MESSAGE: &str = "log_message";
pub const MARKET_STATUS: &str = "market_status";

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Decodes one `{"event": ..., "data": ...}` frame. Unknown event names yield `Ok(None)`.
pub fn decode_envelope(raw: &str) -> Result<Option<FeedEvent>, StreamError> {
    let envelope: Envelope = serde_json::from_str(raw)
        .map_err(|e| StreamError::InvalidData(format!("bad envelope: {e}")))?;
    let name = envelope.event.as_str();
    let data = match envelope.data {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    let event = match name {
        BALANCE_UPDATE => FeedEvent::Balance(payload(name, data)?),
        TRADE_UPDATE => FeedEvent::Trade(payload(name, data)?),
        POSITION_UPDATE => FeedEvent::Position(payload(name, data)?),
        ORDERS_UPDATE => FeedEvent::Orders(orders(data)?),
        LOG_MESSAGE => FeedEvent::Log(payload(name, data)?),
        MARKET_STATUS => FeedEvent::MarketStatus(payload(name, data)?),
        other => {
            debug!(event = other, "ignoring unknown feed event");
            return Ok(None);
        }
    };
    Ok(Some(event))
}

/// Outbound zero-argument call, e.g. `{"event":"request_balance"}`.
pub fn encode_request(event: &str) -> String {
    serde_json::json!({ "event": event }).to_string()
}

fn payload<T: serde::de::DeserializeOwned>(name: &str, data: Value) -> Result<T, StreamError> {
    serde_json::from_value(data)
        .map_err(|e| StreamError::InvalidData(format!("{name} payload is not an object: {e}")))
}

// Servers send either a bare array or `{"orders": [...]}`.
fn orders(data: Value) -> Result<Vec<Wire<OrderPayload>>, StreamError> {
    let list = match data {
        Value::Object(mut map) => map.remove("orders").unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    match list {
        list @ Value::Array(_) => serde_json::from_value(list).map_err(|e| {
            StreamError::InvalidData(format!("{ORDERS_UPDATE} payload is not a list: {e}"))
        }),
        other => Err(StreamError::InvalidData(format!(
            "{ORDERS_UPDATE} payload is not a list: {other}"
        ))),
    }
}
