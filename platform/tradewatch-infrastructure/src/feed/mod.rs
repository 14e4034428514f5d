pub mod envelope;
pub mod replay;
#[cfg(feature = "realtime-ws")]
pub mod websocket;
