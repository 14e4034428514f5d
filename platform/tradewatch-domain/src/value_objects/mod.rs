pub mod balance;
pub mod connection;
pub mod equity_sample;
pub mod filter;
pub mod log_entry;
pub mod market;
pub mod order;
pub mod position;
pub mod side;
pub mod trade;
pub mod wire;
