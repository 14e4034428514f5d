pub mod config;
pub mod rendering;
pub mod session;
