use crate::value_objects::wire::Wire;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketState {
    Open,
    Extended,
    Closed,
    #[default]
    Unknown,
}

impl MarketState {
    pub fn from_flag(is_open: bool) -> Self {
        if is_open {
            MarketState::Open
        } else {
            MarketState::Closed
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" | "regular" => Some(MarketState::Open),
            "extended" | "pre" | "post" => Some(MarketState::Extended),
            "closed" => Some(MarketState::Closed),
            "unknown" => Some(MarketState::Unknown),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketState::Open => "Market Open",
            MarketState::Extended => "Extended Hours",
            MarketState::Closed => "Market Closed",
            MarketState::Unknown => "Market ?",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketStatusPayload {
    pub status: Wire<String>,
}
