use crate::value_objects::side::Side;
use serde::{Deserialize, Serialize};

/// View-level selection over trade and position rows. Never mutates the rows themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideFilter {
    #[default]
    All,
    Buy,
    Sell,
}

impl SideFilter {
    pub const ALL: [SideFilter; 3] = [SideFilter::All, SideFilter::Buy, SideFilter::Sell];

    /// Rows without a recognised side only show under `All`.
    pub fn matches(self, side: Option<Side>) -> bool {
        match self {
            SideFilter::All => true,
            SideFilter::Buy => side == Some(Side::Buy),
            SideFilter::Sell => side == Some(Side::Sell),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SideFilter::All => "All",
            SideFilter::Buy => "Buy",
            SideFilter::Sell => "Sell",
        }
    }
}
