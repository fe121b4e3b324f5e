//! Market data access port trait.

use crate::domain::error::RatchetError;
use crate::domain::series::Series;

/// Source of prices keyed by an asset's market identifier. Calls may block.
pub trait MarketDataPort {
    fn current_price(&self, market: &str) -> Result<f64, RatchetError>;

    /// Daily prices and volumes, oldest first, covering `lookback_days`.
    fn historical_series(&self, market: &str, lookback_days: u32)
    -> Result<Series, RatchetError>;
}
