//! Tradeable asset descriptor.

use serde::Serialize;

/// An asset tracked by the supervisor. Configured externally and never
/// mutated once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Trading symbol, e.g. `BTC/USDT`.
    pub code: String,
    pub name: String,
    /// e.g. `spot`, `token`, `stablecoin`.
    pub asset_type: String,
    /// Identifier used by the market data source, e.g. `bitcoin`.
    pub market: String,
}

impl Asset {
    pub fn new(code: &str, name: &str, asset_type: &str, market: &str) -> Self {
        Asset {
            code: code.to_string(),
            name: name.to_string(),
            asset_type: asset_type.to_string(),
            market: market.to_string(),
        }
    }
}
