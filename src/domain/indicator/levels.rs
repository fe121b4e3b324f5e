//! Recent support/resistance band.

/// Distance from a recent high/low inside which price counts as "near" it.
pub const NEAR_LEVEL_MARGIN: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportResistance {
    pub high: f64,
    pub low: f64,
}

impl SupportResistance {
    /// Price within 2% below the recent high. A price above the high has
    /// broken out and is not near resistance.
    pub fn near_resistance(&self, price: f64) -> bool {
        price >= self.high * (1.0 - NEAR_LEVEL_MARGIN) && price <= self.high
    }

    /// Price within 2% above the recent low. A price below the low has
    /// broken down and is not near support.
    pub fn near_support(&self, price: f64) -> bool {
        price <= self.low * (1.0 + NEAR_LEVEL_MARGIN) && price >= self.low
    }
}

/// High and low over the last `window` prices, or over all prices when
/// fewer are available.
pub fn recent_levels(prices: &[f64], window: usize) -> Option<SupportResistance> {
    if window == 0 || prices.is_empty() {
        return None;
    }
    let start = prices.len().saturating_sub(window);
    let tail = &prices[start..];
    let high = tail.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = tail.iter().copied().fold(f64::INFINITY, f64::min);
    Some(SupportResistance { high, low })
}
