//! Price/volume history for a single asset, ordered oldest to newest.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub prices: Vec<f64>,
    /// Empty when the source supplies no volume data; otherwise the same
    /// length as `prices`.
    pub volumes: Vec<f64>,
}

impl Series {
    pub fn new(prices: Vec<f64>, volumes: Vec<f64>) -> Self {
        Series { prices, volumes }
    }

    pub fn from_prices(prices: Vec<f64>) -> Self {
        Series {
            prices,
            volumes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    pub fn latest_volume(&self) -> Option<f64> {
        self.volumes.last().copied()
    }
}
