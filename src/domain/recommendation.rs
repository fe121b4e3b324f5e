//! Strategy output for a single asset and cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::trade::OrderSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// The order side this signal asks for; `None` for hold.
    pub fn order_side(self) -> Option<OrderSide> {
        match self {
            Signal::Buy => Some(OrderSide::Buy),
            Signal::Sell => Some(OrderSide::Sell),
            Signal::Hold => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "buy"),
            Signal::Sell => write!(f, "sell"),
            Signal::Hold => write!(f, "hold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub code: String,
    pub signal: Signal,
    /// Price at evaluation time; absent when it could not be resolved.
    pub price: Option<f64>,
    /// In [0, 1].
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(
        code: &str,
        signal: Signal,
        price: Option<f64>,
        confidence: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Recommendation {
            code: code.to_string(),
            signal,
            price,
            confidence: confidence.clamp(0.0, 1.0),
            timestamp,
        }
    }

    pub fn hold(code: &str, price: Option<f64>, timestamp: DateTime<Utc>) -> Self {
        Recommendation::new(code, Signal::Hold, price, 0.0, timestamp)
    }
}
