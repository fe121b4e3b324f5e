//! Portfolio performance snapshots and per-trade profit/loss.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::trade::{OrderSide, Trade};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    pub portfolio_value: f64,
    /// Relative change against the previous snapshot's value.
    pub variation: f64,
    pub timestamp: DateTime<Utc>,
}

impl Performance {
    /// (current - previous) / previous, or 0 when previous <= 0.
    pub fn measure(current_value: f64, previous_value: f64, timestamp: DateTime<Utc>) -> Self {
        let variation = if previous_value > 0.0 {
            (current_value - previous_value) / previous_value
        } else {
            0.0
        };
        Performance {
            portfolio_value: current_value,
            variation,
            timestamp,
        }
    }
}

/// A recorded trade marked against the current price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradePnl {
    pub trade: Trade,
    pub current_price: Option<f64>,
    /// Percent; buys gain when price rises, sells when it falls.
    pub pnl_pct: Option<f64>,
}

impl TradePnl {
    pub fn mark(trade: Trade, current_price: Option<f64>) -> Self {
        let pnl_pct = match current_price {
            Some(current) if trade.price != 0.0 => Some(match trade.side {
                OrderSide::Buy => (current - trade.price) / trade.price * 100.0,
                OrderSide::Sell => (trade.price - current) / trade.price * 100.0,
            }),
            _ => None,
        };
        TradePnl {
            trade,
            current_price,
            pnl_pct,
        }
    }
}
