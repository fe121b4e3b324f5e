//! Held positions and their stop-loss/trailing-stop levels.

use serde::Serialize;
use std::fmt;

use super::asset::Asset;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub asset: Asset,
    /// Never negative: long-only.
    pub amount: f64,
}

impl Position {
    pub fn new(asset: Asset, amount: f64) -> Self {
        Position { asset, amount }
    }

    pub fn is_open(&self) -> bool {
        self.amount > 0.0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.amount * price
    }
}

/// Why a stop level forced an exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopTrigger {
    StopLoss,
    TrailingStop,
}

impl fmt::Display for StopTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopTrigger::StopLoss => write!(f, "stop-loss"),
            StopTrigger::TrailingStop => write!(f, "trailing stop"),
        }
    }
}

/// Exit levels for one open position. `highest_price` only ever rises, and
/// `trailing_stop` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StopLevel {
    pub entry_price: f64,
    pub stop_loss: f64,
    pub highest_price: f64,
    pub trailing_stop: f64,
}

impl StopLevel {
    pub fn open(entry_price: f64, stop_loss_pct: f64, trailing_stop_pct: f64) -> Self {
        StopLevel {
            entry_price,
            stop_loss: entry_price * (1.0 - stop_loss_pct),
            highest_price: entry_price,
            trailing_stop: entry_price * (1.0 - trailing_stop_pct),
        }
    }

    /// Ratchet the high-water mark and trailing stop with a new price.
    pub fn observe(&mut self, price: f64, trailing_stop_pct: f64) {
        self.highest_price = self.highest_price.max(price);
        self.trailing_stop = self.highest_price * (1.0 - trailing_stop_pct);
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        price <= self.stop_loss
    }

    pub fn should_trail_out(&self, price: f64) -> bool {
        price <= self.trailing_stop
    }

    /// The breached level, if any. Stop-loss wins when both are hit.
    pub fn breach(&self, price: f64) -> Option<StopTrigger> {
        if self.should_stop_loss(price) {
            Some(StopTrigger::StopLoss)
        } else if self.should_trail_out(price) {
            Some(StopTrigger::TrailingStop)
        } else {
            None
        }
    }
}
