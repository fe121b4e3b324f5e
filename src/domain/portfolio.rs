//! Portfolio ledger: cash, positions and valuation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::asset::Asset;
use super::error::RatchetError;
use super::performance::Performance;
use super::position::Position;
use super::trade::{OrderSide, Trade};
use crate::ports::market_data_port::MarketDataPort;

/// Amounts at or below this are treated as a closed position.
const DUST: f64 = 1e-12;

/// A position with its resolved market price, for status views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionValuation {
    pub code: String,
    pub amount: f64,
    pub price: Option<f64>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub positions: BTreeMap<String, Position>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            positions: BTreeMap::new(),
        }
    }

    pub fn get_position(&self, code: &str) -> Option<&Position> {
        self.positions.get(code)
    }

    pub fn held_amount(&self, code: &str) -> f64 {
        self.positions.get(code).map_or(0.0, |p| p.amount)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Reset both initial capital and cash. Positions are left as they are.
    pub fn reset_capital(&mut self, capital: f64) -> Result<(), RatchetError> {
        if !capital.is_finite() || capital < 0.0 {
            return Err(RatchetError::InvalidCapital(capital));
        }
        self.initial_capital = capital;
        self.cash = capital;
        Ok(())
    }

    /// Book an executed trade against cash and positions.
    ///
    /// A trade without a positive quantity is rejected with
    /// [`RatchetError::Execution`], a sell larger than the held amount with
    /// [`RatchetError::Oversell`]. Rejected trades leave the ledger untouched.
    pub fn apply_trade(&mut self, asset: &Asset, trade: &Trade) -> Result<(), RatchetError> {
        if !(trade.quantity.is_finite() && trade.quantity > 0.0) {
            return Err(RatchetError::Execution {
                code: trade.code.clone(),
                reason: format!("invalid fill quantity {}", trade.quantity),
            });
        }
        let value = trade.value();
        match trade.side {
            OrderSide::Buy => {
                self.cash -= value;
                let position = self
                    .positions
                    .entry(trade.code.clone())
                    .or_insert_with(|| Position::new(asset.clone(), 0.0));
                position.amount += trade.quantity;
                debug!(asset = %trade.code, amount = position.amount, "position increased");
            }
            OrderSide::Sell => {
                let held = self.held_amount(&trade.code);
                if trade.quantity > held + DUST {
                    return Err(RatchetError::Oversell {
                        code: trade.code.clone(),
                        requested: trade.quantity,
                        held,
                    });
                }
                self.cash += value;
                let remaining = held - trade.quantity;
                if remaining <= DUST {
                    self.positions.remove(&trade.code);
                    debug!(asset = %trade.code, "position closed");
                } else if let Some(position) = self.positions.get_mut(&trade.code) {
                    position.amount = remaining;
                    debug!(asset = %trade.code, amount = remaining, "position reduced");
                }
            }
        }
        Ok(())
    }

    /// Sum of amount × current price. Positions whose price cannot be
    /// resolved contribute nothing.
    pub fn positions_value(&self, market: &dyn MarketDataPort) -> f64 {
        self.positions
            .values()
            .filter_map(|pos| match market.current_price(&pos.asset.market) {
                Ok(price) => Some(pos.market_value(price)),
                Err(e) => {
                    warn!(
                        asset = %pos.asset.code,
                        error = %e,
                        "price unavailable, skipping valuation"
                    );
                    None
                }
            })
            .sum()
    }

    pub fn total_value(&self, market: &dyn MarketDataPort) -> f64 {
        self.cash + self.positions_value(market)
    }

    /// Variation of the current total value against `previous_value`.
    pub fn performance(
        &self,
        previous_value: f64,
        now: DateTime<Utc>,
        market: &dyn MarketDataPort,
    ) -> Performance {
        Performance::measure(self.total_value(market), previous_value, now)
    }

    /// Total-value gain relative to initial capital; `None` without capital.
    pub fn pnl(&self, total_value: f64) -> Option<f64> {
        if self.initial_capital > 0.0 {
            Some((total_value - self.initial_capital) / self.initial_capital)
        } else {
            None
        }
    }

    pub fn valuations(&self, market: &dyn MarketDataPort) -> Vec<PositionValuation> {
        self.positions
            .values()
            .map(|pos| {
                let price = market.current_price(&pos.asset.market).ok();
                PositionValuation {
                    code: pos.asset.code.clone(),
                    amount: pos.amount,
                    price,
                    value: price.map(|p| pos.market_value(p)),
                }
            })
            .collect()
    }
}
