//! Risk supervisor: runs decision cycles over every tracked asset.
//!
//! Per asset and cycle:
//! 1. Resolve the current price (skip the asset if unavailable)
//! 2. Evaluate the configured strategy on the historical series
//! 3. Ratchet the position's stop level; a stop-loss or trailing-stop
//!    breach forces a sell regardless of the strategy's signal
//! 4. Size the order: buys spend min(cash, total value × max_risk_pct),
//!    sells liquidate the whole position
//! 5. Execute, book the trade in the ledger, open/close the stop level and
//!    record the trade in the journal
//!
//! A failure on one asset never aborts the cycle. The stop-level table
//! holds an entry exactly for the assets with a positive position.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

use super::asset::Asset;
use super::error::RatchetError;
use super::performance::Performance;
use super::portfolio::Portfolio;
use super::position::{Position, StopLevel, StopTrigger};
use super::recommendation::{Recommendation, Signal};
use super::series::Series;
use super::strategy::{Strategy, StrategyDetails};
use super::trade::{OrderRequest, OrderSide, OrderType, Trade};
use crate::ports::execution_port::ExecutionPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::trade_journal_port::TradeJournalPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    /// Fraction of total portfolio value a single buy may spend.
    pub max_risk_pct: f64,
    pub stop_loss_pct: f64,
    pub trailing_stop_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            max_risk_pct: 0.02,
            stop_loss_pct: 0.05,
            trailing_stop_pct: 0.10,
        }
    }
}

/// The collaborators one cycle talks to.
#[derive(Clone, Copy)]
pub struct CyclePorts<'a> {
    pub market: &'a dyn MarketDataPort,
    pub executor: &'a dyn ExecutionPort,
    pub journal: &'a dyn TradeJournalPort,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssetOutcome {
    PriceUnavailable,
    Held,
    InsufficientCash,
    NothingToSell,
    Traded {
        trade: Trade,
        forced_by: Option<StopTrigger>,
    },
    ExecutionFailed {
        reason: String,
    },
    /// The executor accepted the order but reported no usable fill.
    NotFilled,
    LedgerRejected {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReport {
    pub code: String,
    pub outcome: AssetOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub assets: Vec<AssetReport>,
    pub performance: Performance,
}

impl CycleReport {
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.assets.iter().filter_map(|r| match &r.outcome {
            AssetOutcome::Traded { trade, .. } => Some(trade),
            _ => None,
        })
    }
}

/// Read-only view of the supervisor state between cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupervisorSnapshot {
    pub cash: f64,
    pub initial_capital: f64,
    pub positions: Vec<Position>,
    pub stop_levels: BTreeMap<String, StopLevel>,
    pub recommendations: BTreeMap<String, Recommendation>,
    pub details: BTreeMap<String, StrategyDetails>,
    pub strategy: Option<&'static str>,
    pub last_cycle_start: Option<DateTime<Utc>>,
    pub last_performance: Option<Performance>,
    /// Gain relative to initial capital as of the last cycle.
    pub pnl: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RiskSupervisor {
    assets: Vec<Asset>,
    portfolio: Portfolio,
    strategy: Option<Strategy>,
    risk: RiskConfig,
    lookback_days: u32,
    stop_levels: BTreeMap<String, StopLevel>,
    last_details: BTreeMap<String, StrategyDetails>,
    last_recommendations: BTreeMap<String, Recommendation>,
    last_cycle_start: Option<DateTime<Utc>>,
    last_performance: Option<Performance>,
}

impl RiskSupervisor {
    pub fn new(
        assets: Vec<Asset>,
        portfolio: Portfolio,
        risk: RiskConfig,
        lookback_days: u32,
    ) -> Self {
        RiskSupervisor {
            assets,
            portfolio,
            strategy: None,
            risk,
            lookback_days,
            stop_levels: BTreeMap::new(),
            last_details: BTreeMap::new(),
            last_recommendations: BTreeMap::new(),
            last_cycle_start: None,
            last_performance: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Takes effect from the next evaluation.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        info!(strategy = strategy.name(), "strategy replaced");
        self.strategy = Some(strategy);
    }

    pub fn strategy(&self) -> Option<&Strategy> {
        self.strategy.as_ref()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn risk(&self) -> &RiskConfig {
        &self.risk
    }

    pub fn reset_capital(&mut self, capital: f64) -> Result<(), RatchetError> {
        self.portfolio.reset_capital(capital)
    }

    pub fn stop_level(&self, code: &str) -> Option<&StopLevel> {
        self.stop_levels.get(code)
    }

    pub fn stop_levels(&self) -> &BTreeMap<String, StopLevel> {
        &self.stop_levels
    }

    pub fn last_details(&self) -> &BTreeMap<String, StrategyDetails> {
        &self.last_details
    }

    pub fn last_recommendations(&self) -> &BTreeMap<String, Recommendation> {
        &self.last_recommendations
    }

    pub fn last_cycle_start(&self) -> Option<DateTime<Utc>> {
        self.last_cycle_start
    }

    pub fn last_performance(&self) -> Option<&Performance> {
        self.last_performance.as_ref()
    }

    pub fn snapshot(&self) -> SupervisorSnapshot {
        SupervisorSnapshot {
            cash: self.portfolio.cash,
            initial_capital: self.portfolio.initial_capital,
            positions: self.portfolio.positions.values().cloned().collect(),
            stop_levels: self.stop_levels.clone(),
            recommendations: self.last_recommendations.clone(),
            details: self.last_details.clone(),
            strategy: self.strategy.as_ref().map(Strategy::name),
            last_cycle_start: self.last_cycle_start,
            last_performance: self.last_performance.clone(),
            pnl: self
                .last_performance
                .as_ref()
                .and_then(|p| self.portfolio.pnl(p.portfolio_value)),
        }
    }

    /// Run one decision cycle over every tracked asset, in order.
    ///
    /// Fails only when no strategy is configured, before touching any state.
    pub fn run_cycle(
        &mut self,
        ports: &CyclePorts<'_>,
        now: DateTime<Utc>,
    ) -> Result<CycleReport, RatchetError> {
        let strategy = self.strategy.clone().ok_or(RatchetError::NoStrategy)?;

        self.last_cycle_start = Some(now);
        info!(started_at = %now, assets = self.assets.len(), "starting cycle");
        let previous_value = self.portfolio.total_value(ports.market);

        let assets = self.assets.clone();
        let mut reports = Vec::with_capacity(assets.len());
        for asset in &assets {
            let outcome = self.process_asset(&strategy, asset, ports, now);
            reports.push(AssetReport {
                code: asset.code.clone(),
                outcome,
            });
        }

        let performance = self.portfolio.performance(previous_value, now, ports.market);
        info!(
            value = performance.portfolio_value,
            variation_pct = performance.variation * 100.0,
            "cycle complete"
        );
        self.last_performance = Some(performance.clone());

        Ok(CycleReport {
            started_at: now,
            assets: reports,
            performance,
        })
    }

    fn process_asset(
        &mut self,
        strategy: &Strategy,
        asset: &Asset,
        ports: &CyclePorts<'_>,
        now: DateTime<Utc>,
    ) -> AssetOutcome {
        let code = asset.code.as_str();

        let price = match ports.market.current_price(&asset.market) {
            Ok(price) => price,
            Err(e) => {
                warn!(asset = code, error = %e, "current price unavailable; holding");
                self.last_recommendations
                    .insert(code.to_string(), Recommendation::hold(code, None, now));
                return AssetOutcome::PriceUnavailable;
            }
        };

        let series = match ports
            .market
            .historical_series(&asset.market, self.lookback_days)
        {
            Ok(series) => series,
            Err(e) => {
                warn!(asset = code, error = %e, "historical series unavailable");
                Series::default()
            }
        };

        let evaluation = strategy.evaluate(asset, &series, price, now);
        self.last_details.insert(code.to_string(), evaluation.details);
        let mut recommendation = evaluation.recommendation;

        let forced_by = self.check_stop_level(code, price);
        if let Some(trigger) = forced_by {
            warn!(
                asset = code,
                price,
                %trigger,
                strategy_signal = %recommendation.signal,
                "forcing exit"
            );
            recommendation.signal = Signal::Sell;
            recommendation.price = Some(price);
            recommendation.confidence = 1.0;
        }
        info!(asset = code, signal = %recommendation.signal, "recommendation");
        self.last_recommendations
            .insert(code.to_string(), recommendation.clone());

        let (Some(side), Some(order_price)) =
            (recommendation.signal.order_side(), recommendation.price)
        else {
            return AssetOutcome::Held;
        };
        if order_price <= 0.0 {
            return AssetOutcome::Held;
        }

        let quantity = match side {
            OrderSide::Buy => {
                let total_value = self.portfolio.total_value(ports.market);
                let budget = self.portfolio.cash.min(total_value * self.risk.max_risk_pct);
                let quantity = budget / order_price;
                if quantity <= 0.0 || !quantity.is_finite() {
                    info!(
                        asset = code,
                        cash = self.portfolio.cash,
                        "insufficient cash; skipping buy"
                    );
                    return AssetOutcome::InsufficientCash;
                }
                quantity
            }
            OrderSide::Sell => {
                let held = self.portfolio.held_amount(code);
                if held <= 0.0 {
                    info!(asset = code, "no position to sell; skipping");
                    return AssetOutcome::NothingToSell;
                }
                held
            }
        };

        let order = OrderRequest {
            asset: asset.clone(),
            side,
            quantity,
            price: order_price,
            order_type: OrderType::Market,
        };
        let report = match ports.executor.place_order(&order) {
            Ok(report) => report,
            Err(e) => {
                error!(asset = code, %side, quantity, error = %e, "order failed");
                return AssetOutcome::ExecutionFailed {
                    reason: e.to_string(),
                };
            }
        };
        if !(report.executed_quantity.is_finite() && report.executed_quantity > 0.0)
            || !(report.executed_price.is_finite() && report.executed_price > 0.0)
        {
            warn!(
                asset = code,
                %side,
                quantity = report.executed_quantity,
                price = report.executed_price,
                "order not filled"
            );
            return AssetOutcome::NotFilled;
        }
        let trade = Trade::from_report(&order, &report);

        if let Err(e) = self.portfolio.apply_trade(asset, &trade) {
            error!(asset = code, error = %e, "executed trade rejected by ledger");
            return AssetOutcome::LedgerRejected {
                reason: e.to_string(),
            };
        }
        self.update_stop_level(code, &trade);

        info!(
            asset = code,
            side = %trade.side,
            price = trade.price,
            quantity = trade.quantity,
            "trade executed"
        );
        if let Err(e) = ports.journal.record_trade(&trade) {
            warn!(asset = code, error = %e, "failed to record trade");
        }

        AssetOutcome::Traded { trade, forced_by }
    }

    /// Ratchet the stop level of an open position and report a breach.
    fn check_stop_level(&mut self, code: &str, price: f64) -> Option<StopTrigger> {
        if self.portfolio.held_amount(code) <= 0.0 {
            return None;
        }
        let level = self.stop_levels.get_mut(code)?;
        level.observe(price, self.risk.trailing_stop_pct);
        debug!(
            asset = code,
            highest = level.highest_price,
            trailing = level.trailing_stop,
            stop_loss = level.stop_loss,
            "stop level updated"
        );
        level.breach(price)
    }

    fn update_stop_level(&mut self, code: &str, trade: &Trade) {
        match trade.side {
            OrderSide::Buy => {
                let level = StopLevel::open(
                    trade.price,
                    self.risk.stop_loss_pct,
                    self.risk.trailing_stop_pct,
                );
                self.stop_levels.insert(code.to_string(), level);
            }
            OrderSide::Sell => {
                if self.portfolio.held_amount(code) <= 0.0 {
                    self.stop_levels.remove(code);
                }
            }
        }
    }
}
