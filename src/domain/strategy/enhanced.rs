//! Multi-gate trend strategy.
//!
//! The short SMA delta drives the direction, as in the basic variant, but a
//! signal only fires when every gate for that direction passes:
//! - buy: delta > threshold, price above long SMA, latest volume above its
//!   average, price not near resistance, RSI <= overbought
//! - sell: delta < -threshold, price below long SMA, price not near support,
//!   RSI >= oversold
//!
//! Optional indicators that are undefined (long SMA, volume history, RSI)
//! let their gate pass. Without a short SMA the result is always hold.
//!
//! "Near" a level is the 2% band on the inner side of the recent high or
//! low. A price beyond the level itself is a breakout and passes the gate.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{relative_delta, Evaluation, Gate, GateCheck, Parameter, StrategyDetails};
use crate::domain::asset::Asset;
use crate::domain::indicator::levels::recent_levels;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::volume::{average_volume, volume_confirms};
use crate::domain::indicator::{IndicatorReading, IndicatorType};
use crate::domain::recommendation::{Recommendation, Signal};
use crate::domain::series::Series;

pub const NAME: &str = "Enhanced Trend Strategy";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhancedParams {
    pub short_window: usize,
    pub long_window: usize,
    pub threshold: f64,
    pub volume_window: usize,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for EnhancedParams {
    fn default() -> Self {
        EnhancedParams {
            short_window: 7,
            long_window: 25,
            threshold: 0.02,
            volume_window: 7,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

impl EnhancedParams {
    pub fn description(&self) -> String {
        format!(
            "Trade {s}-day average breakouts beyond {t:.1}% confirmed by the {l}-day trend, \
             {v}-day volume, RSI({r}) within [{os}, {ob}] \
             and distance from recent support/resistance",
            s = self.short_window,
            t = self.threshold * 100.0,
            l = self.long_window,
            v = self.volume_window,
            r = self.rsi_period,
            os = self.rsi_oversold,
            ob = self.rsi_overbought,
        )
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::int("short_window", self.short_window),
            Parameter::int("long_window", self.long_window),
            Parameter::float("threshold", self.threshold),
            Parameter::int("volume_window", self.volume_window),
            Parameter::int("rsi_period", self.rsi_period),
            Parameter::float("rsi_overbought", self.rsi_overbought),
            Parameter::float("rsi_oversold", self.rsi_oversold),
        ]
    }
}

pub fn evaluate(
    params: &EnhancedParams,
    asset: &Asset,
    series: &Series,
    current_price: f64,
    now: DateTime<Utc>,
) -> Evaluation {
    let prices = &series.prices;
    let short = calculate_sma(prices, params.short_window);
    let long = calculate_sma(prices, params.long_window);
    let rsi = calculate_rsi(prices, params.rsi_period);
    let avg_volume = average_volume(&series.volumes, params.volume_window);
    let levels = recent_levels(prices, params.long_window);
    let delta = relative_delta(current_price, short);

    let readings = vec![
        IndicatorReading::new(IndicatorType::Sma(params.short_window), short),
        IndicatorReading::new(IndicatorType::Sma(params.long_window), long),
        IndicatorReading::new(IndicatorType::Rsi(params.rsi_period), rsi),
        IndicatorReading::new(IndicatorType::AvgVolume(params.volume_window), avg_volume),
        IndicatorReading::new(
            IndicatorType::RecentHigh(params.long_window),
            levels.map(|l| l.high),
        ),
        IndicatorReading::new(
            IndicatorType::RecentLow(params.long_window),
            levels.map(|l| l.low),
        ),
    ];

    let (signal, confidence, gates) = match delta {
        None => (Signal::Hold, 0.0, Vec::new()),
        Some(d) => {
            let buy_gates = vec![
                check(Gate::DeltaAboveThreshold, d > params.threshold),
                check(Gate::AboveLongAverage, long.is_none_or(|l| current_price > l)),
                check(
                    Gate::VolumeConfirms,
                    volume_confirms(&series.volumes, params.volume_window),
                ),
                check(
                    Gate::NotNearResistance,
                    !levels.is_some_and(|l| l.near_resistance(current_price)),
                ),
                check(
                    Gate::RsiNotOverbought,
                    rsi.is_none_or(|r| r <= params.rsi_overbought),
                ),
            ];
            let sell_gates = vec![
                check(Gate::DeltaBelowThreshold, d < -params.threshold),
                check(Gate::BelowLongAverage, long.is_none_or(|l| current_price < l)),
                check(
                    Gate::NotNearSupport,
                    !levels.is_some_and(|l| l.near_support(current_price)),
                ),
                check(
                    Gate::RsiNotOversold,
                    rsi.is_none_or(|r| r >= params.rsi_oversold),
                ),
            ];

            let signal = if all_pass(&buy_gates) {
                Signal::Buy
            } else if all_pass(&sell_gates) {
                Signal::Sell
            } else {
                Signal::Hold
            };
            let gates = if d < 0.0 { sell_gates } else { buy_gates };
            (signal, d.abs().min(1.0), gates)
        }
    };

    debug!(
        asset = %asset.code,
        current = current_price,
        short = ?short,
        long = ?long,
        rsi = ?rsi,
        %signal,
        "enhanced strategy evaluated"
    );

    let recommendation =
        Recommendation::new(&asset.code, signal, Some(current_price), confidence, now);
    let details = StrategyDetails {
        strategy: NAME,
        current_price,
        average_price: short,
        delta,
        threshold: params.threshold,
        readings,
        gates,
        signal,
        confidence: recommendation.confidence,
        timestamp: now,
    };

    Evaluation {
        recommendation,
        details,
    }
}

fn check(gate: Gate, passed: bool) -> GateCheck {
    GateCheck { gate, passed }
}

fn all_pass(gates: &[GateCheck]) -> bool {
    gates.iter().all(|g| g.passed)
}
