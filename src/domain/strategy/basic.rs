//! Deviation-from-average strategy.
//!
//! delta = (current - SMA(window)) / SMA(window)
//! buy if delta > threshold, sell if delta < -threshold, else hold.
//! Confidence = min(|delta|, 1).

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{relative_delta, Evaluation, Parameter, StrategyDetails};
use crate::domain::asset::Asset;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorReading, IndicatorType};
use crate::domain::recommendation::{Recommendation, Signal};
use crate::domain::series::Series;

pub const NAME: &str = "Simple Moving Average Strategy";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicParams {
    pub window: usize,
    pub threshold: f64,
}

impl Default for BasicParams {
    fn default() -> Self {
        BasicParams {
            window: 7,
            threshold: 0.02,
        }
    }
}

impl BasicParams {
    pub fn description(&self) -> String {
        format!(
            "Buy when price exceeds the {w}-day average by more than {t:.1}%, \
             sell when price falls below it by more than {t:.1}%",
            w = self.window,
            t = self.threshold * 100.0
        )
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::int("window", self.window),
            Parameter::float("threshold", self.threshold),
        ]
    }
}

pub fn evaluate(
    params: &BasicParams,
    asset: &Asset,
    series: &Series,
    current_price: f64,
    now: DateTime<Utc>,
) -> Evaluation {
    let average = calculate_sma(&series.prices, params.window);
    let delta = relative_delta(current_price, average);

    let (signal, confidence) = match delta {
        Some(d) if d > params.threshold => (Signal::Buy, d.abs().min(1.0)),
        Some(d) if d < -params.threshold => (Signal::Sell, d.abs().min(1.0)),
        Some(d) => (Signal::Hold, d.abs().min(1.0)),
        None => (Signal::Hold, 0.0),
    };
    let price = if series.is_empty() {
        None
    } else {
        Some(current_price)
    };

    debug!(
        asset = %asset.code,
        current = current_price,
        average = ?average,
        delta = ?delta,
        %signal,
        "basic strategy evaluated"
    );

    let recommendation = Recommendation::new(&asset.code, signal, price, confidence, now);
    let details = StrategyDetails {
        strategy: NAME,
        current_price,
        average_price: average,
        delta,
        threshold: params.threshold,
        readings: vec![IndicatorReading::new(
            IndicatorType::Sma(params.window),
            average,
        )],
        gates: Vec::new(),
        signal,
        confidence: recommendation.confidence,
        timestamp: now,
    };

    Evaluation {
        recommendation,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn asset() -> Asset {
        Asset::new("BTC/USDT", "Bitcoin", "spot", "bitcoin")
    }

    fn run(prices: &[f64], current: f64, window: usize, threshold: f64) -> Evaluation {
        let params = BasicParams { window, threshold };
        evaluate(
            &params,
            &asset(),
            &Series::from_prices(prices.to_vec()),
            current,
            Utc::now(),
        )
    }

    #[test]
    fn rising_series_below_threshold_holds() {
        let prices = [100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0];
        let eval = run(&prices, 112.0, 3, 0.02);
        assert_eq!(eval.recommendation.signal, Signal::Hold);
        assert_relative_eq!(eval.details.average_price.unwrap(), 110.0);
        assert_relative_eq!(eval.details.delta.unwrap(), 2.0 / 110.0);
        assert_relative_eq!(eval.recommendation.confidence, 2.0 / 110.0);
    }

    #[test]
    fn buy_above_threshold() {
        let eval = run(&[100.0, 100.0, 100.0], 110.0, 3, 0.02);
        assert_eq!(eval.recommendation.signal, Signal::Buy);
        assert_eq!(eval.recommendation.price, Some(110.0));
        assert_relative_eq!(eval.recommendation.confidence, 0.1);
    }

    #[test]
    fn sell_below_threshold() {
        let eval = run(&[100.0, 100.0, 100.0], 90.0, 3, 0.02);
        assert_eq!(eval.recommendation.signal, Signal::Sell);
        assert_relative_eq!(eval.recommendation.confidence, 0.1);
    }

    #[test]
    fn confidence_capped_at_one() {
        let eval = run(&[10.0, 10.0], 50.0, 2, 0.02);
        assert_eq!(eval.recommendation.signal, Signal::Buy);
        assert_eq!(eval.recommendation.confidence, 1.0);
    }

    #[test]
    fn empty_series_holds_without_price() {
        let eval = run(&[], 100.0, 3, 0.02);
        assert_eq!(eval.recommendation.signal, Signal::Hold);
        assert_eq!(eval.recommendation.confidence, 0.0);
        assert_eq!(eval.recommendation.price, None);
    }

    #[test]
    fn short_series_holds_with_zero_confidence() {
        let eval = run(&[100.0, 200.0], 300.0, 3, 0.02);
        assert_eq!(eval.recommendation.signal, Signal::Hold);
        assert_eq!(eval.recommendation.confidence, 0.0);
        assert_eq!(eval.details.average_price, None);
    }

    #[test]
    fn zero_average_holds() {
        let eval = run(&[0.0, 0.0], 5.0, 2, 0.02);
        assert_eq!(eval.recommendation.signal, Signal::Hold);
        assert_eq!(eval.details.delta, None);
    }

    #[test]
    fn details_record_inputs() {
        let eval = run(&[100.0, 100.0, 100.0], 110.0, 3, 0.02);
        assert_eq!(eval.details.strategy, NAME);
        assert_eq!(eval.details.threshold, 0.02);
        assert_eq!(eval.details.current_price, 110.0);
        assert_eq!(eval.details.signal, Signal::Buy);
        assert_eq!(
            eval.details.readings,
            vec![IndicatorReading::new(IndicatorType::Sma(3), Some(100.0))]
        );
    }

    #[test]
    fn description_mentions_window_and_threshold() {
        let desc = BasicParams::default().description();
        assert!(desc.contains("7-day average"));
        assert!(desc.contains("2.0%"));
    }
}
