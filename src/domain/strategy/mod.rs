//! Strategy engine.
//!
//! A [`Strategy`] is one of a closed set of variants, each carrying its own
//! typed parameters. Every variant exposes the same `evaluate` capability,
//! which returns a [`Recommendation`] together with a [`StrategyDetails`]
//! snapshot of the inputs and outputs that produced it.

pub mod basic;
pub mod enhanced;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::asset::Asset;
use crate::domain::indicator::IndicatorReading;
use crate::domain::recommendation::{Recommendation, Signal};
use crate::domain::series::Series;

pub use basic::BasicParams;
pub use enhanced::EnhancedParams;

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Basic(BasicParams),
    Enhanced(EnhancedParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(usize),
    Float(f64),
}

/// One entry of a variant's parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: &'static str,
    pub value: ParamValue,
}

impl Parameter {
    pub fn int(name: &'static str, value: usize) -> Self {
        Parameter {
            name,
            value: ParamValue::Int(value),
        }
    }

    pub fn float(name: &'static str, value: f64) -> Self {
        Parameter {
            name,
            value: ParamValue::Float(value),
        }
    }
}

/// A named precondition checked by the enhanced strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    DeltaAboveThreshold,
    AboveLongAverage,
    VolumeConfirms,
    NotNearResistance,
    RsiNotOverbought,
    DeltaBelowThreshold,
    BelowLongAverage,
    NotNearSupport,
    RsiNotOversold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateCheck {
    pub gate: Gate,
    pub passed: bool,
}

/// Transparency snapshot of one evaluation. Observers read it; decisions
/// never depend on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyDetails {
    pub strategy: &'static str,
    pub current_price: f64,
    pub average_price: Option<f64>,
    pub delta: Option<f64>,
    pub threshold: f64,
    pub readings: Vec<IndicatorReading>,
    pub gates: Vec<GateCheck>,
    pub signal: Signal,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub recommendation: Recommendation,
    pub details: StrategyDetails,
}

impl Strategy {
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Basic(_) => "basic",
            Strategy::Enhanced(_) => "enhanced",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Basic(_) => basic::NAME,
            Strategy::Enhanced(_) => enhanced::NAME,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Strategy::Basic(p) => p.description(),
            Strategy::Enhanced(p) => p.description(),
        }
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        match self {
            Strategy::Basic(p) => p.parameters(),
            Strategy::Enhanced(p) => p.parameters(),
        }
    }

    pub fn evaluate(
        &self,
        asset: &Asset,
        series: &Series,
        current_price: f64,
        now: DateTime<Utc>,
    ) -> Evaluation {
        match self {
            Strategy::Basic(p) => basic::evaluate(p, asset, series, current_price, now),
            Strategy::Enhanced(p) => enhanced::evaluate(p, asset, series, current_price, now),
        }
    }
}

/// (current - average) / average; undefined for a missing or zero average.
pub(crate) fn relative_delta(current_price: f64, average: Option<f64>) -> Option<f64> {
    average
        .filter(|avg| *avg != 0.0)
        .map(|avg| (current_price - avg) / avg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_name() {
        let basic = Strategy::Basic(BasicParams::default());
        let enhanced = Strategy::Enhanced(EnhancedParams::default());
        assert_eq!(basic.kind(), "basic");
        assert_eq!(enhanced.kind(), "enhanced");
        assert_ne!(basic.name(), enhanced.name());
    }

    #[test]
    fn parameters_are_typed() {
        let strategy = Strategy::Basic(BasicParams {
            window: 5,
            threshold: 0.03,
        });
        assert_eq!(
            strategy.parameters(),
            vec![Parameter::int("window", 5), Parameter::float("threshold", 0.03)]
        );
    }

    #[test]
    fn relative_delta_guards_zero() {
        assert_eq!(relative_delta(10.0, None), None);
        assert_eq!(relative_delta(10.0, Some(0.0)), None);
        assert_eq!(relative_delta(11.0, Some(10.0)), Some(0.1));
    }

    #[test]
    fn param_value_serializes_plain() {
        let json = serde_json::to_string(&Parameter::float("threshold", 0.5)).unwrap();
        assert_eq!(json, r#"{"name":"threshold","value":0.5}"#);
    }
}
