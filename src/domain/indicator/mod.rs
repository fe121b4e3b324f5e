//! Technical indicator engine.
//!
//! Every indicator is computed at the newest point of a series only and
//! returns `None` when the series is too short for it to be defined:
//! - [`sma`]: simple moving average
//! - [`rsi`]: relative strength index with simple averaging
//! - [`volume`]: average volume and the volume confirmation check
//! - [`levels`]: recent support/resistance band
//!
//! `IndicatorType` names an indicator together with its parameters; the
//! strategy engine uses it to label readings in its transparency snapshot.

pub mod levels;
pub mod rsi;
pub mod sma;
pub mod volume;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    AvgVolume(usize),
    RecentHigh(usize),
    RecentLow(usize),
}

/// A single indicator value as observed during an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReading {
    pub indicator: IndicatorType,
    pub value: Option<f64>,
}

impl IndicatorReading {
    pub fn new(indicator: IndicatorType, value: Option<f64>) -> Self {
        IndicatorReading { indicator, value }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::AvgVolume(period) => write!(f, "AVG_VOLUME({})", period),
            IndicatorType::RecentHigh(period) => write!(f, "HIGH({})", period),
            IndicatorType::RecentLow(period) => write!(f, "LOW({})", period),
        }
    }
}
