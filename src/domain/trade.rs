//! Orders and executed trades.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::asset::Asset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(format!("unknown order side '{}'", other)),
        }
    }
}

/// Only market orders are placed; the executor fills at the quoted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderType {
    #[default]
    Market,
}

/// An order submitted to the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub asset: Asset,
    pub side: OrderSide,
    pub quantity: f64,
    pub price: f64,
    pub order_type: OrderType,
}

/// What the executor reports back for a filled order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub exchange: String,
    pub executed_price: f64,
    pub executed_quantity: f64,
    pub timestamp: DateTime<Utc>,
}

/// Immutable record of an executed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub exchange: String,
    pub code: String,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: f64,
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn from_report(order: &OrderRequest, report: &ExecutionReport) -> Self {
        Trade {
            exchange: report.exchange.clone(),
            code: order.asset.code.clone(),
            side: order.side,
            price: report.executed_price,
            quantity: report.executed_quantity,
            timestamp: report.timestamp,
        }
    }

    pub fn value(&self) -> f64 {
        self.price * self.quantity
    }
}
