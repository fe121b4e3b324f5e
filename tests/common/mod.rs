#![allow(dead_code)]

use chrono::Utc;
use ratchet::domain::asset::Asset;
use ratchet::domain::error::RatchetError;
use ratchet::domain::series::Series;
use ratchet::domain::trade::{ExecutionReport, OrderRequest, Trade};
use ratchet::ports::execution_port::ExecutionPort;
use ratchet::ports::market_data_port::MarketDataPort;
use ratchet::ports::trade_journal_port::TradeJournalPort;
use std::collections::HashMap;
use std::sync::Mutex;

/// Market data whose quotes can be moved between cycles.
pub struct MockMarketData {
    pub prices: Mutex<HashMap<String, f64>>,
    pub series: Mutex<HashMap<String, Series>>,
    pub errors: Mutex<HashMap<String, String>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            prices: Mutex::new(HashMap::new()),
            series: Mutex::new(HashMap::new()),
            errors: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_quote(self, market: &str, price: f64, history: &[f64]) -> Self {
        self.set_quote(market, price, history);
        self
    }

    pub fn with_error(self, market: &str, reason: &str) -> Self {
        self.errors
            .lock()
            .unwrap()
            .insert(market.to_string(), reason.to_string());
        self
    }

    pub fn set_quote(&self, market: &str, price: f64, history: &[f64]) {
        self.prices.lock().unwrap().insert(market.to_string(), price);
        self.series
            .lock()
            .unwrap()
            .insert(market.to_string(), Series::from_prices(history.to_vec()));
    }

    pub fn set_series(&self, market: &str, series: Series) {
        self.series.lock().unwrap().insert(market.to_string(), series);
    }

    fn check(&self, market: &str) -> Result<(), RatchetError> {
        match self.errors.lock().unwrap().get(market) {
            Some(reason) => Err(RatchetError::DataUnavailable {
                market: market.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl MarketDataPort for MockMarketData {
    fn current_price(&self, market: &str) -> Result<f64, RatchetError> {
        self.check(market)?;
        self.prices
            .lock()
            .unwrap()
            .get(market)
            .copied()
            .ok_or_else(|| RatchetError::DataUnavailable {
                market: market.to_string(),
                reason: "no quote".into(),
            })
    }

    fn historical_series(&self, market: &str, _lookback_days: u32) -> Result<Series, RatchetError> {
        self.check(market)?;
        Ok(self
            .series
            .lock()
            .unwrap()
            .get(market)
            .cloned()
            .unwrap_or_default())
    }
}

/// Fills every order in full, or rejects orders for the listed codes.
pub struct MockExecutor {
    pub rejected: Vec<String>,
    pub orders: Mutex<Vec<OrderRequest>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            rejected: Vec::new(),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(mut self, code: &str) -> Self {
        self.rejected.push(code.to_string());
        self
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

impl ExecutionPort for MockExecutor {
    fn place_order(&self, order: &OrderRequest) -> Result<ExecutionReport, RatchetError> {
        self.orders.lock().unwrap().push(order.clone());
        if self.rejected.contains(&order.asset.code) {
            return Err(RatchetError::Execution {
                code: order.asset.code.clone(),
                reason: "exchange unavailable".into(),
            });
        }
        Ok(ExecutionReport {
            exchange: "mock".into(),
            executed_price: order.price,
            executed_quantity: order.quantity,
            timestamp: Utc::now(),
        })
    }
}

/// Records trades in memory; can be told to fail every write.
pub struct RecordingJournal {
    pub trades: Mutex<Vec<Trade>>,
    pub fail_writes: bool,
}

impl RecordingJournal {
    pub fn new() -> Self {
        Self {
            trades: Mutex::new(Vec::new()),
            fail_writes: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            trades: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    pub fn recorded(&self) -> Vec<Trade> {
        self.trades.lock().unwrap().clone()
    }
}

impl TradeJournalPort for RecordingJournal {
    fn record_trade(&self, trade: &Trade) -> Result<(), RatchetError> {
        if self.fail_writes {
            return Err(RatchetError::Database {
                reason: "disk full".into(),
            });
        }
        self.trades.lock().unwrap().push(trade.clone());
        Ok(())
    }

    fn list_trades(&self) -> Result<Vec<Trade>, RatchetError> {
        let mut trades = self.recorded();
        trades.reverse();
        Ok(trades)
    }
}

pub fn btc() -> Asset {
    Asset::new("BTC/USDT", "Bitcoin", "spot", "bitcoin")
}

pub fn eth() -> Asset {
    Asset::new("ETH/USDT", "Ethereum", "spot", "ethereum")
}
