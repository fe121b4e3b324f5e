//! CSV file market data adapter.
//!
//! One `<market>.csv` per market identifier under the data directory, with
//! a `date,price,volume` header and one row per day. The current price is
//! the price of the latest row.

use crate::domain::error::RatchetError;
use crate::domain::series::Series;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
struct DailyQuote {
    date: NaiveDate,
    price: f64,
    volume: Option<f64>,
}

pub struct CsvMarketData {
    base_path: PathBuf,
}

impl CsvMarketData {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Reads `[market] data_dir`, defaulting to `./data`.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let dir = config
            .get_string("market", "data_dir")
            .unwrap_or_else(|| "data".to_string());
        Self::new(PathBuf::from(dir))
    }

    fn csv_path(&self, market: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", market))
    }

    fn load(&self, market: &str) -> Result<Vec<DailyQuote>, RatchetError> {
        let unavailable = |reason: String| RatchetError::DataUnavailable {
            market: market.to_string(),
            reason,
        };

        let path = self.csv_path(market);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut quotes = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| unavailable(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| unavailable("missing date column".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| unavailable(format!("invalid date '{}': {}", date_str, e)))?;

            let price: f64 = record
                .get(1)
                .ok_or_else(|| unavailable("missing price column".into()))?
                .trim()
                .parse()
                .map_err(|e| unavailable(format!("invalid price value: {}", e)))?;

            let volume = match record.get(2).map(str::trim) {
                None | Some("") => None,
                Some(v) => Some(
                    v.parse::<f64>()
                        .map_err(|e| unavailable(format!("invalid volume value: {}", e)))?,
                ),
            };

            quotes.push(DailyQuote {
                date,
                price,
                volume,
            });
        }

        quotes.sort_by_key(|q| q.date);
        debug!(market, rows = quotes.len(), "loaded market data");
        Ok(quotes)
    }
}

impl MarketDataPort for CsvMarketData {
    fn current_price(&self, market: &str) -> Result<f64, RatchetError> {
        self.load(market)?
            .last()
            .map(|q| q.price)
            .ok_or_else(|| RatchetError::DataUnavailable {
                market: market.to_string(),
                reason: "no price rows".into(),
            })
    }

    /// The latest `lookback_days` rows. Volumes are only reported when
    /// every returned row carries one.
    fn historical_series(&self, market: &str, lookback_days: u32) -> Result<Series, RatchetError> {
        let quotes = self.load(market)?;
        let start = quotes.len().saturating_sub(lookback_days as usize);
        let window = &quotes[start..];

        let prices = window.iter().map(|q| q.price).collect();
        let volumes = window
            .iter()
            .map(|q| q.volume)
            .collect::<Option<Vec<f64>>>()
            .unwrap_or_default();
        Ok(Series::new(prices, volumes))
    }
}
