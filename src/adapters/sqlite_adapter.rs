//! SQLite trade journal adapter.

use crate::domain::error::RatchetError;
use crate::domain::trade::{OrderSide, Trade};
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_journal_port::TradeJournalPort;
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::debug;

pub struct SqliteTradeJournal {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteTradeJournal {
    /// Opens `[sqlite] path`; without a path the journal lives in memory.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, RatchetError> {
        let Some(db_path) = config.get_string("sqlite", "path") else {
            return Self::in_memory();
        };

        let pool_size = config
            .get_int("sqlite", "pool_size", 4)
            .clamp(1, i64::from(u32::MAX)) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| RatchetError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, RatchetError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| RatchetError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), RatchetError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| RatchetError::Database {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exchange TEXT NOT NULL,
                asset_code TEXT NOT NULL,
                price REAL NOT NULL,
                quantity REAL NOT NULL,
                side TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_timestamp ON trades(timestamp);",
        )
        .map_err(|e: rusqlite::Error| RatchetError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

impl TradeJournalPort for SqliteTradeJournal {
    fn record_trade(&self, trade: &Trade) -> Result<(), RatchetError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| RatchetError::Database {
                reason: e.to_string(),
            })?;

        conn.execute(
            "INSERT INTO trades (exchange, asset_code, price, quantity, side, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                trade.exchange,
                trade.code,
                trade.price,
                trade.quantity,
                trade.side.to_string(),
                // fixed width so text order is chronological
                trade.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )
        .map_err(|e: rusqlite::Error| RatchetError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        debug!(asset = %trade.code, side = %trade.side, "trade journaled");
        Ok(())
    }

    fn list_trades(&self) -> Result<Vec<Trade>, RatchetError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| RatchetError::Database {
                reason: e.to_string(),
            })?;

        let mut stmt = conn
            .prepare(
                "SELECT exchange, asset_code, price, quantity, side, timestamp
                 FROM trades
                 ORDER BY timestamp DESC, id DESC",
            )
            .map_err(|e: rusqlite::Error| RatchetError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(|e: rusqlite::Error| RatchetError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut trades = Vec::new();
        for row in rows {
            let (exchange, code, price, quantity, side_str, ts_str) =
                row.map_err(|e: rusqlite::Error| RatchetError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

            let side: OrderSide = side_str
                .parse()
                .map_err(|reason: String| RatchetError::DatabaseQuery { reason })?;
            let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                .map_err(|e| RatchetError::DatabaseQuery {
                    reason: format!("invalid timestamp '{}': {}", ts_str, e),
                })?
                .with_timezone(&Utc);

            trades.push(Trade {
                exchange,
                code,
                side,
                price,
                quantity,
                timestamp,
            });
        }

        Ok(trades)
    }
}
