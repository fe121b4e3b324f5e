//! In-memory trade journal, used when the `sqlite` feature is disabled.

use std::sync::{Mutex, PoisonError};

use crate::domain::error::RatchetError;
use crate::domain::trade::Trade;
use crate::ports::trade_journal_port::TradeJournalPort;

#[derive(Default)]
pub struct MemoryTradeJournal {
    trades: Mutex<Vec<Trade>>,
}

impl MemoryTradeJournal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TradeJournalPort for MemoryTradeJournal {
    fn record_trade(&self, trade: &Trade) -> Result<(), RatchetError> {
        self.trades
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(trade.clone());
        Ok(())
    }

    fn list_trades(&self) -> Result<Vec<Trade>, RatchetError> {
        let mut trades = self
            .trades
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        // stable sort keeps insertion order among equal timestamps; reverse it
        trades.reverse();
        trades.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(trades)
    }
}
