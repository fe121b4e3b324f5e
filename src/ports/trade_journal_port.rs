//! Executed-trade persistence port trait.

use crate::domain::error::RatchetError;
use crate::domain::trade::Trade;

pub trait TradeJournalPort {
    fn record_trade(&self, trade: &Trade) -> Result<(), RatchetError>;

    /// All recorded trades, newest first.
    fn list_trades(&self) -> Result<Vec<Trade>, RatchetError>;
}
