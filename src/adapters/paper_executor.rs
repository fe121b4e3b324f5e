//! Paper-trading executor: fills every valid order in full at the requested
//! price without contacting an exchange.

use chrono::Utc;
use tracing::info;

use crate::domain::error::RatchetError;
use crate::domain::trade::{ExecutionReport, OrderRequest};
use crate::ports::config_port::ConfigPort;
use crate::ports::execution_port::ExecutionPort;

pub struct PaperExecutor {
    exchange: String,
}

impl PaperExecutor {
    pub fn new(exchange: &str) -> Self {
        Self {
            exchange: exchange.to_string(),
        }
    }

    /// Reads `[executor] exchange`, defaulting to `paper`.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let exchange = config
            .get_string("executor", "exchange")
            .unwrap_or_else(|| "paper".to_string());
        Self::new(&exchange)
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }
}

impl ExecutionPort for PaperExecutor {
    fn place_order(&self, order: &OrderRequest) -> Result<ExecutionReport, RatchetError> {
        let reject = |reason: &str| RatchetError::Execution {
            code: order.asset.code.clone(),
            reason: reason.to_string(),
        };
        if !(order.quantity.is_finite() && order.quantity > 0.0) {
            return Err(reject("quantity must be positive"));
        }
        if !(order.price.is_finite() && order.price > 0.0) {
            return Err(reject("price must be positive"));
        }

        info!(
            exchange = %self.exchange,
            asset = %order.asset.code,
            side = %order.side,
            order_type = ?order.order_type,
            price = order.price,
            quantity = order.quantity,
            "paper fill"
        );

        Ok(ExecutionReport {
            exchange: self.exchange.clone(),
            executed_price: order.price,
            executed_quantity: order.quantity,
            timestamp: Utc::now(),
        })
    }
}
