//! Order execution port trait.

use crate::domain::error::RatchetError;
use crate::domain::trade::{ExecutionReport, OrderRequest};

pub trait ExecutionPort {
    fn place_order(&self, order: &OrderRequest) -> Result<ExecutionReport, RatchetError>;
}
