//! Core domain types and logic.

pub mod asset;
pub mod series;
pub mod indicator;
pub mod strategy;
pub mod recommendation;
pub mod trade;
pub mod position;
pub mod portfolio;
pub mod performance;
pub mod supervisor;
pub mod scheduler;
pub mod config_validation;
pub mod error;
