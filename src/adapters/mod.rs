//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod memory_journal;
pub mod paper_executor;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
