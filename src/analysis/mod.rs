//! Analysis modules.
//!
//! Gathering of raw market data and the insights derived from it.

pub mod aggregator;
pub mod insights;

pub use aggregator::gather_data;
pub use insights::process_data;
