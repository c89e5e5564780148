//! Strategy generation and execution.

pub mod builder;
pub mod executor;

pub use builder::generate_strategy;
pub use executor::Executor;
