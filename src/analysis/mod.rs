//! Analysis modules.
//!
//! Aggregation is the only analysis stage; everything it produces is
//! consumed read-only by the report layer.

pub mod aggregator;

pub use aggregator::*;
