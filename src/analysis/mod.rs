//! Repository analysis.
//!
//! Turns one repository directory into one metric record.

pub mod aggregator;

pub use aggregator::*;
