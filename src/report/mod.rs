//! Report output.
//!
//! Renders the aggregated metrics table to disk.

pub mod generator;

pub use generator::*;
