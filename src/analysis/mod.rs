//! Analysis modules.
//!
//! Derives filtered, ranked views from a raw analysis result.

pub mod aggregator;

pub use aggregator::*;
