//! Utility functions for common type conversions and transformations.

pub mod builders;
pub mod conversion;

pub use conversion::{format_amount, gwei_to_wei, parse_amount};
