//! Common types and utilities shared across the PM2.5 map crates.

pub mod error;
pub mod matrix;
pub mod region;
pub mod time;

pub use error::{Pm25Error, Pm25Result};
pub use matrix::FeatureMatrix;
pub use region::{Region, PHILIPPINES};
pub use time::{DateRange, TimeParseError};
