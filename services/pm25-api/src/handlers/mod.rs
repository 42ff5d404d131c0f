//! HTTP handlers.
//!
//! - `map`: the welcome message and map generation
//! - `health`: liveness and Prometheus metrics

pub mod health;
pub mod map;

pub use health::{health_handler, metrics_handler};
pub use map::{generate_map_get, generate_map_post, root_handler, MapRequest, MapResponse};
