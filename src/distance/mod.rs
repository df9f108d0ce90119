//! Distance and travel time matrices.
//!
//! Provides the dense distance matrix plus the per-worker travel layers
//! that fold service times into arrival computations.

mod matrix;

pub use matrix::{adapt_service_times, CostMatrix, TravelMatrices};
