//! # vrptwms
//!
//! Solver for the Vehicle Routing Problem with Time Windows and Multiple
//! Service workers (VRPTWMS). Given a depot, customers with demands, time
//! windows and service times, a homogeneous fleet with fixed capacity and a
//! maximum crew size per vehicle, the solver produces feasible routes that
//! minimise a hierarchical objective: trucks first, then total service
//! workers, then travelled distance.
//!
//! ## Modules
//!
//! - [`models`] — Domain types (Node, Problem, Route, Solution)
//! - [`distance`] — Distance and per-worker travel time matrices
//! - [`construct`] — Route construction heuristics (Solomon I1, parallel, GRASP)
//! - [`pheromone`] — Pheromone matrix with per-route virtual depots
//! - [`local_search`] — Relocate/swap operators and truck-emptying
//! - [`tabu`] — Node-to-route recency tabu list
//! - [`cache`] — Objective-value solution cache
//! - [`solver`] — Metaheuristic drivers and budget control
//! - [`instance`] — Solomon benchmark instance reader
//! - [`config`] — Runtime configuration
//! - [`report`] — Aggregated result and solution detail output

pub mod cache;
pub mod cli;
pub mod config;
pub mod construct;
pub mod distance;
pub mod error;
pub mod instance;
pub mod local_search;
pub mod models;
pub mod pheromone;
pub mod report;
pub mod solver;
pub mod tabu;

/// Numeric epsilon separating a real improvement from rounding noise.
///
/// Also serves as the positive floor for clamped attractiveness values.
pub const MIN_DELTA: f64 = 1e-13;
