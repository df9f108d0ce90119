//! Route construction heuristics.
//!
//! - [`solomon`] — Sequential Solomon I1 (deterministic, ACO-stochastic and
//!   Reimann-style variants)
//! - [`parallel`] — Parallel construction over a flat candidate pool
//! - [`grasp`] — Sequential construction drawing from a restricted
//!   candidate list
//!
//! Seed selection is shared: deterministic construction seeds each route
//! with the unrouted node farthest from the depot, stochastic construction
//! draws a seed by roulette over distance and the trail between the node
//! and the route's virtual depot. Without pheromone deposits the trail is
//! uniform and the roulette degenerates to distance weighting.

pub mod grasp;
pub mod insertion;
pub mod parallel;
pub mod solomon;

pub use insertion::{CandidateList, Insertion};

use rand::Rng;

use crate::models::{Problem, Solution};
use crate::pheromone::PheromoneMatrix;

/// The unrouted node farthest from the depot, or `None` when everything
/// is routed.
pub fn best_seed(pb: &Problem, unrouted: &[usize]) -> Option<usize> {
    let mut best = None;
    let mut max_dist = -1.0;
    for &node in unrouted {
        if pb.dist(0, node) > max_dist {
            max_dist = pb.dist(0, node);
            best = Some(node);
        }
    }
    best
}

/// Draws a seed for the route about to be opened, weighting each unrouted
/// node by its depot distance times its trail to the route's virtual depot.
///
/// # Panics
///
/// Panics if the unrouted list is empty; callers check first.
pub fn stochastic_seed<R: Rng>(
    pb: &Problem,
    ph: &PheromoneMatrix,
    sol: &Solution,
    rng: &mut R,
) -> usize {
    let depot_id = pb.num_nodes() + sol.trucks();
    draw_seed(sol, rng, |node| {
        pb.dist(0, node) * ph.seed_trail(depot_id, node)
    })
}

/// Draws a seed by trail alone (distance-independent).
///
/// Used by the parallel construction: nodes that used to sit right next
/// to a starting depot were automatically on different routes.
///
/// # Panics
///
/// Panics if the unrouted list is empty; callers check first.
pub fn parallel_seed<R: Rng>(
    pb: &Problem,
    ph: &PheromoneMatrix,
    sol: &Solution,
    rng: &mut R,
) -> usize {
    let depot_id = pb.num_nodes() + sol.trucks();
    draw_seed(sol, rng, |node| ph.seed_trail(depot_id, node))
}

fn draw_seed<R: Rng>(sol: &Solution, rng: &mut R, weight: impl Fn(usize) -> f64) -> usize {
    let unrouted = sol.unrouted();
    assert!(!unrouted.is_empty(), "seed selection without candidates");
    let weights: Vec<f64> = unrouted.iter().map(|&n| weight(n)).collect();
    let mut remaining: f64 = weights.iter().sum();
    let threshold = rng.random::<f64>() * remaining;
    for (i, w) in weights.iter().enumerate() {
        remaining -= w;
        if threshold >= remaining {
            return unrouted[i];
        }
    }
    unrouted[unrouted.len() - 1]
}
