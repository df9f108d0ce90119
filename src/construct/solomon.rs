//! Sequential Solomon I1 insertion heuristic.
//!
//! # Algorithm
//!
//! Open a route with a seed, then repeatedly insert the unrouted node with
//! the best feasible insertion on the *current* route; when nothing fits,
//! close the route and open the next one. The deterministic variant seeds
//! with the node farthest from the depot and commits the cheapest
//! insertion; the stochastic variants draw seeds and insertions by
//! roulette.
//!
//! # Reference
//!
//! Solomon, M.M. (1987). "Algorithms for the Vehicle Routing and
//! Scheduling Problems with Time Window Constraints", *Operations
//! Research* 35(2), 254-265.

use rand::Rng;

use crate::config::Config;
use crate::construct::insertion::{
    best_insertion, best_insertion_aco, best_insertion_mr, pick_by_attractiveness,
    pick_by_inverse_cost, Insertion,
};
use crate::construct::{best_seed, stochastic_seed};
use crate::models::{Problem, Solution};
use crate::pheromone::PheromoneMatrix;

/// Builds routes with plain Solomon I1 until everything is routed or the
/// fleet limit is reached.
///
/// Returns the number of customers left unrouted (0 unless the fleet
/// limit cut construction short). Deterministic seeding and insertion
/// selection follow `cfg.deterministic`.
pub fn sequential<R: Rng>(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    rng: &mut R,
    sol: &mut Solution,
    workers: usize,
    fleet_limit: usize,
) -> usize {
    while sol.num_unrouted() > 0 {
        if sol.trucks() == fleet_limit {
            return sol.num_unrouted();
        }
        let seed = if cfg.deterministic {
            best_seed(pb, sol.unrouted()).expect("unrouted list checked above")
        } else {
            stochastic_seed(pb, ph, sol, rng)
        };
        sol.remove_unrouted(seed);
        let route = sol.open_route(pb, seed, workers);
        loop {
            let chosen = if cfg.deterministic {
                let mut best: Option<Insertion> = None;
                for &node in sol.unrouted() {
                    if let Some(ins) = best_insertion(pb, cfg, sol.route(route), route, node) {
                        if best.as_ref().is_none_or(|b| ins.cost < b.cost) {
                            best = Some(ins);
                        }
                    }
                }
                best
            } else {
                let candidates: Vec<Insertion> = sol
                    .unrouted()
                    .iter()
                    .filter_map(|&node| best_insertion(pb, cfg, sol.route(route), route, node))
                    .collect();
                if candidates.is_empty() {
                    None
                } else {
                    let min_cost = candidates
                        .iter()
                        .map(|c| c.cost)
                        .fold(f64::INFINITY, f64::min);
                    let idx = pick_by_inverse_cost(&candidates, min_cost, rng);
                    Some(candidates[idx].clone())
                }
            };
            let Some(ins) = chosen else {
                break;
            };
            sol.remove_unrouted(ins.node);
            sol.route_mut(route).insert_block(pb, ins.after, &[ins.node]);
        }
    }
    0
}

/// Sequential I1 adapted for ACO: trail-scaled insertion costs, roulette
/// over the per-node best insertions.
pub fn sequential_aco<R: Rng>(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    rng: &mut R,
    sol: &mut Solution,
    workers: usize,
) {
    while sol.num_unrouted() > 0 {
        let seed = stochastic_seed(pb, ph, sol, rng);
        sol.remove_unrouted(seed);
        let route = sol.open_route(pb, seed, workers);
        loop {
            let candidates: Vec<Insertion> = sol
                .unrouted()
                .iter()
                .filter_map(|&node| best_insertion_aco(pb, cfg, ph, sol.route(route), route, node))
                .collect();
            if candidates.is_empty() {
                break;
            }
            let min_cost = candidates
                .iter()
                .map(|c| c.cost)
                .fold(f64::INFINITY, f64::min);
            let idx = pick_by_inverse_cost(&candidates, min_cost, rng);
            let ins = candidates[idx].clone();
            sol.remove_unrouted(ins.node);
            sol.route_mut(route).insert_block(pb, ins.after, &[ins.node]);
        }
    }
}

/// Sequential I1 in the Reimann formulation: the attractiveness is
/// computed directly (clamped positive) and drives the roulette itself.
///
/// No significant quality difference to [`sequential_aco`] has shown up;
/// both are kept selectable.
pub fn sequential_mr<R: Rng>(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    rng: &mut R,
    sol: &mut Solution,
    workers: usize,
) {
    while sol.num_unrouted() > 0 {
        let seed = stochastic_seed(pb, ph, sol, rng);
        sol.remove_unrouted(seed);
        let route = sol.open_route(pb, seed, workers);
        loop {
            let candidates: Vec<Insertion> = sol
                .unrouted()
                .iter()
                .filter_map(|&node| best_insertion_mr(pb, cfg, ph, sol.route(route), route, node))
                .collect();
            if candidates.is_empty() {
                break;
            }
            let idx = pick_by_attractiveness(&candidates, rng);
            let ins = candidates[idx].clone();
            sol.remove_unrouted(ins.node);
            sol.route_mut(route).insert_block(pb, ins.after, &[ins.node]);
        }
    }
}
