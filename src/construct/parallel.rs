//! Parallel route construction for the ants.
//!
//! # Algorithm
//!
//! Instead of filling one route at a time, open the target number of
//! routes up front (seeded by trail roulette over the virtual depots) and
//! keep a flat pool holding *every* feasible insertion position of every
//! unrouted node on every route. Repeatedly draw one by attractiveness
//! roulette, commit it, drop the pool entries its commit invalidated and
//! extend the pool with fresh positions on the updated route. Restricting
//! the pool to per-node best positions has been tried and worsens the
//! solution quality.
//!
//! The target route count is the best known truck count, reduced by one
//! while the driver still believes fewer trucks are possible. When the
//! pool drains with customers left over, a sequential pass finishes the
//! job and the failure feeds the driver's attempt counter.

use rand::Rng;

use crate::config::Config;
use crate::construct::insertion::{first_insertion_trail, pick_by_attractiveness, Insertion};
use crate::construct::{parallel_seed, solomon};
use crate::models::{Problem, Solution};
use crate::pheromone::PheromoneMatrix;

/// Builds routes in parallel, finishing sequentially if needed.
///
/// `max_trucks` is the number of routes to open up front. Returns `true`
/// if the parallel phase alone routed every customer.
pub fn construct<R: Rng>(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    rng: &mut R,
    sol: &mut Solution,
    workers: usize,
    max_trucks: usize,
) -> bool {
    for _ in 0..max_trucks {
        if sol.num_unrouted() == 0 {
            break;
        }
        let seed = parallel_seed(pb, ph, sol, rng);
        sol.remove_unrouted(seed);
        sol.open_route(pb, seed, workers);
    }

    let mut pool = initial_pool(pb, cfg, ph, sol);
    while !pool.is_empty() {
        let idx = pick_by_attractiveness(&pool, rng);
        let ins = pool[idx].clone();
        sol.remove_unrouted(ins.node);
        sol.route_mut(ins.route).insert_block(pb, ins.after, &[ins.node]);
        refresh_pool(&mut pool, pb, cfg, ph, sol, &ins);
    }

    let routed_all = sol.num_unrouted() == 0;
    // any residue is picked up sequentially; the caller records the miss
    solomon::sequential_aco(pb, cfg, ph, rng, sol, workers);
    routed_all
}

/// Every feasible position of every unrouted node on every route.
fn initial_pool(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    sol: &Solution,
) -> Vec<Insertion> {
    let mut pool = Vec::new();
    for &node in sol.unrouted() {
        for (idx, route) in sol.routes().iter().enumerate() {
            push_positions(&mut pool, pb, cfg, ph, sol, idx, route.len(), node);
        }
    }
    pool
}

/// Drops entries invalidated by `committed` and re-adds positions for the
/// remaining unrouted nodes on the updated route.
fn refresh_pool(
    pool: &mut Vec<Insertion>,
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    sol: &Solution,
    committed: &Insertion,
) {
    pool.retain(|c| c.route != committed.route && c.node != committed.node);
    let route_len = sol.route(committed.route).len();
    for &node in sol.unrouted() {
        push_positions(pool, pb, cfg, ph, sol, committed.route, route_len, node);
    }
}

fn push_positions(
    pool: &mut Vec<Insertion>,
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    sol: &Solution,
    route_idx: usize,
    route_len: usize,
    node: usize,
) {
    let mut from = 0;
    while from < route_len - 1 {
        let Some(ins) =
            first_insertion_trail(pb, cfg, ph, sol.route(route_idx), route_idx, node, from)
        else {
            break;
        };
        from = ins.after + 1;
        pool.push(ins);
    }
}
