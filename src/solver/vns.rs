//! Variable neighbourhood search driver.
//!
//! Construct, improve, then repeatedly shake a copy of the incumbent out
//! of its local optimum and re-improve it deterministically: a randomly
//! chosen route is dissolved node by node into the other routes (greedy
//! best insertion, nodes that fit nowhere stay put). Before the shake
//! every route gets its full crew back so the subsequent search has room
//! to rearrange.

use rand::Rng;

use crate::config::Config;
use crate::construct::insertion::{best_insertion, Insertion};
use crate::construct::solomon;
use crate::local_search::{do_ls, move_all, swap_all, SearchState};
use crate::models::{Problem, Solution};
use crate::solver::Solver;
use crate::tabu::TabuList;
use tracing::debug;

pub(crate) fn solve(s: &mut Solver, workers: usize) {
    let fleet_limit = s.pb.num_nodes();
    solomon::sequential(
        s.pb,
        s.cfg,
        &s.pheromone,
        &mut s.rng,
        &mut s.best,
        workers,
        fleet_limit,
    );
    do_ls(s.pb, s.cfg, &mut s.tabu, &mut s.best);
    let mut best_cost = s.best.calc_cost(s.pb, s.cfg);
    while s.proceed(s.num_solutions) {
        let mut sol = s.best.clone();
        shake(s.pb, s.cfg, &mut s.rng, &mut sol);
        improve(s.pb, s.cfg, &mut s.tabu, &mut sol);
        let cost = sol.calc_cost(s.pb, s.cfg);
        if cost < best_cost {
            best_cost = cost;
            sol.set_time(s.elapsed_secs());
            debug!(trucks = sol.trucks(), cost, "vns found a new best");
            s.best = sol;
        }
        s.num_solutions += 1;
    }
}

/// Kicks the solution out of its local optimum.
///
/// Restores every route to the full crew, then dissolves one random
/// route; routes where nothing moves are re-drawn.
fn shake<R: Rng>(pb: &Problem, cfg: &Config, rng: &mut R, sol: &mut Solution) {
    if sol.trucks() < 2 {
        return; // nowhere to distribute
    }
    for idx in 0..sol.trucks() {
        sol.route_mut(idx).set_workers(pb, cfg.max_workers);
    }
    loop {
        let route_idx = rng.random_range(0..sol.trucks());
        if distribute_nodes(pb, cfg, sol, route_idx) > 0 {
            break;
        }
    }
}

/// Moves as many nodes as possible off the given route.
///
/// Unlike the truck-emptying operator this keeps going past immovable
/// nodes and removes the route when it empties. Returns the number of
/// moved nodes.
fn distribute_nodes(pb: &Problem, cfg: &Config, sol: &mut Solution, route_idx: usize) -> usize {
    if sol.route(route_idx).is_empty() {
        return 0;
    }
    let nodes: Vec<usize> = sol.route(route_idx).customers().to_vec();
    let mut moved = 0;
    for node in nodes {
        let mut best: Option<Insertion> = None;
        for target in 0..sol.trucks() {
            if target == route_idx {
                continue;
            }
            if let Some(ins) = best_insertion(pb, cfg, sol.route(target), target, node) {
                if best.as_ref().is_none_or(|b| ins.cost < b.cost) {
                    best = Some(ins);
                }
            }
        }
        let Some(ins) = best else {
            continue; // this node stays; try the next one
        };
        let pos = sol.route(route_idx).position_of(node);
        sol.route_mut(route_idx).remove_block(pb, pos, 1);
        sol.route_mut(ins.route).insert_block(pb, ins.after, &[ins.node]);
        moved += 1;
        if sol.route(route_idx).is_empty() {
            sol.remove_route(pb, route_idx);
            return moved;
        }
    }
    moved
}

/// Deterministic local search: truck fixpoint, per-route worker
/// reduction, then the worker fixpoint.
fn improve(pb: &Problem, cfg: &Config, tabu: &mut TabuList, sol: &mut Solution) {
    loop {
        let mut improved = move_all(pb, cfg, tabu, sol, SearchState::ReduceTrucks);
        improved |= swap_all(pb, cfg, sol);
        if !improved {
            break;
        }
    }
    for idx in 0..sol.trucks() {
        sol.route_mut(idx).reduce_service_workers(pb);
    }
    loop {
        let mut improved = move_all(pb, cfg, tabu, sol, SearchState::ReduceWorkers);
        improved |= swap_all(pb, cfg, sol);
        if !improved {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Metaheuristic;
    use crate::instance::Instance;
    use crate::models::Node;
    use crate::solver::Solver;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> (Problem, Config) {
        let cfg = Config {
            adapt_service_times: false,
            metaheuristic: Metaheuristic::Vns,
            max_workers: 2,
            runtime: 0,
            max_iterations: 15,
            seed: 0,
            ..Config::default()
        };
        let instance = Instance::new(
            "vns",
            30.0,
            vec![
                Node::depot(0.0, 0.0, 1000.0),
                Node::new(1, 10.0, 0.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(2, 20.0, 0.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(3, 0.0, 10.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(4, 0.0, 20.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(5, 15.0, 15.0, 10.0, 0.0, 900.0, 5.0),
            ],
        );
        let pb = Problem::new(instance, &cfg);
        (pb, cfg)
    }

    #[test]
    fn test_vns_terminates_feasibly() {
        let (pb, cfg) = sample();
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
    }

    #[test]
    fn test_shake_restores_full_crews_before_distributing() {
        let (pb, cfg) = sample();
        let mut sol = Solution::new(&pb);
        for node in [1, 2, 3] {
            sol.remove_unrouted(node);
            let idx = sol.open_route(&pb, node, 2);
            sol.route_mut(idx).reduce_service_workers(&pb);
        }
        sol.remove_unrouted(4);
        sol.open_route(&pb, 4, 1);
        sol.remove_unrouted(5);
        sol.open_route(&pb, 5, 1);
        let mut rng = StdRng::seed_from_u64(0);
        shake(&pb, &cfg, &mut rng, &mut sol);
        // shaking moved something and everything is still served once
        assert!(sol.validate(&pb).is_ok());
        for route in sol.routes() {
            assert_eq!(route.workers(), cfg.max_workers);
        }
    }

    #[test]
    fn test_distribute_removes_emptied_route() {
        let (pb, cfg) = sample();
        let mut sol = Solution::new(&pb);
        for node in [1, 2, 3] {
            sol.remove_unrouted(node);
            sol.open_route(&pb, node, 2);
        }
        let moved = distribute_nodes(&pb, &cfg, &mut sol, 0);
        assert_eq!(moved, 1);
        assert_eq!(sol.trucks(), 2);
    }
}
