//! Local search over complete solutions.
//!
//! The search runs in phases following the hierarchical objective:
//! trucks, then workers, then distance. Each phase is a fixpoint over its
//! operators:
//!
//! - [`relocate`] — inter-route block relocation with hierarchical
//!   dominance
//! - [`exchange`] — inter-route single-node swap
//! - truck-emptying — a brute-force attempt to dissolve whole routes
//!
//! The worker phase starts by stripping every route down to its minimum
//! feasible crew, then lets the relocate operator hunt for moves that
//! unlock further reductions.

pub mod exchange;
pub mod relocate;

pub use exchange::swap_all;
pub use relocate::{move_all, move_all_best, perform_move, update_move, Move};

use crate::config::Config;
use crate::construct::insertion::{best_insertion, Insertion};
use crate::models::{Problem, Solution};
use crate::tabu::TabuList;

/// Which objective component the search currently attacks.
///
/// The ordering matters: operators probe worker reductions from
/// [`SearchState::ReduceWorkers`] onwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchState {
    /// Free trucks; distance only breaks ties.
    ReduceTrucks,
    /// Free service workers at the committed truck count.
    ReduceWorkers,
    /// Pure distance polishing.
    ReduceDistance,
}

/// Full local search pass.
///
/// With local search enabled: (a) fixpoint of truck-emptying, relocation
/// and swaps; (b) if more than one worker is allowed, per-route worker
/// reduction followed by the worker-phase fixpoint. With local search
/// disabled only the per-route worker reduction runs.
pub fn do_ls(pb: &Problem, cfg: &Config, tabu: &mut TabuList, sol: &mut Solution) {
    if cfg.do_ls {
        reduce_trucks(pb, cfg, tabu, sol);
        if cfg.max_workers > 1 {
            reduce_workers(pb, cfg, tabu, sol);
        }
    } else {
        for idx in 0..sol.trucks() {
            sol.route_mut(idx).reduce_service_workers(pb);
        }
    }
}

/// Truck phase: brute-force emptying, relocation and swaps to fixpoint.
///
/// Emptying first performs slightly better than emptying last, at the
/// occasional cost of extra workers and distance.
pub fn reduce_trucks(pb: &Problem, cfg: &Config, tabu: &mut TabuList, sol: &mut Solution) {
    loop {
        let mut improved = brute_reduce_trucks(pb, cfg, sol);
        improved |= move_all(pb, cfg, tabu, sol, SearchState::ReduceTrucks);
        improved |= swap_all(pb, cfg, sol);
        if !improved {
            break;
        }
    }
}

/// Worker phase: strip superfluous workers, then relocate and swap to
/// fixpoint.
pub fn reduce_workers(pb: &Problem, cfg: &Config, tabu: &mut TabuList, sol: &mut Solution) {
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

/// Attempts to dissolve whole routes by greedily relocating their nodes.
///
/// Works on a clone because partial emptying worsens the solution; the
/// clone is committed only when some route empties completely, and the
/// hunt restarts until no route can be dissolved. Returns whether the
/// solution was improved.
pub fn brute_reduce_trucks(pb: &Problem, cfg: &Config, sol: &mut Solution) -> bool {
    let mut clone = sol.clone();
    let mut improved = false;
    loop {
        let mut reduced = false;
        for idx in 0..clone.trucks() {
            if empty_route(pb, cfg, &mut clone, idx) {
                clone.remove_route(pb, idx);
                *sol = clone.clone();
                improved = true;
                reduced = true;
                break;
            }
        }
        if !reduced {
            break;
        }
    }
    improved
}

/// Greedily moves every node of a route to its cheapest feasible
/// insertion on some other route.
///
/// Stops at the first immovable node. Returns whether the route was
/// emptied.
fn empty_route(pb: &Problem, cfg: &Config, sol: &mut Solution, route_idx: usize) -> bool {
    if sol.route(route_idx).is_empty() {
        return true;
    }
    let nodes: Vec<usize> = sol.route(route_idx).customers().to_vec();
    for node in nodes {
        let mut best: Option<Insertion> = None;
        for target in 0..sol.trucks() {
            if target == route_idx {
                continue; // don't move nodes from a route to itself
            }
            if let Some(ins) = best_insertion(pb, cfg, sol.route(target), target, node) {
                if best.as_ref().is_none_or(|b| ins.cost < b.cost) {
                    best = Some(ins);
                }
            }
        }
        let Some(ins) = best else {
            break;
        };
        let pos = sol.route(route_idx).position_of(node);
        sol.route_mut(route_idx).remove_block(pb, pos, 1);
        sol.route_mut(ins.route).insert_block(pb, ins.after, &[ins.node]);
        if sol.route(route_idx).is_empty() {
            return true;
        }
    }
    sol.route(route_idx).is_empty()
}
