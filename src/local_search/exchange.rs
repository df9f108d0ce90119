//! Inter-route single-node swap.
//!
//! Exchanges one customer of each of two routes when both sides stay
//! within capacity and time windows and the total distance strictly
//! drops. The time window test reuses the cached propagation values of
//! the neighbouring nodes, so only four tentative arrivals are computed
//! per candidate pair.

use crate::config::Config;
use crate::models::{Problem, Solution};
use crate::MIN_DELTA;

/// Runs pairwise swaps to fixpoint; returns whether anything improved.
pub fn swap_all(pb: &Problem, cfg: &Config, sol: &mut Solution) -> bool {
    if cfg.max_swap < 1 {
        return false;
    }
    let mut success = false;
    loop {
        let mut improved = false;
        let trucks = sol.trucks();
        if trucks >= 2 {
            for i in (1..trucks).rev() {
                for j in (0..i).rev() {
                    improved |= swap_first_improving(pb, sol, i, j);
                }
            }
        }
        success |= improved;
        if !improved {
            break;
        }
    }
    success
}

/// Commits the first distance-saving swap between two routes.
fn swap_first_improving(pb: &Problem, sol: &mut Solution, r1_idx: usize, r2_idx: usize) -> bool {
    let capacity = pb.capacity();
    for p1 in 1..sol.route(r1_idx).len() - 1 {
        for p2 in 1..sol.route(r2_idx).len() - 1 {
            let r1 = sol.route(r1_idx);
            let r2 = sol.route(r2_idx);
            let n1 = r1.node_at(p1);
            let n2 = r2.node_at(p2);
            let (d1, d2) = (pb.demand(n1), pb.demand(n2));
            if capacity < r1.load() - d1 + d2 || capacity < r2.load() - d2 + d1 {
                continue;
            }
            // when do we get to n1 on r2, and to n2 on r1?
            let (w1, w2) = (r1.workers(), r2.workers());
            let arrival1 = pb
                .est(n1)
                .max(r2.aest(p2 - 1) + pb.travel(w2, r2.node_at(p2 - 1), n1));
            let arrival2 = pb
                .est(n2)
                .max(r1.aest(p1 - 1) + pb.travel(w1, r1.node_at(p1 - 1), n2));
            if arrival1 > pb.lst(n1) || arrival2 > pb.lst(n2) {
                continue;
            }
            let succ1 = r1.node_at(p1 + 1);
            let succ2 = r2.node_at(p2 + 1);
            let succ_arrival1 = pb.est(succ1).max(arrival2 + pb.travel(w1, n2, succ1));
            let succ_arrival2 = pb.est(succ2).max(arrival1 + pb.travel(w2, n1, succ2));
            if succ_arrival1 > r1.alst(p1 + 1) || succ_arrival2 > r2.alst(p2 + 1) {
                continue;
            }
            let pred1 = r1.node_at(p1 - 1);
            let pred2 = r2.node_at(p2 - 1);
            let savings = pb.dist(pred1, n1) + pb.dist(n1, succ1) + pb.dist(pred2, n2)
                + pb.dist(n2, succ2)
                - pb.dist(pred1, n2)
                - pb.dist(n2, succ1)
                - pb.dist(pred2, n1)
                - pb.dist(n1, succ2);
            if savings > MIN_DELTA {
                sol.route_mut(r1_idx).replace(pb, p1, n2);
                sol.route_mut(r2_idx).replace(pb, p2, n1);
                return true;
            }
        }
    }
    false
}
