//! Inter-route block relocation.
//!
//! # Algorithm
//!
//! Moves a block of up to `max_move` consecutive customers from a source
//! route to a position on a target route. Candidates are compared by the
//! hierarchical objective: a move that frees a truck beats any that only
//! frees workers, which beats any that only saves distance. Dominance is
//! evaluated *before* the (more expensive) feasibility and tabu checks;
//! measured over the R1 Solomon set this ordering wins on average.
//!
//! Emptying the source route frees its truck and all of its workers;
//! otherwise, while the search is in its worker-reduction phase, a probe
//! bridges the block out of the source and counts how many workers the
//! shortened route can drop.

use crate::config::Config;
use crate::local_search::SearchState;
use crate::models::{Problem, Route, Solution, EMPTY_LEN};
use crate::tabu::TabuList;
use crate::MIN_DELTA;

/// A candidate inter-route relocation.
#[derive(Debug, Clone)]
pub struct Move {
    /// Source route index.
    pub source: usize,
    /// Target route index.
    pub target: usize,
    /// Source route id when the candidate was scanned.
    pub source_id: usize,
    /// Target route id when the candidate was scanned.
    pub target_id: usize,
    /// First block position on the source route.
    pub start: usize,
    /// Block length.
    pub len: usize,
    /// Predecessor position on the target route.
    pub after: usize,
    /// Node ids of the block (for the tabu bookkeeping).
    pub block: Vec<usize>,
    /// Whether the move empties (and frees) the source route.
    pub delta_trucks: bool,
    /// Workers freed by the move.
    pub delta_workers: usize,
    /// Distance saved by the move (positive is better).
    pub delta_dist: f64,
}

/// Returns `true` if the candidate deltas beat the incumbent move.
///
/// The truck branch intentionally carries no `MIN_DELTA` guard; only the
/// distance branch needs the epsilon.
fn delta_is_higher(
    best: Option<&Move>,
    improving: bool,
    d_trucks: bool,
    d_workers: usize,
    d_dist: f64,
) -> bool {
    let (b_trucks, b_workers, b_dist) = match best {
        Some(m) => (m.delta_trucks, m.delta_workers, m.delta_dist),
        None if improving => (false, 0, 0.0),
        None => (false, 0, f64::MIN),
    };
    if d_trucks && !b_trucks {
        true
    } else if d_trucks == b_trucks {
        if d_workers > b_workers {
            true
        } else {
            d_workers == b_workers && d_dist - MIN_DELTA > b_dist
        }
    } else {
        false
    }
}

/// Distance saved by moving the block (positive saves distance).
fn delta_dist_move(
    pb: &Problem,
    source: &Route,
    start: usize,
    len: usize,
    target: &Route,
    after: usize,
) -> f64 {
    let first = source.node_at(start);
    let last = source.node_at(start + len - 1);
    let s_prev = source.node_at(start - 1);
    let s_next = source.node_at(start + len);
    let t_pred = target.node_at(after);
    let t_succ = target.node_at(after + 1);
    pb.dist(s_prev, first) + pb.dist(last, s_next) - pb.dist(s_prev, s_next)
        + pb.dist(t_pred, t_succ)
        - pb.dist(t_pred, first)
        - pb.dist(last, t_succ)
}

/// Largest worker reduction the source route supports once the block is
/// bridged out.
///
/// Only reductions of at least `min_reduction` are probed (the incumbent
/// move already frees that many); at least one worker must stay.
fn block_worker_reduction(
    pb: &Problem,
    source: &Route,
    start: usize,
    len: usize,
    min_reduction: usize,
) -> usize {
    let max_reduction = source.workers() - 1;
    let mut probe = min_reduction.max(1);
    let mut reduction = 0;
    while probe <= max_reduction
        && source.feasible_without_block(pb, start, len, source.workers() - probe)
    {
        reduction = probe;
        probe += 1;
    }
    reduction
}

/// Scans all blocks of length `len` from `source` against all positions
/// on `target`, updating `best` with every dominant, feasible, non-tabu
/// candidate.
///
/// In first-improving mode the scan stops at the first such candidate.
/// Returns whether `best` was updated.
#[allow(clippy::too_many_arguments)]
pub fn update_move(
    pb: &Problem,
    cfg: &Config,
    tabu: &TabuList,
    sol: &Solution,
    best: &mut Option<Move>,
    improving: bool,
    first_improving: bool,
    source_idx: usize,
    target_idx: usize,
    state: SearchState,
    len: usize,
) -> bool {
    if cfg.max_move < len {
        return false;
    }
    let source = sol.route(source_idx);
    let target = sol.route(target_idx);
    if source.len() < EMPTY_LEN + len {
        return false;
    }
    let d_trucks = source.len() == EMPTY_LEN + len;
    let mut d_workers = if d_trucks { source.workers() } else { 0 };
    if best.as_ref().is_some_and(|m| m.delta_trucks) && !d_trucks {
        return false; // the incumbent already frees a truck
    }
    let mut updated = false;
    for start in 1..source.len() - len {
        let block_demand: f64 = (start..start + len)
            .map(|pos| pb.demand(source.node_at(pos)))
            .sum();
        if pb.capacity() < target.load() + block_demand {
            continue;
        }
        if state >= SearchState::ReduceWorkers && !d_trucks {
            let floor = best.as_ref().map_or(0, |m| m.delta_workers);
            d_workers = block_worker_reduction(pb, source, start, len, floor);
        }
        for after in 0..target.len() - 1 {
            let d_dist = delta_dist_move(pb, source, start, len, target, after);
            if !delta_is_higher(best.as_ref(), improving, d_trucks, d_workers, d_dist) {
                continue;
            }
            let block = source.nodes()[start..start + len].to_vec();
            if !target.block_insertion_feasible(pb, &block, after) {
                continue;
            }
            let candidate = Move {
                source: source_idx,
                target: target_idx,
                source_id: source.id(),
                target_id: target.id(),
                start,
                len,
                after,
                block,
                delta_trucks: d_trucks,
                delta_workers: d_workers,
                delta_dist: d_dist,
            };
            if tabu.is_move_tabu(&candidate) {
                continue;
            }
            *best = Some(candidate);
            if first_improving {
                return true;
            }
            updated = true;
        }
    }
    updated
}

/// Applies a scanned move to the solution.
///
/// Records the move in the tabu list first, then unlinks the block,
/// removes an emptied source route (renumbering the rest), commits any
/// probed worker reduction and finally splices the block into the target.
pub fn perform_move(pb: &Problem, tabu: &mut TabuList, sol: &mut Solution, m: Move) {
    tabu.record_move(&m);
    sol.route_mut(m.source).remove_block(pb, m.start, m.len);
    let mut target = m.target;
    if m.delta_trucks {
        sol.remove_route(pb, m.source);
        if m.source < target {
            target -= 1;
        }
    } else if m.delta_workers > 0 {
        let workers = sol.route(m.source).workers() - m.delta_workers;
        sol.route_mut(m.source).set_workers(pb, workers);
    }
    sol.route_mut(target).insert_block(pb, m.after, &m.block);
}

/// Runs the move operator to fixpoint in first-improving mode.
///
/// Block lengths run from `max_move` down to 1, each to its own fixpoint
/// over ordered route pairs. Dispatches to [`move_all_best`] when
/// best-move commits are configured. Returns whether anything moved.
pub fn move_all(
    pb: &Problem,
    cfg: &Config,
    tabu: &mut TabuList,
    sol: &mut Solution,
    state: SearchState,
) -> bool {
    if cfg.best_moves {
        return move_all_best(pb, cfg, tabu, sol, state);
    }
    let mut success = false;
    let mut len = cfg.max_move;
    while len >= 1 {
        loop {
            let mut updated = false;
            let trucks = sol.trucks();
            let mut i = trucks.saturating_sub(1);
            while i >= 1 {
                let mut j = i;
                while j > 0 {
                    j -= 1;
                    let mut removed_source = false;
                    for (src, tgt) in [(j, i), (i, j)] {
                        let mut best = None;
                        updated |= update_move(
                            pb, cfg, tabu, sol, &mut best, true, true, src, tgt, state, len,
                        );
                        if let Some(m) = best.take() {
                            removed_source = m.delta_trucks;
                            perform_move(pb, tabu, sol, m);
                            if removed_source {
                                break; // the source route is gone
                            }
                        }
                    }
                    if removed_source {
                        break;
                    }
                }
                if i == 1 {
                    break;
                }
                i -= 1;
            }
            success |= updated;
            if !updated {
                break;
            }
        }
        len -= 1;
    }
    success
}

/// Runs the move operator to fixpoint in best-move mode.
///
/// Each pass scans every ordered route pair with block lengths 2 and 1,
/// then commits the single dominant move.
pub fn move_all_best(
    pb: &Problem,
    cfg: &Config,
    tabu: &mut TabuList,
    sol: &mut Solution,
    state: SearchState,
) -> bool {
    let mut success = false;
    loop {
        let mut updated = false;
        let mut best: Option<Move> = None;
        let trucks = sol.trucks();
        if trucks >= 2 {
            for i in (1..trucks).rev() {
                for j in (0..i).rev() {
                    for (src, tgt, len) in [(j, i, 2), (i, j, 2), (j, i, 1), (i, j, 1)] {
                        updated |= update_move(
                            pb, cfg, tabu, sol, &mut best, true, false, src, tgt, state, len,
                        );
                    }
                }
            }
        }
        if let Some(m) = best.take() {
            perform_move(pb, tabu, sol, m);
        }
        success |= updated;
        if !updated {
            break;
        }
    }
    success
}
