//! Insertion candidates and their scoring.
//!
//! # Scoring
//!
//! For inserting node `n` between `p` and its successor `s`:
//!
//! ```text
//! cost_dist = d[p][n] + d[n][s] - mu * d[p][s]
//! cost_time = max(start(s), max(est(n), aest(p) + c[p][n]) + c[n][s]) - aest(s)
//! c1        = alpha * cost_dist + (1 - alpha) * cost_time
//! ```
//!
//! The minimised Solomon-style score is `c1 - lambda * d[0][n]`; the
//! maximised Reimann-style attractiveness is `lambda * d[0][n] - c1`,
//! clamped to a tiny positive value when it would not be positive. The
//! deterministic scorer seeds `start(s)` from the successor's `est` while
//! the stochastic scorers use its `aest`. See Solomon (1987), "Algorithms
//! for the Vehicle Routing and Scheduling Problems with Time Window
//! Constraints", Operations Research 35(2), and Reimann et al. on the
//! attractiveness variant.

use rand::Rng;

use crate::config::Config;
use crate::models::{Problem, Route};
use crate::pheromone::PheromoneMatrix;
use crate::MIN_DELTA;

/// Lower bound for costs used as divisors.
pub const MIN_COST: f64 = 1e-3;

/// A candidate insertion of one node into one route.
#[derive(Debug, Clone)]
pub struct Insertion {
    /// Index of the target route within the solution.
    pub route: usize,
    /// Node to insert.
    pub node: usize,
    /// Position of the predecessor on the target route.
    pub after: usize,
    /// Minimised scoring channel.
    pub cost: f64,
    /// Maximised scoring channel.
    pub attractiveness: f64,
}

fn c1(
    pb: &Problem,
    cfg: &Config,
    route: &Route,
    node: usize,
    after: usize,
    succ_from_est: bool,
) -> f64 {
    let pred = route.node_at(after);
    let succ = route.node_at(after + 1);
    let cost_dist = pb.dist(pred, node) + pb.dist(node, succ) - cfg.mu * pb.dist(pred, succ);
    let alpha2 = 1.0 - cfg.alpha;
    let mut cost_time = 0.0;
    if alpha2 != 0.0 {
        let w = route.workers();
        let est_node = pb.est(node).max(route.aest(after) + pb.travel(w, pred, node));
        let succ_start = if succ_from_est {
            pb.est(succ)
        } else {
            route.aest(after + 1)
        };
        let est_succ = succ_start.max(est_node + pb.travel(w, node, succ));
        cost_time = est_succ - route.aest(after + 1);
    }
    cfg.alpha * cost_dist + alpha2 * cost_time
}

/// Best deterministic Solomon insertion of `node` on `route`.
///
/// Minimises `c1 - lambda * d[0][n]` over all feasible positions; `None`
/// when the capacity or every time window forbids the node.
pub fn best_insertion(
    pb: &Problem,
    cfg: &Config,
    route: &Route,
    route_idx: usize,
    node: usize,
) -> Option<Insertion> {
    if pb.capacity() < route.load() + pb.demand(node) {
        return None;
    }
    let mut best: Option<Insertion> = None;
    for after in 0..route.len() - 1 {
        if !route.can_insert_one(pb, node, after) {
            continue;
        }
        let cost = c1(pb, cfg, route, node, after, true) - cfg.lambda * pb.dist(0, node);
        if best.as_ref().is_none_or(|b| cost < b.cost) {
            best = Some(Insertion {
                route: route_idx,
                node,
                after,
                cost,
                attractiveness: 0.0,
            });
        }
    }
    best
}

/// Best trail-scaled insertion of `node` on `route` (ACO roulette cost).
///
/// A strong trail always improves a candidate: non-negative costs are
/// divided by the trail, negative ones multiplied.
pub fn best_insertion_aco(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    route: &Route,
    route_idx: usize,
    node: usize,
) -> Option<Insertion> {
    if pb.capacity() < route.load() + pb.demand(node) {
        return None;
    }
    let mut best: Option<Insertion> = None;
    for after in 0..route.len() - 1 {
        if !route.can_insert_one(pb, node, after) {
            continue;
        }
        let raw = c1(pb, cfg, route, node, after, false) - cfg.lambda * pb.dist(0, node);
        let trail = ph.trail(
            route.depot_id(),
            route.node_at(after),
            route.node_at(after + 1),
            node,
        );
        let cost = if raw >= 0.0 { raw / trail } else { raw * trail };
        if best.as_ref().is_none_or(|b| cost < b.cost) {
            best = Some(Insertion {
                route: route_idx,
                node,
                after,
                cost,
                attractiveness: 0.0,
            });
        }
    }
    best
}

/// Most attractive trail-scaled insertion (Reimann-style).
pub fn best_insertion_mr(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    route: &Route,
    route_idx: usize,
    node: usize,
) -> Option<Insertion> {
    if pb.capacity() < route.load() + pb.demand(node) {
        return None;
    }
    let mut best: Option<Insertion> = None;
    for after in 0..route.len() - 1 {
        if !route.can_insert_one(pb, node, after) {
            continue;
        }
        let mut attract = cfg.lambda * pb.dist(0, node) - c1(pb, cfg, route, node, after, false);
        if attract < 0.0 {
            attract = MIN_DELTA;
        }
        attract *= ph.trail(
            route.depot_id(),
            route.node_at(after),
            route.node_at(after + 1),
            node,
        );
        if best.as_ref().is_none_or(|b| attract > b.attractiveness) {
            best = Some(Insertion {
                route: route_idx,
                node,
                after,
                cost: 0.0,
                attractiveness: attract,
            });
        }
    }
    best
}

/// Most attractive plain insertion, for the GRASP candidate list.
pub fn best_insertion_attractive(
    pb: &Problem,
    cfg: &Config,
    route: &Route,
    route_idx: usize,
    node: usize,
) -> Option<Insertion> {
    if pb.capacity() < route.load() + pb.demand(node) {
        return None;
    }
    let mut best: Option<Insertion> = None;
    for after in 0..route.len() - 1 {
        if !route.can_insert_one(pb, node, after) {
            continue;
        }
        let cost = c1(pb, cfg, route, node, after, false);
        let attract = (cfg.lambda * pb.dist(0, node) - cost).max(MIN_DELTA);
        if best.as_ref().is_none_or(|b| attract > b.attractiveness) {
            best = Some(Insertion {
                route: route_idx,
                node,
                after,
                cost,
                attractiveness: attract,
            });
        }
    }
    best
}

/// First feasible insertion of `node` at or behind position `from`.
///
/// Used by the parallel construction, which keeps every feasible position
/// in its pool. The depot-distance term plays no role here: the node will
/// be on *some* route anyway, so only the detour matters. The
/// attractiveness is `trail / max(c1, MIN_COST)`.
pub fn first_insertion_trail(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    route: &Route,
    route_idx: usize,
    node: usize,
    from: usize,
) -> Option<Insertion> {
    if pb.capacity() < route.load() + pb.demand(node) {
        return None;
    }
    let mut after = from;
    while after < route.len() - 1 {
        if route.can_insert_one(pb, node, after) {
            let cost = c1(pb, cfg, route, node, after, false);
            let trail = ph.trail(
                route.depot_id(),
                route.node_at(after),
                route.node_at(after + 1),
                node,
            );
            return Some(Insertion {
                route: route_idx,
                node,
                after,
                cost: -1.0,
                attractiveness: trail / cost.max(MIN_COST),
            });
        }
        after += 1;
    }
    None
}

/// Weighted roulette over candidate costs, normalised to `[1, inf)`.
///
/// Each candidate weighs `1 / (cost - (min_cost - 1))`.
///
/// # Panics
///
/// Panics when called with an empty candidate set; the callers guarantee
/// at least one candidate, so an empty set is a logic bug.
pub fn pick_by_inverse_cost<R: Rng>(
    candidates: &[Insertion],
    min_cost: f64,
    rng: &mut R,
) -> usize {
    assert!(!candidates.is_empty(), "roulette over an empty candidate set");
    let shift = min_cost - 1.0;
    let weights: Vec<f64> = candidates.iter().map(|c| 1.0 / (c.cost - shift)).collect();
    roulette(&weights, rng)
}

/// Weighted roulette over candidate attractiveness.
///
/// # Panics
///
/// Panics when called with an empty candidate set.
pub fn pick_by_attractiveness<R: Rng>(candidates: &[Insertion], rng: &mut R) -> usize {
    assert!(!candidates.is_empty(), "roulette over an empty candidate set");
    let weights: Vec<f64> = candidates.iter().map(|c| c.attractiveness).collect();
    roulette(&weights, rng)
}

fn roulette<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let mut remaining: f64 = weights.iter().sum();
    let threshold = rng.random::<f64>() * remaining;
    for (i, w) in weights.iter().enumerate() {
        remaining -= w;
        if threshold >= remaining {
            return i;
        }
    }
    // only reachable through accumulated rounding drift
    weights.len() - 1
}

/// A candidate list kept sorted descending by attractiveness.
///
/// With a bound this is the GRASP restricted candidate list: pushing into
/// a full list evicts the least attractive entry. A bound of 0 means
/// unbounded.
#[derive(Debug)]
pub struct CandidateList {
    items: Vec<Insertion>,
    max_size: usize,
}

impl CandidateList {
    /// Creates an empty list with the given bound (0 = unbounded).
    pub fn new(max_size: usize) -> Self {
        Self {
            items: Vec::new(),
            max_size,
        }
    }

    /// Number of stored candidates.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no candidate is stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The stored candidates, most attractive first.
    pub fn items(&self) -> &[Insertion] {
        &self.items
    }

    /// Inserts a candidate at its sorted position.
    ///
    /// Returns `false` if the list was full and the candidate was worse
    /// than everything stored.
    pub fn push(&mut self, ins: Insertion) -> bool {
        let full = self.max_size > 0 && self.items.len() == self.max_size;
        if full && self.items.last().is_some_and(|last| last.attractiveness >= ins.attractiveness)
        {
            return false;
        }
        let pos = self
            .items
            .iter()
            .position(|i| i.attractiveness < ins.attractiveness)
            .unwrap_or(self.items.len());
        self.items.insert(pos, ins);
        if full {
            self.items.pop();
        }
        true
    }

    /// Draws a candidate uniformly or by attractiveness-weighted roulette.
    pub fn pick<R: Rng>(&self, use_weights: bool, rng: &mut R) -> Option<&Insertion> {
        if self.items.is_empty() {
            return None;
        }
        let idx = if use_weights {
            pick_by_attractiveness(&self.items, rng)
        } else {
            rng.random_range(0..self.items.len())
        };
        Some(&self.items[idx])
    }

    /// Drops all candidates, keeping the bound.
    pub fn reset(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::models::{Node, Solution};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_problem() -> (Problem, Config) {
        let instance = Instance::new(
            "line",
            100.0,
            vec![
                Node::depot(0.0, 0.0, 1000.0),
                Node::new(1, 10.0, 0.0, 10.0, 0.0, 900.0, 6.0),
                Node::new(2, 20.0, 0.0, 10.0, 0.0, 900.0, 6.0),
                Node::new(3, 30.0, 0.0, 10.0, 0.0, 900.0, 6.0),
            ],
        );
        let cfg = Config {
            adapt_service_times: false,
            max_workers: 2,
            ..Config::default()
        };
        let pb = Problem::new(instance, &cfg);
        (pb, cfg)
    }

    fn seeded_route(pb: &Problem, seed: usize) -> Route {
        let mut sol = Solution::new(pb);
        sol.remove_unrouted(seed);
        sol.open_route(pb, seed, 2);
        sol.route(0).clone()
    }

    #[test]
    fn test_best_insertion_prefers_detour_free_position() {
        let (pb, cfg) = line_problem();
        let mut route = seeded_route(&pb, 1);
        route.insert_block(&pb, 1, &[3]);
        // inserting 2 between 1 and 3 adds no distance at all
        let ins = best_insertion(&pb, &cfg, &route, 0, 2).expect("feasible");
        assert_eq!(ins.after, 1);
        // alpha = 1, mu = 1: cost_dist = 10 + 10 - 20 = 0
        // score = 0 - lambda * d(0,2) = -2 * 20
        assert!((ins.cost - (-40.0)).abs() < 1e-10);
    }

    #[test]
    fn test_best_insertion_respects_capacity() {
        let (pb, cfg) = line_problem();
        let route = seeded_route(&pb, 1);
        let mut heavy = route.clone();
        for _ in 0..9 {
            heavy.insert_block(&pb, 1, &[2]);
        }
        assert!(best_insertion(&pb, &cfg, &heavy, 0, 3).is_none());
    }

    #[test]
    fn test_time_component_enters_below_alpha_one() {
        let (pb, mut cfg) = line_problem();
        cfg.alpha = 0.5;
        let route = seeded_route(&pb, 3);
        // appending 1 after 3 doubles back; the time term penalises the
        // push-forward of the closing depot
        let ins = best_insertion(&pb, &cfg, &route, 0, 1).expect("feasible");
        assert!(ins.cost.is_finite());
    }

    #[test]
    fn test_aco_trail_improves_cost() {
        let (pb, cfg) = line_problem();
        let route = seeded_route(&pb, 1);
        let uniform = PheromoneMatrix::new(pb.num_nodes(), 1.0, 0.985, 1e-13);
        let base = best_insertion_aco(&pb, &cfg, &uniform, &route, 0, 2).expect("feasible");
        let strong = PheromoneMatrix::new(pb.num_nodes(), 2.0, 0.985, 1e-13);
        let scaled = best_insertion_aco(&pb, &cfg, &strong, &route, 0, 2).expect("feasible");
        // both matrices are uniform, the trail multiplier is 1 in each
        assert!((base.cost - scaled.cost).abs() < 1e-10);
    }

    #[test]
    fn test_mr_attractiveness_clamped_positive() {
        let (pb, mut cfg) = line_problem();
        cfg.lambda = 0.0; // makes every raw attractiveness non-positive
        let ph = PheromoneMatrix::new(pb.num_nodes(), 1.0, 0.985, 1e-13);
        let route = seeded_route(&pb, 1);
        let ins = best_insertion_mr(&pb, &cfg, &ph, &route, 0, 2).expect("feasible");
        assert!(ins.attractiveness > 0.0);
    }

    #[test]
    fn test_first_insertion_walks_positions() {
        let (pb, cfg) = line_problem();
        let ph = PheromoneMatrix::new(pb.num_nodes(), 1.0, 0.985, 1e-13);
        let mut route = seeded_route(&pb, 1);
        route.insert_block(&pb, 1, &[2]);
        let first = first_insertion_trail(&pb, &cfg, &ph, &route, 0, 3, 0).expect("feasible");
        let next = first_insertion_trail(&pb, &cfg, &ph, &route, 0, 3, first.after + 1)
            .expect("feasible");
        assert!(next.after > first.after);
        assert!(first.attractiveness > 0.0);
    }

    #[test]
    fn test_inverse_cost_roulette_picks_valid_index() {
        let (pb, cfg) = line_problem();
        let route = seeded_route(&pb, 1);
        let mut rng = StdRng::seed_from_u64(0);
        let candidates: Vec<Insertion> = [2, 3]
            .iter()
            .filter_map(|&n| best_insertion(&pb, &cfg, &route, 0, n))
            .collect();
        let min_cost = candidates.iter().map(|c| c.cost).fold(f64::INFINITY, f64::min);
        for _ in 0..50 {
            let idx = pick_by_inverse_cost(&candidates, min_cost, &mut rng);
            assert!(idx < candidates.len());
        }
    }

    #[test]
    fn test_attractiveness_roulette_favours_heavy_candidate() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut candidates = Vec::new();
        for (i, attract) in [(0, 1e-9), (1, 1.0)] {
            candidates.push(Insertion {
                route: 0,
                node: i,
                after: 0,
                cost: 0.0,
                attractiveness: attract,
            });
        }
        let mut heavy = 0;
        for _ in 0..100 {
            if pick_by_attractiveness(&candidates, &mut rng) == 1 {
                heavy += 1;
            }
        }
        assert!(heavy > 90);
    }

    #[test]
    fn test_candidate_list_bounded_sorted() {
        let mut rcl = CandidateList::new(2);
        for (node, attract) in [(1, 0.5), (2, 1.5), (3, 1.0), (4, 0.1)] {
            rcl.push(Insertion {
                route: 0,
                node,
                after: 0,
                cost: 0.0,
                attractiveness: attract,
            });
        }
        assert_eq!(rcl.len(), 2);
        assert_eq!(rcl.items()[0].node, 2);
        assert_eq!(rcl.items()[1].node, 3);
    }

    #[test]
    fn test_candidate_list_rejects_worse_when_full() {
        let mut rcl = CandidateList::new(1);
        assert!(rcl.push(Insertion {
            route: 0,
            node: 1,
            after: 0,
            cost: 0.0,
            attractiveness: 1.0,
        }));
        assert!(!rcl.push(Insertion {
            route: 0,
            node: 2,
            after: 0,
            cost: 0.0,
            attractiveness: 0.5,
        }));
        assert_eq!(rcl.items()[0].node, 1);
    }

    #[test]
    fn test_candidate_list_unbounded() {
        let mut rcl = CandidateList::new(0);
        for node in 0..100 {
            rcl.push(Insertion {
                route: 0,
                node,
                after: 0,
                cost: 0.0,
                attractiveness: node as f64,
            });
        }
        assert_eq!(rcl.len(), 100);
        assert_eq!(rcl.items()[0].node, 99);
    }

    #[test]
    fn test_candidate_list_pick_uniform_and_weighted() {
        let mut rcl = CandidateList::new(3);
        for node in [1, 2, 3] {
            rcl.push(Insertion {
                route: 0,
                node,
                after: 0,
                cost: 0.0,
                attractiveness: node as f64,
            });
        }
        let mut rng = StdRng::seed_from_u64(3);
        assert!(rcl.pick(false, &mut rng).is_some());
        assert!(rcl.pick(true, &mut rng).is_some());
        rcl.reset();
        assert!(rcl.pick(true, &mut rng).is_none());
    }
}
