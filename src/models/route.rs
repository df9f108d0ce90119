//! Route: a sentinel-delimited node sequence with time propagation.
//!
//! # Representation
//!
//! A route stores its node ids as a flat sequence whose first and last
//! positions are depot sentinels (node id 0). Earliest and latest service
//! starts are kept in positional vectors aligned with the sequence:
//! `aest[p]` propagates left to right from the opening sentinel, `alst[p]`
//! right to left from the closing one, both using the travel matrix of the
//! route's current worker count. This replaces the classic doubly-linked
//! list with splices on a `Vec`, which keeps the `prev`/`next` reasoning of
//! the propagation rules while avoiding shared sentinel identity.
//!
//! # Invariants
//!
//! For every position `p` holding node `n`: `aest[p] <= lst(n)`,
//! `alst[p] >= est(n)` and `aest[p] <= alst[p]` on a feasible route;
//! `load` never exceeds the vehicle capacity (checked by the callers that
//! grow the route).

use crate::models::Problem;

/// Length of a route that only contains its two depot sentinels.
pub const EMPTY_LEN: usize = 2;

/// A single truck's route.
///
/// `id` is dense within the owning solution (`0..trucks-1`); `depot_id` is
/// `num_nodes + id` and is used exclusively to index virtual depots in the
/// pheromone matrix.
#[derive(Debug, Clone)]
pub struct Route {
    id: usize,
    depot_id: usize,
    nodes: Vec<usize>,
    aest: Vec<f64>,
    alst: Vec<f64>,
    load: f64,
    workers: usize,
}

impl Route {
    /// Opens a new route seeded with a single customer.
    pub fn new(pb: &Problem, id: usize, seed: usize, workers: usize) -> Self {
        let mut route = Self {
            id,
            depot_id: pb.num_nodes() + id,
            nodes: vec![0, seed, 0],
            aest: Vec::new(),
            alst: Vec::new(),
            load: pb.demand(seed),
            workers,
        };
        route.refresh(pb);
        route
    }

    /// Route id within the owning solution.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Virtual depot id (`num_nodes + id`) for pheromone indexing.
    pub fn depot_id(&self) -> usize {
        self.depot_id
    }

    /// Renumbers the route after a removal shifted it down.
    pub(crate) fn set_id(&mut self, id: usize, num_nodes: usize) {
        self.id = id;
        self.depot_id = num_nodes + id;
    }

    /// Number of positions including both depot sentinels.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if only the two depot sentinels remain.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == EMPTY_LEN
    }

    /// Number of customers on the route.
    pub fn customer_count(&self) -> usize {
        self.nodes.len() - EMPTY_LEN
    }

    /// The full node sequence including sentinels.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// The customer ids between the sentinels.
    pub fn customers(&self) -> &[usize] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Node id at the given position.
    pub fn node_at(&self, pos: usize) -> usize {
        self.nodes[pos]
    }

    /// Position of the given customer.
    ///
    /// # Panics
    ///
    /// Panics if the node is not on this route.
    pub fn position_of(&self, node: usize) -> usize {
        self.nodes
            .iter()
            .position(|&n| n == node)
            .expect("node is not on this route")
    }

    /// Actual earliest service start at the given position.
    pub fn aest(&self, pos: usize) -> f64 {
        self.aest[pos]
    }

    /// Actual latest service start at the given position.
    pub fn alst(&self, pos: usize) -> f64 {
        self.alst[pos]
    }

    /// Current load.
    pub fn load(&self) -> f64 {
        self.load
    }

    /// Number of service workers assigned to this route.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Recomputes both propagation vectors for the current worker count.
    pub fn refresh(&mut self, pb: &Problem) {
        let len = self.nodes.len();
        self.aest.resize(len, 0.0);
        self.alst.resize(len, 0.0);
        self.aest[0] = pb.est(self.nodes[0]);
        for pos in 1..len {
            let (prev, node) = (self.nodes[pos - 1], self.nodes[pos]);
            let arrival = self.aest[pos - 1] + pb.travel(self.workers, prev, node);
            self.aest[pos] = pb.est(node).max(arrival);
        }
        self.alst[len - 1] = pb.lst(self.nodes[len - 1]);
        for pos in (0..len - 1).rev() {
            let (node, next) = (self.nodes[pos], self.nodes[pos + 1]);
            let departure = self.alst[pos + 1] - pb.travel(self.workers, node, next);
            self.alst[pos] = pb.lst(node).min(departure);
        }
    }

    /// Returns `true` if `node` fits between position `after` and its
    /// successor without breaking any time window.
    ///
    /// The load is not checked here; callers do that once per route.
    pub fn can_insert_one(&self, pb: &Problem, node: usize, after: usize) -> bool {
        let pred = self.nodes[after];
        let succ = self.nodes[after + 1];
        let earliest = self.aest[after] + pb.travel(self.workers, pred, node);
        let latest = self.alst[after + 1] - pb.travel(self.workers, node, succ);
        earliest <= pb.lst(node) && latest >= pb.est(node) && earliest <= latest
    }

    /// Returns `true` if the whole block fits after position `after`.
    ///
    /// Propagates tentative earliest starts through the block and finally
    /// requires that the successor can still start no later than its
    /// current latest start.
    pub fn block_insertion_feasible(&self, pb: &Problem, block: &[usize], after: usize) -> bool {
        let mut prev = self.nodes[after];
        let mut tentative = self.aest[after];
        for &node in block {
            tentative = pb.est(node).max(tentative + pb.travel(self.workers, prev, node));
            if tentative > pb.lst(node) {
                return false;
            }
            prev = node;
        }
        let succ = self.nodes[after + 1];
        tentative + pb.travel(self.workers, prev, succ) <= self.alst[after + 1]
    }

    /// Returns `true` if the route stays within all time windows when
    /// served by `workers` workers.
    ///
    /// The closing sentinel is included, so the return trip must still meet
    /// the depot's own window.
    pub fn feasible_with(&self, pb: &Problem, workers: usize) -> bool {
        if workers == self.workers {
            return true;
        }
        let mut tentative = pb.est(self.nodes[0]);
        for pos in 1..self.nodes.len() {
            let (prev, node) = (self.nodes[pos - 1], self.nodes[pos]);
            tentative = pb.est(node).max(tentative + pb.travel(workers, prev, node));
            if tentative > pb.lst(node) {
                return false;
            }
        }
        true
    }

    /// Returns `true` if the route without the block `start..start+len`
    /// stays feasible when served by `workers` workers.
    pub fn feasible_without_block(
        &self,
        pb: &Problem,
        start: usize,
        len: usize,
        workers: usize,
    ) -> bool {
        let mut tentative = pb.est(self.nodes[0]);
        let mut prev = self.nodes[0];
        for pos in 1..self.nodes.len() {
            if pos >= start && pos < start + len {
                continue;
            }
            let node = self.nodes[pos];
            tentative = pb.est(node).max(tentative + pb.travel(workers, prev, node));
            if tentative > pb.lst(node) {
                return false;
            }
            prev = node;
        }
        true
    }

    /// Removes service workers while the route stays feasible.
    ///
    /// Walks downward from the current crew size and commits the last
    /// feasible count; afterwards the route is infeasible with one worker
    /// fewer. Returns whether anything was removed.
    pub fn reduce_service_workers(&mut self, pb: &Problem) -> bool {
        let mut reduced = false;
        while self.workers > 1 && self.feasible_with(pb, self.workers - 1) {
            self.workers -= 1;
            reduced = true;
        }
        if reduced {
            self.refresh(pb);
        }
        reduced
    }

    /// Sets the crew size and recomputes the propagation vectors.
    pub fn set_workers(&mut self, pb: &Problem, workers: usize) {
        self.workers = workers;
        self.refresh(pb);
    }

    /// Splices a block of customers in after position `after`.
    ///
    /// Feasibility is not checked here.
    pub fn insert_block(&mut self, pb: &Problem, after: usize, block: &[usize]) {
        for &node in block {
            self.load += pb.demand(node);
        }
        self.nodes.splice(after + 1..after + 1, block.iter().copied());
        self.refresh(pb);
    }

    /// Splices the block `start..start+len` out and returns its node ids.
    pub fn remove_block(&mut self, pb: &Problem, start: usize, len: usize) -> Vec<usize> {
        let block: Vec<usize> = self
            .nodes
            .splice(start..start + len, std::iter::empty())
            .collect();
        for &node in &block {
            self.load -= pb.demand(node);
        }
        self.refresh(pb);
        block
    }

    /// Replaces the customer at `pos` (used by the swap operator).
    pub fn replace(&mut self, pb: &Problem, pos: usize, node: usize) {
        let old = self.nodes[pos];
        self.load += pb.demand(node) - pb.demand(old);
        self.nodes[pos] = node;
        self.refresh(pb);
    }

    /// Total travelled distance of this route.
    pub fn distance(&self, pb: &Problem) -> f64 {
        self.nodes
            .windows(2)
            .map(|w| pb.dist(w[0], w[1]))
            .sum()
    }

    /// Re-checks feasibility from scratch, ignoring the cached propagation.
    ///
    /// Meant for the final invariant check over a finished solution.
    pub fn is_feasible(&self, pb: &Problem) -> bool {
        let mut load = 0.0;
        let mut start = pb.est(self.nodes[0]);
        for pos in 1..self.nodes.len() {
            let (prev, node) = (self.nodes[pos - 1], self.nodes[pos]);
            load += pb.demand(node);
            start = pb.est(node).max(start + pb.travel(self.workers, prev, node));
            if start > pb.lst(node) {
                return false;
            }
        }
        load <= pb.capacity()
    }

    /// Human representation: node ids, crew size, load and length.
    pub fn describe(&self, pb: &Problem) -> String {
        let ids: Vec<String> = self.nodes.iter().map(|n| format!("{n:3}")).collect();
        format!(
            "[{}]: workers={}, load={:6.2}, length={:.2}",
            ids.join(", "),
            self.workers,
            self.load,
            self.distance(pb)
        )
    }
}
