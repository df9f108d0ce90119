//! Pheromone matrix with per-route virtual depots.
//!
//! A single depot id would make every route's first and last edge look
//! identical to the ants, so each route gets a virtual depot id
//! `num_nodes + route_index`. The matrix is therefore `(2n-1)×(2n-1)` for
//! `n` nodes: rows/columns `1..n-1` are customers, `n..2n-2` the virtual
//! depots, and row/column 0 stays unused so node ids index directly.
//! The packing is only valid while a solution uses fewer than `n` trucks,
//! which the solution enforces when opening routes.

use crate::models::Solution;

/// The ants' shared trail memory.
#[derive(Debug, Clone)]
pub struct PheromoneMatrix {
    data: Vec<f64>,
    side: usize,
    rho: f64,
    min_pheromone: f64,
    num_nodes: usize,
}

impl PheromoneMatrix {
    /// Creates a matrix with every cell at `initial`.
    pub fn new(num_nodes: usize, initial: f64, rho: f64, min_pheromone: f64) -> Self {
        let side = 2 * num_nodes - 1;
        Self {
            data: vec![initial; side * side],
            side,
            rho,
            min_pheromone,
            num_nodes,
        }
    }

    /// Trail between two nodes (or a virtual depot and a node).
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.side + to]
    }

    /// Side length of the matrix.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Trail multiplier for inserting `node` between `after` and `succ` on
    /// the route with the given virtual depot.
    ///
    /// Sentinel endpoints (node id 0) are looked up under the virtual
    /// depot id, never under 0.
    pub fn trail(&self, depot_id: usize, after: usize, succ: usize, node: usize) -> f64 {
        let after = if after == 0 { depot_id } else { after };
        let succ = if succ == 0 { depot_id } else { succ };
        (self.get(after, node) + self.get(node, succ)) / (2.0 * self.get(after, succ))
    }

    /// Seed weight of `node` for the route that would get `depot_id`.
    pub fn seed_trail(&self, depot_id: usize, node: usize) -> f64 {
        self.get(depot_id, node) + self.get(node, depot_id)
    }

    /// Evaporates every cell and deposits along the best solution's edges.
    ///
    /// Cells decay by the persistence factor rho but never drop below the
    /// configured minimum; each directed edge of the solution receives
    /// `1 - rho`, with route ends expressed through their virtual depots.
    pub fn update(&mut self, best: &Solution) {
        let deposit = 1.0 - self.rho;
        for i in 1..self.side {
            for j in 1..self.side {
                let cell = &mut self.data[i * self.side + j];
                *cell = (*cell * self.rho).max(self.min_pheromone);
            }
        }
        for (idx, route) in best.routes().iter().enumerate() {
            if route.is_empty() {
                continue;
            }
            let depot = self.num_nodes + idx;
            let customers = route.customers();
            let first = customers[0];
            let last = customers[customers.len() - 1];
            self.data[depot * self.side + first] += deposit;
            self.data[last * self.side + depot] += deposit;
            for pair in customers.windows(2) {
                self.data[pair[0] * self.side + pair[1]] += deposit;
            }
        }
    }
}
