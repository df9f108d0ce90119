//! Solution: owned routes plus the unrouted list.

use crate::config::Config;
use crate::models::{Problem, Route};

/// A (partial) solution to a VRPTWMS instance.
///
/// Starts unsolved with every customer on the unrouted list; a feasible
/// solution has routed all of them. The scalar caches (`workers_cache`,
/// `dist_cache`, `cost_cache`) are only refreshed by [`Solution::calc_cost`]
/// and may be stale after structural changes.
///
/// # Examples
///
/// ```
/// use vrptwms::config::Config;
/// use vrptwms::instance::Instance;
/// use vrptwms::models::{Node, Problem, Solution};
///
/// let instance = Instance::new(
///     "tiny",
///     100.0,
///     vec![
///         Node::depot(0.0, 0.0, 1000.0),
///         Node::new(1, 3.0, 4.0, 10.0, 0.0, 100.0, 5.0),
///     ],
/// );
/// let cfg = Config::default();
/// let pb = Problem::new(instance, &cfg);
/// let mut sol = Solution::new(&pb);
/// assert_eq!(sol.num_unrouted(), 1);
/// sol.remove_unrouted(1);
/// sol.open_route(&pb, 1, 2);
/// assert_eq!(sol.trucks(), 1);
/// assert_eq!(sol.num_unrouted(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Solution {
    routes: Vec<Route>,
    unrouted: Vec<usize>,
    workers_cache: usize,
    dist_cache: f64,
    cost_cache: f64,
    time: u64,
}

impl Solution {
    /// Creates an unsolved solution with every customer unrouted.
    pub fn new(pb: &Problem) -> Self {
        Self {
            routes: Vec::new(),
            unrouted: (1..pb.num_nodes()).collect(),
            workers_cache: 0,
            dist_cache: 0.0,
            cost_cache: 0.0,
            time: 0,
        }
    }

    /// Number of trucks (routes) in use.
    pub fn trucks(&self) -> usize {
        self.routes.len()
    }

    /// The solution's routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The route at the given index.
    pub fn route(&self, idx: usize) -> &Route {
        &self.routes[idx]
    }

    /// Mutable access to the route at the given index.
    pub fn route_mut(&mut self, idx: usize) -> &mut Route {
        &mut self.routes[idx]
    }

    /// Ids of the customers not yet assigned to any route.
    pub fn unrouted(&self) -> &[usize] {
        &self.unrouted
    }

    /// Number of unrouted customers.
    pub fn num_unrouted(&self) -> usize {
        self.unrouted.len()
    }

    /// Opens a new route seeded with `seed` and returns its index.
    ///
    /// The seed must already have been taken off the unrouted list.
    ///
    /// # Panics
    ///
    /// Panics if the route count would break the pheromone packing
    /// invariant (`trucks < num_nodes - 1` virtual depots are available).
    pub fn open_route(&mut self, pb: &Problem, seed: usize, workers: usize) -> usize {
        let id = self.routes.len();
        assert!(
            id < pb.num_nodes() - 1,
            "more routes than virtual depot slots"
        );
        self.routes.push(Route::new(pb, id, seed, workers));
        id
    }

    /// Removes an emptied route and renumbers the routes behind it.
    ///
    /// # Panics
    ///
    /// Panics if the route still carries customers.
    pub fn remove_route(&mut self, pb: &Problem, idx: usize) {
        assert!(
            self.routes[idx].is_empty(),
            "tried to remove a non-empty route"
        );
        self.routes.remove(idx);
        for i in idx..self.routes.len() {
            self.routes[i].set_id(i, pb.num_nodes());
        }
    }

    /// Takes a customer off the unrouted list.
    ///
    /// # Panics
    ///
    /// Panics if the node is not unrouted; that indicates a bookkeeping
    /// bug in a construction heuristic.
    pub fn remove_unrouted(&mut self, node: usize) {
        let pos = self
            .unrouted
            .iter()
            .position(|&n| n == node)
            .expect("node is not on the unrouted list");
        self.unrouted.remove(pos);
    }

    /// Returns the solution to its freshly-initialized state.
    ///
    /// Each route's customers are prepended to the unrouted list in route
    /// order; all routes and caches are dropped.
    pub fn reset(&mut self, _pb: &Problem) {
        for route in std::mem::take(&mut self.routes) {
            if route.is_empty() {
                continue;
            }
            let mut head: Vec<usize> = route.customers().to_vec();
            head.append(&mut self.unrouted);
            self.unrouted = head;
        }
        self.workers_cache = 0;
        self.dist_cache = 0.0;
        self.cost_cache = 0.0;
        self.time = 0;
    }

    /// Total travelled distance over all routes.
    pub fn calc_dist(&self, pb: &Problem) -> f64 {
        self.routes.iter().map(|r| r.distance(pb)).sum()
    }

    /// Total number of service workers over all routes.
    pub fn calc_workers(&self) -> usize {
        self.routes.iter().map(|r| r.workers()).sum()
    }

    /// Recomputes the objective value and refreshes all caches.
    pub fn calc_cost(&mut self, pb: &Problem, cfg: &Config) -> f64 {
        self.workers_cache = self.calc_workers();
        self.dist_cache = self.calc_dist(pb);
        self.cost_cache = cfg.objective(self.trucks(), self.workers_cache, self.dist_cache);
        self.cost_cache
    }

    /// Cached total worker count (see [`Solution::calc_cost`]).
    pub fn workers_cache(&self) -> usize {
        self.workers_cache
    }

    /// Cached total distance (see [`Solution::calc_cost`]).
    pub fn dist_cache(&self) -> f64 {
        self.dist_cache
    }

    /// Cached objective value (see [`Solution::calc_cost`]).
    pub fn cost_cache(&self) -> f64 {
        self.cost_cache
    }

    /// Seconds into the run at which this solution was found.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Records when this solution was found.
    pub fn set_time(&mut self, secs: u64) {
        self.time = secs;
    }

    /// Verifies the solution invariants from scratch.
    ///
    /// Every route must be feasible on its own and every customer must be
    /// served exactly once. Returns a description of the first group of
    /// violations found.
    pub fn validate(&self, pb: &Problem) -> Result<(), String> {
        let mut problems = Vec::new();
        let mut served = vec![0usize; pb.num_nodes()];
        served[0] = 1; // the depot serves itself
        for route in &self.routes {
            if !route.is_feasible(pb) {
                problems.push(format!("route {} is infeasible", route.id()));
            }
            for &node in route.customers() {
                served[node] += 1;
            }
        }
        for (node, &count) in served.iter().enumerate() {
            if count > 1 {
                problems.push(format!("node {node} was served more than once"));
            } else if count < 1 {
                problems.push(format!("node {node} was not served at all"));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::models::Node;

    fn square_problem() -> (Problem, Config) {
        let instance = Instance::new(
            "square",
            30.0,
            vec![
                Node::depot(0.0, 0.0, 1000.0),
                Node::new(1, 10.0, 0.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(2, 10.0, 10.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(3, 0.0, 10.0, 10.0, 0.0, 900.0, 5.0),
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

    #[test]
    fn test_new_solution() {
        let (pb, _) = square_problem();
        let sol = Solution::new(&pb);
        assert_eq!(sol.trucks(), 0);
        assert_eq!(sol.unrouted(), &[1, 2, 3]);
    }

    #[test]
    fn test_open_and_remove_route_renumbers() {
        let (pb, _) = square_problem();
        let mut sol = Solution::new(&pb);
        for node in [1, 2, 3] {
            sol.remove_unrouted(node);
            sol.open_route(&pb, node, 2);
        }
        assert_eq!(sol.trucks(), 3);
        sol.route_mut(1).remove_block(&pb, 1, 1);
        sol.remove_route(&pb, 1);
        assert_eq!(sol.trucks(), 2);
        // dense ids and matching virtual depots
        for (i, route) in sol.routes().iter().enumerate() {
            assert_eq!(route.id(), i);
            assert_eq!(route.depot_id(), pb.num_nodes() + i);
        }
    }

    #[test]
    #[should_panic(expected = "non-empty route")]
    fn test_remove_route_rejects_populated() {
        let (pb, _) = square_problem();
        let mut sol = Solution::new(&pb);
        sol.remove_unrouted(1);
        sol.open_route(&pb, 1, 1);
        sol.remove_route(&pb, 0);
    }

    #[test]
    fn test_reset_returns_customers() {
        let (pb, _) = square_problem();
        let mut sol = Solution::new(&pb);
        sol.remove_unrouted(2);
        let r = sol.open_route(&pb, 2, 1);
        sol.remove_unrouted(3);
        sol.route_mut(r).insert_block(&pb, 1, &[3]);
        sol.reset(&pb);
        assert_eq!(sol.trucks(), 0);
        assert_eq!(sol.num_unrouted(), 3);
        // the reset route's customers come back at the head
        assert_eq!(sol.unrouted(), &[2, 3, 1]);
    }

    #[test]
    fn test_calc_cost_uses_weights() {
        let (pb, cfg) = square_problem();
        let mut sol = Solution::new(&pb);
        sol.remove_unrouted(1);
        sol.open_route(&pb, 1, 2);
        let cost = sol.calc_cost(&pb, &cfg);
        let expected = cfg.objective(1, 2, 20.0);
        assert!((cost - expected).abs() < 1e-10);
        assert_eq!(sol.workers_cache(), 2);
        assert!((sol.dist_cache() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_clone_is_identity_disjoint() {
        let (pb, _) = square_problem();
        let mut sol = Solution::new(&pb);
        sol.remove_unrouted(1);
        sol.open_route(&pb, 1, 2);
        let clone = sol.clone();
        // mutate the original; the clone must not follow
        sol.remove_unrouted(2);
        sol.route_mut(0).insert_block(&pb, 1, &[2]);
        assert_eq!(clone.route(0).customer_count(), 1);
        assert_eq!(clone.num_unrouted(), 2);
    }

    #[test]
    fn test_validate_detects_missing_and_duplicate() {
        let (pb, _) = square_problem();
        let mut sol = Solution::new(&pb);
        sol.remove_unrouted(1);
        sol.open_route(&pb, 1, 1);
        let err = sol.validate(&pb).unwrap_err();
        assert!(err.contains("node 2 was not served"));

        sol.route_mut(0).insert_block(&pb, 1, &[2, 2]);
        let err = sol.validate(&pb).unwrap_err();
        assert!(err.contains("served more than once"));
    }

    #[test]
    fn test_validate_accepts_complete_solution() {
        let (pb, _) = square_problem();
        let mut sol = Solution::new(&pb);
        sol.remove_unrouted(1);
        let r = sol.open_route(&pb, 1, 1);
        sol.remove_unrouted(2);
        sol.route_mut(r).insert_block(&pb, 1, &[2]);
        sol.remove_unrouted(3);
        sol.route_mut(r).insert_block(&pb, 2, &[3]);
        assert!(sol.validate(&pb).is_ok());
    }
}
