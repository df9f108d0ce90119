//! GRASP drivers.
//!
//! Each iteration greedily constructs a randomized solution from the
//! restricted candidate list, improves it with local search and keeps it
//! when it beats the incumbent. No pheromone feedback: the seed roulette
//! runs on the uniform initial trails, i.e. on depot distance alone.

use tracing::debug;

use crate::cache::SolutionCache;
use crate::construct::grasp::sequential_rcl;
use crate::local_search::do_ls;
use crate::models::Solution;
use crate::solver::{adopt_if_better, Solver};

/// Plain GRASP.
pub(crate) fn solve(s: &mut Solver, workers: usize) {
    let mut best_cost = f64::INFINITY;
    let mut sol = Solution::new(s.pb);
    while s.proceed(s.num_solutions) {
        sequential_rcl(s.pb, s.cfg, &s.pheromone, &mut s.rng, &mut sol, workers);
        do_ls(s.pb, s.cfg, &mut s.tabu, &mut sol);
        let cost = sol.calc_cost(s.pb, s.cfg);
        adopt_if_better(s, &mut sol, cost, &mut best_cost);
        sol.reset(s.pb);
        s.num_solutions += 1;
    }
}

/// GRASP with the objective-value cache: repeated objective values skip
/// local search.
pub(crate) fn solve_cached(s: &mut Solver, workers: usize) {
    let mut best_cost = f64::INFINITY;
    let mut sol = Solution::new(s.pb);
    let mut cache = SolutionCache::new(s.pb.num_nodes());
    while s.proceed(s.num_solutions) {
        sol.reset(s.pb);
        s.num_solutions += 1;
        sequential_rcl(s.pb, s.cfg, &s.pheromone, &mut s.rng, &mut sol, workers);
        sol.calc_cost(s.pb, s.cfg);
        if cache.contains(&sol) > 0 {
            continue;
        }
        cache.add(&sol);
        do_ls(s.pb, s.cfg, &mut s.tabu, &mut sol);
        let cost = sol.calc_cost(s.pb, s.cfg);
        adopt_if_better(s, &mut sol, cost, &mut best_cost);
    }
    debug!(
        distinct = cache.size(),
        queries = cache.queries(),
        "grasp cache statistics"
    );
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, Metaheuristic};
    use crate::instance::Instance;
    use crate::models::{Node, Problem};
    use crate::solver::Solver;

    fn sample(metaheuristic: Metaheuristic) -> (Problem, Config) {
        let cfg = Config {
            adapt_service_times: false,
            metaheuristic,
            max_workers: 2,
            runtime: 0,
            max_iterations: 25,
            seed: 0,
            ..Config::default()
        };
        let instance = Instance::new(
            "grasp",
            40.0,
            vec![
                Node::depot(0.0, 0.0, 1000.0),
                Node::new(1, 10.0, 0.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(2, 20.0, 0.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(3, 0.0, 10.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(4, 0.0, 20.0, 10.0, 0.0, 900.0, 5.0),
            ],
        );
        let pb = Problem::new(instance, &cfg);
        (pb, cfg)
    }

    #[test]
    fn test_grasp_terminates_feasibly() {
        let (pb, cfg) = sample(Metaheuristic::Grasp);
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
        assert_eq!(s.num_solutions(), cfg.max_iterations);
    }

    #[test]
    fn test_grasp_unweighted_large_rcl() {
        let (pb, mut cfg) = sample(Metaheuristic::Grasp);
        cfg.use_weights = false;
        cfg.rcl_size = 20;
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
    }

    #[test]
    fn test_grasp_weighted_unbounded_rcl() {
        let (pb, mut cfg) = sample(Metaheuristic::Grasp);
        cfg.use_weights = true;
        cfg.rcl_size = 0;
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
    }

    #[test]
    fn test_cached_grasp_terminates_feasibly() {
        let (pb, cfg) = sample(Metaheuristic::CachedGrasp);
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
    }
}
