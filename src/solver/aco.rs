//! Ant colony optimisation drivers.
//!
//! Per generation every ant constructs a solution guided by the pheromone
//! matrix, local search polishes it, and the best solution reinforces its
//! edges afterwards. Virtual per-route depot ids keep the first and last
//! edges of different routes distinguishable; without them the colony
//! fails to converge.

use tracing::debug;

use crate::cache::SolutionCache;
use crate::local_search::do_ls;
use crate::models::Solution;
use crate::solver::{adopt_if_better, construct_routes, Solver};

/// How often one objective fingerprint may recur before the cached driver
/// declares the colony saturated.
const MAX_CACHE_HITS: u64 = 5;

/// Plain ACO.
pub(crate) fn solve(s: &mut Solver, workers: usize) {
    let mut best_cost = f64::INFINITY;
    let mut sol = Solution::new(s.pb);
    while s.proceed(s.num_solutions) {
        for _ in 0..s.ants {
            sol.reset(s.pb);
            construct_routes(s, &mut sol, workers);
            do_ls(s.pb, s.cfg, &mut s.tabu, &mut sol);
            let cost = sol.calc_cost(s.pb, s.cfg);
            adopt_if_better(s, &mut sol, cost, &mut best_cost);
        }
        s.num_solutions += s.ants;
        s.pheromone.update(&s.best);
    }
}

/// ACO with the objective-value cache.
///
/// Solutions whose fingerprint has been seen before skip local search
/// entirely; once one fingerprint recurs more than [`MAX_CACHE_HITS`]
/// times the saturation timestamp is recorded (reported as a metric, no
/// countermeasure is taken).
pub(crate) fn solve_cached(s: &mut Solver, workers: usize) {
    let mut best_cost = f64::INFINITY;
    let mut sol = Solution::new(s.pb);
    let mut cache = SolutionCache::new(s.pb.num_nodes());
    let mut saturated = false;
    while s.proceed(s.num_solutions) {
        for _ in 0..s.ants {
            sol.reset(s.pb);
            construct_routes(s, &mut sol, workers);
            sol.calc_cost(s.pb, s.cfg);
            let hits = cache.contains(&sol);
            if hits > 0 {
                if hits > MAX_CACHE_HITS && !saturated {
                    saturated = true;
                    s.saturation_time = s.elapsed_secs();
                    debug!(
                        distinct = cache.size(),
                        queries = cache.queries(),
                        "cache saturated"
                    );
                }
                continue;
            }
            cache.add(&sol);
            do_ls(s.pb, s.cfg, &mut s.tabu, &mut sol);
            let cost = sol.calc_cost(s.pb, s.cfg);
            adopt_if_better(s, &mut sol, cost, &mut best_cost);
        }
        s.num_solutions += s.ants;
        s.pheromone.update(&s.best);
    }
}

/// ACO variant carrying a stagnation detector.
///
/// The detector counts near-identical objective values and would reset
/// the pheromone matrix on repeated stagnation; the reset is deliberately
/// left out, so detection only logs. Construction happens on the scratch
/// left over from the previous ant (the reset moves to the end of the
/// loop).
pub(crate) fn solve_gaco(s: &mut Solver, workers: usize) {
    let mut best_cost = f64::INFINITY;
    let mut local_best = f64::INFINITY;
    let mut stagnant = 0u32;
    let mut sol = Solution::new(s.pb);
    while s.proceed(s.num_solutions) {
        for _ in 0..s.ants {
            construct_routes(s, &mut sol, workers);
            do_ls(s.pb, s.cfg, &mut s.tabu, &mut sol);
            let cost = sol.calc_cost(s.pb, s.cfg);
            if (local_best - cost).abs() < 1e-3 && stagnant >= 2 {
                stagnant = 0;
                debug!(cost, "objective stagnation detected");
                local_best = f64::INFINITY;
            } else if (local_best - cost).abs() < 1e-3 {
                stagnant += 1;
            }
            if adopt_if_better(s, &mut sol, cost, &mut best_cost) {
                stagnant = 0;
            }
            sol.reset(s.pb);
        }
        s.num_solutions += s.ants;
        s.pheromone.update(&s.best);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Metaheuristic, StartHeuristic};
    use crate::instance::Instance;
    use crate::models::{Node, Problem};

    fn sample(metaheuristic: Metaheuristic, start: StartHeuristic) -> (Problem, Config) {
        let cfg = Config {
            adapt_service_times: false,
            metaheuristic,
            start_heuristic: start,
            max_workers: 2,
            runtime: 0,
            max_iterations: 30,
            ants: 10,
            seed: 0,
            ..Config::default()
        };
        let instance = Instance::new(
            "aco",
            40.0,
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
    fn test_aco_with_each_start_heuristic() {
        for start in [
            StartHeuristic::Solomon,
            StartHeuristic::SolomonMr,
            StartHeuristic::Parallel,
        ] {
            let (pb, cfg) = sample(Metaheuristic::Aco, start);
            let mut s = Solver::new(&pb, &cfg);
            s.run();
            assert!(
                s.best().validate(&pb).is_ok(),
                "start heuristic {start} failed"
            );
            assert!(s.num_solutions() >= cfg.max_iterations);
        }
    }

    #[test]
    fn test_aco_is_reproducible_with_fixed_seed() {
        let (pb, cfg) = sample(Metaheuristic::Aco, StartHeuristic::Solomon);
        let mut costs = Vec::new();
        for _ in 0..2 {
            let mut s = Solver::new(&pb, &cfg);
            s.run();
            costs.push(s.best().cost_cache());
        }
        assert!((costs[0] - costs[1]).abs() < 1e-12);
    }

    #[test]
    fn test_cached_aco_terminates_feasibly() {
        let (pb, cfg) = sample(Metaheuristic::CachedAco, StartHeuristic::Solomon);
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
    }

    #[test]
    fn test_gaco_terminates_feasibly() {
        let (pb, cfg) = sample(Metaheuristic::Gaco, StartHeuristic::Solomon);
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
    }

    #[test]
    fn test_pheromone_stays_above_minimum_after_run() {
        let (pb, cfg) = sample(Metaheuristic::Aco, StartHeuristic::Solomon);
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        for i in 1..s.pheromone.side() {
            for j in 1..s.pheromone.side() {
                assert!(s.pheromone.get(i, j) >= cfg.min_pheromone);
            }
        }
    }
}
