//! Tabu search driver.
//!
//! Starts from one sequential construction and then walks the move
//! neighbourhood with *non-improving* best moves: every pass commits the
//! dominant move even when it worsens the solution, and the tabu list
//! keeps the walk from cycling straight back. Halfway through either
//! budget the search commits to the reached truck count and hunts workers
//! instead.

use crate::construct::solomon;
use crate::local_search::{perform_move, update_move, Move, SearchState};
use crate::solver::Solver;
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
    let mut best_cost = s.best.calc_cost(s.pb, s.cfg);
    let mut sol = s.best.clone();
    let mut state = SearchState::ReduceTrucks;
    loop {
        let mut updated = false;
        if s.cfg.max_iterations > 0 && s.tabu.iteration() * 2 > s.cfg.max_iterations {
            state = SearchState::ReduceWorkers;
        }
        if s.cfg.runtime > 0 && s.elapsed_secs() * 2 > s.cfg.runtime {
            state = SearchState::ReduceWorkers;
        }
        let mut best_move: Option<Move> = None;
        let trucks = sol.trucks();
        if trucks >= 2 {
            for i in (1..trucks).rev() {
                for j in (0..i).rev() {
                    for (src, tgt, len) in [(j, i, 2), (i, j, 2), (j, i, 1), (i, j, 1)] {
                        updated |= update_move(
                            s.pb,
                            s.cfg,
                            &s.tabu,
                            &sol,
                            &mut best_move,
                            false,
                            false,
                            src,
                            tgt,
                            state,
                            len,
                        );
                    }
                }
            }
        }
        if let Some(m) = best_move.take() {
            perform_move(s.pb, &mut s.tabu, &mut sol, m);
        }
        let cost = sol.calc_cost(s.pb, s.cfg);
        if cost < best_cost {
            best_cost = cost;
            sol.set_time(s.elapsed_secs());
            debug!(
                trucks = sol.trucks(),
                cost, "tabu search found a new best"
            );
            s.best = sol.clone();
        }
        if !(updated && s.proceed(s.tabu.iteration())) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, Metaheuristic};
    use crate::instance::Instance;
    use crate::models::{Node, Problem};
    use crate::solver::Solver;

    fn sample() -> (Problem, Config) {
        let cfg = Config {
            adapt_service_times: false,
            metaheuristic: Metaheuristic::Ts,
            max_workers: 2,
            runtime: 0,
            max_iterations: 60,
            tabu_time: 5,
            seed: 0,
            ..Config::default()
        };
        let instance = Instance::new(
            "ts",
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
    fn test_tabu_search_terminates_feasibly() {
        let (pb, cfg) = sample();
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
        assert!(s.tabu.is_active());
    }

    #[test]
    fn test_tabu_search_reproducible() {
        let (pb, cfg) = sample();
        let mut costs = Vec::new();
        for _ in 0..2 {
            let mut s = Solver::new(&pb, &cfg);
            s.run();
            costs.push(s.best().cost_cache());
        }
        assert!((costs[0] - costs[1]).abs() < 1e-12);
    }

    #[test]
    fn test_tabu_iterations_respect_budget() {
        let (pb, cfg) = sample();
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.tabu.iteration() <= cfg.max_iterations + 1);
    }
}
