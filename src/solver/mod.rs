//! Metaheuristic drivers.
//!
//! All drivers share one outer shape: while the budget allows, construct a
//! scratch solution, optionally improve it with local search, score it and
//! swap it into the best slot when it wins; then feed the generation's
//! best back into the pheromone matrix (where applicable). The variants
//! differ only in construction choice, the post-construction step and the
//! after-generation update.

mod aco;
mod grasp;
mod ts;
mod vns;

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::{Config, Metaheuristic, StartHeuristic};
use crate::construct::{parallel, solomon};
use crate::local_search::{do_ls, SearchState};
use crate::models::{Problem, Solution};
use crate::pheromone::PheromoneMatrix;
use crate::report::InstanceResult;
use crate::tabu::TabuList;

/// One solver run over one problem instance.
///
/// Owns everything with run lifetime: the pheromone matrix, the tabu
/// list, the construction state machine, the RNG and the best solution
/// found so far.
pub struct Solver<'a> {
    pub(crate) pb: &'a Problem,
    pub(crate) cfg: &'a Config,
    pub(crate) pheromone: PheromoneMatrix,
    pub(crate) tabu: TabuList,
    pub(crate) state: SearchState,
    pub(crate) attempts: u64,
    pub(crate) num_solutions: u64,
    pub(crate) start: Instant,
    pub(crate) best: Solution,
    pub(crate) rng: StdRng,
    pub(crate) saturation_time: u64,
    pub(crate) ants: u64,
}

impl<'a> Solver<'a> {
    /// Prepares a run; `ants == 0` in the configuration resolves to one
    /// ant per customer.
    pub fn new(pb: &'a Problem, cfg: &'a Config) -> Self {
        let ants = if cfg.ants == 0 {
            (pb.num_nodes() - 1) as u64
        } else {
            cfg.ants as u64
        };
        Self {
            pb,
            cfg,
            pheromone: PheromoneMatrix::new(
                pb.num_nodes(),
                cfg.initial_pheromone,
                cfg.rho,
                cfg.min_pheromone,
            ),
            tabu: TabuList::new(
                pb.num_nodes(),
                cfg.tabu_time,
                cfg.metaheuristic == Metaheuristic::Ts,
            ),
            state: SearchState::ReduceTrucks,
            attempts: 0,
            num_solutions: 0,
            start: Instant::now(),
            best: Solution::new(pb),
            rng: StdRng::seed_from_u64(cfg.seed),
            saturation_time: 0,
            ants,
        }
    }

    /// Runs the configured metaheuristic to completion.
    pub fn run(&mut self) {
        let workers = self.cfg.max_workers;
        match self.cfg.metaheuristic {
            Metaheuristic::None => self.solve_once(workers),
            Metaheuristic::Aco => aco::solve(self, workers),
            Metaheuristic::CachedAco => aco::solve_cached(self, workers),
            Metaheuristic::Gaco => aco::solve_gaco(self, workers),
            Metaheuristic::Grasp => grasp::solve(self, workers),
            Metaheuristic::CachedGrasp => grasp::solve_cached(self, workers),
            Metaheuristic::Ts => ts::solve(self, workers),
            Metaheuristic::Vns => vns::solve(self, workers),
        }
        self.best.calc_cost(self.pb, self.cfg);
    }

    /// Single construction plus one local search pass.
    fn solve_once(&mut self, workers: usize) {
        let fleet_limit = self.pb.num_nodes();
        solomon::sequential(
            self.pb,
            self.cfg,
            &self.pheromone,
            &mut self.rng,
            &mut self.best,
            workers,
            fleet_limit,
        );
        do_ls(self.pb, self.cfg, &mut self.tabu, &mut self.best);
    }

    /// Budget predicate: `false` once either the wall clock or the
    /// iteration budget is exhausted (a zero budget never triggers).
    pub fn proceed(&self, iteration: u64) -> bool {
        let timeout = self.cfg.runtime > 0 && self.elapsed_secs() >= self.cfg.runtime;
        let runsout = self.cfg.max_iterations > 0 && iteration >= self.cfg.max_iterations;
        !(timeout || runsout)
    }

    /// Seconds since this run started.
    pub fn elapsed_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }

    /// The best solution found so far.
    pub fn best(&self) -> &Solution {
        &self.best
    }

    /// Total constructed solutions (ant iterations).
    pub fn num_solutions(&self) -> u64 {
        self.num_solutions
    }

    /// Benchmark record of the finished run.
    ///
    /// The best solution's caches must be up to date, which
    /// [`Solver::run`] guarantees.
    pub fn result(&self) -> InstanceResult {
        InstanceResult {
            name: self.pb.name().to_string(),
            trucks: self.best.trucks(),
            workers: self.best.workers_cache(),
            distance: self.best.dist_cache(),
            cost: self.best.cost_cache(),
            time: self.best.time(),
            saturation_time: self.saturation_time,
        }
    }
}

/// Builds a scratch solution with the configured start heuristic.
///
/// Parallel construction reduces the target truck count by one while the
/// state machine still hunts trucks; after `max_failed_attempts`
/// consecutive misses the driver commits to the best known count and
/// moves on to saving workers.
pub(crate) fn construct_routes(s: &mut Solver, sol: &mut Solution, workers: usize) {
    match s.cfg.start_heuristic {
        StartHeuristic::Solomon => {
            solomon::sequential_aco(s.pb, s.cfg, &s.pheromone, &mut s.rng, sol, workers);
        }
        StartHeuristic::SolomonMr => {
            solomon::sequential_mr(s.pb, s.cfg, &s.pheromone, &mut s.rng, sol, workers);
        }
        StartHeuristic::Parallel => {
            if s.best.trucks() == 0 {
                // no past solution yet: let a sequential pass set the bar
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
            }
            let mut max_trucks = s.best.trucks();
            if s.state == SearchState::ReduceTrucks {
                max_trucks -= 1;
            }
            let routed_all = parallel::construct(
                s.pb,
                s.cfg,
                &s.pheromone,
                &mut s.rng,
                sol,
                workers,
                max_trucks,
            );
            if routed_all {
                s.attempts = 0;
            } else {
                s.attempts += 1;
                if s.attempts >= s.cfg.max_failed_attempts && s.state == SearchState::ReduceTrucks {
                    s.state = SearchState::ReduceWorkers;
                    s.attempts = 0;
                }
            }
        }
    }
}

/// Swaps `sol` into the best slot if its cost wins; returns whether it
/// did. `sol` then holds the previous best as scratch for the next ant.
pub(crate) fn adopt_if_better(
    s: &mut Solver,
    sol: &mut Solution,
    cost: f64,
    best_cost: &mut f64,
) -> bool {
    if cost < *best_cost {
        *best_cost = cost;
        sol.set_time(s.elapsed_secs());
        debug!(
            trucks = sol.trucks(),
            workers = sol.workers_cache(),
            distance = sol.dist_cache(),
            cost = sol.cost_cache(),
            seconds = sol.time(),
            "new best solution"
        );
        std::mem::swap(&mut s.best, sol);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::models::Node;

    fn sample_problem(cfg: &Config) -> Problem {
        let instance = Instance::new(
            "sample",
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
        Problem::new(instance, cfg)
    }

    fn budgeted(metaheuristic: Metaheuristic) -> Config {
        Config {
            adapt_service_times: false,
            metaheuristic,
            max_workers: 2,
            runtime: 0,
            max_iterations: 40,
            ants: 10,
            seed: 0,
            ..Config::default()
        }
    }

    #[test]
    fn test_proceed_budget_exhaustion() {
        let cfg = budgeted(Metaheuristic::Aco);
        let pb = sample_problem(&cfg);
        let s = Solver::new(&pb, &cfg);
        assert!(s.proceed(0));
        assert!(s.proceed(39));
        assert!(!s.proceed(40));
        assert!(!s.proceed(100));
    }

    #[test]
    fn test_dynamic_ants() {
        let mut cfg = budgeted(Metaheuristic::Aco);
        cfg.ants = 0;
        let pb = sample_problem(&cfg);
        let s = Solver::new(&pb, &cfg);
        assert_eq!(s.ants, 5);
    }

    #[test]
    fn test_solve_none_deterministic() {
        let mut cfg = budgeted(Metaheuristic::None);
        cfg.deterministic = true;
        let pb = sample_problem(&cfg);
        let mut results = Vec::new();
        for _ in 0..2 {
            let mut s = Solver::new(&pb, &cfg);
            s.run();
            assert!(s.best().validate(&pb).is_ok());
            results.push((
                s.best().trucks(),
                s.best().workers_cache(),
                s.best().dist_cache(),
            ));
        }
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn test_every_metaheuristic_terminates_feasibly() {
        for metaheuristic in [
            Metaheuristic::None,
            Metaheuristic::Aco,
            Metaheuristic::CachedAco,
            Metaheuristic::CachedGrasp,
            Metaheuristic::Gaco,
            Metaheuristic::Grasp,
            Metaheuristic::Ts,
            Metaheuristic::Vns,
        ] {
            let cfg = budgeted(metaheuristic);
            let pb = sample_problem(&cfg);
            let mut s = Solver::new(&pb, &cfg);
            s.run();
            assert!(
                s.best().validate(&pb).is_ok(),
                "{metaheuristic} produced an infeasible solution"
            );
        }
    }

    #[test]
    fn test_aco_with_parallel_construction() {
        let mut cfg = budgeted(Metaheuristic::Aco);
        cfg.start_heuristic = StartHeuristic::Parallel;
        cfg.do_ls = false;
        cfg.max_failed_attempts = 3;
        let pb = sample_problem(&cfg);
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        assert!(s.best().validate(&pb).is_ok());
        assert!(!s.proceed(s.num_solutions()));
    }

    #[test]
    fn test_best_trucks_monotone_over_run() {
        // with local search on, the recorded best truck count never grows
        let mut cfg = budgeted(Metaheuristic::Aco);
        cfg.max_iterations = 30;
        let pb = sample_problem(&cfg);
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        let final_trucks = s.best().trucks();
        let mut rerun = Solver::new(&pb, &cfg);
        rerun.run();
        assert_eq!(rerun.best().trucks(), final_trucks);
        assert!(final_trucks >= 2); // 50 demand over capacity 40
    }

    #[test]
    fn test_result_record() {
        let cfg = budgeted(Metaheuristic::None);
        let pb = sample_problem(&cfg);
        let mut s = Solver::new(&pb, &cfg);
        s.run();
        let result = s.result();
        assert_eq!(result.name, "sample");
        assert_eq!(result.trucks, s.best().trucks());
        assert!(result.cost > 0.0);
        assert_eq!(result.saturation_time, 0);
    }
}
