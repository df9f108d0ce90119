//! Runtime configuration.
//!
//! Defaults are overridden by a `key = value` configuration file, which is
//! in turn overridden by command-line flags. A missing file is reported and
//! the defaults are kept.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use tracing::warn;

use crate::error::SolverError;

/// Which metaheuristic drives the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Metaheuristic {
    /// Single construction plus one local search pass.
    None,
    /// Ant colony optimisation.
    Aco,
    /// ACO that skips local search for already-seen objective values.
    #[value(name = "cached_aco")]
    CachedAco,
    /// GRASP with the same caching shortcut.
    #[value(name = "cached_grasp")]
    CachedGrasp,
    /// ACO variant with an (inert) stagnation detector.
    Gaco,
    /// Greedy randomized adaptive search procedure.
    Grasp,
    /// Tabu search over non-improving best moves.
    Ts,
    /// Variable neighbourhood search.
    Vns,
}

impl fmt::Display for Metaheuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Aco => "aco",
            Self::CachedAco => "cached_aco",
            Self::CachedGrasp => "cached_grasp",
            Self::Gaco => "gaco",
            Self::Grasp => "grasp",
            Self::Ts => "ts",
            Self::Vns => "vns",
        };
        f.write_str(name)
    }
}

impl FromStr for Metaheuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "aco" => Ok(Self::Aco),
            "cached_aco" => Ok(Self::CachedAco),
            "cached_grasp" => Ok(Self::CachedGrasp),
            "gaco" => Ok(Self::Gaco),
            "grasp" => Ok(Self::Grasp),
            "ts" => Ok(Self::Ts),
            "vns" => Ok(Self::Vns),
            other => Err(format!("metaheuristic '{other}' not recognized")),
        }
    }
}

/// Which construction heuristic seeds each iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StartHeuristic {
    /// Sequential Solomon I1.
    Solomon,
    /// Reimann-style stochastic Solomon (direct attractiveness).
    #[value(name = "solomon-mr")]
    SolomonMr,
    /// Parallel construction over virtual per-route depots.
    Parallel,
}

impl fmt::Display for StartHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Solomon => "solomon",
            Self::SolomonMr => "solomon-mr",
            Self::Parallel => "parallel",
        };
        f.write_str(name)
    }
}

impl FromStr for StartHeuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solomon" => Ok(Self::Solomon),
            "solomon-mr" => Ok(Self::SolomonMr),
            "parallel" => Ok(Self::Parallel),
            other => Err(format!("start heuristic '{other}' not recognized")),
        }
    }
}

/// Format of the aggregated result output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table with sum/avg rows.
    Human,
    /// One comma-separated row per instance.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Self::Human),
            "csv" => Ok(Self::Csv),
            other => Err(format!("output format '{other}' not recognized")),
        }
    }
}

/// All tunables of a solver run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Rescale service times from demands (off when solving plain VRPTW).
    pub adapt_service_times: bool,
    /// Distance/time weighting in the Solomon insertion score.
    pub alpha: f64,
    /// Ants per generation; 0 means one ant per customer.
    pub ants: usize,
    /// Commit the best move per pass instead of the first improving one.
    pub best_moves: bool,
    /// Objective weight of one truck.
    pub cost_truck: f64,
    /// Objective weight of one service worker.
    pub cost_worker: f64,
    /// Objective weight of one distance unit.
    pub cost_distance: f64,
    /// Deterministic construction (fixed seed, no roulette).
    pub deterministic: bool,
    /// Run local search after construction.
    pub do_ls: bool,
    /// Result output format.
    pub format: OutputFormat,
    /// Initial value of every pheromone cell.
    pub initial_pheromone: f64,
    /// Depot-distance weight in the insertion score.
    pub lambda: f64,
    /// Parallel-construction failures tolerated before committing to the
    /// current best truck count.
    pub max_failed_attempts: u64,
    /// Iteration budget; 0 disables the limit.
    pub max_iterations: u64,
    /// Longest block the relocate operator moves at once.
    pub max_move: usize,
    /// Enables the swap operator when >= 1.
    pub max_swap: usize,
    /// Maximum crew size per truck.
    pub max_workers: usize,
    /// The metaheuristic to run.
    pub metaheuristic: Metaheuristic,
    /// Lower bound of every pheromone cell.
    pub min_pheromone: f64,
    /// Detour weighting in the Solomon insertion score.
    pub mu: f64,
    /// Output tweak for GNU-parallel pipelines (implies CSV).
    pub parallel: bool,
    /// Size of the GRASP restricted candidate list; 0 means unbounded.
    pub rcl_size: usize,
    /// Pheromone persistence (1 - evaporation).
    pub rho: f64,
    /// Wall-clock budget per instance in seconds; 0 disables the limit.
    pub runtime: u64,
    /// Seed for the pseudo random number generator.
    pub seed: u64,
    /// Service time per demand unit when adapting service times.
    pub service_rate: f64,
    /// Append-mode file receiving per-instance solution details.
    pub details_path: String,
    /// Construction heuristic.
    pub start_heuristic: StartHeuristic,
    /// Iterations a moved node may not return to the route it left.
    pub tabu_time: u64,
    /// Velocity used when capping adapted service times.
    pub truck_velocity: f64,
    /// Weighted (instead of uniform) selection from the GRASP RCL.
    pub use_weights: bool,
    /// Output verbosity (0 = results only).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adapt_service_times: true,
            alpha: 1.0,
            ants: 0,
            best_moves: true,
            cost_truck: 1.0,
            cost_worker: 0.1,
            cost_distance: 0.0001,
            deterministic: false,
            do_ls: true,
            format: OutputFormat::Human,
            initial_pheromone: 1.0,
            lambda: 2.0,
            max_failed_attempts: 500,
            max_iterations: 0,
            max_move: 2,
            max_swap: 1,
            max_workers: 3,
            metaheuristic: Metaheuristic::Aco,
            min_pheromone: 1e-13,
            mu: 1.0,
            parallel: false,
            rcl_size: 2,
            rho: 0.985,
            runtime: 10,
            seed: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            service_rate: 2.0,
            details_path: "details.txt".into(),
            start_heuristic: StartHeuristic::Solomon,
            tabu_time: 50,
            truck_velocity: 1.0,
            use_weights: true,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Loads the configuration file over the defaults.
    ///
    /// A missing file is tolerated with a warning; a present but broken
    /// file is an error.
    pub fn load(path: &Path) -> Result<Self, SolverError> {
        let mut cfg = Self::default();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "configuration file '{}' could not be read ({e}); \
                     continuing with default values",
                    path.display()
                );
                return Ok(cfg);
            }
        };
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                SolverError::InvalidConfig(format!(
                    "{}:{}: expected 'key = value'",
                    path.display(),
                    lineno + 1
                ))
            })?;
            cfg.apply_pair(key.trim(), value.trim()).map_err(|reason| {
                SolverError::InvalidConfig(format!(
                    "{}:{}: {reason}",
                    path.display(),
                    lineno + 1
                ))
            })?;
        }
        Ok(cfg)
    }

    fn apply_pair(&mut self, key: &str, value: &str) -> Result<(), String> {
        fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, String>
        where
            T::Err: fmt::Display,
        {
            value
                .parse()
                .map_err(|e| format!("bad value '{value}' for {key}: {e}"))
        }

        match key {
            "adapt_service_times" => self.adapt_service_times = parse(key, value)?,
            "alpha" => self.alpha = parse(key, value)?,
            "ants" => self.ants = parse(key, value)?,
            "best_moves" => self.best_moves = parse(key, value)?,
            "cost_truck" => self.cost_truck = parse(key, value)?,
            "cost_worker" => self.cost_worker = parse(key, value)?,
            "cost_distance" => self.cost_distance = parse(key, value)?,
            "deterministic" => self.deterministic = parse(key, value)?,
            "do_ls" => self.do_ls = parse(key, value)?,
            "format" => self.format = parse(key, value)?,
            "initial_pheromone" => self.initial_pheromone = parse(key, value)?,
            "lambda" => self.lambda = parse(key, value)?,
            "max_failed_attempts" => self.max_failed_attempts = parse(key, value)?,
            "max_iterations" => self.max_iterations = parse(key, value)?,
            "max_move" => self.max_move = parse(key, value)?,
            "max_swap" => self.max_swap = parse(key, value)?,
            "max_workers" => self.max_workers = parse(key, value)?,
            "metaheuristic" => self.metaheuristic = parse(key, value)?,
            "min_pheromone" => self.min_pheromone = parse(key, value)?,
            "mu" => self.mu = parse(key, value)?,
            "parallel" => self.parallel = parse(key, value)?,
            "rcl_size" => self.rcl_size = parse(key, value)?,
            "rho" => self.rho = parse(key, value)?,
            "runtime" => self.runtime = parse(key, value)?,
            "seed" => self.seed = parse(key, value)?,
            "service_rate" => self.service_rate = parse(key, value)?,
            "sol_details_filename" => self.details_path = value.to_string(),
            "start_heuristic" => self.start_heuristic = parse(key, value)?,
            "tabu_time" => self.tabu_time = parse(key, value)?,
            "truck_velocity" => self.truck_velocity = parse(key, value)?,
            "use_weights" => self.use_weights = parse(key, value)?,
            "verbosity" => self.verbosity = parse(key, value)?,
            other => return Err(format!("unknown configuration key '{other}'")),
        }
        Ok(())
    }

    /// Rejects configurations the solver cannot run with.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.runtime == 0 && self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig(
                "iterations or runtime must be finite (> 0)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(SolverError::InvalidConfig(
                "alpha needs to be in the interval [0.0, 1.0]".into(),
            ));
        }
        if self.max_workers == 0 {
            return Err(SolverError::InvalidConfig(
                "max_workers must be at least 1".into(),
            ));
        }
        if matches!(
            self.metaheuristic,
            Metaheuristic::Grasp | Metaheuristic::CachedGrasp | Metaheuristic::Ts | Metaheuristic::Vns
        ) && self.start_heuristic != StartHeuristic::Solomon
        {
            return Err(SolverError::InvalidConfig(format!(
                "start heuristic '{}' is not available for {}",
                self.start_heuristic, self.metaheuristic
            )));
        }
        Ok(())
    }

    /// The hierarchical objective as a scalar.
    ///
    /// Monotonic in each of trucks, workers and distance for non-negative
    /// cost weights.
    pub fn objective(&self, trucks: usize, workers: usize, distance: f64) -> f64 {
        distance * self.cost_distance
            + workers as f64 * self.cost_worker
            + trucks as f64 * self.cost_truck
    }

    /// One-paragraph summary printed before solving.
    pub fn banner(&self) -> String {
        let construction = match (self.start_heuristic, self.deterministic) {
            (StartHeuristic::Solomon, true) => "deterministic solomon".to_string(),
            (StartHeuristic::Solomon, false) => "stochastic solomon".to_string(),
            (h, _) => h.to_string(),
        };
        let ls = if self.do_ls {
            let mode = if self.best_moves {
                "only best moves"
            } else {
                "first improving moves"
            };
            format!(
                "local search ({mode}; max_move: {}, max_swap: {})",
                self.max_move, self.max_swap
            )
        } else {
            "no local search".to_string()
        };
        let budget = if self.runtime > 0 {
            format!("runtime: {} sec/inst", self.runtime)
        } else {
            format!("runtime not limited; max. {} iterations", self.max_iterations)
        };
        format!(
            "seed: {}\nmetaheuristic: {}\n{} (alpha: {:.2}, lambda: {:.2}, mu: {:.2})\n{}\n{}",
            self.seed, self.metaheuristic, construction, self.alpha, self.lambda, self.mu, ls, budget
        )
    }
}
