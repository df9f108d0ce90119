//! Command-line surface.
//!
//! Flags override the configuration file, which overrides the built-in
//! defaults. Instance files are positional; every readable one is solved
//! with the same configuration.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{Config, Metaheuristic, OutputFormat, StartHeuristic};

/// Solver for vehicle routing problems with time windows and multiple
/// service workers (Solomon benchmark format).
#[derive(Debug, Parser)]
#[command(name = "vrptwms", version, about)]
pub struct Arguments {
    /// Metaheuristic to run
    #[arg(short, long, value_enum)]
    pub metaheuristic: Option<Metaheuristic>,

    /// Route construction heuristic
    #[arg(short, long, value_enum)]
    pub construct: Option<StartHeuristic>,

    /// Result output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Seed for the pseudo random number generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Increase the verbosity level (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Runtime per instance in seconds (0 disables the limit)
    #[arg(short, long)]
    pub runtime: Option<u64>,

    /// Maximum number of iterations (0 disables the limit)
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Number of ants (0 for one ant per customer)
    #[arg(long)]
    pub ants: Option<usize>,

    /// Pheromone persistence (1 - evaporation)
    #[arg(long)]
    pub rho: Option<f64>,

    /// Alpha parameter of Solomon's I1 heuristic, in [0, 1]
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Size of the GRASP restricted candidate list (0 for unbounded)
    #[arg(long = "rcl-size")]
    pub rcl_size: Option<usize>,

    /// Weighted selection from the GRASP candidate list
    #[arg(long = "use-weights")]
    pub use_weights: Option<bool>,

    /// Enable or disable local search
    #[arg(long = "ls")]
    pub do_ls: Option<bool>,

    /// Deterministic construction (disables the metaheuristic)
    #[arg(short, long)]
    pub deterministic: bool,

    /// Adjust output for pipeline runs (implies csv, suppresses banner)
    #[arg(long)]
    pub parallel: bool,

    /// Solve a plain VRPTW (one worker, no service time adaption)
    #[arg(long)]
    pub vrptw: bool,

    /// Configuration file with key = value lines
    #[arg(long, default_value = "vrptwms.conf")]
    pub config: PathBuf,

    /// Instance files in Solomon format
    #[arg(required = true)]
    pub instances: Vec<PathBuf>,
}

impl Arguments {
    /// Folds the flags into a file-loaded configuration.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(m) = self.metaheuristic {
            cfg.metaheuristic = m;
        }
        if let Some(c) = self.construct {
            cfg.start_heuristic = c;
        }
        if let Some(f) = self.format {
            cfg.format = f;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(runtime) = self.runtime {
            cfg.runtime = runtime;
        }
        if let Some(iterations) = self.iterations {
            cfg.max_iterations = iterations;
        }
        if let Some(ants) = self.ants {
            cfg.ants = ants;
        }
        if let Some(rho) = self.rho {
            cfg.rho = rho;
        }
        if let Some(alpha) = self.alpha {
            cfg.alpha = alpha;
        }
        if let Some(rcl_size) = self.rcl_size {
            cfg.rcl_size = rcl_size;
        }
        if let Some(use_weights) = self.use_weights {
            cfg.use_weights = use_weights;
        }
        if let Some(do_ls) = self.do_ls {
            cfg.do_ls = do_ls;
        }
        if self.deterministic {
            cfg.deterministic = true;
            cfg.metaheuristic = Metaheuristic::None;
        }
        if self.parallel {
            cfg.format = OutputFormat::Csv;
            cfg.parallel = true;
        }
        if self.vrptw {
            cfg.max_workers = 1;
            cfg.adapt_service_times = false;
        }
        cfg.verbosity = cfg.verbosity.max(self.verbose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Arguments {
        Arguments::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = parse(&["vrptwms", "R101.txt"]);
        let mut cfg = Config::default();
        let before = cfg.clone();
        args.apply(&mut cfg);
        assert_eq!(cfg.metaheuristic, before.metaheuristic);
        assert_eq!(cfg.seed, before.seed);
        assert_eq!(args.instances, vec![PathBuf::from("R101.txt")]);
    }

    #[test]
    fn test_flags_override() {
        let args = parse(&[
            "vrptwms",
            "-m",
            "cached_aco",
            "-c",
            "parallel",
            "--seed",
            "7",
            "--runtime",
            "0",
            "--iterations",
            "70",
            "--ants",
            "50",
            "--ls",
            "false",
            "R101.txt",
        ]);
        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.metaheuristic, Metaheuristic::CachedAco);
        assert_eq!(cfg.start_heuristic, StartHeuristic::Parallel);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.runtime, 0);
        assert_eq!(cfg.max_iterations, 70);
        assert_eq!(cfg.ants, 50);
        assert!(!cfg.do_ls);
    }

    #[test]
    fn test_deterministic_disables_metaheuristic() {
        let args = parse(&["vrptwms", "-m", "aco", "-d", "R101.txt"]);
        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert!(cfg.deterministic);
        assert_eq!(cfg.metaheuristic, Metaheuristic::None);
    }

    #[test]
    fn test_parallel_implies_csv() {
        let args = parse(&["vrptwms", "--parallel", "R101.txt"]);
        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert!(cfg.parallel);
        assert_eq!(cfg.format, OutputFormat::Csv);
    }

    #[test]
    fn test_vrptw_mode() {
        let args = parse(&["vrptwms", "--vrptw", "R101.txt"]);
        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.max_workers, 1);
        assert!(!cfg.adapt_service_times);
    }

    #[test]
    fn test_instances_are_required() {
        assert!(Arguments::try_parse_from(["vrptwms"]).is_err());
    }

    #[test]
    fn test_verbose_counts() {
        let args = parse(&["vrptwms", "-vvv", "R101.txt"]);
        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.verbosity, 3);
    }
}
