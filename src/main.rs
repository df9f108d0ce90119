use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vrptwms::cli::Arguments;
use vrptwms::config::Config;
use vrptwms::error::SolverError;
use vrptwms::instance::read_instance;
use vrptwms::models::Problem;
use vrptwms::report;
use vrptwms::solver::Solver;

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_tracing(args.verbose);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run(args: &Arguments) -> Result<(), SolverError> {
    let mut cfg = Config::load(&args.config)?;
    args.apply(&mut cfg);
    cfg.validate()?;

    if !cfg.parallel {
        println!("{}\n", cfg.banner());
    }

    let mut results = Vec::new();
    for path in &args.instances {
        let instance = match read_instance(path) {
            Ok(instance) => instance,
            Err(e) => {
                warn!("{e}; skipping this instance");
                continue;
            }
        };
        if cfg.verbosity >= 1 {
            info!("processing \"{}\"", path.display());
        }
        let pb = Problem::new(instance, &cfg);
        let mut solver = Solver::new(&pb, &cfg);
        solver.run();
        if let Err(details) = solver.best().validate(&pb) {
            eprintln!("{}", report::render_solution(&pb, solver.best()));
            return Err(SolverError::InfeasibleSolution(details));
        }
        if cfg.verbosity >= 1 {
            let elapsed = solver.elapsed_secs().max(1);
            info!(
                "calculated {} iterations/s",
                solver.num_solutions() / elapsed
            );
        }
        if cfg.verbosity >= 2 {
            report::print_solution(&pb, solver.best());
        }
        report::append_details(&cfg.details_path, &pb, solver.best())?;
        results.push(solver.result());
    }
    if results.is_empty() {
        return Err(SolverError::NoInput);
    }
    report::print_results(&results, &cfg)?;
    Ok(())
}
