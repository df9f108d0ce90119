//! Result aggregation and output.
//!
//! Two surfaces: the aggregated benchmark table over all processed
//! instances (human-readable or CSV, with sum/avg rows for multi-instance
//! runs) and the append-mode details file holding every route of each
//! best solution.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{self, Write as _};

use colored::Colorize;

use crate::config::{Config, Metaheuristic, OutputFormat};
use crate::error::SolverError;
use crate::models::{Problem, Solution};

/// Benchmark record of one solved instance.
#[derive(Debug, Clone)]
pub struct InstanceResult {
    /// Instance name.
    pub name: String,
    /// Trucks used by the best solution.
    pub trucks: usize,
    /// Total service workers deployed.
    pub workers: usize,
    /// Total travelled distance.
    pub distance: f64,
    /// Objective value.
    pub cost: f64,
    /// Seconds until the best solution was found.
    pub time: u64,
    /// Seconds until the solution cache saturated, or 0.
    pub saturation_time: u64,
}

/// Prints the aggregated results in the configured format.
pub fn print_results(results: &[InstanceResult], cfg: &Config) -> Result<(), SolverError> {
    if results.is_empty() {
        return Ok(());
    }
    match cfg.format {
        OutputFormat::Csv => print_csv(results, cfg),
        OutputFormat::Human => {
            print_human(results, cfg);
            Ok(())
        }
    }
}

fn time_column(result: &InstanceResult, cfg: &Config) -> String {
    if cfg.metaheuristic == Metaheuristic::None {
        "n/a".to_string()
    } else {
        result.time.to_string()
    }
}

fn print_csv(results: &[InstanceResult], cfg: &Config) -> Result<(), SolverError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(io::stdout());
    if cfg.verbosity >= 1 {
        writer.write_record(["name", "trucks", "workers", "distance", "cost", "time [s]"])?;
    }
    for result in results {
        let mut record = vec![
            result.name.clone(),
            result.trucks.to_string(),
            result.workers.to_string(),
            format!("{:.2}", result.distance),
            format!("{:.6}", result.cost),
            time_column(result, cfg),
        ];
        if result.saturation_time > 0 {
            record.push(result.saturation_time.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_human(results: &[InstanceResult], cfg: &Config) {
    let rule = "|------------+--------+---------+----------+------------+----------|";
    println!("{rule}");
    println!("| name       | trucks | workers | distance |  cost      | time [s] |");
    println!("{rule}");
    let mut sums = (0usize, 0usize, 0.0f64, 0.0f64, 0u64);
    for result in results {
        println!(
            "| {:>10} | {:>6} | {:>7} | {:>8.2} | {:>10.6} | {:>8} |",
            result.name,
            result.trucks,
            result.workers,
            result.distance,
            result.cost,
            time_column(result, cfg),
        );
        sums.0 += result.trucks;
        sums.1 += result.workers;
        sums.2 += result.distance;
        sums.3 += result.cost;
        sums.4 += result.time;
    }
    println!("{rule}");
    let count = results.len();
    if count > 1 {
        println!(
            "| {:>10} | {:>6} | {:>7} | {:>8.2} | {:>10.6} | {:>8} |",
            "sum", sums.0, sums.1, sums.2, sums.3, sums.4,
        );
        let n = count as f64;
        println!(
            "| {:>10} | {:>6.2} | {:>7.2} | {:>8.2} | {:>10.6} | {:>8.2} |",
            "avg",
            sums.0 as f64 / n,
            sums.1 as f64 / n,
            sums.2 / n,
            sums.3 / n,
            sums.4 as f64 / n,
        );
        println!("{rule}");
    }
}

/// One-line summary of a solution (caches must be fresh).
pub fn summary_line(sol: &Solution) -> String {
    format!(
        "trucks: {}, workers: {}, distance: {:.2}, cost: {:.6}",
        sol.trucks(),
        sol.workers_cache(),
        sol.dist_cache(),
        sol.cost_cache()
    )
}

/// Renders every route of a solution plus the summary line.
pub fn render_solution(pb: &Problem, sol: &Solution) -> String {
    let mut out = String::new();
    for route in sol.routes() {
        let _ = writeln!(out, "{}", route.describe(pb));
    }
    let _ = writeln!(out, "{}", summary_line(sol));
    out
}

/// Prints the best solution to stdout with a highlighted summary.
pub fn print_solution(pb: &Problem, sol: &Solution) {
    for route in sol.routes() {
        println!("{}", route.describe(pb));
    }
    println!("{}", summary_line(sol).green());
}

/// Appends one instance's solution details to the details file.
pub fn append_details(path: &str, pb: &Problem, sol: &Solution) -> Result<(), io::Error> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", pb.name())?;
    writeln!(file, "found best solution after {} seconds", sol.time())?;
    write!(file, "{}", render_solution(pb, sol))?;
    writeln!(file)?;
    Ok(())
}
