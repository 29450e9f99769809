// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use clap::Parser;
use lotsize_model::loader::InstanceLoader;
use lotsize_solver::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lotsize", about = "Cycle-canceling solver for single-machine lot sizing")]
struct Args {
    /// Path to the instance file.
    file: PathBuf,

    /// Wall-clock budget in seconds.
    #[arg(short = 't', long = "time-limit", default_value_t = 600.0)]
    time_limit: f64,

    /// Enumerate the full cycle space instead of running the local search;
    /// proves optimality when it finishes within the budget.
    #[arg(short = 'e', long)]
    enumerate: bool,

    /// Demands per neighbourhood of the local search.
    #[arg(short = 'n', long = "neighbourhood", default_value_t = 4)]
    neighbourhood: usize,

    /// Start from a random feasible schedule instead of the
    /// minimum-inventory one.
    #[arg(short = 'r', long)]
    random: bool,

    /// Adopt the best move of each iteration instead of the first.
    #[arg(short = 'g', long = "best-improvement")]
    best_improvement: bool,

    /// Worker threads; defaults to the number of logical cpus.
    #[arg(long)]
    workers: Option<usize>,

    /// Seed of the random start and the neighborhood shuffle.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn main() -> ExitCode {
    enable_tracing();
    let args = Args::parse();

    if !args.file.is_file() {
        eprintln!("Given file cannot be found.");
        return ExitCode::FAILURE;
    }
    let instance = match InstanceLoader::new().from_path(&args.file) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Failed to load instance: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        slots = instance.num_time_slots(),
        types = instance.num_types(),
        units = instance.num_produced_items(),
        "loaded instance"
    );

    let graph = ProblemGraph::build(&instance);
    let initial = if args.random {
        let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
        graph.random_schedule(&mut rng)
    } else {
        graph.min_inventory_schedule()
    };
    let initial = match initial {
        Ok(schedule) => schedule,
        Err(e) => {
            eprintln!("Instance is infeasible: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("Initial schedule: {} (cost {})", initial, initial.cost());

    let config = SearchConfig {
        acceptance: if args.best_improvement {
            Acceptance::BestImprovement
        } else {
            Acceptance::FirstImprovement
        },
        num_workers: args
            .workers
            .map(|w| w.max(1))
            .unwrap_or_else(|| SearchConfig::default().num_workers),
        seed: args.seed,
        ..SearchConfig::default()
    };
    let time_limit = Duration::from_secs_f64(args.time_limit.max(0.0));

    let start = Instant::now();
    let (best, optimality_proven) = if args.enumerate {
        let mut solver = ExhaustiveSearch::new(&graph, config);
        let best = solver.search(initial, time_limit);
        let proven = solver.search_space_exhausted();
        (best, proven)
    } else {
        let mut solver = LocalSearch::new(&graph, args.neighbourhood, config);
        (solver.search(initial, time_limit), false)
    };
    let runtime = start.elapsed();

    println!("Best schedule: {best}");
    println!("Changeover cost: {}", best.changeover_cost());
    println!("Inventory cost: {}", best.inventory_cost());
    println!("Total cost: {}", best.cost());
    if optimality_proven {
        println!("The search space was exhausted; the schedule is optimal.");
    }
    tracing::info!(runtime_ms = runtime.as_millis() as u64, "done");
    ExitCode::SUCCESS
}
