mod action;
mod distance;
mod heuristic;
mod level;
mod pqueue;
mod protocol;
mod solver;
mod state;
mod strategy;
mod topology;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use heuristic::{Evaluation, Heuristic, HeuristicContext};
use level::Level;
use protocol::{ExecutionError, Server};
use solver::{Limits, SolveResult, Solver, SuccessorOrder};
use std::io::{self, BufReader};
use std::path::PathBuf;
use strategy::Strategy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyType {
    Bfs,
    Dfs,
    Astar,
    Wastar,
    Greedy,
}

#[derive(Parser)]
#[command(name = "searchclient")]
#[command(about = "A single-agent search client for box-pushing levels", long_about = None)]
struct Args {
    /// Search strategy
    #[arg(short, long, value_enum, default_value = "bfs")]
    strategy: StrategyType,

    /// Weight of the heuristic for weighted A*
    #[arg(short = 'w', long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    weight: u32,

    /// Maximum number of states to generate before giving up
    #[arg(short = 'n', long, default_value = "10000000")]
    max_states: usize,

    /// Maximum estimated memory of the search tree, in megabytes
    #[arg(short = 'm', long)]
    max_memory_mb: Option<usize>,

    /// Seed for the successor shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Expand successors in a fixed order instead of shuffling them
    #[arg(long, default_value = "false")]
    fixed_order: bool,

    /// Solve a level file and print the plan instead of talking to a server
    #[arg(short, long, value_name = "FILE")]
    level: Option<PathBuf>,
}

impl Args {
    fn limits(&self) -> Limits {
        Limits {
            max_states: self.max_states,
            max_memory_bytes: self.max_memory_mb.map(|mb| mb.saturating_mul(1024 * 1024)),
        }
    }

    /// How best-first strategies rank nodes; `None` for uninformed search.
    fn evaluation(&self) -> Option<Evaluation> {
        match self.strategy {
            StrategyType::Bfs | StrategyType::Dfs => None,
            StrategyType::Astar => Some(Evaluation::AStar),
            StrategyType::Wastar => Some(Evaluation::WeightedAStar(self.weight)),
            StrategyType::Greedy => Some(Evaluation::Greedy),
        }
    }

    fn successor_order(&self) -> SuccessorOrder {
        if self.fixed_order {
            SuccessorOrder::Fixed
        } else {
            SuccessorOrder::shuffled(self.seed)
        }
    }
}

fn search(level: &Level, args: &Args) -> anyhow::Result<SolveResult> {
    // Distance tables are only built for informed search.
    let context;
    let strategy = match (args.strategy, args.evaluation()) {
        (_, Some(evaluation)) => {
            context = HeuristicContext::new(&level.topology);
            Strategy::best_first(Heuristic::new(&context, evaluation))
        }
        (StrategyType::Dfs, None) => Strategy::dfs(),
        (_, None) => Strategy::bfs(),
    };

    let mut solver = Solver::new(
        &level.topology,
        level.initial.clone(),
        strategy,
        args.limits(),
        args.successor_order(),
    )?;
    Ok(solver.solve())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(path) = &args.level {
        let level = Level::from_file(path)
            .with_context(|| format!("Failed to load level {}", path.display()))?;
        match search(&level, &args)? {
            SolveResult::Solved(plan) => {
                for action in plan {
                    println!("{}", action);
                }
            }
            SolveResult::Impossible | SolveResult::Cutoff => {
                tracing::info!("Unable to solve level.");
            }
        }
        return Ok(());
    }

    tracing::info!("SearchClient initializing.");
    let mut server = Server::new(BufReader::new(io::stdin()), io::stdout());
    let level = server.read_level().context("Failed to read level from server")?;

    let plan = match search(&level, &args)? {
        SolveResult::Solved(plan) => plan,
        SolveResult::Impossible | SolveResult::Cutoff => {
            tracing::info!("Unable to solve level.");
            return Ok(());
        }
    };

    match server.execute(&level, &plan) {
        Ok(()) => Ok(()),
        Err(err @ ExecutionError::Rejected { .. }) => {
            tracing::error!("{}", err);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
