//! Board-solving command line front end.
//!
//! Loads a JSON board configuration, renders the board, dispatches on
//! terminal count, and prints the outcome (re-rendering the board after
//! a successful chain solve).

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use leyline::{render, Config, Error, Solution};

#[derive(Parser)]
#[command(name = "leyline", version, about = "Connect aspect terminals on a hex board")]
struct Args {
    /// Path to a JSON board configuration.
    config: PathBuf,

    /// Print the aspect table before solving.
    #[arg(long)]
    aspects: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> leyline::Result<()> {
    let config = Config::from_path(&args.config)?;
    let (registry, mut grid) = config.build()?;

    if args.aspects {
        print_aspect_table(&registry);
    }

    println!("Grid size: {}", grid.side_length());
    println!("Terminals: {}", grid.terminals().len());
    println!("{}", render::render(&grid, &registry));

    let started = Instant::now();
    let solution = leyline::solve(&mut grid, &registry);
    let elapsed = started.elapsed();

    match solution {
        Ok(Solution::Chain(chain)) => {
            println!(
                "Connected in {elapsed:.2?}: {} cells, {} new placements",
                chain.len(),
                chain.cost,
            );
            for placement in &chain.placements {
                let name = registry
                    .get(placement.aspect)
                    .map(|aspect| aspect.name().to_string())
                    .unwrap_or_else(|_| placement.aspect.to_string());
                println!("  {name} at {}", placement.position);
            }
            println!("{}", render::render(&grid, &registry));
        }
        Ok(Solution::Tree { cost }) => {
            println!("Steiner cost: {cost} (solved in {elapsed:.2?})");
        }
        Err(err @ (Error::NoPath | Error::NoTree)) => {
            println!("No solution: {err} (searched for {elapsed:.2?})");
        }
        Err(err) => return Err(err),
    }

    Ok(())
}

fn print_aspect_table(registry: &leyline::AspectRegistry) {
    println!("Aspects:");
    for (id, aspect) in registry.iter() {
        match aspect.parents() {
            None => println!("  {id} {} ({})", aspect.name(), aspect.tier()),
            Some((parent1, parent2)) => {
                let name_of = |id| {
                    registry
                        .get(id)
                        .map(|aspect| aspect.name().to_string())
                        .unwrap_or_else(|_| "?".to_string())
                };
                println!(
                    "  {id} {} ({}) = {} + {}",
                    aspect.name(),
                    aspect.tier(),
                    name_of(parent1),
                    name_of(parent2),
                );
            }
        }
    }
    println!();
}
