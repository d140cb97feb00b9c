//! OP Solver - Command Line Interface
//!
//! A solver for the Orienteering Problem combining a tabu search
//! metaheuristic with an exact Gurobi formulation.

use clap::{Parser, Subcommand};
use op_solver::context::ExecutionContext;
use op_solver::exact::{ExactConfig, ExactSolver};
use op_solver::generator::{generate_family, generate_instance, GeneratorConfig};
use op_solver::instance::OPInstance;
use op_solver::tabu::{Evaluator, SearchConfig, TabuSearch};
use op_solver::visualization::Visualizer;

use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "op-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "A tabu search and exact solver for the Orienteering Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tabu search on an instance
    Solve {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Output directory for result CSV files
        #[arg(short, long, default_value = "results")]
        out: PathBuf,

        /// Name recorded in the result files for this configuration
        #[arg(long, default_value = "tabu")]
        config_name: String,

        /// Apply the first improving move in each local-search pass
        /// (default = best improvement)
        #[arg(long)]
        first_improve: bool,

        /// Enable intensification (default = disabled)
        #[arg(long)]
        intensification: bool,

        /// Enable diversification (default = disabled)
        #[arg(long)]
        diversification: bool,

        /// Maximum runtime in seconds
        #[arg(short, long, default_value = "60")]
        max_time: u64,

        /// Stop early once this score is reached
        #[arg(long, default_value = "99999999")]
        target: i32,

        /// Seed for the random generator
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Write the best solution as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Render the best solution as an SVG figure
        #[arg(long)]
        visualize: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Solve an instance exactly (requires the `gurobi` feature)
    Exact {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Output directory for result CSV files
        #[arg(short, long, default_value = "results")]
        out: PathBuf,

        /// Name recorded in the result files for this configuration
        #[arg(long, default_value = "ilp")]
        config_name: String,

        /// Maximum runtime in seconds
        #[arg(short, long, default_value = "60")]
        max_time: u64,

        /// Verbose solver output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate synthetic instances
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "instances")]
        dir: PathBuf,

        /// Instance name prefix
        #[arg(short, long, default_value = "gen")]
        prefix: String,

        /// Number of vertices (single-instance mode)
        #[arg(short, long)]
        n: Option<usize>,

        /// Travel budget (single-instance mode)
        #[arg(short, long)]
        t_max: Option<f64>,

        /// Seed for the random generator
        #[arg(short, long, default_value = "0")]
        seed: u64,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

/// Summary of a solver run, written with `--output`
#[derive(Serialize)]
struct SolveReport {
    instance: String,
    config: String,
    score: i32,
    dist: f64,
    time: f64,
    path: Vec<usize>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            instance,
            out,
            config_name,
            first_improve,
            intensification,
            diversification,
            max_time,
            target,
            seed,
            output,
            visualize,
            verbose,
        } => {
            solve_instance(
                &instance,
                &out,
                &config_name,
                SearchConfig {
                    first_improve,
                    enable_intensification: intensification,
                    enable_diversification: diversification,
                    max_time_sec: max_time,
                    target,
                    seed,
                },
                output,
                visualize,
                verbose,
            );
        }

        Commands::Exact { instance, out, config_name, max_time, verbose } => {
            solve_exact(&instance, &out, &config_name, max_time, verbose);
        }

        Commands::Generate { dir, prefix, n, t_max, seed } => {
            generate(&dir, &prefix, n, t_max, seed);
        }

        Commands::Analyze { instance } => {
            analyze_instance(&instance);
        }
    }
}

fn load_instance(path: &PathBuf) -> OPInstance {
    match OPInstance::from_file(path) {
        Ok(op) => op,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_instance(
    path: &PathBuf,
    out: &PathBuf,
    config_name: &str,
    config: SearchConfig,
    output: Option<PathBuf>,
    visualize: bool,
    verbose: bool,
) {
    println!("Loading instance from {:?}...", path);
    let op = load_instance(path);

    if verbose {
        println!("{}", op.statistics());
        println!("Config: {:?}", config);
    }

    std::fs::create_dir_all(out).expect("Failed to create output directory");
    let mut context = ExecutionContext::new(&op, config_name, out);

    println!("Running tabu search for up to {}s...", config.max_time_sec);
    let start = std::time::Instant::now();
    let best = TabuSearch::new(&op, config).solve(&mut context);
    let elapsed = start.elapsed().as_secs_f64();

    let evaluator = Evaluator::new(&op);
    let score = evaluator.total_score(&best);
    let dist = evaluator.total_dist(&best);

    println!("\n========== Results ==========");
    println!("Instance: {}", op.name);
    println!("Score: {}", score);
    println!("Distance: {:.2} (budget {:.2})", dist, op.t_max);
    println!("Vertices visited: {} / {}", best.vertices().len(), op.n);
    println!("Time: {:.2}s", elapsed);

    if verbose {
        println!("\nPath: {:?}", best.vertices());
    }

    context.export_improves_csv().expect("Failed to export improvement ledger");
    context.export_improve_scores_csv().expect("Failed to export score ledger");
    context.export_best_csv().expect("Failed to export summary");
    println!("\nLedgers written to {:?}", out);

    if let Some(out_path) = output {
        let report = SolveReport {
            instance: op.name.clone(),
            config: config_name.to_string(),
            score,
            dist,
            time: elapsed,
            path: best.vertices(),
        };
        let json = serde_json::to_string_pretty(&report).unwrap();
        std::fs::write(&out_path, json).expect("Failed to write output");
        println!("Solution saved to {:?}", out_path);
    }

    if visualize {
        let viz = Visualizer::new();
        let svg = viz.generate_svg(&op, &best);
        let svg_path = path.with_extension("svg");
        match viz.save_svg(&svg, &svg_path) {
            Ok(()) => println!("Visualization saved to {:?}", svg_path),
            Err(e) => eprintln!("Failed to save visualization: {}", e),
        }
    }
}

fn solve_exact(path: &PathBuf, out: &PathBuf, config_name: &str, max_time: u64, verbose: bool) {
    println!("Loading instance from {:?}...", path);
    let op = load_instance(path);

    std::fs::create_dir_all(out).expect("Failed to create output directory");
    let mut context = ExecutionContext::new(&op, config_name, out);

    let config = ExactConfig {
        time_limit: max_time as f64,
        verbose,
        ..Default::default()
    };

    let solver = ExactSolver::new(config);
    match solver.solve(&op) {
        Ok(result) => {
            println!("\n========== Results ==========");
            println!("Status: {}", result.status);
            println!("Score: {:.0}", result.score);
            println!("Upper bound: {:.2}", result.upper_bound);
            println!("Gap: {:.4}%", result.gap * 100.0);
            println!("Nodes explored: {}", result.nodes_explored);
            println!("Time: {:.2}s", result.runtime);

            context.add_improve(&op, &result.solution, result.runtime);
            context.set_exact_bounds(result.upper_bound, result.gap * 100.0, result.optimal);

            context.export_improves_csv().expect("Failed to export improvement ledger");
            context.export_best_csv().expect("Failed to export summary");
            println!("\nLedgers written to {:?}", out);
        }
        Err(e) => {
            eprintln!("Exact solver error: {}", e);
            std::process::exit(1);
        }
    }
}

fn generate(dir: &PathBuf, prefix: &str, n: Option<usize>, t_max: Option<f64>, seed: u64) {
    std::fs::create_dir_all(dir).expect("Failed to create instance directory");

    if n.is_some() || t_max.is_some() {
        let config = GeneratorConfig {
            n: n.unwrap_or(300),
            t_max: t_max.unwrap_or(300.0),
            seed,
            ..Default::default()
        };
        let name = format!("{}_{}_{}.txt", prefix, config.n, config.t_max as i64);
        match generate_instance(dir.join(&name), &config) {
            Ok(()) => println!("Generated {:?}", dir.join(&name)),
            Err(e) => {
                eprintln!("Generation failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    match generate_family(dir, prefix, seed) {
        Ok(names) => {
            println!("Generated {} instances in {:?}:", names.len(), dir);
            for name in names {
                println!("  {}", name);
            }
        }
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn analyze_instance(path: &PathBuf) {
    let op = load_instance(path);

    println!("========== Instance Analysis ==========\n");
    println!("{}", op.statistics());

    // quick feasibility probe: greedy construction only
    let mut context = ExecutionContext::new(&op, "analyze", &std::env::temp_dir());
    let config = SearchConfig { max_time_sec: 0, ..Default::default() };
    let constructed = TabuSearch::new(&op, config).solve(&mut context);

    let evaluator = Evaluator::new(&op);
    println!("\nQuick Solution Estimate (greedy construction):");
    println!(
        "  Score: {} / {} | Dist: {:.2} / {:.2} | Visited: {} / {}",
        evaluator.total_score(&constructed),
        op.total_score(),
        evaluator.total_dist(&constructed),
        op.t_max,
        constructed.vertices().len(),
        op.n
    );
}
