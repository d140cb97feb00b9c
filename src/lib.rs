//! OP Solver Library
//!
//! A solver for the Orienteering Problem (OP): find a simple path between
//! two fixed vertices whose Euclidean length stays within a travel budget
//! and whose collected vertex score is maximal.
//!
//! # Features
//!
//! - Tabu search metaheuristic with five move neighborhoods (insertion,
//!   replace, relocate, 2-opt, 3-opt), intensification and diversification
//! - Greedy ratio-based constructive heuristic
//! - Exact MIP solver using Gurobi (optional `gurobi` feature)
//! - Instance loading, synthetic instance generation, CSV result ledgers
//!   and SVG visualization
//!
//! # Example
//!
//! ```no_run
//! use op_solver::instance::OPInstance;
//! use op_solver::context::ExecutionContext;
//! use op_solver::tabu::{SearchConfig, TabuSearch};
//! use std::path::Path;
//!
//! // Load instance
//! let op = OPInstance::from_file("instance.txt").unwrap();
//!
//! // Run the tabu search for 10 seconds
//! let mut context = ExecutionContext::new(&op, "default", Path::new("results"));
//! let config = SearchConfig { max_time_sec: 10, ..Default::default() };
//! let best = TabuSearch::new(&op, config).solve(&mut context);
//!
//! println!("Best solution: {}", best);
//! ```

pub mod context;
pub mod exact;
pub mod generator;
pub mod instance;
pub mod solution;
pub mod tabu;
pub mod visualization;

pub use instance::OPInstance;
pub use solution::Solution;
