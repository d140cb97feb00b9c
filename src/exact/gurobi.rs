//! Exact OP solver using Gurobi.
//!
//! Mixed Integer Programming formulation of the Orienteering Problem:
//! - Binary variables x[i][j] for arcs of the path
//! - Integer variables u[i] for MTZ subtour elimination
//! - Objective: maximize the score collected by visited vertices
//! - One budget constraint bounding the total arc length by t_max

#[cfg(feature = "gurobi")]
use crate::instance::OPInstance;
#[cfg(feature = "gurobi")]
use crate::solution::Solution;
#[cfg(feature = "gurobi")]
use grb::prelude::*;

/// Exact solver configuration
#[derive(Debug, Clone)]
pub struct ExactConfig {
    /// Time limit in seconds
    pub time_limit: f64,
    /// MIP gap tolerance
    pub mip_gap: f64,
    /// Number of threads (0 = automatic)
    pub threads: i32,
    /// Enable verbose output
    pub verbose: bool,
    /// Warm start from a heuristic solution
    pub warm_start: Option<Solution>,
}

impl Default for ExactConfig {
    fn default() -> Self {
        ExactConfig {
            time_limit: 3600.0,
            mip_gap: 1e-6,
            threads: 0,
            verbose: false,
            warm_start: None,
        }
    }
}

/// Result of exact solving
#[derive(Debug, Clone)]
pub struct ExactResult {
    /// Best solution found
    pub solution: Solution,
    /// Score of the best integer solution
    pub score: f64,
    /// Best bound on the achievable score
    pub upper_bound: f64,
    /// Optimality gap
    pub gap: f64,
    /// Whether an optimal solution was proven
    pub optimal: bool,
    /// Solver status
    pub status: String,
    /// Number of branch-and-bound nodes explored
    pub nodes_explored: i64,
    /// Solver runtime in seconds
    pub runtime: f64,
}

/// Gurobi-based exact solver for the OP
pub struct ExactSolver {
    config: ExactConfig,
}

impl ExactSolver {
    pub fn new(config: ExactConfig) -> Self {
        ExactSolver { config }
    }

    /// Solve the OP to optimality (or near-optimality within the time limit)
    pub fn solve(&self, instance: &OPInstance) -> Result<ExactResult, String> {
        let start = std::time::Instant::now();
        let n = instance.n;

        let env = Env::new("")
            .map_err(|e| format!("Failed to create Gurobi environment: {}", e))?;

        let mut model = Model::with_env("op", env)
            .map_err(|e| format!("Failed to create model: {}", e))?;

        model.set_param(param::TimeLimit, self.config.time_limit)
            .map_err(|e| format!("Failed to set time limit: {}", e))?;
        model.set_param(param::MIPGap, self.config.mip_gap)
            .map_err(|e| format!("Failed to set MIP gap: {}", e))?;
        model.set_param(param::Threads, self.config.threads)
            .map_err(|e| format!("Failed to set threads: {}", e))?;

        if !self.config.verbose {
            model.set_param(param::OutputFlag, 0)
                .map_err(|e| format!("Failed to set output flag: {}", e))?;
        }

        // x[i][j] = 1 if arc (i,j) is on the path
        let mut x: Vec<Vec<Var>> = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Vec::with_capacity(n);
            for j in 0..n {
                let var = add_binvar!(model, name: &format!("x_{}_{}", i, j))
                    .map_err(|e| format!("Failed to add variable x[{}][{}]: {}", i, j, e))?;
                row.push(var);
            }
            x.push(row);
        }

        // u[i] = position of vertex i on the path (MTZ subtour elimination)
        let mut u: Vec<Var> = Vec::with_capacity(n);
        for i in 0..n {
            let var = add_intvar!(model, name: &format!("u_{}", i), bounds: 0..n as i32)
                .map_err(|e| format!("Failed to add variable u[{}]: {}", i, e))?;
            u.push(var);
        }

        model.update()
            .map_err(|e| format!("Failed to update model: {}", e))?;

        // maximize the score collected by interior departures
        let objective: Expr = (1..n - 1)
            .flat_map(|i| (1..n).map(move |j| (i, j)))
            .map(|(i, j)| instance.score(i) as f64 * x[i][j])
            .grb_sum();
        model.set_objective(objective, Maximize)
            .map_err(|e| format!("Failed to set objective: {}", e))?;

        // no self-loops
        let self_loops: Expr = (0..n).map(|i| x[i][i]).grb_sum();
        model.add_constr("no_self_loops", c!(self_loops == 0.0))
            .map_err(|e| format!("Failed to add self-loop constraint: {}", e))?;

        // the path leaves the start vertex exactly once
        let start_out: Expr = (1..n).map(|j| x[0][j]).grb_sum();
        model.add_constr("start_out", c!(start_out == 1.0))
            .map_err(|e| format!("Failed to add start constraint: {}", e))?;

        // the path enters the end vertex exactly once
        let end_in: Expr = (0..n - 1).map(|i| x[i][n - 1]).grb_sum();
        model.add_constr("end_in", c!(end_in == 1.0))
            .map_err(|e| format!("Failed to add end constraint: {}", e))?;

        // interior vertices: at most one visit, inflow matches outflow
        for k in 1..n - 1 {
            let arcs_in: Expr = (0..n - 1).map(|i| x[i][k]).grb_sum();
            let arcs_out: Expr = (1..n).map(|i| x[k][i]).grb_sum();

            model.add_constr(&format!("in_{}", k), c!(arcs_in.clone() <= 1.0))
                .map_err(|e| format!("Failed to add in-degree constraint: {}", e))?;
            model.add_constr(&format!("out_{}", k), c!(arcs_out.clone() <= 1.0))
                .map_err(|e| format!("Failed to add out-degree constraint: {}", e))?;
            model.add_constr(&format!("flow_{}", k), c!(arcs_in == arcs_out))
                .map_err(|e| format!("Failed to add flow constraint: {}", e))?;
        }

        // travel budget
        let travelled: Expr = (0..n - 1)
            .flat_map(|i| (1..n).map(move |j| (i, j)))
            .filter(|&(i, j)| i != j)
            .map(|(i, j)| instance.distance(i, j) * x[i][j])
            .grb_sum();
        model.add_constr("budget", c!(travelled <= instance.t_max))
            .map_err(|e| format!("Failed to add budget constraint: {}", e))?;

        // MTZ ordering over interior vertices
        for i in 1..n - 1 {
            model.add_constr(&format!("u_lb_{}", i), c!(u[i] >= 2.0))
                .map_err(|e| format!("Failed to add MTZ bound: {}", e))?;
            model.add_constr(&format!("u_ub_{}", i), c!(u[i] <= (n - 1) as f64))
                .map_err(|e| format!("Failed to add MTZ bound: {}", e))?;
        }
        for i in 1..n - 1 {
            for j in 1..n - 1 {
                model.add_constr(
                    &format!("mtz_{}_{}", i, j),
                    c!(u[i] - u[j] + 1.0 <= (n - 2) as f64 * (1.0 - x[i][j])),
                )
                .map_err(|e| format!("Failed to add MTZ constraint: {}", e))?;
            }
        }

        // warm start from a heuristic path
        if let Some(ref warm) = self.config.warm_start {
            for i in 0..n {
                for j in 0..n {
                    model.set_obj_attr(attr::Start, &x[i][j], 0.0)
                        .map_err(|e| format!("Failed to initialize warm start: {}", e))?;
                }
            }
            for (i, link) in warm.next.iter().enumerate() {
                if let Some(j) = link {
                    model.set_obj_attr(attr::Start, &x[i][*j], 1.0)
                        .map_err(|e| format!("Failed to set warm start arc: {}", e))?;
                }
            }
        }

        model.update()
            .map_err(|e| format!("Failed to update model before optimization: {}", e))?;

        model.optimize()
            .map_err(|e| format!("Optimization failed: {}", e))?;

        let status = model.status()
            .map_err(|e| format!("Failed to get status: {}", e))?;

        let status_str = match status {
            Status::Optimal => "Optimal",
            Status::TimeLimit => "TimeLimit",
            Status::Infeasible => "Infeasible",
            Status::InfOrUnbd => "InfeasibleOrUnbounded",
            Status::Unbounded => "Unbounded",
            Status::NodeLimit => "NodeLimit",
            Status::SolutionLimit => "SolutionLimit",
            _ => "Unknown",
        };

        let score: f64;
        let upper_bound: f64;
        let gap: f64;
        let optimal: bool;
        let nodes: i64;
        let mut arcs: Vec<(usize, usize)> = Vec::new();

        if status == Status::Optimal || status == Status::TimeLimit || status == Status::SolutionLimit {
            score = model.get_attr(attr::ObjVal).unwrap_or(0.0);
            upper_bound = model.get_attr(attr::ObjBound).unwrap_or(f64::INFINITY);
            gap = model.get_attr(attr::MIPGap).unwrap_or(1.0);
            optimal = status == Status::Optimal;
            nodes = model.get_attr(attr::NodeCount).unwrap_or(0.0) as i64;

            for i in 0..n {
                for j in 0..n {
                    let val = model.get_obj_attr(attr::X, &x[i][j]).unwrap_or(0.0);
                    if val > 0.5 {
                        arcs.push((i, j));
                    }
                }
            }
        } else {
            score = 0.0;
            upper_bound = f64::INFINITY;
            gap = 1.0;
            optimal = false;
            nodes = 0;
        }

        let solution = if arcs.is_empty() {
            Solution::trivial(n)
        } else {
            Solution::from_arcs(n, &arcs)
        };

        Ok(ExactResult {
            solution,
            score,
            upper_bound,
            gap,
            optimal,
            status: status_str.to_string(),
            nodes_explored: nodes,
            runtime: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[ignore]
    fn test_exact_solver() {
    }
}
