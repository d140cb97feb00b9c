//! Execution context: best-so-far tracking and the improvement ledger.
//!
//! The search engines report every improving solution here; the context
//! keeps the best one, appends ledger rows, and exports them as CSV files
//! at the end of a run.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::instance::OPInstance;
use crate::solution::Solution;
use crate::tabu::evaluator::Evaluator;

/// One row of the improvement ledger.
#[derive(Debug, Clone)]
pub struct ImproveRecord {
    pub instance: String,
    pub config: String,
    pub score: i32,
    pub dist: f64,
    pub time: f64,
}

/// Tracks the best solution seen so far and the history of improvements.
pub struct ExecutionContext {
    pub instance_name: String,
    pub config_name: String,
    pub out_dir: PathBuf,

    improves: Vec<ImproveRecord>,
    improves_score: Vec<ImproveRecord>,

    pub best_sol: Option<Solution>,
    pub best_score: Option<i32>,
    pub best_dist: Option<f64>,
    pub best_time: Option<f64>,

    /// Upper bound reported by the exact solver, if it ran
    pub upper_bound: Option<f64>,
    /// Optimality gap in percent, if known
    pub gap: Option<f64>,
    pub is_optimal: Option<bool>,
}

impl ExecutionContext {
    pub fn new(op: &OPInstance, config_name: &str, out_dir: &Path) -> Self {
        ExecutionContext {
            instance_name: op.name.clone(),
            config_name: config_name.to_string(),
            out_dir: out_dir.to_path_buf(),
            improves: Vec::new(),
            improves_score: Vec::new(),
            best_sol: None,
            best_score: None,
            best_dist: None,
            best_time: None,
            upper_bound: None,
            gap: None,
            is_optimal: None,
        }
    }

    /// Record a solution the search considers an improvement.
    ///
    /// Every call appends to the full ledger; the score-only ledger gets a
    /// row only when the collected score strictly increased.
    pub fn add_improve(&mut self, op: &OPInstance, sol: &Solution, time_sec: f64) {
        let evaluator = Evaluator::new(op);
        let score = evaluator.total_score(sol);
        let dist = evaluator.total_dist(sol);

        let record = ImproveRecord {
            instance: self.instance_name.clone(),
            config: self.config_name.clone(),
            score,
            dist,
            time: time_sec,
        };

        if self.best_sol.is_none() || score > self.best_score.unwrap_or(i32::MIN) {
            self.improves_score.push(record.clone());
        }

        self.best_sol = Some(sol.clone());
        self.best_score = Some(score);
        self.best_dist = Some(dist);
        self.best_time = Some(time_sec);

        self.improves.push(record);
    }

    /// Attach the bounds reported by the exact solver.
    pub fn set_exact_bounds(&mut self, upper_bound: f64, gap_percent: f64, is_optimal: bool) {
        self.upper_bound = Some(upper_bound);
        self.gap = Some(gap_percent);
        self.is_optimal = Some(is_optimal);
    }

    /// Export the full improvement ledger to `<out_dir>/improves.csv`.
    pub fn export_improves_csv(&self) -> Result<(), String> {
        self.write_ledger("improves.csv", &self.improves)
    }

    /// Export the score-improvements ledger to `<out_dir>/improve_scores.csv`.
    pub fn export_improve_scores_csv(&self) -> Result<(), String> {
        self.write_ledger("improve_scores.csv", &self.improves_score)
    }

    fn write_ledger(&self, file_name: &str, records: &[ImproveRecord]) -> Result<(), String> {
        let path = self.out_dir.join(file_name);
        let file = File::create(&path)
            .map_err(|e| format!("Cannot create {:?}: {}", path, e))?;
        let mut writer = csv::Writer::from_writer(file);

        writer
            .write_record(["instance", "config", "score", "dist", "time"])
            .map_err(|e| format!("CSV write error: {}", e))?;

        for r in records {
            writer
                .write_record([
                    r.instance.clone(),
                    r.config.clone(),
                    r.score.to_string(),
                    format!("{:.2}", r.dist),
                    format!("{:.2}", r.time),
                ])
                .map_err(|e| format!("CSV write error: {}", e))?;
        }

        writer.flush().map_err(|e| format!("CSV flush error: {}", e))
    }

    /// Export the final summary row to `<out_dir>/best.csv`.
    pub fn export_best_csv(&self) -> Result<(), String> {
        let path = self.out_dir.join("best.csv");
        let file = File::create(&path)
            .map_err(|e| format!("Cannot create {:?}: {}", path, e))?;
        let mut writer = csv::Writer::from_writer(file);

        let fmt_opt = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_default();

        writer
            .write_record(["instance", "config", "score", "dist", "UB", "gap", "time"])
            .map_err(|e| format!("CSV write error: {}", e))?;
        writer
            .write_record([
                self.instance_name.clone(),
                self.config_name.clone(),
                self.best_score.map(|s| s.to_string()).unwrap_or_default(),
                fmt_opt(self.best_dist),
                fmt_opt(self.upper_bound),
                fmt_opt(self.gap),
                fmt_opt(self.best_time),
            ])
            .map_err(|e| format!("CSV write error: {}", e))?;

        writer.flush().map_err(|e| format!("CSV flush error: {}", e))
    }

    pub fn improves(&self) -> &[ImproveRecord] {
        &self.improves
    }

    pub fn score_improves(&self) -> &[ImproveRecord] {
        &self.improves_score
    }
}
