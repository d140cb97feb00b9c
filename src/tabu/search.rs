//! Tabu search metaheuristic for the OP.
//!
//! The search starts from a greedy constructive solution and iterates a
//! layered local search: insertion and replace passes first (score-driven),
//! then relocate and 2-opt passes (distance-driven), with an intensified
//! sweep (free-site replace and 3-opt) on stagnation and a destructive
//! diversification of the best solution after prolonged non-improvement.
//! At a local optimum a random non-improving candidate is applied and
//! registered in the tabu list; aspiration lets a tabu move through when it
//! would beat the global best on its own metric.

use std::time::Instant;

use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::context::ExecutionContext;
use crate::instance::OPInstance;
use crate::solution::Solution;
use crate::tabu::evaluator::Evaluator;
use crate::tabu::moves::Move;
use crate::tabu::tabu_list::TabuList;

/// Iterations of non-improvement after which diversification fires.
const DIVERSIFICATION_THRESHOLD: usize = 50;

/// Search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Apply the first qualifying move in each pass instead of the best one
    pub first_improve: bool,
    /// Enable the intensified sweep on stagnation
    pub enable_intensification: bool,
    /// Enable diversification from the best solution
    pub enable_diversification: bool,
    /// Wall-clock budget in seconds
    pub max_time_sec: u64,
    /// Stop early once the best score reaches this value
    pub target: i32,
    /// Seed for the engine's random generator
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            first_improve: false,
            enable_intensification: false,
            enable_diversification: false,
            max_time_sec: 60,
            target: 99_999_999,
            seed: 0,
        }
    }
}

/// Best candidate moves per criterion, collected during one local-search
/// step, plus the metrics the aspiration criterion compares against.
struct LocalSearchState {
    best_delta_dist: f64,
    best_dist_move: Option<Move>,
    best_delta_score: i32,
    best_score_move: Option<Move>,
    best_delta_ratio: f64,
    best_ratio_move: Option<Move>,

    score_cur_sol: i32,
    dist_cur_sol: f64,
    score_best_sol: i32,
    dist_best_sol: f64,
}

impl LocalSearchState {
    fn new(evaluator: &Evaluator, sol: &Solution, best_sol: &Solution) -> Self {
        LocalSearchState {
            best_delta_dist: f64::INFINITY,
            best_dist_move: None,
            best_delta_score: i32::MIN,
            best_score_move: None,
            best_delta_ratio: f64::NEG_INFINITY,
            best_ratio_move: None,
            score_cur_sol: evaluator.total_score(sol),
            dist_cur_sol: evaluator.total_dist(sol),
            score_best_sol: evaluator.total_score(best_sol),
            dist_best_sol: evaluator.total_dist(best_sol),
        }
    }
}

/// Tabu search engine over one OP instance.
pub struct TabuSearch<'a> {
    op: &'a OPInstance,
    evaluator: Evaluator<'a>,
    config: SearchConfig,
    tabu_list: TabuList,
    rng: ChaCha8Rng,
    sol: Solution,
    best_sol: Solution,
    start: Instant,
}

impl<'a> TabuSearch<'a> {
    pub fn new(op: &'a OPInstance, config: SearchConfig) -> Self {
        let tenure = std::cmp::max(3, (op.n as f64 * 0.3) as usize);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        TabuSearch {
            op,
            evaluator: Evaluator::new(op),
            config,
            tabu_list: TabuList::new(tenure),
            rng,
            sol: Solution::trivial(op.n),
            best_sol: Solution::trivial(op.n),
            start: Instant::now(),
        }
    }

    /// Run the search until the wall-clock budget is spent, the tour is
    /// Hamiltonian, or the target score is reached. Returns the best
    /// solution found; improvements are reported to `context` as they
    /// happen.
    pub fn solve(&mut self, context: &mut ExecutionContext) -> Solution {
        self.start = Instant::now();

        self.constructive_heuristic(context);
        self.best_sol = self.sol.clone();

        let mut itr = 0usize;
        let mut last_solution_change_itr = 0usize;

        while self.time_elapsed() < self.config.max_time_sec as f64
            && !self.best_sol.is_complete()
            && self.evaluator.total_score(&self.best_sol) < self.config.target
        {
            self.local_search(itr, last_solution_change_itr);

            if self.update_best_sol() {
                last_solution_change_itr = itr;
                info!(
                    "best sol improved at itr {}: score={}, dist={:.2}",
                    itr,
                    self.evaluator.total_score(&self.best_sol),
                    self.evaluator.total_dist(&self.best_sol)
                );
                let elapsed = self.time_elapsed();
                context.add_improve(self.op, &self.best_sol, elapsed);
            }

            if self.trigger_diversification_criteria(itr, last_solution_change_itr) {
                last_solution_change_itr = itr;
                self.diversify();
            }

            itr += 1;
        }

        info!(
            "search finished after {} iterations, {:.2}s: {}",
            itr,
            self.time_elapsed(),
            self.best_sol
        );

        self.best_sol.clone()
    }

    /// Greedy construction: repeatedly apply the feasible insertion with the
    /// best score-per-distance ratio until none remains.
    fn constructive_heuristic(&mut self, context: &mut ExecutionContext) {
        self.sol = Solution::trivial(self.op.n);

        loop {
            let best_candidate = self
                .evaluator
                .insertion_candidates(&self.sol)
                .max_by_key(|mv| OrderedFloat(mv.delta_ratio().unwrap_or(f64::NEG_INFINITY)));

            match best_candidate {
                Some(mv) => {
                    mv.apply(&mut self.sol);
                    let elapsed = self.time_elapsed();
                    context.add_improve(self.op, &self.sol, elapsed);
                }
                None => break,
            }
        }

        info!("finished construction phase, {}", self.sol);
    }

    /// One step of the layered local search; the first pass that applies a
    /// move wins.
    fn local_search(&mut self, itr: usize, last_solution_change_itr: usize) {
        self.tabu_list.update(itr);

        let mut state = LocalSearchState::new(&self.evaluator, &self.sol, &self.best_sol);

        if self.search_insertion(&mut state) {
            return;
        }

        if self.search_replace(&mut state) {
            return;
        }

        if state.best_delta_score > 0 {
            if let Some(mv) = state.best_score_move {
                if !self.is_move_forbidden(&mv, &state, true) {
                    debug!("applying best score move: {}", mv);
                    mv.apply(&mut self.sol);
                    return;
                }
            }
        }

        if state.best_delta_ratio > 0.0 {
            if let Some(mv) = state.best_ratio_move {
                if !self.is_move_forbidden(&mv, &state, true) {
                    debug!("applying best ratio move: {}", mv);
                    mv.apply(&mut self.sol);
                    return;
                }
            }
        }

        if self.search_relocate(&mut state) {
            return;
        }

        if self.search_two_opt(&mut state) {
            return;
        }

        if state.best_delta_dist < 0.0 {
            if let Some(mv) = state.best_dist_move {
                if !self.is_move_forbidden(&mv, &state, false) {
                    debug!("applying best dist move: {}", mv);
                    mv.apply(&mut self.sol);
                    return;
                }
            }
        }

        if self.trigger_intensification_criteria(itr, last_solution_change_itr)
            && self.intensification_search()
        {
            debug!("intensification improved sol at itr {}", itr);
            return;
        }

        debug!("local optimum at itr {}: {}", itr, self.sol);
        self.apply_non_improving_move(&state, itr);
    }

    /// Escape a local optimum: apply a uniformly random non-tabu candidate
    /// among the recorded best moves and make it tabu.
    fn apply_non_improving_move(&mut self, state: &LocalSearchState, itr: usize) {
        let valid_moves: Vec<Move> = [state.best_dist_move, state.best_score_move, state.best_ratio_move]
            .into_iter()
            .flatten()
            .filter(|mv| !self.tabu_list.is_tabu(mv))
            .collect();

        match valid_moves.choose(&mut self.rng) {
            Some(mv) => {
                debug!("applying non-improving {} move: {}", mv.kind(), mv);
                mv.apply(&mut self.sol);
                self.tabu_list.add(mv, itr);
            }
            None => debug!("no valid candidates for non-improving move"),
        }
    }

    /// Insertion pass, driven by the score-per-distance ratio.
    fn search_insertion(&mut self, state: &mut LocalSearchState) -> bool {
        let mut applied: Option<Move> = None;

        for mv in self.evaluator.insertion_candidates(&self.sol) {
            let delta_ratio = mv.delta_ratio().unwrap_or(f64::NEG_INFINITY);

            if self.is_move_forbidden(&mv, state, true) {
                continue;
            }

            if self.config.first_improve && delta_ratio > 0.0 {
                applied = Some(mv);
                break;
            }

            if delta_ratio > state.best_delta_ratio {
                state.best_delta_ratio = delta_ratio;
                state.best_ratio_move = Some(mv);
            }
        }

        if let Some(mv) = applied {
            debug!("applying insertion move (first-improve): {}", mv);
            mv.apply(&mut self.sol);
            return true;
        }
        false
    }

    /// Replace pass. Candidates split in three cases: equal score (judged
    /// on distance), dominating (better score and shorter), and
    /// ratio-improving (better score at a distance cost).
    fn search_replace(&mut self, state: &mut LocalSearchState) -> bool {
        let mut applied: Option<Move> = None;

        for mv in self.evaluator.replace_candidates(&self.sol) {
            let delta_score = mv.delta_score().unwrap_or(0);
            let delta_dist = mv.delta_distance();
            let delta_ratio = mv.delta_ratio().unwrap_or(0.0);

            if delta_score == 0 {
                if self.is_move_forbidden(&mv, state, false) {
                    continue;
                }

                if self.config.first_improve && delta_dist < 0.0 {
                    applied = Some(mv);
                    break;
                }

                if delta_dist < state.best_delta_dist {
                    state.best_delta_dist = delta_dist;
                    state.best_dist_move = Some(mv);
                }
            } else if delta_dist < 0.0 {
                if self.is_move_forbidden(&mv, state, true) {
                    continue;
                }

                if self.config.first_improve {
                    applied = Some(mv);
                    break;
                }

                if delta_score > state.best_delta_score {
                    state.best_delta_score = delta_score;
                    state.best_score_move = Some(mv);
                }
            } else {
                // delta_score > 0, delta_dist >= 0
                if self.is_move_forbidden(&mv, state, true) {
                    continue;
                }

                if self.config.first_improve && delta_ratio > 0.0 {
                    applied = Some(mv);
                    break;
                }

                if delta_ratio > state.best_delta_ratio {
                    state.best_delta_ratio = delta_ratio;
                    state.best_ratio_move = Some(mv);
                }
            }
        }

        if let Some(mv) = applied {
            debug!("applying replace move (first-improve): {}", mv);
            mv.apply(&mut self.sol);
            return true;
        }
        false
    }

    /// Replace pass over every insertion site; no tabu filtering, used only
    /// inside the intensified sweep.
    fn search_intensified_replace(&mut self, state: &mut LocalSearchState) -> bool {
        let mut applied: Option<Move> = None;

        for mv in self.evaluator.intensified_replace_candidates(&self.sol) {
            let delta_score = mv.delta_score().unwrap_or(0);
            let delta_dist = mv.delta_distance();
            let delta_ratio = mv.delta_ratio().unwrap_or(0.0);

            if delta_score == 0 {
                if self.config.first_improve && delta_dist < 0.0 {
                    applied = Some(mv);
                    break;
                }

                if delta_dist < state.best_delta_dist {
                    state.best_delta_dist = delta_dist;
                    state.best_dist_move = Some(mv);
                }
            } else if delta_dist < 0.0 {
                if self.config.first_improve {
                    applied = Some(mv);
                    break;
                }

                if delta_score > state.best_delta_score {
                    state.best_delta_score = delta_score;
                    state.best_score_move = Some(mv);
                }
            } else {
                if self.config.first_improve && delta_ratio > 0.0 {
                    applied = Some(mv);
                    break;
                }

                if delta_ratio > state.best_delta_ratio {
                    state.best_delta_ratio = delta_ratio;
                    state.best_ratio_move = Some(mv);
                }
            }
        }

        if let Some(mv) = applied {
            debug!("intensification: applying replace move (first-improve): {}", mv);
            mv.apply(&mut self.sol);
            return true;
        }
        false
    }

    /// Relocate pass, distance-driven.
    fn search_relocate(&mut self, state: &mut LocalSearchState) -> bool {
        let mut applied: Option<Move> = None;

        for mv in self.evaluator.relocate_candidates(&self.sol) {
            let delta_dist = mv.delta_distance();

            if self.is_move_forbidden(&mv, state, false) {
                continue;
            }

            if self.config.first_improve && delta_dist < 0.0 {
                applied = Some(mv);
                break;
            }

            if delta_dist < state.best_delta_dist {
                state.best_delta_dist = delta_dist;
                state.best_dist_move = Some(mv);
            }
        }

        if let Some(mv) = applied {
            debug!("applying relocate move (first-improve): {}", mv);
            mv.apply(&mut self.sol);
            return true;
        }
        false
    }

    /// 2-opt pass, distance-driven.
    fn search_two_opt(&mut self, state: &mut LocalSearchState) -> bool {
        let mut applied: Option<Move> = None;

        for mv in self.evaluator.two_opt_candidates(&self.sol) {
            let delta_dist = mv.delta_distance();

            if self.is_move_forbidden(&mv, state, false) {
                continue;
            }

            if self.config.first_improve && delta_dist < 0.0 {
                applied = Some(mv);
                break;
            }

            if delta_dist < state.best_delta_dist {
                state.best_delta_dist = delta_dist;
                state.best_dist_move = Some(mv);
            }
        }

        if let Some(mv) = applied {
            debug!("applying 2-opt move (first-improve): {}", mv);
            mv.apply(&mut self.sol);
            return true;
        }
        false
    }

    /// 3-opt pass (both variants); no tabu filtering, intensification only.
    fn search_three_opt(&mut self, state: &mut LocalSearchState) -> bool {
        let mut applied: Option<Move> = None;

        for mv in self.evaluator.three_opt_candidates(&self.sol) {
            let delta_dist = mv.delta_distance();

            if self.config.first_improve && delta_dist < 0.0 {
                applied = Some(mv);
                break;
            }

            if delta_dist < state.best_delta_dist {
                state.best_delta_dist = delta_dist;
                state.best_dist_move = Some(mv);
            }
        }

        if let Some(mv) = applied {
            debug!("intensification: applying 3-opt move (first-improve): {}", mv);
            mv.apply(&mut self.sol);
            return true;
        }
        false
    }

    /// Deeper sweep on stagnation: free-site replaces, then the best score,
    /// ratio and distance candidates, then 3-opt.
    fn intensification_search(&mut self) -> bool {
        let mut state = LocalSearchState::new(&self.evaluator, &self.sol, &self.best_sol);

        debug!("intensification...");

        if self.search_intensified_replace(&mut state) {
            return true;
        }

        if state.best_delta_score > 0 {
            if let Some(mv) = state.best_score_move {
                debug!("intensification: applying best score move: {}", mv);
                mv.apply(&mut self.sol);
                return true;
            }
        }

        if state.best_delta_ratio > 0.0 {
            if let Some(mv) = state.best_ratio_move {
                debug!("intensification: applying best ratio move: {}", mv);
                mv.apply(&mut self.sol);
                return true;
            }
        }

        if self.search_three_opt(&mut state) {
            return true;
        }

        if state.best_delta_dist < 0.0 {
            if let Some(mv) = state.best_dist_move {
                debug!("intensification: applying best dist move: {}", mv);
                mv.apply(&mut self.sol);
                return true;
            }
        }

        debug!("intensification did not improve sol");
        false
    }

    fn trigger_intensification_criteria(&self, cur_itr: usize, last_solution_change_itr: usize) -> bool {
        if !self.config.enable_intensification || cur_itr < 5 {
            return false;
        }

        if cur_itr - last_solution_change_itr == 1 {
            return true;
        }

        cur_itr % self.op.n <= 1
    }

    fn trigger_diversification_criteria(&self, cur_itr: usize, last_solution_change_itr: usize) -> bool {
        if !self.config.enable_diversification {
            return false;
        }

        cur_itr - last_solution_change_itr > DIVERSIFICATION_THRESHOLD
    }

    /// Restart from a perturbation of the best solution and forget all tabus.
    fn diversify(&mut self) {
        debug!("diversifying the best sol: {}", self.best_sol);

        self.sol = self.evaluator.diversify_vertices(&self.best_sol, &mut self.rng);

        debug!("sol after diversification: {}", self.sol);

        self.tabu_list.clear();
    }

    /// A tabu move passes only through aspiration: it must beat the best
    /// solution on the metric the current pass optimises.
    fn is_move_forbidden(&self, mv: &Move, state: &LocalSearchState, use_metric_score: bool) -> bool {
        if !self.tabu_list.is_tabu(mv) {
            return false;
        }

        let forbidden = if use_metric_score {
            state.score_cur_sol + mv.delta_score().unwrap_or(0) <= state.score_best_sol
        } else {
            state.dist_cur_sol + mv.delta_distance() >= state.dist_best_sol
        };

        if forbidden {
            debug!(
                "move forbidden by {} metric: {}",
                if use_metric_score { "score" } else { "dist" },
                mv
            );
        }
        forbidden
    }

    /// Adopt the current solution as best when it collects more score, or
    /// the same score over a shorter distance.
    fn update_best_sol(&mut self) -> bool {
        let score_sol = self.evaluator.total_score(&self.sol);
        let score_best = self.evaluator.total_score(&self.best_sol);

        if score_sol > score_best {
            self.best_sol = self.sol.clone();
            return true;
        }
        if score_sol == score_best {
            let dist_sol = self.evaluator.total_dist(&self.sol);
            let dist_best = self.evaluator.total_dist(&self.best_sol);
            if dist_sol < dist_best {
                self.best_sol = self.sol.clone();
                return true;
            }
        }
        false
    }

    fn time_elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Vertex;
    use rand::{Rng, SeedableRng};
    use std::path::Path;

    fn context_for(op: &OPInstance) -> ExecutionContext {
        ExecutionContext::new(op, "test", Path::new("."))
    }

    fn random_instance(n: usize, t_max: f64, seed: u64) -> OPInstance {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let vertices: Vec<Vertex> = (0..n)
            .map(|i| {
                let score = if i == 0 || i == n - 1 { 0 } else { rng.gen_range(5..=50) };
                Vertex::new(score, rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0))
            })
            .collect();
        OPInstance::new("random", vertices, t_max).unwrap()
    }

    fn assert_feasible_path(op: &OPInstance, sol: &Solution) {
        let evaluator = Evaluator::new(op);
        assert!(evaluator.total_dist(sol) <= op.t_max + 1e-9);

        let path = sol.vertices();
        assert_eq!(path[0], 0);
        assert_eq!(*path.last().unwrap(), op.n - 1);
        let mut seen = vec![false; op.n];
        for &v in &path {
            assert!(!seen[v], "vertex {} visited twice", v);
            seen[v] = true;
        }
        for v in 0..op.n {
            if let Some(w) = sol.next[v] {
                assert_eq!(sol.prev[w], Some(v));
            }
        }
    }

    #[test]
    fn test_three_vertex_line() {
        // single zero-score interior vertex: it is still collected, since a
        // zero-gain insertion beats no insertion in the constructive phase
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(0, 1.0, 1.0),
            Vertex::new(0, 2.0, 0.0),
        ];
        let op = OPInstance::new("tiny", vertices, 10.0).unwrap();
        let mut ctx = context_for(&op);

        let best = TabuSearch::new(&op, SearchConfig::default()).solve(&mut ctx);

        assert_eq!(best.vertices(), vec![0, 1, 2]);
        let evaluator = Evaluator::new(&op);
        assert_eq!(evaluator.total_score(&best), 0);
        assert!((evaluator.total_dist(&best) - 2.0 * (2.0f64).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_tight_budget_selects_scoring_vertex() {
        // budget fits one interior detour; the scoring vertex must win over
        // the zero-score one at equal distance cost
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(7, 0.0, 10.0),
            Vertex::new(0, 10.0, 10.0),
            Vertex::new(0, 10.0, 0.0),
        ];
        let op = OPInstance::new("tight", vertices, 28.0).unwrap();
        let mut ctx = context_for(&op);

        let config = SearchConfig { max_time_sec: 1, ..Default::default() };
        let best = TabuSearch::new(&op, config).solve(&mut ctx);

        let evaluator = Evaluator::new(&op);
        assert_eq!(evaluator.total_score(&best), 7);
        let path = best.vertices();
        assert!(path.contains(&1));
        assert!(!path.contains(&2));
        assert_feasible_path(&op, &best);
    }

    #[test]
    fn test_generous_budget_collects_everything() {
        // unit square with a center endpoint; all three scoring vertices fit
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(10, 1.0, 0.0),
            Vertex::new(10, 1.0, 1.0),
            Vertex::new(10, 0.0, 1.0),
            Vertex::new(0, 0.5, 0.5),
        ];
        let op = OPInstance::new("square", vertices, 100.0).unwrap();
        let mut ctx = context_for(&op);

        let best = TabuSearch::new(&op, SearchConfig::default()).solve(&mut ctx);

        let evaluator = Evaluator::new(&op);
        assert_eq!(evaluator.total_score(&best), 30);
        assert!(best.is_complete());
        assert_feasible_path(&op, &best);
    }

    #[test]
    fn test_loader_convention_end_to_end() {
        use std::fs::File;
        use std::io::Write;

        let path = std::env::temp_dir().join("op_solver_search_loader_test.txt");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "100 1").unwrap();
        writeln!(f, "0.0 0.0 0").unwrap();
        writeln!(f, "10.0 0.0 0").unwrap();
        writeln!(f, "10.0 10.0 5").unwrap();
        writeln!(f, "0.0 10.0 7").unwrap();
        drop(f);

        let op = OPInstance::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(op.end(), 3);

        let mut ctx = context_for(&op);
        let best = TabuSearch::new(&op, SearchConfig::default()).solve(&mut ctx);

        // generous budget: both scoring vertices fit
        let evaluator = Evaluator::new(&op);
        assert_eq!(evaluator.total_score(&best), 12);
        assert_feasible_path(&op, &best);
    }

    #[test]
    fn test_deadline_is_respected() {
        let op = random_instance(300, 100.0, 0);
        let mut ctx = context_for(&op);

        let config = SearchConfig { max_time_sec: 1, ..Default::default() };
        let wall = Instant::now();
        let best = TabuSearch::new(&op, config).solve(&mut ctx);

        assert!(wall.elapsed().as_secs_f64() < 2.0, "engine ran past the deadline");
        assert_feasible_path(&op, &best);
    }

    #[test]
    fn test_best_score_is_monotone_in_ledger() {
        let op = random_instance(40, 150.0, 3);
        let mut ctx = context_for(&op);

        let config = SearchConfig {
            max_time_sec: 1,
            enable_intensification: true,
            ..Default::default()
        };
        TabuSearch::new(&op, config).solve(&mut ctx);

        let scores: Vec<i32> = ctx.score_improves().iter().map(|r| r.score).collect();
        assert!(!scores.is_empty());
        assert!(scores.windows(2).all(|w| w[0] < w[1]), "score ledger not increasing: {:?}", scores);
    }

    #[test]
    fn test_diversification_never_loses_the_best() {
        let op = random_instance(40, 150.0, 4);
        let mut ctx = context_for(&op);

        let config = SearchConfig {
            max_time_sec: 1,
            enable_diversification: true,
            ..Default::default()
        };
        let best = TabuSearch::new(&op, config).solve(&mut ctx);

        // the first ledger rows come from the constructive phase; the final
        // best can only be at least as good
        let constructive_score = ctx.score_improves().first().map(|r| r.score).unwrap();
        let evaluator = Evaluator::new(&op);
        assert!(evaluator.total_score(&best) >= constructive_score);
        assert_feasible_path(&op, &best);
    }

    #[test]
    fn test_first_improve_reaches_a_feasible_best() {
        let op = random_instance(30, 120.0, 5);
        let mut ctx = context_for(&op);

        let config = SearchConfig {
            max_time_sec: 1,
            first_improve: true,
            enable_intensification: true,
            enable_diversification: true,
            ..Default::default()
        };
        let best = TabuSearch::new(&op, config).solve(&mut ctx);

        assert_feasible_path(&op, &best);
        let evaluator = Evaluator::new(&op);
        assert!(evaluator.total_score(&best) > 0);
    }

    #[test]
    fn test_target_stops_the_search_early() {
        let op = random_instance(60, 200.0, 6);
        let mut ctx = context_for(&op);

        let config = SearchConfig { max_time_sec: 60, target: 1, ..Default::default() };
        let wall = Instant::now();
        let best = TabuSearch::new(&op, config).solve(&mut ctx);

        // construction alone reaches score 1, so the main loop exits at once
        assert!(wall.elapsed().as_secs_f64() < 10.0);
        let evaluator = Evaluator::new(&op);
        assert!(evaluator.total_score(&best) >= 1);
    }

    #[test]
    fn test_same_seed_same_construction() {
        let op = random_instance(25, 120.0, 7);

        let mut ctx_a = context_for(&op);
        let mut ts_a = TabuSearch::new(&op, SearchConfig { max_time_sec: 0, ..Default::default() });
        let best_a = ts_a.solve(&mut ctx_a);

        let mut ctx_b = context_for(&op);
        let mut ts_b = TabuSearch::new(&op, SearchConfig { max_time_sec: 0, ..Default::default() });
        let best_b = ts_b.solve(&mut ctx_b);

        // a zero budget stops after the (deterministic) constructive phase
        assert_eq!(best_a.vertices(), best_b.vertices());
    }
}
