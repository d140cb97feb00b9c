//! Move catalogue for the tabu search.
//!
//! Each move is a value object describing one candidate transformation of
//! the tour together with its precomputed deltas and the vertex keys that
//! identify it in the tabu list. A closed enum keeps dispatch in the inner
//! loop allocation-free.

use crate::solution::Solution;

/// A parameterised local modification of the tour.
///
/// `delta_dist` is the change in total tour length if the move is applied.
/// Moves that change the vertex set (Insertion, Replace) additionally carry
/// `delta_score` and `delta_ratio`; the tour-reordering moves (Relocate,
/// TwoOpt, ThreeOpt) have no score delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Move {
    /// Place `cand` immediately after `insert_pos`.
    Insertion {
        cand: usize,
        insert_pos: usize,
        delta_score: i32,
        delta_dist: f64,
        delta_ratio: f64,
    },
    /// Remove `out_cand` and insert `in_cand` after `insert_pos`.
    /// When `insert_pos == prev[out_cand]` the replacement is in place;
    /// otherwise the insertion site was chosen independently.
    Replace {
        in_cand: usize,
        insert_pos: usize,
        out_cand: usize,
        delta_score: i32,
        delta_dist: f64,
        delta_ratio: f64,
    },
    /// Move `cand` to immediately after `rel_pos`.
    Relocate {
        cand: usize,
        rel_pos: usize,
        delta_dist: f64,
    },
    /// Reverse the open segment `(next[v1] .. v2)`.
    TwoOpt {
        v1: usize,
        v2: usize,
        delta_dist: f64,
    },
    /// Two segment reversals, or with `segment_swap` a permutation into
    /// `S1 S3(reversed) S2(reversed) S4`.
    ThreeOpt {
        v1: usize,
        v2: usize,
        v3: usize,
        segment_swap: bool,
        delta_dist: f64,
    },
}

/// Vertex keys identifying a move in the tabu list (at most three).
#[derive(Debug, Clone, Copy)]
pub struct TabuKeys {
    keys: [usize; 3],
    len: usize,
}

impl TabuKeys {
    fn new(keys: &[usize]) -> Self {
        let mut buf = [0usize; 3];
        buf[..keys.len()].copy_from_slice(keys);
        TabuKeys { keys: buf, len: keys.len() }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.keys[..self.len]
    }
}

impl Move {
    /// Mutate `sol` according to this move.
    pub fn apply(&self, sol: &mut Solution) {
        match *self {
            Move::Insertion { cand, insert_pos, .. } => sol.add_vertex_after(cand, insert_pos),
            Move::Replace { in_cand, insert_pos, out_cand, .. } => {
                sol.replace_vertex(in_cand, insert_pos, out_cand)
            }
            Move::Relocate { cand, rel_pos, .. } => sol.relocate_vertex(cand, rel_pos),
            Move::TwoOpt { v1, v2, .. } => sol.two_opt(v1, v2),
            Move::ThreeOpt { v1, v2, v3, segment_swap, .. } => {
                if segment_swap {
                    sol.three_opt_with_segment_swap(v1, v2, v3);
                } else {
                    sol.three_opt(v1, v2, v3);
                }
            }
        }
    }

    /// Change in collected score, `None` for moves that keep the vertex set.
    pub fn delta_score(&self) -> Option<i32> {
        match *self {
            Move::Insertion { delta_score, .. } | Move::Replace { delta_score, .. } => {
                Some(delta_score)
            }
            _ => None,
        }
    }

    /// Change in total tour length.
    pub fn delta_distance(&self) -> f64 {
        match *self {
            Move::Insertion { delta_dist, .. }
            | Move::Replace { delta_dist, .. }
            | Move::Relocate { delta_dist, .. }
            | Move::TwoOpt { delta_dist, .. }
            | Move::ThreeOpt { delta_dist, .. } => delta_dist,
        }
    }

    /// Score gained per unit of added distance, `None` for score-free moves.
    pub fn delta_ratio(&self) -> Option<f64> {
        match *self {
            Move::Insertion { delta_ratio, .. } | Move::Replace { delta_ratio, .. } => {
                Some(delta_ratio)
            }
            _ => None,
        }
    }

    /// Vertex keys registered in (and checked against) the tabu list.
    pub fn tabu_keys(&self) -> TabuKeys {
        match *self {
            Move::Insertion { cand, .. } => TabuKeys::new(&[cand]),
            Move::Replace { in_cand, out_cand, .. } => TabuKeys::new(&[out_cand, in_cand]),
            Move::Relocate { cand, .. } => TabuKeys::new(&[cand]),
            Move::TwoOpt { v1, v2, .. } => TabuKeys::new(&[v1, v2]),
            Move::ThreeOpt { v1, v2, v3, .. } => TabuKeys::new(&[v1, v2, v3]),
        }
    }

    /// Short name of the move kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Move::Insertion { .. } => "insertion",
            Move::Replace { .. } => "replace",
            Move::Relocate { .. } => "relocate",
            Move::TwoOpt { .. } => "2-opt",
            Move::ThreeOpt { .. } => "3-opt",
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Move::Insertion { cand, insert_pos, delta_score, delta_dist, delta_ratio } => write!(
                f,
                "Insertion(cand={}, insert_pos={}, delta_score={}, delta_dist={:.2}, delta_ratio={:.2})",
                cand, insert_pos, delta_score, delta_dist, delta_ratio
            ),
            Move::Replace { in_cand, insert_pos, out_cand, delta_score, delta_dist, delta_ratio } => write!(
                f,
                "Replace(in_cand={}, insert_pos={}, out_cand={}, delta_score={}, delta_dist={:.2}, delta_ratio={:.2})",
                in_cand, insert_pos, out_cand, delta_score, delta_dist, delta_ratio
            ),
            Move::Relocate { cand, rel_pos, delta_dist } => write!(
                f,
                "Relocate(cand={}, rel_pos={}, delta_dist={:.2})",
                cand, rel_pos, delta_dist
            ),
            Move::TwoOpt { v1, v2, delta_dist } => {
                write!(f, "TwoOpt(v1={}, v2={}, delta_dist={:.2})", v1, v2, delta_dist)
            }
            Move::ThreeOpt { v1, v2, v3, segment_swap, delta_dist } => write!(
                f,
                "ThreeOpt(v1={}, v2={}, v3={}, segment_swap={}, delta_dist={:.2})",
                v1, v2, v3, segment_swap, delta_dist
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabu_keys_per_kind() {
        let ins = Move::Insertion { cand: 4, insert_pos: 0, delta_score: 5, delta_dist: 1.0, delta_ratio: 5.0 };
        assert_eq!(ins.tabu_keys().as_slice(), &[4]);

        let rep = Move::Replace { in_cand: 2, insert_pos: 0, out_cand: 7, delta_score: 0, delta_dist: -1.0, delta_ratio: 0.0 };
        assert_eq!(rep.tabu_keys().as_slice(), &[7, 2]);

        let two = Move::TwoOpt { v1: 1, v2: 5, delta_dist: -0.5 };
        assert_eq!(two.tabu_keys().as_slice(), &[1, 5]);

        let three = Move::ThreeOpt { v1: 1, v2: 3, v3: 6, segment_swap: true, delta_dist: -0.5 };
        assert_eq!(three.tabu_keys().as_slice(), &[1, 3, 6]);
    }

    #[test]
    fn test_score_deltas_only_on_vertex_set_moves() {
        let rel = Move::Relocate { cand: 3, rel_pos: 1, delta_dist: -0.2 };
        assert_eq!(rel.delta_score(), None);
        assert_eq!(rel.delta_ratio(), None);
        assert_eq!(rel.delta_distance(), -0.2);

        let ins = Move::Insertion { cand: 4, insert_pos: 0, delta_score: 5, delta_dist: 2.0, delta_ratio: 2.5 };
        assert_eq!(ins.delta_score(), Some(5));
        assert_eq!(ins.delta_ratio(), Some(2.5));
    }
}
