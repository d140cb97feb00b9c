//! Solution representation and manipulation for the OP.
//!
//! A solution is a simple path from vertex `0` to vertex `n - 1`, stored as
//! a doubly-linked list over two fixed-size index arrays (`next`, `prev`).
//! All mutation primitives run in O(1) link updates except the segment
//! reversals, which touch only the reversed span.

use serde::{Deserialize, Serialize};

/// Doubly-linked path over the vertex indices `[0..n)`.
///
/// `next[v]`/`prev[v]` are `None` for vertices outside the path and for the
/// structurally absent neighbours of the endpoints (`prev[0]`,
/// `next[n - 1]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Number of vertices in the instance
    pub n: usize,
    /// Successor of each vertex along the path
    pub next: Vec<Option<usize>>,
    /// Predecessor of each vertex along the path
    pub prev: Vec<Option<usize>>,
}

impl Solution {
    fn empty(n: usize) -> Self {
        Solution {
            n,
            next: vec![None; n],
            prev: vec![None; n],
        }
    }

    /// Create the initial path `0 -> n-1` with no interior vertices.
    pub fn trivial(n: usize) -> Self {
        let mut sol = Self::empty(n);
        sol.next[0] = Some(n - 1);
        sol.prev[n - 1] = Some(0);
        sol
    }

    /// Rebuild a solution from a set of arcs `(i, j)`.
    ///
    /// Links are set exactly as the arcs dictate; absence is encoded by the
    /// `Option` representation, so no post-processing of entries is needed
    /// (vertex `0` is a legitimate link target even though its own `prev`
    /// stays absent).
    pub fn from_arcs(n: usize, arcs: &[(usize, usize)]) -> Self {
        let mut sol = Self::empty(n);
        for &(i, j) in arcs {
            sol.next[i] = Some(j);
            sol.prev[j] = Some(i);
        }
        sol
    }

    /// Walk the path from vertex `0` and return the visited vertices in order.
    pub fn vertices(&self) -> Vec<usize> {
        let mut res = Vec::new();
        let mut cur = Some(0);

        while let Some(v) = cur {
            res.push(v);
            cur = self.next[v];
        }

        res
    }

    /// Vertices currently outside the path.
    pub fn remaining_vertices(&self) -> Vec<usize> {
        let mut in_path = vec![false; self.n];
        for v in self.vertices() {
            in_path[v] = true;
        }
        (0..self.n).filter(|&v| !in_path[v]).collect()
    }

    /// True when every vertex of the instance is on the path.
    pub fn is_complete(&self) -> bool {
        self.vertices().len() == self.n
    }

    /// Insert vertex `x` between `v1` and its successor.
    ///
    /// `x` must be off the path; `v1` must be on the path and not the end
    /// vertex.
    pub fn add_vertex_after(&mut self, x: usize, v1: usize) {
        debug_assert!(self.next[x].is_none() && self.prev[x].is_none(), "vertex {} already in path", x);
        let v2 = self.next[v1].expect("insertion point has no successor");

        self.next[v1] = Some(x);
        self.prev[x] = Some(v1);

        self.prev[v2] = Some(x);
        self.next[x] = Some(v2);
    }

    /// Unlink an interior vertex from the path.
    pub fn remove_vertex(&mut self, v: usize) {
        let prev = self.prev[v].expect("cannot remove the start vertex");
        let next = self.next[v].expect("cannot remove the end vertex");

        self.next[prev] = Some(next);
        self.prev[next] = Some(prev);

        self.prev[v] = None;
        self.next[v] = None;
    }

    /// Remove `out_v` and insert `in_v` after `insert_pos`, in that order.
    pub fn replace_vertex(&mut self, in_v: usize, insert_pos: usize, out_v: usize) {
        self.remove_vertex(out_v);
        self.add_vertex_after(in_v, insert_pos);
    }

    /// Move interior vertex `x` to the position immediately after `rel_pos`.
    ///
    /// `rel_pos` must be on the path, distinct from `x` and from `prev[x]`,
    /// and not the end vertex.
    pub fn relocate_vertex(&mut self, x: usize, rel_pos: usize) {
        let prev_of_x = self.prev[x].expect("cannot relocate the start vertex");
        let next_of_x = self.next[x].expect("cannot relocate the end vertex");
        let next_of_rel_pos = self.next[rel_pos].expect("relocation point has no successor");

        self.next[prev_of_x] = Some(next_of_x);
        self.prev[next_of_x] = Some(prev_of_x);

        self.next[rel_pos] = Some(x);
        self.prev[next_of_rel_pos] = Some(x);

        self.next[x] = Some(next_of_rel_pos);
        self.prev[x] = Some(rel_pos);
    }

    /// Apply a 2-opt move in place.
    ///
    /// Removes edges `(v1, next[v1])` and `(v2, next[v2])`, then reconnects
    /// by reversing the segment between `next[v1]` and `v2`. Assumes `v1`
    /// and `v2` are non-adjacent and `v2` is not the end vertex.
    pub fn two_opt(&mut self, v1: usize, v2: usize) {
        let start = self.next[v1].expect("2-opt pivot has no successor");
        self.reverse_segment(start, v2);
    }

    /// Apply a 3-opt move: reverse `(next[v1] .. v2)` then `(old next[v2] .. v3)`.
    pub fn three_opt(&mut self, v1: usize, v2: usize, v3: usize) {
        let next_v1 = self.next[v1].expect("3-opt pivot has no successor");
        let next_v2 = self.next[v2].expect("3-opt pivot has no successor");
        self.reverse_segment(next_v1, v2);
        self.reverse_segment(next_v2, v3);
    }

    /// Apply a 3-opt move and then swap the two reversed segments, so the
    /// tour becomes `S1 S3(reversed) S2(reversed) S4` relative to the
    /// original ordering.
    pub fn three_opt_with_segment_swap(&mut self, v1: usize, v2: usize, v3: usize) {
        let next_v1 = self.next[v1].expect("3-opt pivot has no successor");
        let next_v2 = self.next[v2].expect("3-opt pivot has no successor");

        self.three_opt(v1, v2, v3);

        self.swap_adjacent_segments(v2, next_v1, v3, next_v2);
    }

    /// Reverse the internal segment of the path between `start` and `end`
    /// (inclusive). `start` cannot be the first vertex and `end` cannot be
    /// the last.
    fn reverse_segment(&mut self, start: usize, end: usize) {
        let before_start = self.prev[start].expect("segment start cannot be the first vertex");
        let after_end = self.next[end].expect("segment end cannot be the last vertex");

        let mut prev = after_end;
        let mut cur = start;

        // flip the links until we walk past 'end'
        while cur != after_end {
            let nxt = self.next[cur].expect("segment is not contiguous");
            self.next[cur] = Some(prev);
            self.prev[prev] = Some(cur);
            prev = cur;
            cur = nxt;
        }

        // reattach the borders
        self.next[before_start] = Some(end);
        self.prev[end] = Some(before_start);

        self.next[start] = Some(after_end);
        self.prev[after_end] = Some(start);
    }

    /// Swap the position of two adjacent segments `S1 = [v1 .. v2]`,
    /// `S2 = [v3 .. v4]` (with `next[v2] = v3`).
    fn swap_adjacent_segments(&mut self, v1: usize, v2: usize, v3: usize, v4: usize) {
        let prev_v1 = self.prev[v1];
        let next_v4 = self.next[v4];

        if let Some(p) = prev_v1 {
            self.next[p] = Some(v3);
        }
        self.prev[v3] = prev_v1;

        // connect the end of S2 to the head of S1
        self.next[v4] = Some(v1);
        self.prev[v1] = Some(v4);

        // connect the end of S1 to the original successor of S2
        self.next[v2] = next_v4;
        if let Some(nx) = next_v4 {
            self.prev[nx] = Some(v2);
        }
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path: Vec<String> = self.vertices().iter().map(|v| v.to_string()).collect();
        write!(f, "Solution(n={}, path=[{}])", self.n, path.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Structural coherence: next/prev mirror each other, the path is
    /// simple, and off-path vertices are fully unlinked.
    fn assert_coherent(sol: &Solution) {
        for v in 0..sol.n {
            if let Some(w) = sol.next[v] {
                assert_eq!(sol.prev[w], Some(v), "next[{}]={} but prev[{}]!={}", v, w, w, v);
            }
            if let Some(u) = sol.prev[v] {
                assert_eq!(sol.next[u], Some(v), "prev[{}]={} but next[{}]!={}", v, u, u, v);
            }
        }

        assert_eq!(sol.prev[0], None);
        assert_eq!(sol.next[sol.n - 1], None);

        let path = sol.vertices();
        assert_eq!(path[0], 0);
        assert_eq!(*path.last().unwrap(), sol.n - 1);
        let mut seen = vec![false; sol.n];
        for &v in &path {
            assert!(!seen[v], "vertex {} visited twice", v);
            seen[v] = true;
        }
        for v in 0..sol.n {
            if !seen[v] {
                assert_eq!(sol.next[v], None);
                assert_eq!(sol.prev[v], None);
            }
        }
    }

    /// Build the path 0 -> 1 -> 2 -> ... -> n-1.
    fn full_path(n: usize) -> Solution {
        let mut sol = Solution::trivial(n);
        for v in (1..n - 1).rev() {
            sol.add_vertex_after(v, 0);
        }
        sol
    }

    #[test]
    fn test_trivial_path() {
        let sol = Solution::trivial(5);
        assert_eq!(sol.vertices(), vec![0, 4]);
        assert_eq!(sol.remaining_vertices(), vec![1, 2, 3]);
        assert!(!sol.is_complete());
        assert_coherent(&sol);
    }

    #[test]
    fn test_add_and_remove_roundtrip() {
        let mut sol = Solution::trivial(5);
        sol.add_vertex_after(2, 0);
        assert_eq!(sol.vertices(), vec![0, 2, 4]);
        assert_coherent(&sol);

        sol.add_vertex_after(3, 2);
        assert_eq!(sol.vertices(), vec![0, 2, 3, 4]);
        assert_coherent(&sol);

        let before = sol.clone();
        sol.add_vertex_after(1, 3);
        sol.remove_vertex(1);
        assert_eq!(sol.next, before.next);
        assert_eq!(sol.prev, before.prev);
    }

    #[test]
    fn test_replace_vertex() {
        let mut sol = Solution::trivial(5);
        sol.add_vertex_after(1, 0);
        sol.replace_vertex(3, 0, 1);
        assert_eq!(sol.vertices(), vec![0, 3, 4]);
        assert_coherent(&sol);
    }

    #[test]
    fn test_relocate_vertex() {
        let mut sol = full_path(6);
        // 0 1 2 3 4 5 -> move 1 after 3
        sol.relocate_vertex(1, 3);
        assert_eq!(sol.vertices(), vec![0, 2, 3, 1, 4, 5]);
        assert_coherent(&sol);

        // move it back after 0
        sol.relocate_vertex(1, 0);
        assert_eq!(sol.vertices(), vec![0, 1, 2, 3, 4, 5]);
        assert_coherent(&sol);
    }

    #[test]
    fn test_two_opt_reverses_segment() {
        let mut sol = full_path(6);
        // removes (0,1) and (3,4): segment 1..3 is reversed
        sol.two_opt(0, 3);
        assert_eq!(sol.vertices(), vec![0, 3, 2, 1, 4, 5]);
        assert_coherent(&sol);
    }

    #[test]
    fn test_two_opt_twice_is_identity() {
        let mut sol = full_path(7);
        let before = sol.clone();
        sol.two_opt(1, 4);
        sol.two_opt(1, 4);
        assert_eq!(sol.next, before.next);
        assert_eq!(sol.prev, before.prev);
    }

    #[test]
    fn test_three_opt() {
        let mut sol = full_path(8);
        // segments (1..3) and (4..5) both reversed in place
        sol.three_opt(0, 3, 5);
        assert_eq!(sol.vertices(), vec![0, 3, 2, 1, 5, 4, 6, 7]);
        assert_coherent(&sol);
    }

    #[test]
    fn test_three_opt_with_segment_swap() {
        let mut sol = full_path(8);
        // S1=[0], S2=[1..3], S3=[4..5], S4=[6,7] -> S1 S3r S2r S4
        sol.three_opt_with_segment_swap(0, 3, 5);
        assert_eq!(sol.vertices(), vec![0, 5, 4, 3, 2, 1, 6, 7]);
        assert_coherent(&sol);
    }

    #[test]
    fn test_from_arcs() {
        let arcs = vec![(0, 2), (2, 1), (1, 3)];
        let sol = Solution::from_arcs(4, &arcs);
        assert_eq!(sol.vertices(), vec![0, 2, 1, 3]);
        assert_coherent(&sol);
    }

    #[test]
    fn test_from_arcs_keeps_links_to_start_side_vertices() {
        // arcs targeting low indices must survive as-is
        let arcs = vec![(0, 3), (3, 1), (1, 4)];
        let sol = Solution::from_arcs(5, &arcs);
        assert_eq!(sol.next[3], Some(1));
        assert_eq!(sol.prev[1], Some(3));
        assert_eq!(sol.vertices(), vec![0, 3, 1, 4]);
    }
}
