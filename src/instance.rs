//! Module for parsing and representing OP instances.
//!
//! This module handles the plain-text instance format used for the
//! Orienteering Problem. It manages vertex coordinates, scores, the travel
//! budget and the precomputed Euclidean distance matrix.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use serde::{Deserialize, Serialize};

/// Represents a vertex in the OP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Collectible score (0 for the path endpoints)
    pub score: i32,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Vertex {
    pub fn new(score: i32, x: f64, y: f64) -> Self {
        Vertex { score, x, y }
    }
}

/// Represents a complete OP instance
///
/// Convention: the path starts at vertex `0` and ends at vertex `n - 1`;
/// both endpoints carry score 0. Raw files list the end vertex in position
/// 1, so the loader swaps positions `1` and `n - 1` before building the
/// distance matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OPInstance {
    /// Name of the instance
    pub name: String,
    /// Number of vertices (including both endpoints)
    pub n: usize,
    /// List of all vertices
    pub vertices: Vec<Vertex>,
    /// Precomputed distance matrix
    #[serde(skip)]
    pub distances: Vec<Vec<f64>>,
    /// Travel-time budget
    pub t_max: f64,
}

impl OPInstance {
    /// Build an instance from raw vertex data, computing the distance matrix.
    /// Vertices are taken as-is: index 0 is the start, index n-1 the end.
    pub fn new(name: &str, vertices: Vec<Vertex>, t_max: f64) -> Result<Self, String> {
        if vertices.len() < 3 {
            return Err(format!("Instance needs at least 3 vertices, got {}", vertices.len()));
        }
        if t_max <= 0.0 {
            return Err(format!("Invalid travel budget: {}", t_max));
        }
        if let Some(v) = vertices.iter().find(|v| v.score < 0) {
            return Err(format!("Negative vertex score: {}", v.score));
        }

        let distances = Self::compute_distance_matrix(&vertices);

        Ok(OPInstance {
            name: name.to_string(),
            n: vertices.len(),
            vertices,
            distances,
            t_max,
        })
    }

    /// Parse an OP instance from a text file.
    ///
    /// First line: `t_max first_index` (the second value is ignored).
    /// Each remaining line: `x y score`. After parsing, vertices at
    /// positions `1` and `n - 1` are swapped so that the fixed endpoints
    /// sit at indices `0` and `n - 1`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let file = File::open(&path)
            .map_err(|e| format!("Cannot open file: {}", e))?;
        let reader = BufReader::new(file);

        let name = path.as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut t_max = None;
        let mut vertices: Vec<Vertex> = Vec::new();

        for line in reader.lines() {
            let line = line.map_err(|e| format!("Read error: {}", e))?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();

            if t_max.is_none() {
                // header line: t_max and the 1-based index of the start vertex
                let budget: f64 = parts[0].parse().map_err(|_| "Invalid t_max")?;
                t_max = Some(budget);
                continue;
            }

            if parts.len() < 3 {
                return Err(format!("Malformed vertex line: '{}'", line));
            }
            let x: f64 = parts[0].parse().map_err(|_| "Invalid x coordinate")?;
            let y: f64 = parts[1].parse().map_err(|_| "Invalid y coordinate")?;
            let score: i32 = parts[2].parse().map_err(|_| "Invalid score")?;
            vertices.push(Vertex::new(score, x, y));
        }

        let t_max = t_max.ok_or("Empty instance file")?;

        if vertices.len() < 3 {
            return Err(format!("Instance needs at least 3 vertices, got {}", vertices.len()));
        }

        // The raw format lists the end vertex in position 1; move it to the
        // last position so indices 0 and n-1 are the fixed endpoints.
        let last = vertices.len() - 1;
        vertices.swap(1, last);

        Self::new(&name, vertices, t_max)
    }

    /// Compute the Euclidean distance matrix
    fn compute_distance_matrix(vertices: &[Vertex]) -> Vec<Vec<f64>> {
        let n = vertices.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let dx = vertices[i].x - vertices[j].x;
                    let dy = vertices[i].y - vertices[j].y;
                    matrix[i][j] = (dx * dx + dy * dy).sqrt();
                }
            }
        }

        matrix
    }

    /// Get the distance between two vertices
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i][j]
    }

    /// Score of a vertex
    #[inline]
    pub fn score(&self, i: usize) -> i32 {
        self.vertices[i].score
    }

    /// Index of the end vertex
    #[inline]
    pub fn end(&self) -> usize {
        self.n - 1
    }

    /// Sum of all collectible scores (upper bound on any tour score)
    pub fn total_score(&self) -> i32 {
        self.vertices.iter().map(|v| v.score).sum()
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let scores: Vec<i32> = self.vertices[1..self.n - 1].iter().map(|v| v.score).collect();
        let avg_score = scores.iter().sum::<i32>() as f64 / scores.len() as f64;
        let max_score = scores.iter().copied().max().unwrap_or(0);

        let mut dists: Vec<f64> = Vec::new();
        for i in 0..self.n {
            for j in i + 1..self.n {
                dists.push(self.distance(i, j));
            }
        }
        let avg_distance = dists.iter().sum::<f64>() / dists.len() as f64;
        let max_distance = dists.iter().cloned().fold(0.0, f64::max);

        InstanceStatistics {
            name: self.name.clone(),
            n: self.n,
            t_max: self.t_max,
            total_score: self.total_score(),
            avg_score,
            max_score,
            avg_distance,
            max_distance,
            direct_distance: self.distance(0, self.n - 1),
        }
    }
}

/// Statistics about an OP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub n: usize,
    pub t_max: f64,
    pub total_score: i32,
    pub avg_score: f64,
    pub max_score: i32,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// Distance of the trivial start-to-end path
    pub direct_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Vertices: {} (2 endpoints + {} collectible)", self.n, self.n - 2)?;
        writeln!(f, "  Budget (t_max): {:.2}", self.t_max)?;
        writeln!(f, "  Total score: {}", self.total_score)?;
        writeln!(f, "  Avg score: {:.2}", self.avg_score)?;
        writeln!(f, "  Max score: {}", self.max_score)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)?;
        writeln!(f, "  Direct start-end distance: {:.2}", self.direct_distance)
    }
}
