//! Synthetic OP instance generation.
//!
//! Writes instances in the same text format the loader consumes: a header
//! line `t_max 1`, then one `x y score` line per vertex. The first two
//! vertices carry score 0 (they become the path endpoints after the
//! loader's swap); the rest draw scores from {5, 10, ..., 50}.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Configuration for one generated instance.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of vertices
    pub n: usize,
    /// Travel budget written in the header
    pub t_max: f64,
    /// Coordinates are drawn from `[1.0, max_xy)` on a 0.1 grid
    pub max_xy: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            n: 300,
            t_max: 300.0,
            max_xy: 200.0,
            seed: 0,
        }
    }
}

/// Generate a single instance file at `path`.
///
/// Coordinates are sampled without replacement per axis, so no two vertices
/// share an x or a y value.
pub fn generate_instance<P: AsRef<Path>>(path: P, config: &GeneratorConfig) -> Result<(), String> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let grid: Vec<f64> = (10..(config.max_xy * 10.0) as i64).map(|i| i as f64 * 0.1).collect();
    if grid.len() < config.n {
        return Err(format!(
            "Coordinate grid too small for {} vertices (max_xy = {})",
            config.n, config.max_xy
        ));
    }

    let xs: Vec<f64> = grid.choose_multiple(&mut rng, config.n).copied().collect();
    let ys: Vec<f64> = grid.choose_multiple(&mut rng, config.n).copied().collect();

    let score_choices: Vec<i32> = (1..=10).map(|s| s * 5).collect();

    let mut file = File::create(&path)
        .map_err(|e| format!("Cannot create {:?}: {}", path.as_ref(), e))?;

    writeln!(file, "{} 1", config.t_max as i64).map_err(|e| format!("Write error: {}", e))?;

    for i in 0..config.n {
        let score = if i < 2 {
            0
        } else {
            *score_choices.choose(&mut rng).expect("score choices are non-empty")
        };
        writeln!(file, "{:.1} {:.1} {}", xs[i], ys[i], score)
            .map_err(|e| format!("Write error: {}", e))?;
    }

    Ok(())
}

/// Generate the standard family: one instance per budget in
/// `50, 150, ..., 550`, named `<prefix>_<n>_<t_max>.txt` under `dir`.
pub fn generate_family<P: AsRef<Path>>(dir: P, prefix: &str, seed: u64) -> Result<Vec<String>, String> {
    let mut names = Vec::new();

    for t_max in (50..600).step_by(100) {
        let config = GeneratorConfig {
            t_max: t_max as f64,
            seed,
            ..Default::default()
        };
        let name = format!("{}_{}_{}.txt", prefix, config.n, t_max);
        generate_instance(dir.as_ref().join(&name), &config)?;
        names.push(name);
    }

    Ok(names)
}
