//! Visualization utilities for OP solutions.
//!
//! Generates SVG figures of a solution's path over the vertex cloud.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::instance::OPInstance;
use crate::solution::Solution;
use crate::tabu::evaluator::Evaluator;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Vertex radius
    pub node_radius: f64,
    /// Draw each vertex's score next to it
    pub plot_scores: bool,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 6.0,
            plot_scores: true,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an SVG figure of a solution
    pub fn generate_svg(&self, instance: &OPInstance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = self.get_bounds(instance);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #3498db; stroke: #2c3e50; stroke-width: 2; }}
    .endpoint {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #34495e; stroke-width: 1.5; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        let evaluator = Evaluator::new(instance);
        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | Score: {} | Dist: {:.2} / {:.2}</text>
"##,
            self.margin,
            instance.name,
            evaluator.total_score(solution),
            evaluator.total_dist(solution),
            instance.t_max
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        for (from, link) in solution.next.iter().enumerate() {
            if let Some(to) = link {
                let (x1, y1) = transform(instance.vertices[from].x, instance.vertices[from].y);
                let (x2, y2) = transform(instance.vertices[*to].x, instance.vertices[*to].y);

                svg.push_str(&format!(
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge" marker-end="url(#arrow)"/>
"#,
                    x1, y1, x2, y2
                ));
            }
        }

        svg.push_str(
            r##"<defs>
<marker id="arrow" markerWidth="10" markerHeight="10" refX="9" refY="3" orient="auto" markerUnits="strokeWidth">
<path d="M0,0 L0,6 L9,3 z" fill="#34495e"/>
</marker>
</defs>
"##,
        );

        for (i, vertex) in instance.vertices.iter().enumerate() {
            let (x, y) = transform(vertex.x, vertex.y);

            let class = if i == 0 || i == instance.n - 1 { "endpoint" } else { "node" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            if self.plot_scores {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                    x,
                    y - self.node_radius - 3.0,
                    vertex.score
                ));
            }
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save an SVG string to a file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> Result<(), String> {
        let mut file = File::create(&path)
            .map_err(|e| format!("Cannot create {:?}: {}", path.as_ref(), e))?;
        file.write_all(svg.as_bytes())
            .map_err(|e| format!("Cannot write SVG: {}", e))
    }

    fn get_bounds(&self, instance: &OPInstance) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for v in &instance.vertices {
            min_x = min_x.min(v.x);
            max_x = max_x.max(v.x);
            min_y = min_y.min(v.y);
            max_y = max_y.max(v.y);
        }

        (min_x, max_x, min_y, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Vertex;

    #[test]
    fn test_svg_contains_path_edges() {
        let vertices = vec![
            Vertex::new(0, 0.0, 0.0),
            Vertex::new(5, 1.0, 1.0),
            Vertex::new(0, 2.0, 0.0),
        ];
        let instance = OPInstance::new("viz", vertices, 10.0).unwrap();
        let mut sol = Solution::trivial(3);
        sol.add_vertex_after(1, 0);

        let svg = Visualizer::new().generate_svg(&instance, &sol);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.ends_with("</svg>"));
        // two arcs on the path, two endpoint markers
        assert_eq!(svg.matches("class=\"edge\"").count(), 2);
        assert_eq!(svg.matches("class=\"endpoint\"").count(), 2);
    }
}
