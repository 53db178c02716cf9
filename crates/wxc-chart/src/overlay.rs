//! Wind-direction arrows drawn over the wind-speed line.
//!
//! Runs after the regular datasets. Provider directions are meteorological
//! (where the wind comes *from*), so arrows are turned a further 180° to
//! point where the wind is going.

use tiny_skia::{FillRule, PathBuilder, Pixmap, Transform};

use crate::dataset::Rgba;

pub const ARROW_HEIGHT: f32 = 14.0;
pub const ARROW_BASE: f32 = 8.0;

#[derive(Debug, Clone, Copy)]
pub struct WindArrows {
    pub color: Rgba,
}

impl Default for WindArrows {
    fn default() -> Self {
        Self {
            color: Rgba::with_alpha(255, 255, 255, 0.7),
        }
    }
}

impl WindArrows {
    /// Indices that receive an arrow: odd buckets with both a drawn point
    /// and a direction value.
    pub fn arrow_indices(points: &[Option<(f32, f32)>], directions: &[Option<f64>]) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(i, point)| {
                i % 2 == 1 && point.is_some() && directions.get(*i).copied().flatten().is_some()
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Rotation applied to an upward-pointing arrow, in degrees
    pub fn rotation_degrees(direction: f64) -> f32 {
        (direction + 180.0) as f32
    }

    /// Triangle corners (tip first) for an arrow centred on `(x, y)`.
    pub fn arrow_vertices(x: f32, y: f32, direction: f64) -> [(f32, f32); 3] {
        let theta = Self::rotation_degrees(direction).to_radians();
        let (sin, cos) = theta.sin_cos();
        local_triangle().map(|(px, py)| (px * cos - py * sin + x, px * sin + py * cos + y))
    }

    /// Draw the arrows; returns how many were drawn.
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        points: &[Option<(f32, f32)>],
        directions: &[Option<f64>],
    ) -> usize {
        let Some(path) = triangle_path() else {
            return 0;
        };
        let paint = self.color.to_paint();

        let indices = Self::arrow_indices(points, directions);
        for &i in &indices {
            let (Some((x, y)), Some(direction)) = (points[i], directions[i]) else {
                continue;
            };
            let transform =
                Transform::from_rotate(Self::rotation_degrees(direction)).post_translate(x, y);
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }

        indices.len()
    }
}

fn local_triangle() -> [(f32, f32); 3] {
    let half_h = ARROW_HEIGHT / 2.0;
    let half_b = ARROW_BASE / 2.0;
    [(0.0, -half_h), (-half_b, half_h), (half_b, half_h)]
}

fn triangle_path() -> Option<tiny_skia::Path> {
    let [tip, left, right] = local_triangle();
    let mut pb = PathBuilder::new();
    pb.move_to(tip.0, tip.1);
    pb.line_to(left.0, left.1);
    pb.line_to(right.0, right.1);
    pb.close();
    pb.finish()
}
