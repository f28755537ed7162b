//! Drifting seed points.

use glam::DVec2;
use pattern_engine_core::color::Rgba;
use pattern_engine_core::palette::ColorPalette;
use pattern_engine_core::prng::Xorshift64;

/// Fraction of the gap to the target speed closed per frame.
const SPEED_RELAX: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoronoiPoint {
    pub position: DVec2,
    pub velocity: DVec2,
    pub color: Rgba,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoronoiPointSet {
    points: Vec<VoronoiPoint>,
}

impl VoronoiPointSet {
    /// `count` points placed uniformly, each heading in a random direction at
    /// `speed`.
    pub fn generate(
        count: usize,
        width: f64,
        height: f64,
        speed: f64,
        palette: &ColorPalette,
        rng: &mut Xorshift64,
    ) -> Self {
        let points = (0..count)
            .map(|_| VoronoiPoint {
                position: rng.next_point(width, height),
                velocity: rng.next_direction() * speed,
                color: palette.pick(rng),
            })
            .collect();
        Self { points }
    }

    pub fn from_points(points: Vec<VoronoiPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[VoronoiPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the point closest to `p`; ties go to the lower index.
    pub fn nearest_point(&self, p: DVec2) -> Option<usize> {
        self.nearest_with_distance(p).map(|(i, _)| i)
    }

    /// Closest point and its squared distance.
    pub fn nearest_with_distance(&self, p: DVec2) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, pt) in self.points.iter().enumerate() {
            let d = pt.position.distance_squared(p);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best
    }

    /// Moves points and reflects them off the canvas edges.
    pub fn advance(&mut self, frames: f64, width: f64, height: f64) {
        for pt in &mut self.points {
            pt.position += pt.velocity * frames;
            reflect(&mut pt.position.x, &mut pt.velocity.x, width);
            reflect(&mut pt.position.y, &mut pt.velocity.y, height);
        }
    }

    /// Radial push away from `center`, scaled by `weight(distance)`.
    pub fn repel(&mut self, center: DVec2, strength: f64, weight: impl Fn(f64) -> f64) {
        for pt in &mut self.points {
            let offset = pt.position - center;
            let w = weight(offset.length());
            if w <= 0.0 {
                continue;
            }
            pt.velocity += offset.normalize_or_zero() * strength * w;
        }
    }

    /// Relaxes each speed toward `target`, keeping its direction. Stalled
    /// points get a fresh direction.
    pub fn damp(&mut self, target: f64, frames: f64, rng: &mut Xorshift64) {
        let k = (SPEED_RELAX * frames).min(1.0);
        for pt in &mut self.points {
            let speed = pt.velocity.length();
            let dir = if speed > 1e-9 {
                pt.velocity / speed
            } else if target > 0.0 {
                rng.next_direction()
            } else {
                continue;
            };
            pt.velocity = dir * (speed + (target - speed) * k);
        }
    }

    pub fn recolor(&mut self, palette: &ColorPalette, rng: &mut Xorshift64) {
        for pt in &mut self.points {
            pt.color = palette.pick(rng);
        }
    }
}

fn reflect(pos: &mut f64, vel: &mut f64, extent: f64) {
    if *pos < 0.0 {
        *pos = -*pos;
        *vel = vel.abs();
    } else if *pos > extent {
        *pos = 2.0 * extent - *pos;
        *vel = -vel.abs();
    }
    // A step longer than the canvas can overshoot the mirror.
    *pos = pos.clamp(0.0, extent);
}
