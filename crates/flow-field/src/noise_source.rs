//! Direction sources sampled to build the vector grid.
//!
//! Each source maps `(x, y, depth)` in pixel space to a unit direction.
//! Perlin and OpenSimplex turn the scalar noise value into an angle; curl
//! takes the numerical curl of Perlin noise, which gives a divergence-free
//! field.

use glam::DVec2;
use noise::{NoiseFn, OpenSimplex, Perlin};
use std::f64::consts::TAU;

/// How many full turns the noise range [-1, 1] spans.
const ANGLE_TURNS: f64 = 2.0;
/// Finite-difference step for curl, in noise space.
const CURL_EPS: f64 = 1e-3;
const SINGULARITY_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoiseKind {
    #[default]
    Perlin,
    Simplex,
    Curl,
}

impl NoiseKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "perlin" => Some(NoiseKind::Perlin),
            "simplex" | "opensimplex" => Some(NoiseKind::Simplex),
            "curl" => Some(NoiseKind::Curl),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NoiseKind::Perlin => "perlin",
            NoiseKind::Simplex => "simplex",
            NoiseKind::Curl => "curl",
        }
    }
}

/// A seeded noise generator producing unit directions.
#[derive(Clone)]
pub struct NoiseSource {
    kind: NoiseKind,
    scale: f64,
    perlin: Perlin,
    simplex: OpenSimplex,
}

impl NoiseSource {
    pub fn new(kind: NoiseKind, scale: f64, seed: u32) -> Self {
        Self {
            kind,
            scale,
            perlin: Perlin::new(seed),
            simplex: OpenSimplex::new(seed),
        }
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// Unit direction at pixel `(x, y)` and noise depth `depth`.
    pub fn direction(&self, x: f64, y: f64, depth: f64) -> DVec2 {
        let sx = x * self.scale;
        let sy = y * self.scale;
        match self.kind {
            NoiseKind::Perlin => angle_to_dir(self.perlin.get([sx, sy, depth])),
            NoiseKind::Simplex => angle_to_dir(self.simplex.get([sx, sy, depth])),
            NoiseKind::Curl => {
                // Curl of a 2D scalar field F: (dF/dy, -dF/dx).
                let df_dy = (self.perlin.get([sx, sy + CURL_EPS, depth])
                    - self.perlin.get([sx, sy - CURL_EPS, depth]))
                    / (2.0 * CURL_EPS);
                let df_dx = (self.perlin.get([sx + CURL_EPS, sy, depth])
                    - self.perlin.get([sx - CURL_EPS, sy, depth]))
                    / (2.0 * CURL_EPS);
                let v = DVec2::new(df_dy, -df_dx);
                let len = v.length();
                if len < SINGULARITY_EPS || !len.is_finite() {
                    angle_to_dir(self.perlin.get([sx, sy, depth]))
                } else {
                    v / len
                }
            }
        }
    }
}

fn angle_to_dir(n: f64) -> DVec2 {
    DVec2::from_angle(n * TAU * ANGLE_TURNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_yields_unit_vectors() {
        for kind in [NoiseKind::Perlin, NoiseKind::Simplex, NoiseKind::Curl] {
            let src = NoiseSource::new(kind, 0.01, 7);
            for i in 0..50 {
                let d = src.direction(i as f64 * 13.7, i as f64 * 4.1, 0.3);
                assert!((d.length() - 1.0).abs() < 1e-9, "{kind:?} at {i}");
            }
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = NoiseSource::new(NoiseKind::Perlin, 0.02, 3);
        let b = NoiseSource::new(NoiseKind::Perlin, 0.02, 3);
        assert_eq!(a.direction(10.5, 20.25, 1.0), b.direction(10.5, 20.25, 1.0));
    }

    #[test]
    fn depth_changes_the_field() {
        let src = NoiseSource::new(NoiseKind::Simplex, 0.01, 11);
        let a = src.direction(123.4, 56.7, 0.0);
        let b = src.direction(123.4, 56.7, 5.5);
        assert!(a.distance(b) > 1e-6);
    }

    #[test]
    fn names_round_trip() {
        for kind in [NoiseKind::Perlin, NoiseKind::Simplex, NoiseKind::Curl] {
            assert_eq!(NoiseKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(NoiseKind::from_name("worley"), None);
    }
}
