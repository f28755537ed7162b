//! Point-mass particle shared by the particle-system and flow-field engines.

use crate::color::Rgba;
use crate::surface::Surface;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Glyph drawn for a particle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Star,
}

impl ParticleShape {
    pub const ALL: [ParticleShape; 4] = [
        ParticleShape::Circle,
        ParticleShape::Square,
        ParticleShape::Triangle,
        ParticleShape::Star,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "circle" => Some(ParticleShape::Circle),
            "square" => Some(ParticleShape::Square),
            "triangle" => Some(ParticleShape::Triangle),
            "star" => Some(ParticleShape::Star),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParticleShape::Circle => "circle",
            ParticleShape::Square => "square",
            ParticleShape::Triangle => "triangle",
            ParticleShape::Star => "star",
        }
    }
}

/// A point mass with life.
///
/// `life` starts at 1 and falls by `decay` per frame. Forces accumulate in
/// `acceleration` and are consumed by [`Particle::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    pub acceleration: DVec2,
    pub size: f64,
    pub color: Rgba,
    pub life: f64,
    pub decay: f64,
    pub shape: ParticleShape,
}

impl Particle {
    pub fn new(position: DVec2, velocity: DVec2, size: f64, color: Rgba) -> Self {
        Self {
            position,
            velocity,
            acceleration: DVec2::ZERO,
            size: size.max(0.0),
            color,
            life: 1.0,
            decay: 0.0,
            shape: ParticleShape::Circle,
        }
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay.max(0.0);
        self
    }

    pub fn with_shape(mut self, shape: ParticleShape) -> Self {
        self.shape = shape;
        self
    }

    /// Accumulates a force for the next update. Non-finite forces are dropped.
    pub fn apply_force(&mut self, force: DVec2) {
        if force.is_finite() {
            self.acceleration += force;
        }
    }

    /// Semi-implicit Euler over `frames` 60 Hz frames: velocity first, then
    /// position with the new velocity. Clears the accumulated acceleration and
    /// decays life.
    pub fn update(&mut self, frames: f64) {
        self.velocity += self.acceleration * frames;
        self.position += self.velocity * frames;
        self.acceleration = DVec2::ZERO;
        self.life -= self.decay * frames;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    /// Draws the particle with its color faded by remaining life.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let color = self.color.fade(self.life.clamp(0.0, 1.0));
        let r = self.size * 0.5;
        match self.shape {
            ParticleShape::Circle => surface.fill_circle(self.position, r, color),
            ParticleShape::Square => surface.fill_rect(
                self.position.x - r,
                self.position.y - r,
                self.size,
                self.size,
                color,
            ),
            ParticleShape::Triangle => {
                let pts = polygon(self.position, r, 3, 0.0);
                surface.fill_path(&pts, color);
            }
            ParticleShape::Star => {
                let pts = star(self.position, r, r * 0.45, 5);
                surface.fill_path(&pts, color);
            }
        }
    }
}

/// Regular polygon pointing up.
fn polygon(center: DVec2, radius: f64, sides: usize, phase: f64) -> Vec<DVec2> {
    (0..sides)
        .map(|i| {
            let a = phase - FRAC_PI_2 + TAU * i as f64 / sides as f64;
            center + DVec2::from_angle(a) * radius
        })
        .collect()
}

fn star(center: DVec2, outer: f64, inner: f64, points: usize) -> Vec<DVec2> {
    (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = -FRAC_PI_2 + TAU * i as f64 / (points * 2) as f64;
            center + DVec2::from_angle(a) * r
        })
        .collect()
}
