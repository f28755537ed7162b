//! Escape-time iteration and the complex-plane view.
//!
//! Complex numbers are carried as `DVec2` with `x` the real and `y` the
//! imaginary part.

use glam::DVec2;

/// Squared magnitude past which an orbit is considered escaped.
pub const BAILOUT_SQ: f64 = 4.0;
/// Complex-plane span of the shorter canvas side at zoom 1.
pub const BASE_SPAN: f64 = 3.0;
/// Zoom range. Past the upper end adjacent pixels map to the same `f64`.
pub const MIN_ZOOM: f64 = 1e-6;
pub const MAX_ZOOM: f64 = 1e13;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FractalKind {
    #[default]
    Mandelbrot,
    Julia,
    BurningShip,
    Tricorn,
    Multibrot,
}

impl FractalKind {
    pub const ALL: [FractalKind; 5] = [
        FractalKind::Mandelbrot,
        FractalKind::Julia,
        FractalKind::BurningShip,
        FractalKind::Tricorn,
        FractalKind::Multibrot,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "mandelbrot" => Some(Self::Mandelbrot),
            "julia" => Some(Self::Julia),
            "burning-ship" | "burningship" => Some(Self::BurningShip),
            "tricorn" | "mandelbar" => Some(Self::Tricorn),
            "multibrot" => Some(Self::Multibrot),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Mandelbrot => "mandelbrot",
            Self::Julia => "julia",
            Self::BurningShip => "burning-ship",
            Self::Tricorn => "tricorn",
            Self::Multibrot => "multibrot",
        }
    }

    /// Where the view starts when no center is configured.
    pub fn default_center(self) -> DVec2 {
        match self {
            Self::Julia => DVec2::ZERO,
            _ => DVec2::new(-0.5, 0.0),
        }
    }

    /// One step of the recurrence.
    #[inline]
    fn step(self, z: DVec2, c: DVec2, power: f64) -> DVec2 {
        match self {
            Self::Mandelbrot | Self::Julia => square(z) + c,
            Self::BurningShip => square(z.abs()) + c,
            Self::Tricorn => square(DVec2::new(z.x, -z.y)) + c,
            Self::Multibrot => pow(z, power) + c,
        }
    }

    /// Exponent that governs the growth rate, for smooth coloring.
    fn degree(self, power: f64) -> f64 {
        match self {
            Self::Multibrot => power,
            _ => 2.0,
        }
    }
}

#[inline]
fn square(z: DVec2) -> DVec2 {
    DVec2::new(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y)
}

fn pow(z: DVec2, p: f64) -> DVec2 {
    let r_sq = z.length_squared();
    if r_sq == 0.0 {
        return DVec2::ZERO;
    }
    let r = r_sq.powf(p * 0.5);
    let theta = z.y.atan2(z.x) * p;
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Outcome of iterating one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Escape {
    /// Still bounded at the iteration cap.
    Inside,
    Escaped {
        iterations: usize,
        /// Fractional iteration count; equals `iterations` when unsmoothed.
        smooth: f64,
    },
}

impl Escape {
    pub fn escaped(self) -> bool {
        matches!(self, Escape::Escaped { .. })
    }
}

/// Iterates `z ← f(z) + c` from `z0` until `|z|² > 4` or `max_iterations`.
pub fn escape_time(
    kind: FractalKind,
    z0: DVec2,
    c: DVec2,
    power: f64,
    max_iterations: usize,
) -> Escape {
    let mut z = z0;
    for i in 0..max_iterations {
        z = kind.step(z, c, power);
        let mag_sq = z.length_squared();
        if mag_sq > BAILOUT_SQ || !mag_sq.is_finite() {
            let iterations = i + 1;
            let smooth = smooth_count(iterations, mag_sq, kind.degree(power));
            return Escape::Escaped { iterations, smooth };
        }
    }
    Escape::Inside
}

/// Normalized iteration count `n + 1 - log_d(ln |z|)`.
fn smooth_count(iterations: usize, mag_sq: f64, degree: f64) -> f64 {
    let n = iterations as f64;
    if !mag_sq.is_finite() || mag_sq <= 1.0 {
        return n;
    }
    let log_zn = mag_sq.ln() * 0.5;
    let nu = log_zn.ln() / degree.ln();
    if nu.is_finite() {
        (n + 1.0 - nu).max(0.0)
    } else {
        n
    }
}

/// Mapping between canvas pixels and the complex plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalView {
    pub center: DVec2,
    pub zoom: f64,
}

impl FractalView {
    pub fn new(center: DVec2, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Complex units per canvas pixel.
    pub fn scale(&self, width: f64, height: f64) -> f64 {
        BASE_SPAN / (self.zoom * width.min(height).max(1.0))
    }

    /// Complex coordinate under a canvas point. The imaginary axis points up.
    pub fn to_complex(&self, point: DVec2, width: f64, height: f64) -> DVec2 {
        let s = self.scale(width, height);
        DVec2::new(
            self.center.x + (point.x - width * 0.5) * s,
            self.center.y - (point.y - height * 0.5) * s,
        )
    }

    /// Visible window as `(min, max)` corners: real range on `x`, imaginary
    /// range on `y`.
    pub fn bounds(&self, width: f64, height: f64) -> (DVec2, DVec2) {
        let half = DVec2::new(width, height) * 0.5 * self.scale(width, height);
        (self.center - half, self.center + half)
    }

    /// Recenters on `point` and magnifies by `factor`, up to [`MAX_ZOOM`].
    pub fn zoom_at(&mut self, point: DVec2, factor: f64, width: f64, height: f64) {
        self.center = self.to_complex(point, width, height);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}
