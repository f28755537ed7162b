//! Typed options for the fractal engine.

use crate::escape::{FractalKind, MAX_ZOOM, MIN_ZOOM};
use glam::DVec2;
use pattern_engine_core::interaction::InteractionParams;
use pattern_engine_core::params::{
    param_bool, param_f64, param_f64_clamped, param_pair, param_string, param_usize_clamped,
};
use serde_json::{json, Value};

const DEFAULT_JULIA: (f64, f64) = (-0.7, 0.27015);
const DEFAULT_MAX_ITERATIONS: usize = 100;
const DEFAULT_POWER: f64 = 3.0;
const DEFAULT_ZOOM_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    pub kind: FractalKind,
    pub julia: DVec2,
    pub zoom: f64,
    pub center: DVec2,
    pub max_iterations: usize,
    /// Exponent of the multibrot recurrence, in [2, 8].
    pub power: f64,
    pub smooth_coloring: bool,
    pub zoom_factor: f64,
    /// Canvas pixels per computed sample along each axis.
    pub resolution: usize,
    pub animate_julia: bool,
    pub interaction: InteractionParams,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self::from_json(&json!({}))
    }
}

impl FractalParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        let kind =
            FractalKind::from_name(&param_string(params, "fractal_type", "mandelbrot"))
                .unwrap_or_default();
        let julia = match param_pair(params, "julia_constant") {
            Some((re, im)) => DVec2::new(re, im),
            None => DVec2::new(
                param_f64(params, "julia_real", DEFAULT_JULIA.0),
                param_f64(params, "julia_imag", DEFAULT_JULIA.1),
            ),
        };
        let default_center = kind.default_center();
        let zoom = param_f64(params, "zoom", 1.0);
        Self {
            kind,
            julia,
            zoom: if zoom > 0.0 {
                zoom.clamp(MIN_ZOOM, MAX_ZOOM)
            } else {
                1.0
            },
            center: DVec2::new(
                param_f64(params, "center_x", default_center.x),
                param_f64(params, "center_y", default_center.y),
            ),
            max_iterations: param_usize_clamped(
                params,
                "max_iterations",
                DEFAULT_MAX_ITERATIONS,
                10,
                5000,
            ),
            power: param_f64_clamped(params, "power", DEFAULT_POWER, 2.0, 8.0),
            smooth_coloring: param_bool(params, "smooth_coloring", true),
            zoom_factor: {
                let f = param_f64(params, "zoom_factor", DEFAULT_ZOOM_FACTOR);
                if f > 1.0 {
                    f.min(100.0)
                } else {
                    DEFAULT_ZOOM_FACTOR
                }
            },
            resolution: param_usize_clamped(params, "resolution", 1, 1, 8),
            animate_julia: param_bool(params, "animate_julia", false),
            interaction: InteractionParams::from_json(params),
        }
    }

    /// True when the computed image depends on a field that differs.
    pub fn changes_image(&self, other: &FractalParams) -> bool {
        self.kind != other.kind
            || self.julia != other.julia
            || self.zoom != other.zoom
            || self.center != other.center
            || self.max_iterations != other.max_iterations
            || self.power != other.power
            || self.smooth_coloring != other.smooth_coloring
            || self.resolution != other.resolution
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "fractal_type": self.kind.name(),
            "julia_real": self.julia.x,
            "julia_imag": self.julia.y,
            "zoom": self.zoom,
            "center_x": self.center.x,
            "center_y": self.center.y,
            "max_iterations": self.max_iterations,
            "power": self.power,
            "smooth_coloring": self.smooth_coloring,
            "zoom_factor": self.zoom_factor,
            "resolution": self.resolution,
            "animate_julia": self.animate_julia,
        });
        self.interaction.write_json(&mut out);
        out
    }

    pub fn schema() -> Value {
        let mut schema = json!({
            "fractal_type": {
                "type": "enum", "default": "mandelbrot",
                "options": ["mandelbrot", "julia", "burning-ship", "tricorn", "multibrot"],
                "description": "Escape-time recurrence"
            },
            "julia_real": {
                "type": "number", "default": DEFAULT_JULIA.0,
                "description": "Real part of the Julia constant"
            },
            "julia_imag": {
                "type": "number", "default": DEFAULT_JULIA.1,
                "description": "Imaginary part of the Julia constant"
            },
            "julia_constant": {
                "type": "array", "default": [DEFAULT_JULIA.0, DEFAULT_JULIA.1],
                "description": "[re, im]; overrides julia_real and julia_imag"
            },
            "zoom": {
                "type": "number", "default": 1.0, "min": MIN_ZOOM, "max": MAX_ZOOM,
                "description": "Magnification"
            },
            "center_x": {
                "type": "number", "default": -0.5,
                "description": "Real coordinate of the view center (0 for julia)"
            },
            "center_y": {
                "type": "number", "default": 0.0,
                "description": "Imaginary coordinate of the view center"
            },
            "max_iterations": {
                "type": "integer", "default": DEFAULT_MAX_ITERATIONS, "min": 10, "max": 5000,
                "description": "Iteration cap"
            },
            "power": {
                "type": "number", "default": DEFAULT_POWER, "min": 2.0, "max": 8.0,
                "description": "Exponent for multibrot"
            },
            "smooth_coloring": {
                "type": "boolean", "default": true,
                "description": "Continuous escape coloring"
            },
            "zoom_factor": {
                "type": "number", "default": DEFAULT_ZOOM_FACTOR, "min": 1.0, "max": 100.0,
                "description": "Zoom applied per press"
            },
            "resolution": {
                "type": "integer", "default": 1, "min": 1, "max": 8,
                "description": "Pixels per computed sample"
            },
            "animate_julia": {
                "type": "boolean", "default": false,
                "description": "Slowly orbit the Julia constant"
            }
        });
        InteractionParams::write_schema(&mut schema);
        schema
    }
}
