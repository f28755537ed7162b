//! Typed options for the Voronoi engine.

use pattern_engine_core::interaction::InteractionParams;
use pattern_engine_core::params::{
    param_bool, param_f64_clamped, param_string, param_usize_clamped,
};
use serde_json::{json, Value};

const DEFAULT_POINT_COUNT: usize = 30;
const DEFAULT_CELL_SIZE: usize = 4;

/// How a sample is colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// The owning point's color.
    #[default]
    Cell,
    /// Gradient by distance to the owning point.
    Distance,
    /// Gradient by direction from the owning point.
    Angle,
}

impl ColorMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cell" => Some(Self::Cell),
            "distance" => Some(Self::Distance),
            "angle" => Some(Self::Angle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Distance => "distance",
            Self::Angle => "angle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoronoiParams {
    pub point_count: usize,
    /// Sampling step in pixels.
    pub cell_size: usize,
    pub color_mode: ColorMode,
    pub show_borders: bool,
    pub show_points: bool,
    pub speed: f64,
    pub interaction: InteractionParams,
}

impl Default for VoronoiParams {
    fn default() -> Self {
        Self::from_json(&json!({}))
    }
}

impl VoronoiParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            point_count: param_usize_clamped(params, "point_count", DEFAULT_POINT_COUNT, 0, 1000),
            cell_size: param_usize_clamped(params, "cell_size", DEFAULT_CELL_SIZE, 1, 64),
            color_mode: ColorMode::from_name(&param_string(params, "color_mode", "cell"))
                .unwrap_or_default(),
            show_borders: param_bool(params, "show_borders", true),
            show_points: param_bool(params, "show_points", true),
            speed: param_f64_clamped(params, "speed", 1.0, 0.0, 20.0),
            interaction: InteractionParams::from_json(params),
        }
    }

    pub fn needs_reinit(&self, other: &VoronoiParams) -> bool {
        self.point_count != other.point_count
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "point_count": self.point_count,
            "cell_size": self.cell_size,
            "color_mode": self.color_mode.name(),
            "show_borders": self.show_borders,
            "show_points": self.show_points,
            "speed": self.speed,
        });
        self.interaction.write_json(&mut out);
        out
    }

    pub fn schema() -> Value {
        let mut schema = json!({
            "point_count": {
                "type": "integer", "default": DEFAULT_POINT_COUNT, "min": 0, "max": 1000,
                "description": "Number of seed points"
            },
            "cell_size": {
                "type": "integer", "default": DEFAULT_CELL_SIZE, "min": 1, "max": 64,
                "description": "Sampling step in pixels"
            },
            "color_mode": {
                "type": "enum", "default": "cell", "options": ["cell", "distance", "angle"],
                "description": "Per-sample coloring"
            },
            "show_borders": {
                "type": "boolean", "default": true,
                "description": "Outline cell boundaries"
            },
            "show_points": {
                "type": "boolean", "default": true,
                "description": "Mark seed points"
            },
            "speed": {
                "type": "number", "default": 1.0, "min": 0.0, "max": 20.0,
                "description": "Drift speed in pixels per frame"
            }
        });
        InteractionParams::write_schema(&mut schema);
        schema
    }
}
