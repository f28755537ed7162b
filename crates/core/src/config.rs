//! Host-owned configuration record.
//!
//! A [`Configuration`] captures everything needed to (re)build an engine:
//! algorithm, canvas size, background, palette, PRNG seed and the
//! algorithm-specific options object. The host replaces it wholesale on every
//! edit; engines only ever read it. The options object stays as JSON here:
//! each engine crate parses it into its own closed, typed params struct.

use crate::color::Rgba;
use crate::error::EngineError;
use crate::palette::ColorPalette;
use crate::params::{param_f64, param_string};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
pub const DEFAULT_SEED: u64 = 42;

/// Smallest canvas edge accepted; anything below is raised to it.
const MIN_CANVAS_EDGE: f64 = 1.0;
/// Largest canvas edge accepted.
const MAX_CANVAS_EDGE: f64 = 16_384.0;

/// Which engine a configuration drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    Particles,
    FlowField,
    CellularAutomaton,
    Fractal,
    Voronoi,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Particles,
        Algorithm::FlowField,
        Algorithm::CellularAutomaton,
        Algorithm::Fractal,
        Algorithm::Voronoi,
    ];

    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Particles => "particles",
            Algorithm::FlowField => "flow-field",
            Algorithm::CellularAutomaton => "cellular-automaton",
            Algorithm::Fractal => "fractal",
            Algorithm::Voronoi => "voronoi",
        }
    }

    /// Parses a selector, accepting a few common aliases.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        let normalized = name.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "particles" | "particle-system" => Ok(Algorithm::Particles),
            "flow-field" | "flowfield" | "flow" => Ok(Algorithm::FlowField),
            "cellular-automaton" | "automaton" | "cellular" => Ok(Algorithm::CellularAutomaton),
            "fractal" | "fractals" => Ok(Algorithm::Fractal),
            "voronoi" => Ok(Algorithm::Voronoi),
            _ => Err(EngineError::UnknownAlgorithm(name.to_string())),
        }
    }

    /// Parses a selector, substituting the default engine when unrecognized.
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|e| {
            tracing::warn!(error = %e, fallback = Algorithm::default().name(), "algorithm selector fallback");
            Algorithm::default()
        })
    }
}

/// Full configuration for one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    width: f64,
    height: f64,
    pub background: Rgba,
    pub palette: ColorPalette,
    pub algorithm: Algorithm,
    pub seed: u64,
    /// Algorithm-specific options; always a JSON object.
    options: Value,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: Rgba::BLACK,
            palette: ColorPalette::default(),
            algorithm: Algorithm::default(),
            seed: DEFAULT_SEED,
            options: Value::Object(Map::new()),
        }
    }
}

impl Configuration {
    /// Default configuration for `algorithm` on a `width × height` canvas.
    pub fn new(algorithm: Algorithm, width: f64, height: f64) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
        .with_canvas(width, height)
    }

    /// Returns a copy with the canvas size replaced; non-positive or
    /// non-finite sizes fall back to the defaults, the rest is clamped.
    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.width = sanitize_edge(width, DEFAULT_WIDTH);
        self.height = sanitize_edge(height, DEFAULT_HEIGHT);
        self
    }

    /// Returns a copy with the options object replaced. Non-objects are
    /// treated as an empty object.
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = if options.is_object() {
            options
        } else {
            Value::Object(Map::new())
        };
        self
    }

    /// Returns a copy with a single option set.
    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        if let Value::Object(map) = &mut self.options {
            map.insert(key.to_string(), value);
        }
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn options(&self) -> &Value {
        &self.options
    }

    /// True when the canvas dimensions differ.
    pub fn canvas_changed(&self, other: &Configuration) -> bool {
        self.width != other.width || self.height != other.height
    }

    /// True when anything that affects coloring differs.
    pub fn appearance_changed(&self, other: &Configuration) -> bool {
        self.background != other.background || self.palette != other.palette
    }

    /// Parses a configuration object. Every field is optional and every
    /// malformed value falls back to its default.
    ///
    /// ```json
    /// {"width": 800, "height": 600, "background": "#000000",
    ///  "palette": "ocean", "algorithm": "voronoi", "seed": 7,
    ///  "options": {"point_count": 40}}
    /// ```
    pub fn from_json(value: &Value) -> Self {
        let background = value
            .get("background")
            .and_then(Value::as_str)
            .and_then(|s| Rgba::from_hex(s).ok())
            .unwrap_or(Rgba::BLACK);
        let palette = value
            .get("palette")
            .map(ColorPalette::from_json)
            .unwrap_or_default();
        let algorithm =
            Algorithm::from_name_or_default(&param_string(value, "algorithm", "particles"));
        let seed = value
            .get("seed")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_SEED);
        let options = value.get("options").cloned().unwrap_or(Value::Null);
        Self {
            background,
            palette,
            algorithm,
            seed,
            ..Self::default()
        }
        .with_canvas(
            param_f64(value, "width", DEFAULT_WIDTH),
            param_f64(value, "height", DEFAULT_HEIGHT),
        )
        .with_options(options)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "width": self.width,
            "height": self.height,
            "background": self.background.to_hex(),
            "palette": self.palette.to_json(),
            "algorithm": self.algorithm.name(),
            "seed": self.seed,
            "options": self.options,
        })
    }
}

fn sanitize_edge(v: f64, default: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v.clamp(MIN_CANVAS_EDGE, MAX_CANVAS_EDGE)
    } else {
        default
    }
}
