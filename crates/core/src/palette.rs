//! Ordered color palette with a selection mode and opacity.
//!
//! [`ColorPalette::color_at_progress`] is the lookup used for anything driven
//! by a scalar (fractal escape counts, automaton cell ages, Voronoi distance).
//! [`ColorPalette::pick`] implements the selection mode and is what engines
//! call when assigning a color to a newly spawned entity.

use crate::color::Rgba;
use crate::error::EngineError;
use crate::params::{param_f64_clamped, param_string};
use crate::prng::Xorshift64;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// How a palette hands out colors to new entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteMode {
    /// Every entity gets the first color.
    Single,
    /// Each entity gets one of the palette colors at random.
    Random,
    /// Each entity gets a random point along the interpolated gradient.
    #[default]
    Gradient,
}

impl PaletteMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "single" | "solid" => Some(PaletteMode::Single),
            "random" | "discrete" => Some(PaletteMode::Random),
            "gradient" | "interpolated" => Some(PaletteMode::Gradient),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaletteMode::Single => "single",
            PaletteMode::Random => "random",
            PaletteMode::Gradient => "gradient",
        }
    }
}

/// Non-empty ordered list of colors plus a mode and an opacity in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<Rgba>,
    mode: PaletteMode,
    opacity: f64,
}

const BUILTIN_NAMES: &[&str] = &[
    "default", "ocean", "neon", "fire", "earth", "monochrome", "vapor",
];

impl ColorPalette {
    /// Requires at least one color. Opacity is clamped to [0, 1].
    pub fn new(colors: Vec<Rgba>, mode: PaletteMode, opacity: f64) -> Result<Self, EngineError> {
        if colors.is_empty() {
            return Err(EngineError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self {
            colors,
            mode,
            opacity: if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) },
        })
    }

    /// Parses hex strings into a gradient palette at full opacity.
    pub fn from_hex(hexes: &[&str]) -> Result<Self, EngineError> {
        let colors = hexes
            .iter()
            .map(|h| Rgba::from_hex(h))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors, PaletteMode::Gradient, 1.0)
    }

    /// Built-in palette by name (case insensitive).
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        let hexes: &[&str] = match name.trim().to_ascii_lowercase().as_str() {
            "default" => &["#3b82f6", "#8b5cf6"],
            "ocean" => &["#001f3f", "#003366", "#005f73", "#0a9396", "#94d2bd"],
            "neon" => &["#ff00ff", "#00ff41", "#ffff00", "#ff0080", "#00ffff"],
            "fire" => &["#800000", "#cc0000", "#ff4500", "#ff8c00", "#ffd700"],
            "earth" => &["#5c4033", "#8b6914", "#6b8e23", "#daa520", "#d2b48c"],
            "monochrome" => &["#000000", "#404040", "#808080", "#c0c0c0", "#ffffff"],
            "vapor" => &["#7b2d8e", "#c77dff", "#ff9ebb", "#80ced6", "#a0e7e5"],
            other => {
                return Err(EngineError::InvalidPalette(format!(
                    "unknown palette '{other}'"
                )))
            }
        };
        Self::from_hex(hexes)
    }

    /// Names accepted by [`ColorPalette::from_name`].
    pub fn list_names() -> &'static [&'static str] {
        BUILTIN_NAMES
    }

    /// Reads a palette from configuration JSON.
    ///
    /// Accepts a built-in name (`"ocean"`) or an object
    /// `{"colors": [...], "mode": "gradient", "opacity": 1.0}`. Anything that
    /// cannot be used produces the default blue→purple gradient; colors that
    /// fail to parse are skipped.
    pub fn from_json(value: &Value) -> Self {
        if let Some(name) = value.as_str() {
            return Self::from_name(name).unwrap_or_default();
        }
        let colors: Vec<Rgba> = value
            .get("colors")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|s| Rgba::from_hex(s).ok())
                    .collect()
            })
            .unwrap_or_default();
        let mode = PaletteMode::from_name(&param_string(value, "mode", "gradient"))
            .unwrap_or_default();
        let opacity = param_f64_clamped(value, "opacity", 1.0, 0.0, 1.0);
        match Self::new(colors, mode, opacity) {
            Ok(p) => p,
            Err(_) => Self {
                mode,
                opacity,
                ..Self::default()
            },
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "colors": self.colors.iter().map(|c| c.to_hex()).collect::<Vec<_>>(),
            "mode": self.mode.name(),
            "opacity": self.opacity,
        })
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn mode(&self) -> PaletteMode {
        self.mode
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn first(&self) -> Rgba {
        self.colors[0]
    }

    pub fn last(&self) -> Rgba {
        self.colors[self.colors.len() - 1]
    }

    /// Color at `t` in [0, 1]; `t` is clamped and NaN reads as 0.
    ///
    /// Gradient mode interpolates linearly between neighbouring stops; the
    /// discrete modes snap to the nearest stop. In every mode `t = 0` is the
    /// first color and `t = 1` the last.
    pub fn color_at_progress(&self, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.colors.len();
        if n == 1 {
            return self.colors[0];
        }
        if t >= 1.0 {
            return self.last();
        }
        let scaled = t * (n - 1) as f64;
        match self.mode {
            PaletteMode::Gradient => {
                let idx = (scaled as usize).min(n - 2);
                let frac = scaled - idx as f64;
                self.colors[idx].lerp(self.colors[idx + 1], frac)
            }
            PaletteMode::Single | PaletteMode::Random => {
                self.colors[(scaled.round() as usize).min(n - 1)]
            }
        }
    }

    /// Color by index, cycling through the stops.
    pub fn color_at_index(&self, index: usize) -> Rgba {
        self.colors[index % self.colors.len()]
    }

    /// Color for a new entity according to the palette mode.
    pub fn pick(&self, rng: &mut Xorshift64) -> Rgba {
        match self.mode {
            PaletteMode::Single => self.colors[0],
            PaletteMode::Random => self.colors[rng.next_usize(self.colors.len())],
            PaletteMode::Gradient => self.color_at_progress(rng.next_f64()),
        }
    }

    /// Applies the palette opacity to a color it produced.
    pub fn apply_opacity(&self, color: Rgba) -> Rgba {
        color.fade(self.opacity)
    }
}

impl Default for ColorPalette {
    /// Two-stop blue→purple gradient.
    fn default() -> Self {
        Self {
            colors: vec![
                Rgba::rgb(59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0),
                Rgba::rgb(139.0 / 255.0, 92.0 / 255.0, 246.0 / 255.0),
            ],
            mode: PaletteMode::Gradient,
            opacity: 1.0,
        }
    }
}
