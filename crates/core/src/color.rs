//! RGBA color type shared by palettes, particles and surfaces.
//!
//! Components are `f64` in [0, 1]. Colors serialize as hex strings
//! (`"#rrggbb"` when opaque, `"#rrggbbaa"` otherwise), which is what the
//! configuration JSON carries.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parses `"#rrggbb"`, `"#rrggbbaa"`, or the same without `#` (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Rgba, EngineError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 && hex.len() != 8 {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 or 8 hex digits, got {}",
                hex.len()
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| -> Result<f64, EngineError> {
            let digits = hex
                .get(range)
                .ok_or_else(|| EngineError::InvalidColor(format!("invalid {name} component")))?;
            u8::from_str_radix(digits, 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        let a = if hex.len() == 8 {
            channel(6..8, "alpha")?
        } else {
            1.0
        };
        Ok(Rgba {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
            a,
        })
    }

    /// Formats as `"#rrggbb"`, or `"#rrggbbaa"` when not fully opaque.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// Quantizes to 8-bit channels with rounding.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self::new(
            px[0] as f64 / 255.0,
            px[1] as f64 / 255.0,
            px[2] as f64 / 255.0,
            px[3] as f64 / 255.0,
        )
    }

    /// Linear interpolation of all four channels; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Same color with alpha replaced.
    pub fn with_alpha(self, a: f64) -> Rgba {
        Rgba {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn fade(self, factor: f64) -> Rgba {
        self.with_alpha(self.a * factor)
    }

    /// Source-over compositing of `self` onto an opaque-or-not `dst`.
    pub fn over(self, dst: Rgba) -> Rgba {
        let sa = self.a.clamp(0.0, 1.0);
        let da = dst.a.clamp(0.0, 1.0);
        let out_a = sa + da * (1.0 - sa);
        if out_a <= f64::EPSILON {
            return Rgba::TRANSPARENT;
        }
        let mix = |s: f64, d: f64| (s * sa + d * da * (1.0 - sa)) / out_a;
        Rgba {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: out_a,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::BLACK
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: Rgba, b: Rgba) -> bool {
        (a.r - b.r).abs() < EPSILON
            && (a.g - b.g).abs() < EPSILON
            && (a.b - b.b).abs() < EPSILON
            && (a.a - b.a).abs() < EPSILON
    }

    #[test]
    fn from_hex_parses_rgb_and_rgba() {
        let red = Rgba::from_hex("#ff0000").unwrap();
        assert!(approx_eq(red, Rgba::rgb(1.0, 0.0, 0.0)));
        let half = Rgba::from_hex("0000FF80").unwrap();
        assert_eq!(half.to_rgba8(), [0, 0, 255, 128]);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Rgba::from_hex("#fff").is_err());
        assert!(Rgba::from_hex("#gg0000").is_err());
        assert!(Rgba::from_hex("").is_err());
    }

    #[test]
    fn to_hex_omits_alpha_when_opaque() {
        assert_eq!(Rgba::rgb(1.0, 0.0, 0.0).to_hex(), "#ff0000");
        assert_eq!(Rgba::new(0.0, 0.0, 0.0, 0.0).to_hex(), "#00000000");
    }

    #[test]
    fn lerp_midpoint_is_exact_average() {
        let mid = Rgba::rgb(1.0, 0.0, 0.0).lerp(Rgba::rgb(0.0, 0.0, 1.0), 0.5);
        assert!(approx_eq(mid, Rgba::rgb(0.5, 0.0, 0.5)));
    }

    #[test]
    fn lerp_clamps_and_handles_nan() {
        let a = Rgba::BLACK;
        let b = Rgba::WHITE;
        assert!(approx_eq(a.lerp(b, 3.0), b));
        assert!(approx_eq(a.lerp(b, f64::NAN), a));
    }

    #[test]
    fn over_with_opaque_source_replaces_destination() {
        let out = Rgba::rgb(0.2, 0.4, 0.6).over(Rgba::WHITE);
        assert!(approx_eq(out, Rgba::rgb(0.2, 0.4, 0.6)));
    }

    #[test]
    fn over_with_transparent_source_keeps_destination() {
        let out = Rgba::TRANSPARENT.over(Rgba::rgb(0.1, 0.2, 0.3));
        assert!(approx_eq(out, Rgba::rgb(0.1, 0.2, 0.3)));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgba::rgb(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(json, "\"#00ff00\"");
        let back: Rgba = serde_json::from_str("\"#00ff00\"").unwrap();
        assert!(approx_eq(back, Rgba::rgb(0.0, 1.0, 0.0)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn lerp_stays_between_endpoints(t in -2.0_f64..3.0, a in 0.0_f64..=1.0, b in 0.0_f64..=1.0) {
                let c = Rgba::rgb(a, a, a).lerp(Rgba::rgb(b, b, b), t);
                prop_assert!(c.r >= a.min(b) - EPSILON && c.r <= a.max(b) + EPSILON);
            }

            #[test]
            fn over_alpha_stays_in_unit_interval(sa in 0.0_f64..=1.0, da in 0.0_f64..=1.0) {
                let out = Rgba::new(0.3, 0.3, 0.3, sa).over(Rgba::new(0.7, 0.7, 0.7, da));
                prop_assert!(out.a >= 0.0 && out.a <= 1.0 + EPSILON);
            }
        }
    }
}
