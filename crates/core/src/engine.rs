//! The `Engine` contract shared by every simulation, plus frame-timing helpers.
//!
//! The trait is object-safe so hosts can hold a `Box<dyn Engine>` as well as
//! the closed `EngineKind` sum type from the engines crate.
//!
//! All operations take `&mut self` and are infallible: configuration problems
//! are clamped when options are parsed, degenerate geometry produces no force.
//! Because of the exclusive borrow, a configuration change or pointer event
//! can never interleave with an `advance` in progress.

use crate::color::Rgba;
use crate::config::Configuration;
use crate::surface::Surface;
use glam::DVec2;
use serde_json::Value;

/// Longest frame step honored by `advance`, in seconds.
pub const MAX_DT: f64 = 0.1;
/// Reference frame rate; per-frame constants are expressed at this rate.
pub const FRAME_RATE: f64 = 60.0;

/// Core trait for generative simulations.
pub trait Engine {
    /// Advances the simulation by `dt` seconds (clamped to `[0, MAX_DT]`).
    fn advance(&mut self, dt: f64);

    /// Draws the current state. Every engine covers the whole surface.
    fn render(&mut self, surface: &mut dyn Surface);

    /// Pointer position (canvas pixels) and whether it is pressed.
    /// `None` means the pointer left the canvas.
    fn on_interaction(&mut self, point: Option<DVec2>, active: bool);

    /// Replaces the configuration. Each engine decides whether the change
    /// needs a full re-initialization or can be applied in place.
    fn apply_configuration(&mut self, config: Configuration);

    /// Re-initializes all state from the current configuration.
    fn reset(&mut self);

    fn configuration(&self) -> &Configuration;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}

/// Converts a frame duration in seconds to 60 Hz frame units.
///
/// Negative or non-finite durations count as zero; long stalls are capped at
/// [`MAX_DT`] so a hidden tab cannot make the simulation jump.
pub fn frames_from_dt(dt: f64) -> f64 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(MAX_DT) * FRAME_RATE
}

/// Paints the background. With `trail > 0` the previous frame is only
/// partially covered, leaving motion trails.
pub fn paint_background(surface: &mut dyn Surface, background: Rgba, trail: f64) {
    let trail = if trail.is_finite() {
        trail.clamp(0.0, 0.99)
    } else {
        0.0
    };
    if trail > 0.0 {
        surface.clear(background.with_alpha(background.a * (1.0 - trail)));
    } else {
        surface.clear(background);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CommandRecorder, DrawCommand};
    use serde_json::json;

    /// Minimal engine implementation used to verify trait object safety.
    struct MockEngine {
        config: Configuration,
        elapsed_frames: f64,
    }

    impl MockEngine {
        fn new() -> Self {
            Self {
                config: Configuration::default(),
                elapsed_frames: 0.0,
            }
        }
    }

    impl Engine for MockEngine {
        fn advance(&mut self, dt: f64) {
            self.elapsed_frames += frames_from_dt(dt);
        }

        fn render(&mut self, surface: &mut dyn Surface) {
            paint_background(surface, self.config.background, 0.0);
        }

        fn on_interaction(&mut self, _point: Option<DVec2>, _active: bool) {}

        fn apply_configuration(&mut self, config: Configuration) {
            self.config = config;
        }

        fn reset(&mut self) {
            self.elapsed_frames = 0.0;
        }

        fn configuration(&self) -> &Configuration {
            &self.config
        }

        fn params(&self) -> Value {
            json!({"elapsed_frames": self.elapsed_frames})
        }

        fn param_schema(&self) -> Value {
            json!({"elapsed_frames": {"type": "number", "default": 0.0}})
        }
    }

    #[test]
    fn engine_trait_is_object_safe() {
        let mut engine: Box<dyn Engine> = Box::new(MockEngine::new());
        engine.advance(1.0 / 60.0);
        assert!((engine.params()["elapsed_frames"].as_f64().unwrap() - 1.0).abs() < 1e-9);
        engine.reset();
        assert_eq!(engine.params()["elapsed_frames"], 0.0);
    }

    #[test]
    fn dt_is_clamped() {
        assert_eq!(frames_from_dt(-1.0), 0.0);
        assert_eq!(frames_from_dt(f64::NAN), 0.0);
        assert_eq!(frames_from_dt(f64::INFINITY), 0.0);
        assert!((frames_from_dt(5.0) - 6.0).abs() < 1e-12);
        assert!((frames_from_dt(0.05) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn render_clears_with_background() {
        let mut engine = MockEngine::new();
        engine.apply_configuration(Configuration::default().with_background(Rgba::WHITE));
        let mut rec = CommandRecorder::new(800.0, 600.0);
        engine.render(&mut rec);
        assert_eq!(
            rec.commands()[0],
            DrawCommand::FillRect {
                x: 0.0,
                y: 0.0,
                w: 800.0,
                h: 600.0,
                color: Rgba::WHITE
            }
        );
    }

    #[test]
    fn trail_lowers_background_alpha() {
        let mut rec = CommandRecorder::new(10.0, 10.0);
        paint_background(&mut rec, Rgba::BLACK, 0.75);
        match rec.commands()[0] {
            DrawCommand::FillRect { color, .. } => assert!((color.a - 0.25).abs() < 1e-12),
            ref other => panic!("unexpected {other:?}"),
        }
    }
}
