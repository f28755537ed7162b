//! CPU rendering of an engine into an RGBA8 [`Raster`].
//!
//! Always available (no feature gate) so hosts that do not write PNGs can
//! still grab pixels.

use glam::DVec2;
use pattern_engine_core::error::EngineError;
use pattern_engine_core::raster::Raster;
use pattern_engine_core::surface::PixelSurface;
use pattern_engine_core::Engine;

/// Pointer input to replay while running frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerScript {
    pub position: DVec2,
    /// Frames (from the start) during which the pointer is held down.
    pub held_frames: usize,
}

/// Renders the engine's current state onto a raster the size of its canvas.
pub fn render_to_raster(engine: &mut dyn Engine) -> Result<Raster, EngineError> {
    let config = engine.configuration();
    let width = config.width().ceil() as usize;
    let height = config.height().ceil() as usize;
    let raster = Raster::new(width, height, config.background)?;
    let mut surface = PixelSurface::new(raster);
    engine.render(&mut surface);
    Ok(surface.into_raster())
}

/// Advances `frames` steps of `dt` seconds. Trail-style engines need every
/// frame painted, so each step also renders onto the persistent surface.
pub fn run_frames(
    engine: &mut dyn Engine,
    frames: usize,
    dt: f64,
    pointer: Option<PointerScript>,
) -> Result<Raster, EngineError> {
    let config = engine.configuration();
    let width = config.width().ceil() as usize;
    let height = config.height().ceil() as usize;
    let mut surface = PixelSurface::new(Raster::new(width, height, config.background)?);
    for frame in 0..frames {
        if let Some(script) = pointer {
            engine.on_interaction(Some(script.position), frame < script.held_frames);
        }
        engine.advance(dt);
        engine.render(&mut surface);
    }
    if frames == 0 {
        engine.render(&mut surface);
    }
    tracing::debug!(frames, width, height, "frames rendered");
    Ok(surface.into_raster())
}
