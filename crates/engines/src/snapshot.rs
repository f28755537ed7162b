//! PNG output of rendered frames.
//!
//! Feature-gated behind `png` (default on) so hosts that only need pixels do
//! not pull in the `image` crate.

use pattern_engine_core::error::EngineError;
use pattern_engine_core::raster::Raster;
use pattern_engine_core::Engine;
use std::path::Path;

use crate::raster::render_to_raster;

/// Writes a raster as a PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the raster dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(raster.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(raster.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, raster.pixels().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    tracing::debug!(path = %path.display(), w, h, "snapshot written");
    Ok(())
}

/// Renders the engine's current state and writes it to `path`.
pub fn snapshot(engine: &mut dyn Engine, path: &Path) -> Result<(), EngineError> {
    let raster = render_to_raster(engine)?;
    write_png(&raster, path)
}
