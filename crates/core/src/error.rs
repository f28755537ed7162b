//! Error types for the pattern-engine core.
//!
//! Engine operations themselves never fail; these errors come from the
//! fallible constructors (colors, palettes, grids, rasters) and from the
//! snapshot/CLI layers built on top of them.

use thiserror::Error;

/// Errors produced by core constructors and output helpers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero when creating a grid or raster.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Two buffers had incompatible dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// An algorithm name did not match any known engine.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Writing an output artifact failed.
    #[error("i/o error: {0}")]
    Io(String),
}
