#![deny(unsafe_code)]
//! Core types and traits for the pattern-engine simulations.
//!
//! Provides the `Engine` contract, `Configuration`, `ColorPalette`, `Rgba`,
//! the `Surface` drawing abstraction (with `PixelSurface` and
//! `CommandRecorder`), `Particle`, `Grid`, `Raster`, `SpatialHash`, the
//! `Xorshift64` PRNG, and typed parameter helpers.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod interaction;
pub mod palette;
pub mod params;
pub mod particle;
pub mod prng;
pub mod raster;
pub mod spatial;
pub mod surface;

pub use color::Rgba;
pub use config::{Algorithm, Configuration};
pub use engine::Engine;
pub use error::EngineError;
pub use grid::Grid;
pub use interaction::{InteractionParams, PointerState};
pub use palette::{ColorPalette, PaletteMode};
pub use particle::{Particle, ParticleShape};
pub use prng::Xorshift64;
pub use raster::Raster;
pub use spatial::SpatialHash;
pub use surface::{CommandRecorder, DrawCommand, PixelSurface, Surface};
