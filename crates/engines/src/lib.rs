#![deny(unsafe_code)]
//! Engine factory: maps an [`Algorithm`] to its implementation and provides
//! CPU-side snapshot rendering.
//!
//! This crate sits between `pattern-engine-core` (which defines the `Engine`
//! trait) and the individual engine crates. The CLI and any other host depend
//! on it so dispatch lives in one place.

pub mod raster;

#[cfg(feature = "png")]
pub mod snapshot;

use glam::DVec2;
use pattern_engine_automaton::CellularAutomaton;
use pattern_engine_core::config::Algorithm;
use pattern_engine_core::surface::Surface;
use pattern_engine_core::{Configuration, Engine};
use pattern_engine_flow_field::FlowField;
use pattern_engine_fractal::Fractal;
use pattern_engine_particles::ParticleSystem;
use pattern_engine_voronoi::Voronoi;
use serde_json::Value;

/// One of the five engines.
///
/// Wraps each implementation and delegates the `Engine` trait methods.
pub enum EngineKind {
    Particles(ParticleSystem),
    FlowField(FlowField),
    CellularAutomaton(CellularAutomaton),
    Fractal(Fractal),
    Voronoi(Voronoi),
}

macro_rules! dispatch {
    ($self:expr, $engine:ident => $call:expr) => {
        match $self {
            EngineKind::Particles($engine) => $call,
            EngineKind::FlowField($engine) => $call,
            EngineKind::CellularAutomaton($engine) => $call,
            EngineKind::Fractal($engine) => $call,
            EngineKind::Voronoi($engine) => $call,
        }
    };
}

impl EngineKind {
    /// Builds the engine selected by `config.algorithm`.
    pub fn create(config: Configuration) -> Self {
        tracing::debug!(algorithm = config.algorithm.name(), "creating engine");
        match config.algorithm {
            Algorithm::Particles => EngineKind::Particles(ParticleSystem::new(config)),
            Algorithm::FlowField => EngineKind::FlowField(FlowField::new(config)),
            Algorithm::CellularAutomaton => {
                EngineKind::CellularAutomaton(CellularAutomaton::new(config))
            }
            Algorithm::Fractal => EngineKind::Fractal(Fractal::new(config)),
            Algorithm::Voronoi => EngineKind::Voronoi(Voronoi::new(config)),
        }
    }

    /// Builds an engine from a selector string. Unrecognized names fall back
    /// to the particle system with a warning.
    pub fn from_name(name: &str, mut config: Configuration) -> Self {
        config.algorithm = Algorithm::from_name_or_default(name);
        Self::create(config)
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            EngineKind::Particles(_) => Algorithm::Particles,
            EngineKind::FlowField(_) => Algorithm::FlowField,
            EngineKind::CellularAutomaton(_) => Algorithm::CellularAutomaton,
            EngineKind::Fractal(_) => Algorithm::Fractal,
            EngineKind::Voronoi(_) => Algorithm::Voronoi,
        }
    }

    /// Canonical names of every algorithm.
    pub fn list_algorithms() -> Vec<&'static str> {
        Algorithm::ALL.iter().map(|a| a.name()).collect()
    }

    /// Default parameter schema for an algorithm, without building it on a
    /// real canvas.
    pub fn schema_for(algorithm: Algorithm) -> Value {
        Self::create(Configuration::new(algorithm, 64.0, 64.0)).param_schema()
    }
}

impl Engine for EngineKind {
    fn advance(&mut self, dt: f64) {
        dispatch!(self, e => e.advance(dt))
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        dispatch!(self, e => e.render(surface))
    }

    fn on_interaction(&mut self, point: Option<DVec2>, active: bool) {
        dispatch!(self, e => e.on_interaction(point, active))
    }

    /// A configuration selecting a different algorithm replaces the engine
    /// and drops all previous state.
    fn apply_configuration(&mut self, config: Configuration) {
        if config.algorithm != self.algorithm() {
            *self = Self::create(config);
            return;
        }
        dispatch!(self, e => e.apply_configuration(config))
    }

    fn reset(&mut self) {
        dispatch!(self, e => e.reset())
    }

    fn configuration(&self) -> &Configuration {
        dispatch!(self, e => e.configuration())
    }

    fn params(&self) -> Value {
        dispatch!(self, e => e.params())
    }

    fn param_schema(&self) -> Value {
        dispatch!(self, e => e.param_schema())
    }
}
