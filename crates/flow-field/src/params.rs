//! Typed options for the flow-field engine.

use crate::noise_source::NoiseKind;
use pattern_engine_core::interaction::InteractionParams;
use pattern_engine_core::params::{
    param_bool, param_f64_clamped, param_string, param_usize, param_usize_clamped,
};
use serde_json::{json, Value};

pub const DEFAULT_PARTICLE_COUNT: usize = 500;
pub const MAX_PARTICLE_COUNT: usize = 10_000;
const DEFAULT_CELL_SIZE: f64 = 20.0;
const DEFAULT_NOISE_SCALE: f64 = 0.01;
const DEFAULT_FIELD_SPEED: f64 = 0.005;
const DEFAULT_REGEN_INTERVAL: usize = 2;
const DEFAULT_SPEED: f64 = 2.0;
const DEFAULT_MIN_SIZE: f64 = 1.0;
const DEFAULT_MAX_SIZE: f64 = 3.0;
const DEFAULT_DECAY: f64 = 0.003;
const DEFAULT_BURST_SIZE: usize = 20;
const DEFAULT_TRAIL: f64 = 0.9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeMode {
    #[default]
    Wrap,
    Respawn,
}

impl EdgeMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wrap" => Some(EdgeMode::Wrap),
            "respawn" => Some(EdgeMode::Respawn),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EdgeMode::Wrap => "wrap",
            EdgeMode::Respawn => "respawn",
        }
    }
}

/// What the pointer does to the field.
///
/// `disturb` bends nearby vectors away from the pointer; `attract` bends
/// them toward it; `spawn` recycles a burst of particles at the pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowInteraction {
    #[default]
    Disturb,
    Attract,
    Spawn,
}

impl FlowInteraction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "disturb" | "repel" => Some(FlowInteraction::Disturb),
            "attract" => Some(FlowInteraction::Attract),
            "spawn" => Some(FlowInteraction::Spawn),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FlowInteraction::Disturb => "disturb",
            FlowInteraction::Attract => "attract",
            FlowInteraction::Spawn => "spawn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowFieldParams {
    pub particle_count: usize,
    pub cell_size: f64,
    pub noise_scale: f64,
    pub noise: NoiseKind,
    pub animate_field: bool,
    pub field_speed: f64,
    pub regen_interval: usize,
    pub blend_fraction: f64,
    pub speed: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub decay: f64,
    pub edge_mode: EdgeMode,
    pub interaction_mode: FlowInteraction,
    pub burst_size: usize,
    pub show_field: bool,
    pub trail: f64,
    pub interaction: InteractionParams,
}

impl Default for FlowFieldParams {
    fn default() -> Self {
        Self::from_json(&json!({}))
    }
}

impl FlowFieldParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        let mut min_size = param_f64_clamped(params, "min_size", DEFAULT_MIN_SIZE, 0.1, 100.0);
        let mut max_size = param_f64_clamped(params, "max_size", DEFAULT_MAX_SIZE, 0.1, 100.0);
        if min_size > max_size {
            std::mem::swap(&mut min_size, &mut max_size);
        }
        Self {
            particle_count: param_usize(params, "particle_count", DEFAULT_PARTICLE_COUNT)
                .min(MAX_PARTICLE_COUNT),
            cell_size: param_f64_clamped(params, "cell_size", DEFAULT_CELL_SIZE, 4.0, 200.0),
            noise_scale: param_f64_clamped(params, "noise_scale", DEFAULT_NOISE_SCALE, 1e-5, 1.0),
            noise: NoiseKind::from_name(&param_string(params, "noise", "perlin"))
                .unwrap_or_default(),
            animate_field: param_bool(params, "animate_field", true),
            field_speed: param_f64_clamped(params, "field_speed", DEFAULT_FIELD_SPEED, 0.0, 1.0),
            regen_interval: param_usize_clamped(
                params,
                "regen_interval",
                DEFAULT_REGEN_INTERVAL,
                1,
                600,
            ),
            blend_fraction: param_f64_clamped(params, "blend_fraction", 1.0, 0.01, 1.0),
            speed: param_f64_clamped(params, "speed", DEFAULT_SPEED, 0.0, 50.0),
            min_size,
            max_size,
            decay: param_f64_clamped(params, "decay", DEFAULT_DECAY, 0.0, 1.0),
            edge_mode: EdgeMode::from_name(&param_string(params, "edge_mode", "wrap"))
                .unwrap_or_default(),
            interaction_mode: FlowInteraction::from_name(&param_string(
                params,
                "interaction_mode",
                "disturb",
            ))
            .unwrap_or_default(),
            burst_size: param_usize_clamped(params, "burst_size", DEFAULT_BURST_SIZE, 1, 1000),
            show_field: param_bool(params, "show_field", false),
            trail: param_f64_clamped(params, "trail", DEFAULT_TRAIL, 0.0, 0.99),
            interaction: InteractionParams::from_json(params),
        }
    }

    /// Changes that need a new particle pool.
    pub fn needs_reinit(&self, other: &FlowFieldParams) -> bool {
        self.particle_count != other.particle_count
    }

    /// Changes that need the vector grid rebuilt.
    pub fn needs_new_field(&self, other: &FlowFieldParams) -> bool {
        self.cell_size != other.cell_size
            || self.noise != other.noise
            || self.noise_scale != other.noise_scale
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "particle_count": self.particle_count,
            "cell_size": self.cell_size,
            "noise_scale": self.noise_scale,
            "noise": self.noise.name(),
            "animate_field": self.animate_field,
            "field_speed": self.field_speed,
            "regen_interval": self.regen_interval,
            "blend_fraction": self.blend_fraction,
            "speed": self.speed,
            "min_size": self.min_size,
            "max_size": self.max_size,
            "decay": self.decay,
            "edge_mode": self.edge_mode.name(),
            "interaction_mode": self.interaction_mode.name(),
            "burst_size": self.burst_size,
            "show_field": self.show_field,
            "trail": self.trail,
        });
        self.interaction.write_json(&mut out);
        out
    }

    pub fn schema() -> Value {
        let mut schema = json!({
            "particle_count": {
                "type": "integer", "default": DEFAULT_PARTICLE_COUNT, "min": 0, "max": MAX_PARTICLE_COUNT,
                "description": "Number of advected particles"
            },
            "cell_size": {
                "type": "number", "default": DEFAULT_CELL_SIZE, "min": 4.0, "max": 200.0,
                "description": "Vector grid cell edge in pixels"
            },
            "noise_scale": {
                "type": "number", "default": DEFAULT_NOISE_SCALE, "min": 0.00001, "max": 1.0,
                "description": "Spatial frequency of the noise"
            },
            "noise": {
                "type": "enum", "default": "perlin", "options": ["perlin", "simplex", "curl"],
                "description": "Noise generator"
            },
            "animate_field": {
                "type": "boolean", "default": true,
                "description": "Evolve the field over time"
            },
            "field_speed": {
                "type": "number", "default": DEFAULT_FIELD_SPEED, "min": 0.0, "max": 1.0,
                "description": "Noise depth added per frame"
            },
            "regen_interval": {
                "type": "integer", "default": DEFAULT_REGEN_INTERVAL, "min": 1, "max": 600,
                "description": "Frames between field regenerations"
            },
            "blend_fraction": {
                "type": "number", "default": 1.0, "min": 0.01, "max": 1.0,
                "description": "Share of cells refreshed per regeneration"
            },
            "speed": {
                "type": "number", "default": DEFAULT_SPEED, "min": 0.0, "max": 50.0,
                "description": "Particle speed in pixels per frame"
            },
            "min_size": {
                "type": "number", "default": DEFAULT_MIN_SIZE, "min": 0.1, "max": 100.0,
                "description": "Smallest particle diameter"
            },
            "max_size": {
                "type": "number", "default": DEFAULT_MAX_SIZE, "min": 0.1, "max": 100.0,
                "description": "Largest particle diameter"
            },
            "decay": {
                "type": "number", "default": DEFAULT_DECAY, "min": 0.0, "max": 1.0,
                "description": "Life lost per frame"
            },
            "edge_mode": {
                "type": "enum", "default": "wrap", "options": ["wrap", "respawn"],
                "description": "What happens when a particle leaves the canvas"
            },
            "interaction_mode": {
                "type": "enum", "default": "disturb", "options": ["disturb", "attract", "spawn"],
                "description": "Pointer effect"
            },
            "burst_size": {
                "type": "integer", "default": DEFAULT_BURST_SIZE, "min": 1, "max": 1000,
                "description": "Particles recycled per frame in spawn mode"
            },
            "show_field": {
                "type": "boolean", "default": false,
                "description": "Draw the vector grid"
            },
            "trail": {
                "type": "number", "default": DEFAULT_TRAIL, "min": 0.0, "max": 0.99,
                "description": "Motion trail persistence"
            }
        });
        InteractionParams::write_schema(&mut schema);
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = FlowFieldParams::default();
        assert_eq!(p.particle_count, 500);
        assert_eq!(p.cell_size, 20.0);
        assert_eq!(p.noise, NoiseKind::Perlin);
        assert!(p.animate_field);
        assert_eq!(p.regen_interval, 2);
        assert_eq!(p.blend_fraction, 1.0);
        assert_eq!(p.interaction_mode, FlowInteraction::Disturb);
        assert_eq!(p.trail, 0.9);
    }

    #[test]
    fn ranges_are_clamped() {
        let p = FlowFieldParams::from_json(&json!({
            "cell_size": 1.0,
            "regen_interval": 0,
            "blend_fraction": 0.0,
            "particle_count": 50_000
        }));
        assert_eq!(p.cell_size, 4.0);
        assert_eq!(p.regen_interval, 1);
        assert_eq!(p.blend_fraction, 0.01);
        assert_eq!(p.particle_count, MAX_PARTICLE_COUNT);
    }

    #[test]
    fn repel_is_an_alias_for_disturb() {
        let p = FlowFieldParams::from_json(&json!({"interaction_mode": "repel"}));
        assert_eq!(p.interaction_mode, FlowInteraction::Disturb);
    }

    #[test]
    fn change_classification() {
        let a = FlowFieldParams::default();
        let b = FlowFieldParams::from_json(&json!({"noise": "curl"}));
        assert!(a.needs_new_field(&b));
        assert!(!a.needs_reinit(&b));
        let c = FlowFieldParams::from_json(&json!({"speed": 5.0}));
        assert!(!a.needs_new_field(&c) && !a.needs_reinit(&c));
    }

    #[test]
    fn round_trip_and_schema() {
        let p = FlowFieldParams::from_json(&json!({"noise": "simplex", "edge_mode": "respawn"}));
        assert_eq!(FlowFieldParams::from_json(&p.to_json()), p);
        let schema = FlowFieldParams::schema();
        for key in p.to_json().as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "missing schema for {key}");
        }
    }
}
