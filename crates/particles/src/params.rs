//! Typed options for the particle system.

use pattern_engine_core::interaction::InteractionParams;
use pattern_engine_core::params::{
    param_bool, param_f64, param_f64_clamped, param_string, param_usize, param_usize_clamped,
};
use pattern_engine_core::particle::ParticleShape;
use serde_json::{json, Value};

pub const DEFAULT_PARTICLE_COUNT: usize = 200;
pub const MAX_PARTICLE_COUNT: usize = 10_000;
const DEFAULT_MIN_SIZE: f64 = 2.0;
const DEFAULT_MAX_SIZE: f64 = 8.0;
const DEFAULT_SPEED: f64 = 2.0;
const DEFAULT_BOUNCE_FACTOR: f64 = 0.8;
const DEFAULT_FRICTION: f64 = 0.01;
const DEFAULT_DECAY: f64 = 0.003;
const DEFAULT_PERCEPTION_RADIUS: f64 = 50.0;
pub const DEFAULT_SUBSAMPLE_THRESHOLD: usize = 300;

/// How particles are launched and which behavior force they feel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Movement {
    #[default]
    Random,
    Bounce,
    Orbit,
    Wave,
    Follow,
    Attract,
    Repel,
    Explode,
    Directed,
}

impl Movement {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "random" => Some(Movement::Random),
            "bounce" => Some(Movement::Bounce),
            "orbit" => Some(Movement::Orbit),
            "wave" => Some(Movement::Wave),
            "follow" | "flock" => Some(Movement::Follow),
            "attract" => Some(Movement::Attract),
            "repel" => Some(Movement::Repel),
            "explode" => Some(Movement::Explode),
            "directed" => Some(Movement::Directed),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Movement::Random => "random",
            Movement::Bounce => "bounce",
            Movement::Orbit => "orbit",
            Movement::Wave => "wave",
            Movement::Follow => "follow",
            Movement::Attract => "attract",
            Movement::Repel => "repel",
            Movement::Explode => "explode",
            Movement::Directed => "directed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeMode {
    Bounce,
    #[default]
    Wrap,
}

impl EdgeMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bounce" => Some(EdgeMode::Bounce),
            "wrap" => Some(EdgeMode::Wrap),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EdgeMode::Bounce => "bounce",
            EdgeMode::Wrap => "wrap",
        }
    }
}

/// Direction of the pointer force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerMode {
    #[default]
    Attract,
    Repel,
}

impl PointerMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "attract" => Some(PointerMode::Attract),
            "repel" => Some(PointerMode::Repel),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PointerMode::Attract => "attract",
            PointerMode::Repel => "repel",
        }
    }
}

/// Particle-system parameters, parsed and clamped from the option map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    pub particle_count: usize,
    pub min_size: f64,
    pub max_size: f64,
    pub speed: f64,
    pub movement: Movement,
    pub shape: ParticleShape,
    pub edge_mode: EdgeMode,
    pub collision_enabled: bool,
    pub bounce_factor: f64,
    pub gravity: f64,
    pub wind: f64,
    pub friction: f64,
    pub turbulence: f64,
    pub decay: f64,
    pub perception_radius: f64,
    pub trail: f64,
    pub subsample_threshold: usize,
    pub pointer_mode: PointerMode,
    pub interaction: InteractionParams,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self::from_json(&json!({}))
    }
}

impl ParticleParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        let mut min_size = param_f64_clamped(params, "min_size", DEFAULT_MIN_SIZE, 0.1, 200.0);
        let mut max_size = param_f64_clamped(params, "max_size", DEFAULT_MAX_SIZE, 0.1, 200.0);
        if min_size > max_size {
            std::mem::swap(&mut min_size, &mut max_size);
        }
        Self {
            particle_count: param_usize(params, "particle_count", DEFAULT_PARTICLE_COUNT)
                .min(MAX_PARTICLE_COUNT),
            min_size,
            max_size,
            speed: param_f64_clamped(params, "speed", DEFAULT_SPEED, 0.0, 50.0),
            movement: Movement::from_name(&param_string(params, "movement", "random"))
                .unwrap_or_default(),
            shape: ParticleShape::from_name(&param_string(params, "shape", "circle"))
                .unwrap_or_default(),
            edge_mode: EdgeMode::from_name(&param_string(params, "edge_mode", "wrap"))
                .unwrap_or_default(),
            collision_enabled: param_bool(params, "collision_enabled", false),
            bounce_factor: param_f64_clamped(
                params,
                "bounce_factor",
                DEFAULT_BOUNCE_FACTOR,
                0.0,
                1.0,
            ),
            gravity: param_f64(params, "gravity", 0.0),
            wind: param_f64(params, "wind", 0.0),
            friction: param_f64_clamped(params, "friction", DEFAULT_FRICTION, 0.0, 1.0),
            turbulence: param_f64_clamped(params, "turbulence", 0.0, 0.0, 100.0),
            decay: param_f64_clamped(params, "decay", DEFAULT_DECAY, 0.0, 1.0),
            perception_radius: param_f64_clamped(
                params,
                "perception_radius",
                DEFAULT_PERCEPTION_RADIUS,
                1.0,
                1000.0,
            ),
            trail: param_f64_clamped(params, "trail", 0.0, 0.0, 0.99),
            subsample_threshold: param_usize_clamped(
                params,
                "subsample_threshold",
                DEFAULT_SUBSAMPLE_THRESHOLD,
                1,
                MAX_PARTICLE_COUNT,
            ),
            pointer_mode: PointerMode::from_name(&param_string(
                params,
                "interaction_mode",
                "attract",
            ))
            .unwrap_or_default(),
            interaction: InteractionParams::from_json(params),
        }
    }

    /// Edge policy actually applied: the `bounce` movement always bounces.
    pub fn effective_edge_mode(&self) -> EdgeMode {
        if self.movement == Movement::Bounce {
            EdgeMode::Bounce
        } else {
            self.edge_mode
        }
    }

    /// True when switching from `self` to `other` needs a fresh population.
    pub fn needs_reinit(&self, other: &ParticleParams) -> bool {
        self.particle_count != other.particle_count
            || self.shape != other.shape
            || self.movement != other.movement
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "particle_count": self.particle_count,
            "min_size": self.min_size,
            "max_size": self.max_size,
            "speed": self.speed,
            "movement": self.movement.name(),
            "shape": self.shape.name(),
            "edge_mode": self.edge_mode.name(),
            "collision_enabled": self.collision_enabled,
            "bounce_factor": self.bounce_factor,
            "gravity": self.gravity,
            "wind": self.wind,
            "friction": self.friction,
            "turbulence": self.turbulence,
            "decay": self.decay,
            "perception_radius": self.perception_radius,
            "trail": self.trail,
            "subsample_threshold": self.subsample_threshold,
            "interaction_mode": self.pointer_mode.name(),
        });
        self.interaction.write_json(&mut out);
        out
    }

    pub fn schema() -> Value {
        let mut schema = json!({
            "particle_count": {
                "type": "integer",
                "default": DEFAULT_PARTICLE_COUNT,
                "min": 0,
                "max": MAX_PARTICLE_COUNT,
                "description": "Number of particles"
            },
            "min_size": {
                "type": "number",
                "default": DEFAULT_MIN_SIZE,
                "min": 0.1,
                "max": 200.0,
                "description": "Smallest particle diameter in pixels"
            },
            "max_size": {
                "type": "number",
                "default": DEFAULT_MAX_SIZE,
                "min": 0.1,
                "max": 200.0,
                "description": "Largest particle diameter in pixels"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "max": 50.0,
                "description": "Initial speed in pixels per frame"
            },
            "movement": {
                "type": "enum",
                "default": "random",
                "options": ["random", "bounce", "orbit", "wave", "follow", "attract", "repel", "explode", "directed"],
                "description": "Movement behavior"
            },
            "shape": {
                "type": "enum",
                "default": "circle",
                "options": ["circle", "square", "triangle", "star"],
                "description": "Particle glyph"
            },
            "edge_mode": {
                "type": "enum",
                "default": "wrap",
                "options": ["bounce", "wrap"],
                "description": "What happens at the canvas edge"
            },
            "collision_enabled": {
                "type": "boolean",
                "default": false,
                "description": "Push overlapping particles apart"
            },
            "bounce_factor": {
                "type": "number",
                "default": DEFAULT_BOUNCE_FACTOR,
                "min": 0.0,
                "max": 1.0,
                "description": "Velocity kept after bouncing off an edge"
            },
            "gravity": {
                "type": "number",
                "default": 0.0,
                "description": "Downward force"
            },
            "wind": {
                "type": "number",
                "default": 0.0,
                "description": "Horizontal force"
            },
            "friction": {
                "type": "number",
                "default": DEFAULT_FRICTION,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of velocity lost per frame"
            },
            "turbulence": {
                "type": "number",
                "default": 0.0,
                "min": 0.0,
                "max": 100.0,
                "description": "Random jitter force"
            },
            "decay": {
                "type": "number",
                "default": DEFAULT_DECAY,
                "min": 0.0,
                "max": 1.0,
                "description": "Life lost per frame"
            },
            "perception_radius": {
                "type": "number",
                "default": DEFAULT_PERCEPTION_RADIUS,
                "min": 1.0,
                "max": 1000.0,
                "description": "Neighbor radius for flocking"
            },
            "trail": {
                "type": "number",
                "default": 0.0,
                "min": 0.0,
                "max": 0.99,
                "description": "Motion trail persistence"
            },
            "subsample_threshold": {
                "type": "integer",
                "default": DEFAULT_SUBSAMPLE_THRESHOLD,
                "min": 1,
                "max": MAX_PARTICLE_COUNT,
                "description": "Population above which collisions are bucketed and decimated"
            },
            "interaction_mode": {
                "type": "enum",
                "default": "attract",
                "options": ["attract", "repel"],
                "description": "Pointer pulls or pushes particles"
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
    fn empty_json_gives_documented_defaults() {
        let p = ParticleParams::from_json(&json!({}));
        assert_eq!(p.particle_count, 200);
        assert_eq!(p.min_size, 2.0);
        assert_eq!(p.max_size, 8.0);
        assert_eq!(p.movement, Movement::Random);
        assert_eq!(p.shape, ParticleShape::Circle);
        assert_eq!(p.edge_mode, EdgeMode::Wrap);
        assert!(!p.collision_enabled);
        assert_eq!(p.subsample_threshold, 300);
        assert_eq!(p.pointer_mode, PointerMode::Attract);
    }

    #[test]
    fn count_is_capped() {
        let p = ParticleParams::from_json(&json!({"particle_count": 1_000_000}));
        assert_eq!(p.particle_count, MAX_PARTICLE_COUNT);
    }

    #[test]
    fn inverted_sizes_are_swapped() {
        let p = ParticleParams::from_json(&json!({"min_size": 9.0, "max_size": 3.0}));
        assert_eq!((p.min_size, p.max_size), (3.0, 9.0));
    }

    #[test]
    fn unknown_enums_fall_back() {
        let p = ParticleParams::from_json(&json!({
            "movement": "teleport",
            "shape": "hexagon",
            "edge_mode": "portal",
            "interaction_mode": "spin"
        }));
        assert_eq!(p, ParticleParams::default());
    }

    #[test]
    fn bounce_movement_forces_bounce_edges() {
        let p = ParticleParams::from_json(&json!({"movement": "bounce", "edge_mode": "wrap"}));
        assert_eq!(p.effective_edge_mode(), EdgeMode::Bounce);
    }

    #[test]
    fn reinit_only_on_structural_change() {
        let a = ParticleParams::default();
        let b = ParticleParams::from_json(&json!({"gravity": 0.5, "friction": 0.2}));
        assert!(!a.needs_reinit(&b));
        let c = ParticleParams::from_json(&json!({"shape": "star"}));
        assert!(a.needs_reinit(&c));
        let d = ParticleParams::from_json(&json!({"movement": "orbit"}));
        assert!(a.needs_reinit(&d));
        let e = ParticleParams::from_json(&json!({"particle_count": 10}));
        assert!(a.needs_reinit(&e));
    }

    #[test]
    fn to_json_round_trips() {
        let p = ParticleParams::from_json(&json!({
            "particle_count": 42,
            "movement": "follow",
            "shape": "triangle",
            "edge_mode": "bounce",
            "interaction_mode": "repel",
            "trail": 0.5
        }));
        assert_eq!(ParticleParams::from_json(&p.to_json()), p);
    }

    #[test]
    fn schema_lists_every_param() {
        let schema = ParticleParams::schema();
        let params = ParticleParams::default().to_json();
        for key in params.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "missing schema for {key}");
        }
    }
}
