//! Typed options for the cellular automaton.

use crate::rules::{LifeRule, RuleFamily};
use pattern_engine_core::interaction::InteractionParams;
use pattern_engine_core::params::{
    param_bool, param_f64_clamped, param_string, param_usize, param_usize_clamped,
    param_usize_list,
};
use serde_json::{json, Value};

const DEFAULT_CELL_SIZE: usize = 8;
const DEFAULT_INITIAL_DENSITY: f64 = 0.3;
const DEFAULT_ELEMENTARY_RULE: usize = 30;
const DEFAULT_STEPS_PER_SECOND: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonParams {
    pub cell_size: usize,
    pub rule: RuleFamily,
    pub initial_density: f64,
    /// Effective birth/survival sets; `rulestring` overrides the arrays.
    pub life_rule: LifeRule,
    pub rulestring: Option<String>,
    pub birth_probability: f64,
    pub elementary_rule: u8,
    pub elementary_random_start: bool,
    pub auto_reset_generations: usize,
    pub reset_on_extinction: bool,
    pub steps_per_second: f64,
    pub show_grid: bool,
    pub interaction: InteractionParams,
}

impl Default for AutomatonParams {
    fn default() -> Self {
        Self::from_json(&json!({}))
    }
}

impl AutomatonParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        let birth = param_usize_list(params, "birth", &[3], 8);
        let survival = param_usize_list(params, "survival", &[2, 3], 8);
        let rulestring = params
            .get("rulestring")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);
        let life_rule = match rulestring.as_deref().map(|s| (s, LifeRule::parse(s))) {
            Some((_, Some(rule))) => rule,
            Some((s, None)) => {
                tracing::warn!(rulestring = s, "unparseable rulestring, using birth/survival");
                LifeRule::from_counts(&birth, &survival)
            }
            None => LifeRule::from_counts(&birth, &survival),
        };
        Self {
            cell_size: param_usize_clamped(params, "cell_size", DEFAULT_CELL_SIZE, 1, 100),
            rule: RuleFamily::from_name(&param_string(params, "rule", "life")).unwrap_or_default(),
            initial_density: param_f64_clamped(
                params,
                "initial_density",
                DEFAULT_INITIAL_DENSITY,
                0.0,
                1.0,
            ),
            life_rule,
            rulestring,
            birth_probability: param_f64_clamped(params, "birth_probability", 1.0, 0.0, 1.0),
            elementary_rule: param_usize(params, "elementary_rule", DEFAULT_ELEMENTARY_RULE)
                .min(255) as u8,
            elementary_random_start: param_bool(params, "elementary_random_start", false),
            auto_reset_generations: param_usize(params, "auto_reset_generations", 0),
            reset_on_extinction: param_bool(params, "reset_on_extinction", false),
            steps_per_second: param_f64_clamped(
                params,
                "steps_per_second",
                DEFAULT_STEPS_PER_SECOND,
                0.1,
                240.0,
            ),
            show_grid: param_bool(params, "show_grid", false),
            interaction: InteractionParams::from_json(params),
        }
    }

    /// Changes that need a freshly seeded grid.
    pub fn needs_reseed(&self, other: &AutomatonParams) -> bool {
        self.cell_size != other.cell_size
            || self.rule != other.rule
            || self.initial_density != other.initial_density
            || self.elementary_rule != other.elementary_rule
            || self.elementary_random_start != other.elementary_random_start
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "cell_size": self.cell_size,
            "rule": self.rule.name(),
            "initial_density": self.initial_density,
            "birth": self.life_rule.birth_counts(),
            "survival": self.life_rule.survival_counts(),
            "birth_probability": self.birth_probability,
            "elementary_rule": self.elementary_rule,
            "elementary_random_start": self.elementary_random_start,
            "auto_reset_generations": self.auto_reset_generations,
            "reset_on_extinction": self.reset_on_extinction,
            "steps_per_second": self.steps_per_second,
            "show_grid": self.show_grid,
        });
        if let (Some(s), Value::Object(map)) = (&self.rulestring, &mut out) {
            map.insert("rulestring".into(), json!(s));
        }
        self.interaction.write_json(&mut out);
        out
    }

    pub fn schema() -> Value {
        let mut schema = json!({
            "cell_size": {
                "type": "integer", "default": DEFAULT_CELL_SIZE, "min": 1, "max": 100,
                "description": "Cell edge in pixels"
            },
            "rule": {
                "type": "enum", "default": "life",
                "options": ["life", "seeds", "brians-brain", "wireworld", "elementary"],
                "description": "Rule family"
            },
            "initial_density": {
                "type": "number", "default": DEFAULT_INITIAL_DENSITY, "min": 0.0, "max": 1.0,
                "description": "Share of cells alive after seeding"
            },
            "birth": {
                "type": "array", "default": [3], "items": {"type": "integer", "min": 0, "max": 8},
                "description": "Neighbor counts that give birth (life)"
            },
            "survival": {
                "type": "array", "default": [2, 3], "items": {"type": "integer", "min": 0, "max": 8},
                "description": "Neighbor counts that survive (life)"
            },
            "rulestring": {
                "type": "string", "default": null,
                "description": "B/S notation such as B36/S23; overrides birth and survival"
            },
            "birth_probability": {
                "type": "number", "default": 1.0, "min": 0.0, "max": 1.0,
                "description": "Chance that a qualifying dead cell is born (seeds)"
            },
            "elementary_rule": {
                "type": "integer", "default": DEFAULT_ELEMENTARY_RULE, "min": 0, "max": 255,
                "description": "Wolfram rule number"
            },
            "elementary_random_start": {
                "type": "boolean", "default": false,
                "description": "Random first row instead of a single center cell"
            },
            "auto_reset_generations": {
                "type": "integer", "default": 0, "min": 0,
                "description": "Re-seed after this many generations (0 = never)"
            },
            "reset_on_extinction": {
                "type": "boolean", "default": false,
                "description": "Re-seed when no active cells remain"
            },
            "steps_per_second": {
                "type": "number", "default": DEFAULT_STEPS_PER_SECOND, "min": 0.1, "max": 240.0,
                "description": "Generations per second"
            },
            "show_grid": {
                "type": "boolean", "default": false,
                "description": "Draw cell boundaries"
            }
        });
        InteractionParams::write_schema(&mut schema);
        schema
    }
}
