//! Pointer interaction options and press tracking.

use crate::params::{param_bool, param_f64_clamped};
use glam::DVec2;
use serde_json::{json, Value};

pub const DEFAULT_INTERACTION_STRENGTH: f64 = 1.0;
pub const DEFAULT_INTERACTION_RADIUS: f64 = 100.0;

/// Options every engine reads from its option map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionParams {
    pub enabled: bool,
    /// In [0, 10].
    pub strength: f64,
    /// In [1, 2000] pixels.
    pub radius: f64,
}

impl Default for InteractionParams {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: DEFAULT_INTERACTION_STRENGTH,
            radius: DEFAULT_INTERACTION_RADIUS,
        }
    }
}

impl InteractionParams {
    pub fn from_json(params: &Value) -> Self {
        Self {
            enabled: param_bool(params, "interaction_enabled", true),
            strength: param_f64_clamped(
                params,
                "interaction_strength",
                DEFAULT_INTERACTION_STRENGTH,
                0.0,
                10.0,
            ),
            radius: param_f64_clamped(
                params,
                "interaction_radius",
                DEFAULT_INTERACTION_RADIUS,
                1.0,
                2000.0,
            ),
        }
    }

    /// Writes the current values into a params object.
    pub fn write_json(&self, out: &mut Value) {
        if let Value::Object(map) = out {
            map.insert("interaction_enabled".into(), json!(self.enabled));
            map.insert("interaction_strength".into(), json!(self.strength));
            map.insert("interaction_radius".into(), json!(self.radius));
        }
    }

    /// Adds the shared schema entries to an engine schema object.
    pub fn write_schema(out: &mut Value) {
        if let Value::Object(map) = out {
            map.insert(
                "interaction_enabled".into(),
                json!({
                    "type": "boolean",
                    "default": true,
                    "description": "Respond to pointer input"
                }),
            );
            map.insert(
                "interaction_strength".into(),
                json!({
                    "type": "number",
                    "default": DEFAULT_INTERACTION_STRENGTH,
                    "min": 0.0,
                    "max": 10.0,
                    "description": "Pointer effect multiplier"
                }),
            );
            map.insert(
                "interaction_radius".into(),
                json!({
                    "type": "number",
                    "default": DEFAULT_INTERACTION_RADIUS,
                    "min": 1.0,
                    "max": 2000.0,
                    "description": "Pointer influence radius in pixels"
                }),
            );
        }
    }

    /// Linear falloff in [0, 1]: 1 at the pointer, 0 at the radius and beyond.
    pub fn falloff(&self, distance: f64) -> f64 {
        if !distance.is_finite() || distance >= self.radius {
            0.0
        } else {
            1.0 - distance.max(0.0) / self.radius
        }
    }
}

/// Latest pointer state as reported through `on_interaction`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub position: Option<DVec2>,
    pub active: bool,
    pressed_edge: bool,
}

impl PointerState {
    /// Records a pointer event. A transition from inactive to active marks a
    /// press that [`PointerState::take_press`] consumes once.
    pub fn update(&mut self, point: Option<DVec2>, active: bool) {
        let point = point.filter(|p| p.is_finite());
        if active && !self.active && point.is_some() {
            self.pressed_edge = true;
        }
        self.position = point;
        self.active = active && point.is_some();
    }

    /// Position while the pointer is held down.
    pub fn active_position(&self) -> Option<DVec2> {
        if self.active {
            self.position
        } else {
            None
        }
    }

    /// Returns the press position once per press.
    pub fn take_press(&mut self) -> Option<DVec2> {
        if std::mem::take(&mut self.pressed_edge) {
            self.position
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
