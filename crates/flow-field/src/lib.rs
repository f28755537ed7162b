#![deny(unsafe_code)]
//! Flow-field engine.
//!
//! A [`FlowVectorGrid`] of unit directions is sampled from 3D noise at
//! `(x · noise_scale, y · noise_scale, depth)`. A pool of particles is
//! advected through it: each frame a particle's velocity is the vector of the
//! cell under it times `speed`. When the field animates, `depth` grows by
//! `field_speed` per frame and the grid is refreshed every `regen_interval`
//! frames, either wholesale or as a rolling window of `blend_fraction` of the
//! cells.

pub mod field;
pub mod noise_source;
pub mod params;

use glam::DVec2;
use pattern_engine_core::engine::{frames_from_dt, paint_background};
use pattern_engine_core::interaction::PointerState;
use pattern_engine_core::particle::Particle;
use pattern_engine_core::prng::Xorshift64;
use pattern_engine_core::surface::Surface;
use pattern_engine_core::{Configuration, Engine};
use serde_json::Value;

pub use field::FlowVectorGrid;
pub use noise_source::{NoiseKind, NoiseSource};
pub use params::{EdgeMode, FlowFieldParams, FlowInteraction};

/// Blend weight of a disturbance at the pointer with strength 1.
const DISTURB_RATE: f64 = 0.2;
/// Spawned particles land within this many pixels of the pointer.
const SPAWN_JITTER: f64 = 10.0;
/// Slack for accumulated frame counts (1/60 s is not exact in binary).
const FRAME_EPSILON: f64 = 1e-9;
/// Opacity of the vector-grid overlay.
const FIELD_OVERLAY_ALPHA: f64 = 0.35;

/// Flow-field engine.
pub struct FlowField {
    config: Configuration,
    params: FlowFieldParams,
    grid: FlowVectorGrid,
    source: NoiseSource,
    particles: Vec<Particle>,
    rng: Xorshift64,
    pointer: PointerState,
    depth: f64,
    since_regen: f64,
    spawn_cursor: usize,
}

impl FlowField {
    pub fn new(config: Configuration) -> Self {
        let params = FlowFieldParams::from_json(config.options());
        let mut rng = Xorshift64::new(config.seed);
        let source = NoiseSource::new(params.noise, params.noise_scale, rng.next_u64() as u32);
        let grid = build_grid(&config, &params, &source, 0.0);
        let mut engine = Self {
            config,
            params,
            grid,
            source,
            particles: Vec::new(),
            rng,
            pointer: PointerState::default(),
            depth: 0.0,
            since_regen: 0.0,
            spawn_cursor: 0,
        };
        engine.spawn_population();
        engine
    }

    pub fn grid(&self) -> &FlowVectorGrid {
        &self.grid
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    fn initialize(&mut self) {
        self.rng = Xorshift64::new(self.config.seed);
        self.source = NoiseSource::new(
            self.params.noise,
            self.params.noise_scale,
            self.rng.next_u64() as u32,
        );
        self.depth = 0.0;
        self.since_regen = 0.0;
        self.spawn_cursor = 0;
        self.grid = build_grid(&self.config, &self.params, &self.source, self.depth);
        self.spawn_population();
    }

    fn spawn_population(&mut self) {
        self.particles.clear();
        self.particles.reserve(self.params.particle_count);
        for _ in 0..self.params.particle_count {
            let at = self.rng.next_point(self.config.width(), self.config.height());
            let p = self.spawn_at(at);
            self.particles.push(p);
        }
        tracing::debug!(
            count = self.particles.len(),
            cols = self.grid.cols(),
            rows = self.grid.rows(),
            "flow field initialized"
        );
    }

    fn spawn_at(&mut self, position: DVec2) -> Particle {
        let size = self.rng.next_range(self.params.min_size, self.params.max_size);
        let color = self
            .config
            .palette
            .apply_opacity(self.config.palette.pick(&mut self.rng));
        let velocity = self.grid.lookup(position) * self.params.speed;
        Particle::new(position, velocity, size, color).with_decay(self.params.decay)
    }

    fn rebuild_field(&mut self) {
        self.source = NoiseSource::new(
            self.params.noise,
            self.params.noise_scale,
            self.rng.next_u64() as u32,
        );
        self.grid = build_grid(&self.config, &self.params, &self.source, self.depth);
        self.since_regen = 0.0;
    }

    fn evolve_field(&mut self, frames: f64) {
        if !self.params.animate_field {
            return;
        }
        self.depth += self.params.field_speed * frames;
        self.since_regen += frames;
        let interval = self.params.regen_interval as f64;
        if self.since_regen + FRAME_EPSILON < interval {
            return;
        }
        self.since_regen = (self.since_regen - interval).clamp(0.0, interval);
        if self.params.blend_fraction >= 1.0 {
            self.grid.regenerate(&self.source, self.depth);
        } else {
            self.grid
                .blend_window(&self.source, self.depth, self.params.blend_fraction);
        }
    }

    fn apply_interaction(&mut self) {
        let interaction = self.params.interaction;
        if !interaction.enabled {
            return;
        }
        let Some(point) = self.pointer.active_position() else {
            return;
        };
        match self.params.interaction_mode {
            FlowInteraction::Disturb | FlowInteraction::Attract => {
                let sign = if self.params.interaction_mode == FlowInteraction::Attract {
                    1.0
                } else {
                    -1.0
                };
                self.grid.disturb(
                    point,
                    interaction.radius,
                    interaction.strength * DISTURB_RATE,
                    sign,
                );
            }
            FlowInteraction::Spawn => self.spawn_burst(point),
        }
    }

    /// Recycles `burst_size` particles at the pointer, oldest slot first.
    fn spawn_burst(&mut self, point: DVec2) {
        let n = self.particles.len();
        if n == 0 {
            return;
        }
        for _ in 0..self.params.burst_size.min(n) {
            let at = point + self.rng.next_direction() * self.rng.next_range(0.0, SPAWN_JITTER);
            let p = self.spawn_at(at);
            self.particles[self.spawn_cursor % n] = p;
            self.spawn_cursor = (self.spawn_cursor + 1) % n;
        }
    }

    fn move_particles(&mut self, frames: f64) {
        let w = self.config.width();
        let h = self.config.height();
        for i in 0..self.particles.len() {
            let dir = self.grid.lookup(self.particles[i].position);
            let p = &mut self.particles[i];
            p.velocity = dir * self.params.speed;
            p.update(frames);

            let outside = p.position.x < 0.0
                || p.position.x >= w
                || p.position.y < 0.0
                || p.position.y >= h;
            let respawn = p.is_dead()
                || !p.position.is_finite()
                || (outside && self.params.edge_mode == EdgeMode::Respawn);
            if respawn {
                let at = self.rng.next_point(w, h);
                self.particles[i] = self.spawn_at(at);
            } else if outside {
                p.position.x = wrap_coord(p.position.x, w);
                p.position.y = wrap_coord(p.position.y, h);
            }
        }
    }

    fn draw_field(&self, surface: &mut dyn Surface) {
        let color = self
            .config
            .palette
            .first()
            .with_alpha(FIELD_OVERLAY_ALPHA);
        let half = self.grid.cell_size() * 0.4;
        for (col, row, v) in self.grid.vectors().iter() {
            let c = self.grid.cell_center(col, row);
            surface.draw_line(c - v * half, c + v * half, 1.0, color);
        }
    }
}

/// Wraps into `[0, extent)`; `rem_euclid` can round up to `extent` itself.
fn wrap_coord(v: f64, extent: f64) -> f64 {
    let r = v.rem_euclid(extent);
    if r >= extent {
        0.0
    } else {
        r
    }
}

fn build_grid(
    config: &Configuration,
    params: &FlowFieldParams,
    source: &NoiseSource,
    depth: f64,
) -> FlowVectorGrid {
    let mut grid = FlowVectorGrid::new(config.width(), config.height(), params.cell_size);
    grid.regenerate(source, depth);
    grid
}

impl Engine for FlowField {
    fn advance(&mut self, dt: f64) {
        let frames = frames_from_dt(dt);
        if frames <= 0.0 {
            return;
        }
        self.evolve_field(frames);
        self.apply_interaction();
        self.move_particles(frames);
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        paint_background(surface, self.config.background, self.params.trail);
        if self.params.show_field {
            self.draw_field(surface);
        }
        for p in &self.particles {
            p.draw(surface);
        }
    }

    fn on_interaction(&mut self, point: Option<DVec2>, active: bool) {
        self.pointer.update(point, active);
    }

    fn apply_configuration(&mut self, config: Configuration) {
        let params = FlowFieldParams::from_json(config.options());
        let full = self.params.needs_reinit(&params)
            || self.config.canvas_changed(&config)
            || self.config.seed != config.seed;
        let new_field = self.params.needs_new_field(&params);
        let recolor = self.config.palette != config.palette;
        self.config = config;
        self.params = params;
        if full {
            self.initialize();
            return;
        }
        if new_field {
            self.rebuild_field();
        }
        for i in 0..self.particles.len() {
            self.particles[i].decay = self.params.decay;
            if recolor {
                let c = self.config.palette.pick(&mut self.rng);
                self.particles[i].color = self.config.palette.apply_opacity(c);
            }
        }
    }

    fn reset(&mut self) {
        self.pointer.clear();
        self.initialize();
    }

    fn configuration(&self) -> &Configuration {
        &self.config
    }

    fn params(&self) -> Value {
        self.params.to_json()
    }

    fn param_schema(&self) -> Value {
        FlowFieldParams::schema()
    }
}
