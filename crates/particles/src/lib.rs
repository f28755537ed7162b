#![deny(unsafe_code)]
//! Particle-system engine.
//!
//! A fixed-size population of [`Particle`]s moves under a behavior force
//! (orbit, wave, flocking, attraction...), environmental forces (gravity,
//! wind, friction, turbulence) and an optional pointer force. Dead particles
//! are overwritten in place, so the population always equals
//! `particle_count`.
//!
//! Collisions are resolved all-pairs up to `subsample_threshold` particles;
//! above it particles are bucketed in a [`SpatialHash`] and only every
//! `stride`-th particle is resolved per frame, rotating the phase each frame.

pub mod forces;
pub mod params;

use glam::DVec2;
use pattern_engine_core::engine::{frames_from_dt, paint_background};
use pattern_engine_core::interaction::PointerState;
use pattern_engine_core::particle::Particle;
use pattern_engine_core::prng::Xorshift64;
use pattern_engine_core::spatial::SpatialHash;
use pattern_engine_core::surface::Surface;
use pattern_engine_core::{Configuration, Engine};
use serde_json::Value;

pub use params::{EdgeMode, Movement, ParticleParams, PointerMode};

use forces::ENVIRONMENT_SCALE;

/// Velocity cap as a multiple of the configured speed.
const MAX_SPEED_FACTOR: f64 = 5.0;
/// Velocity cap used when `speed` is zero, so forces can still move things.
const MIN_SPEED_CAP: f64 = 2.0;
/// Respawn jitter around the canvas center for explode/orbit.
const CENTER_SPAWN_JITTER: f64 = 5.0;

/// Particle-system engine.
pub struct ParticleSystem {
    config: Configuration,
    params: ParticleParams,
    particles: Vec<Particle>,
    rng: Xorshift64,
    pointer: PointerState,
    hash: SpatialHash,
    positions: Vec<DVec2>,
    candidates: Vec<usize>,
    time: f64,
    frame: u64,
}

impl ParticleSystem {
    /// Creates the engine and spawns its population.
    pub fn new(config: Configuration) -> Self {
        let params = ParticleParams::from_json(config.options());
        let mut engine = Self {
            rng: Xorshift64::new(config.seed),
            config,
            params,
            particles: Vec::new(),
            pointer: PointerState::default(),
            hash: SpatialHash::default(),
            positions: Vec::new(),
            candidates: Vec::new(),
            time: 0.0,
            frame: 0,
        };
        engine.initialize();
        engine
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_params(&self) -> &ParticleParams {
        &self.params
    }

    fn center(&self) -> DVec2 {
        DVec2::new(self.config.width(), self.config.height()) * 0.5
    }

    fn speed_cap(&self) -> f64 {
        (self.params.speed * MAX_SPEED_FACTOR).max(MIN_SPEED_CAP)
    }

    fn initialize(&mut self) {
        self.rng = Xorshift64::new(self.config.seed);
        self.time = 0.0;
        self.frame = 0;
        self.particles.clear();
        self.particles.reserve(self.params.particle_count);
        for _ in 0..self.params.particle_count {
            let p = self.spawn(true);
            self.particles.push(p);
        }
        tracing::debug!(
            count = self.particles.len(),
            movement = self.params.movement.name(),
            "particle system initialized"
        );
    }

    /// Builds a fresh particle. `initial` selects the start-up placement;
    /// respawns use the per-movement respawn policy instead.
    fn spawn(&mut self, initial: bool) -> Particle {
        let w = self.config.width();
        let h = self.config.height();
        let center = self.center();
        let speed = self.params.speed;
        let size = self.rng.next_range(self.params.min_size, self.params.max_size);

        let position = match self.params.movement {
            Movement::Explode => center + self.rng.next_direction() * CENTER_SPAWN_JITTER,
            Movement::Orbit if !initial => {
                center + self.rng.next_direction() * CENTER_SPAWN_JITTER
            }
            Movement::Directed if !initial => DVec2::new(0.0, self.rng.next_range(0.0, h)),
            _ => self.rng.next_point(w, h),
        };

        let velocity = match self.params.movement {
            Movement::Orbit => {
                let radial = position - center;
                if radial.length_squared() > 1e-12 {
                    radial.normalize().perp() * speed
                } else {
                    self.rng.next_direction() * speed
                }
            }
            Movement::Explode => self.rng.next_direction() * speed * self.rng.next_range(0.5, 1.5),
            Movement::Directed => DVec2::new(speed, self.rng.next_range(-0.1, 0.1) * speed),
            _ => self.rng.next_direction() * speed * self.rng.next_range(0.5, 1.0),
        };

        let color = self
            .config
            .palette
            .apply_opacity(self.config.palette.pick(&mut self.rng));
        Particle::new(position, velocity, size, color)
            .with_decay(self.params.decay)
            .with_shape(self.params.shape)
    }

    fn apply_behavior_forces(&mut self) {
        let center = self.center();
        let speed = self.params.speed;
        let time = self.time;
        match self.params.movement {
            Movement::Orbit => {
                for p in &mut self.particles {
                    p.apply_force(forces::orbit(p.position, center, speed));
                }
            }
            Movement::Wave => {
                for p in &mut self.particles {
                    p.apply_force(forces::wave(p.position, time, speed));
                }
            }
            Movement::Attract | Movement::Repel => {
                let sign = if self.params.movement == Movement::Attract {
                    1.0
                } else {
                    -1.0
                };
                for p in &mut self.particles {
                    p.apply_force(forces::radial(p.position, center, speed, sign));
                }
            }
            Movement::Follow => self.apply_flocking(),
            Movement::Random | Movement::Bounce | Movement::Directed | Movement::Explode => {}
        }
    }

    fn apply_flocking(&mut self) {
        let radius = self.params.perception_radius;
        self.rebuild_hash(radius);
        let snapshot: Vec<(DVec2, DVec2)> = self
            .particles
            .iter()
            .map(|p| (p.position, p.velocity))
            .collect();
        for (i, p) in self.particles.iter_mut().enumerate() {
            self.hash
                .candidates_into(p.position, radius, &mut self.candidates);
            let neighbors = self
                .candidates
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| snapshot[j]);
            p.apply_force(forces::flock(p.position, p.velocity, neighbors, radius));
        }
    }

    fn apply_environment(&mut self, frames: f64) {
        let base = DVec2::new(self.params.wind, self.params.gravity) * ENVIRONMENT_SCALE;
        let turbulence = self.params.turbulence * ENVIRONMENT_SCALE;
        for p in &mut self.particles {
            let mut force = base;
            if turbulence > 0.0 {
                force += self.rng.next_direction() * turbulence * self.rng.next_f64();
            }
            p.apply_force(force);
        }
        if self.params.friction > 0.0 {
            let keep = (1.0 - self.params.friction).powf(frames);
            for p in &mut self.particles {
                p.velocity *= keep;
            }
        }
    }

    fn apply_pointer(&mut self) {
        let interaction = self.params.interaction;
        if !interaction.enabled {
            return;
        }
        let Some(target) = self.pointer.active_position() else {
            return;
        };
        let sign = match self.params.pointer_mode {
            PointerMode::Attract => 1.0,
            PointerMode::Repel => -1.0,
        };
        for p in &mut self.particles {
            let falloff = interaction.falloff(p.position.distance(target));
            p.apply_force(forces::pointer(
                p.position,
                target,
                interaction.strength,
                falloff,
                sign,
            ));
        }
    }

    fn integrate(&mut self, frames: f64) {
        let cap = self.speed_cap();
        for p in &mut self.particles {
            p.update(frames);
            p.velocity = p.velocity.clamp_length_max(cap);
        }
    }

    fn apply_edges(&mut self) {
        let w = self.config.width();
        let h = self.config.height();
        match self.params.effective_edge_mode() {
            EdgeMode::Bounce => {
                let k = self.params.bounce_factor;
                for p in &mut self.particles {
                    let r = (p.size * 0.5).min(w * 0.5).min(h * 0.5);
                    if p.position.x < r {
                        p.position.x = r;
                        p.velocity.x = p.velocity.x.abs() * k;
                    } else if p.position.x > w - r {
                        p.position.x = w - r;
                        p.velocity.x = -p.velocity.x.abs() * k;
                    }
                    if p.position.y < r {
                        p.position.y = r;
                        p.velocity.y = p.velocity.y.abs() * k;
                    } else if p.position.y > h - r {
                        p.position.y = h - r;
                        p.velocity.y = -p.velocity.y.abs() * k;
                    }
                }
            }
            EdgeMode::Wrap => {
                for p in &mut self.particles {
                    let m = p.size;
                    if p.position.x < -m {
                        p.position.x = w + m;
                    } else if p.position.x > w + m {
                        p.position.x = -m;
                    }
                    if p.position.y < -m {
                        p.position.y = h + m;
                    } else if p.position.y > h + m {
                        p.position.y = -m;
                    }
                }
            }
        }
    }

    fn respawn_dead(&mut self) {
        for i in 0..self.particles.len() {
            let dead = {
                let p = &self.particles[i];
                p.is_dead() || !p.position.is_finite()
            };
            if dead {
                self.particles[i] = self.spawn(false);
            }
        }
    }

    fn rebuild_hash(&mut self, cell_size: f64) {
        if (self.hash.cell_size() - cell_size).abs() > f64::EPSILON {
            self.hash = SpatialHash::new(cell_size);
        }
        self.positions.clear();
        self.positions
            .extend(self.particles.iter().map(|p| p.position));
        self.hash
            .rebuild(&self.positions, self.config.width(), self.config.height());
    }

    /// Pushes overlapping particles apart proportionally to their overlap.
    fn resolve_collisions(&mut self) {
        let n = self.particles.len();
        if n < 2 {
            return;
        }
        if n <= self.params.subsample_threshold {
            for i in 0..n {
                for j in (i + 1)..n {
                    self.separate(i, j);
                }
            }
            return;
        }

        let stride = n.div_ceil(self.params.subsample_threshold);
        let phase = (self.frame % stride as u64) as usize;
        self.rebuild_hash(self.params.max_size.max(1.0));
        let reach = self.params.max_size;
        let mut candidates = std::mem::take(&mut self.candidates);
        for i in (phase..n).step_by(stride) {
            self.hash
                .candidates_into(self.particles[i].position, reach, &mut candidates);
            for &j in &candidates {
                if j != i {
                    self.separate(i, j);
                }
            }
        }
        self.candidates = candidates;
    }

    fn separate(&mut self, i: usize, j: usize) {
        let (a, b) = (&self.particles[i], &self.particles[j]);
        if let Some(push) = forces::separation_push(a.position, a.size * 0.5, b.position, b.size * 0.5)
        {
            self.particles[i].position += push;
            self.particles[j].position -= push;
        }
    }

    /// Recolors the population after a palette change.
    fn recolor(&mut self) {
        for i in 0..self.particles.len() {
            let c = self.config.palette.pick(&mut self.rng);
            self.particles[i].color = self.config.palette.apply_opacity(c);
        }
    }
}

impl Engine for ParticleSystem {
    fn advance(&mut self, dt: f64) {
        let frames = frames_from_dt(dt);
        if frames <= 0.0 {
            return;
        }
        self.apply_behavior_forces();
        self.apply_environment(frames);
        self.apply_pointer();
        self.integrate(frames);
        self.apply_edges();
        self.respawn_dead();
        if self.params.collision_enabled {
            self.resolve_collisions();
        }
        self.time += frames;
        self.frame = self.frame.wrapping_add(1);
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        paint_background(surface, self.config.background, self.params.trail);
        for p in &self.particles {
            p.draw(surface);
        }
    }

    fn on_interaction(&mut self, point: Option<DVec2>, active: bool) {
        self.pointer.update(point, active);
    }

    fn apply_configuration(&mut self, config: Configuration) {
        let params = ParticleParams::from_json(config.options());
        let reinit = self.params.needs_reinit(&params)
            || self.config.canvas_changed(&config)
            || self.config.seed != config.seed;
        let recolor = self.config.palette != config.palette;
        self.config = config;
        self.params = params;
        if reinit {
            self.initialize();
            return;
        }
        for p in &mut self.particles {
            p.decay = self.params.decay;
            p.size = p.size.clamp(self.params.min_size, self.params.max_size);
        }
        if recolor {
            self.recolor();
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
        ParticleParams::schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pattern_engine_core::config::Algorithm;
    use pattern_engine_core::surface::CommandRecorder;
    use serde_json::json;

    const DT: f64 = 1.0 / 60.0;

    fn config(options: Value) -> Configuration {
        Configuration::new(Algorithm::Particles, 400.0, 300.0).with_options(options)
    }

    fn system(options: Value) -> ParticleSystem {
        ParticleSystem::new(config(options))
    }

    fn in_canvas(p: &Particle, w: f64, h: f64) -> bool {
        p.position.x >= 0.0 && p.position.x <= w && p.position.y >= 0.0 && p.position.y <= h
    }

    #[test]
    fn new_spawns_configured_count() {
        let s = system(json!({"particle_count": 123}));
        assert_eq!(s.particles().len(), 123);
        assert!(s.particles().iter().all(|p| in_canvas(p, 400.0, 300.0)));
    }

    #[test]
    fn sizes_respect_bounds() {
        let s = system(json!({"min_size": 3.0, "max_size": 5.0}));
        assert!(s.particles().iter().all(|p| (3.0..=5.0).contains(&p.size)));
    }

    #[test]
    fn population_is_constant_under_heavy_decay() {
        let mut s = system(json!({"particle_count": 50, "decay": 0.5}));
        for _ in 0..200 {
            s.advance(DT);
            assert_eq!(s.particles().len(), 50);
        }
        assert!(s.particles().iter().all(|p| !p.is_dead()));
    }

    #[test]
    fn same_seed_is_deterministic() {
        let opts = json!({"particle_count": 40, "turbulence": 2.0, "movement": "follow"});
        let mut a = system(opts.clone());
        let mut b = system(opts);
        for _ in 0..30 {
            a.advance(DT);
            b.advance(DT);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn different_seed_differs() {
        let a = ParticleSystem::new(config(json!({})).with_seed(1));
        let b = ParticleSystem::new(config(json!({})).with_seed(2));
        assert_ne!(a.particles()[0].position, b.particles()[0].position);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut s = system(json!({"gravity": 5.0}));
        let before = s.particles().to_vec();
        s.advance(0.0);
        s.advance(-1.0);
        s.advance(f64::NAN);
        assert_eq!(s.particles(), &before[..]);
    }

    #[test]
    fn zero_particles_renders_only_background() {
        let mut s = system(json!({"particle_count": 0}));
        s.advance(DT);
        let mut rec = CommandRecorder::new(400.0, 300.0);
        s.render(&mut rec);
        assert_eq!(rec.commands().len(), 1);
        assert_eq!(rec.shape_count(), 0);
    }

    #[test]
    fn render_draws_every_particle() {
        let mut s = system(json!({"particle_count": 25}));
        let mut rec = CommandRecorder::new(400.0, 300.0);
        s.render(&mut rec);
        assert_eq!(rec.shape_count(), 25);
    }

    #[test]
    fn bounce_keeps_particles_inside() {
        let mut s = system(json!({
            "particle_count": 80,
            "movement": "bounce",
            "speed": 10.0,
            "decay": 0.0
        }));
        for _ in 0..300 {
            s.advance(0.1);
        }
        assert!(s.particles().iter().all(|p| in_canvas(p, 400.0, 300.0)));
    }

    #[test]
    fn wrap_reappears_on_opposite_edge() {
        let mut s = system(json!({"particle_count": 1, "decay": 0.0, "friction": 0.0}));
        s.particles[0].position = DVec2::new(399.0, 150.0);
        s.particles[0].velocity = DVec2::new(20.0, 0.0);
        s.advance(DT);
        let p = &s.particles()[0];
        assert!(p.position.x <= 0.0, "x = {}", p.position.x);
    }

    #[test]
    fn gravity_pulls_down() {
        let mut s = system(json!({"particle_count": 1, "speed": 0.0, "gravity": 1.0, "decay": 0.0}));
        let y0 = s.particles()[0].position.y;
        for _ in 0..5 {
            s.advance(DT);
        }
        assert!(s.particles()[0].position.y > y0);
    }

    #[test]
    fn friction_slows_particles() {
        let mut s = system(json!({"particle_count": 10, "friction": 0.5, "decay": 0.0}));
        let before: f64 = s.particles().iter().map(|p| p.velocity.length()).sum();
        s.advance(DT);
        let after: f64 = s.particles().iter().map(|p| p.velocity.length()).sum();
        assert!(after < before);
    }

    #[test]
    fn directed_respawns_at_left_edge() {
        let mut s = system(json!({"particle_count": 5, "movement": "directed", "decay": 1.0}));
        s.advance(DT);
        for p in s.particles() {
            assert!(p.position.x.abs() < 1e-9);
        }
    }

    #[test]
    fn explode_respawns_near_center() {
        let mut s = system(json!({"particle_count": 5, "movement": "explode", "decay": 1.0}));
        s.advance(DT);
        let center = DVec2::new(200.0, 150.0);
        for p in s.particles() {
            assert!(p.position.distance(center) <= CENTER_SPAWN_JITTER + 1e-9);
        }
    }

    #[test]
    fn collisions_separate_overlapping_pair() {
        let mut s = system(json!({
            "particle_count": 2,
            "collision_enabled": true,
            "speed": 0.0,
            "decay": 0.0,
            "min_size": 10.0,
            "max_size": 10.0
        }));
        s.particles[0].position = DVec2::new(100.0, 100.0);
        s.particles[1].position = DVec2::new(104.0, 100.0);
        s.advance(DT);
        let d = s.particles()[0].position.distance(s.particles()[1].position);
        assert!((d - 10.0).abs() < 1e-9, "distance {d}");
    }

    #[test]
    fn collisions_above_threshold_still_run() {
        let mut s = system(json!({
            "particle_count": 400,
            "collision_enabled": true,
            "subsample_threshold": 100,
            "decay": 0.0
        }));
        for _ in 0..10 {
            s.advance(DT);
        }
        assert_eq!(s.particles().len(), 400);
        assert!(s.particles().iter().all(|p| p.position.is_finite()));
    }

    #[test]
    fn pointer_attracts_when_active() {
        let mut s = system(json!({
            "particle_count": 1,
            "speed": 0.0,
            "decay": 0.0,
            "friction": 0.0,
            "interaction_radius": 500.0
        }));
        s.particles[0].position = DVec2::new(100.0, 100.0);
        s.on_interaction(Some(DVec2::new(200.0, 100.0)), true);
        s.advance(DT);
        assert!(s.particles()[0].velocity.x > 0.0);
    }

    #[test]
    fn pointer_repels_in_repel_mode() {
        let mut s = system(json!({
            "particle_count": 1,
            "speed": 0.0,
            "decay": 0.0,
            "friction": 0.0,
            "interaction_mode": "repel",
            "interaction_radius": 500.0
        }));
        s.particles[0].position = DVec2::new(100.0, 100.0);
        s.on_interaction(Some(DVec2::new(200.0, 100.0)), true);
        s.advance(DT);
        assert!(s.particles()[0].velocity.x < 0.0);
    }

    #[test]
    fn disabled_interaction_is_ignored() {
        let mut s = system(json!({
            "particle_count": 1,
            "speed": 0.0,
            "decay": 0.0,
            "interaction_enabled": false
        }));
        s.on_interaction(Some(DVec2::new(10.0, 10.0)), true);
        s.advance(DT);
        assert_eq!(s.particles()[0].velocity, DVec2::ZERO);
    }

    #[test]
    fn physics_change_applies_in_place() {
        let mut s = system(json!({"particle_count": 30}));
        let before = s.particles().to_vec();
        s.apply_configuration(config(json!({"particle_count": 30, "gravity": 2.0, "wind": 1.0})));
        assert_eq!(s.particles(), &before[..]);
        assert_eq!(s.particle_params().gravity, 2.0);
    }

    #[test]
    fn count_change_reinitializes() {
        let mut s = system(json!({"particle_count": 30}));
        s.apply_configuration(config(json!({"particle_count": 12})));
        assert_eq!(s.particles().len(), 12);
    }

    #[test]
    fn shape_change_reinitializes() {
        let mut s = system(json!({"particle_count": 5}));
        s.apply_configuration(config(json!({"particle_count": 5, "shape": "star"})));
        assert!(s
            .particles()
            .iter()
            .all(|p| p.shape == pattern_engine_core::ParticleShape::Star));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut s = system(json!({"particle_count": 20}));
        let initial = s.particles().to_vec();
        for _ in 0..10 {
            s.advance(DT);
        }
        s.reset();
        assert_eq!(s.particles(), &initial[..]);
    }

    #[test]
    fn every_movement_stays_finite() {
        for movement in [
            "random", "bounce", "orbit", "wave", "follow", "attract", "repel", "explode", "directed",
        ] {
            let mut s = system(json!({"particle_count": 60, "movement": movement, "turbulence": 1.0}));
            for _ in 0..60 {
                s.advance(DT);
            }
            assert!(
                s.particles().iter().all(|p| p.position.is_finite() && p.velocity.is_finite()),
                "{movement}"
            );
        }
    }

    #[test]
    fn params_reflect_options() {
        let s = system(json!({"movement": "wave"}));
        assert_eq!(s.params()["movement"], "wave");
        assert!(s.param_schema().get("particle_count").is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn population_never_changes(
                count in 0_usize..120,
                decay in 0.0_f64..1.0,
                seed in any::<u64>(),
                steps in 1_usize..40,
            ) {
                let cfg = config(json!({"particle_count": count, "decay": decay}))
                    .with_seed(seed);
                let mut s = ParticleSystem::new(cfg);
                for _ in 0..steps {
                    s.advance(DT);
                }
                prop_assert_eq!(s.particles().len(), count);
            }
        }
    }
}
