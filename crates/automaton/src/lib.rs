#![deny(unsafe_code)]
//! Cellular-automaton engine.
//!
//! Five rule families share one double-buffered byte grid (see [`rules`] for
//! the state encoding). Generations are stepped on a wall-clock cadence of
//! `steps_per_second`, at most [`MAX_STEPS_PER_FRAME`] per `advance`.
//!
//! Grid dimensions are `ceil(width / cell_size) × ceil(height / cell_size)`
//! and only change on re-initialization.

pub mod grid;
pub mod params;
pub mod rules;

use glam::DVec2;
use pattern_engine_core::color::Rgba;
use pattern_engine_core::engine::{frames_from_dt, paint_background, FRAME_RATE};
use pattern_engine_core::interaction::PointerState;
use pattern_engine_core::prng::Xorshift64;
use pattern_engine_core::surface::Surface;
use pattern_engine_core::{Configuration, Engine};
use serde_json::Value;

pub use grid::AutomatonGrid;
pub use params::AutomatonParams;
pub use rules::{LifeRule, RuleFamily};

pub const MAX_STEPS_PER_FRAME: usize = 4;
/// Ages at or above this render with the last palette color.
const AGE_SPAN: f64 = 32.0;
const GRID_LINE_ALPHA: f64 = 0.08;
/// Spacing between generated wires, in cells.
const WIRE_SPACING: usize = 6;
/// One electron per this many conductor cells.
const CONDUCTORS_PER_HEAD: usize = 40;

/// Cellular-automaton engine.
pub struct CellularAutomaton {
    config: Configuration,
    params: AutomatonParams,
    grid: AutomatonGrid,
    rng: Xorshift64,
    pointer: PointerState,
    generation: u64,
    accumulator: f64,
}

impl CellularAutomaton {
    pub fn new(config: Configuration) -> Self {
        let params = AutomatonParams::from_json(config.options());
        let (cols, rows) = grid_dims(&config, params.cell_size);
        let mut engine = Self {
            rng: Xorshift64::new(config.seed),
            config,
            params,
            grid: AutomatonGrid::new(cols, rows),
            pointer: PointerState::default(),
            generation: 0,
            accumulator: 0.0,
        };
        engine.seed_grid();
        engine
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn grid(&self) -> &AutomatonGrid {
        &self.grid
    }

    pub fn cell(&self, x: usize, y: usize) -> u8 {
        self.grid.get(x, y)
    }

    pub fn set_cell(&mut self, x: usize, y: usize, state: u8) {
        self.grid.set(x, y, state);
    }

    /// Cells in a state that keeps the pattern going.
    pub fn population(&self) -> usize {
        let family = self.params.rule;
        self.grid.count(|s| family.is_active(s))
    }

    /// Advances exactly one generation, ignoring the step cadence.
    pub fn step(&mut self) {
        {
            let (current, next) = self.grid.buffers();
            match self.params.rule {
                RuleFamily::Life => rules::step_life(current, next, &self.params.life_rule),
                RuleFamily::Seeds => rules::step_seeds(
                    current,
                    next,
                    self.params.birth_probability,
                    &mut self.rng,
                ),
                RuleFamily::BriansBrain => rules::step_brians_brain(current, next),
                RuleFamily::Wireworld => rules::step_wireworld(current, next),
                RuleFamily::Elementary => {
                    rules::step_elementary(current, next, self.params.elementary_rule)
                }
            }
        }
        self.grid.swap();
        self.generation += 1;

        let auto = self.params.auto_reset_generations as u64;
        if auto > 0 && self.generation >= auto {
            tracing::debug!(generation = self.generation, "auto reset");
            self.seed_grid();
        } else if self.params.reset_on_extinction && self.population() == 0 {
            tracing::debug!(generation = self.generation, "extinct, re-seeding");
            self.seed_grid();
        }
    }

    fn initialize(&mut self) {
        self.rng = Xorshift64::new(self.config.seed);
        let (cols, rows) = grid_dims(&self.config, self.params.cell_size);
        self.grid = AutomatonGrid::new(cols, rows);
        self.seed_grid();
    }

    /// Fills the grid with the family's starting pattern.
    fn seed_grid(&mut self) {
        self.generation = 0;
        self.accumulator = 0.0;
        self.grid.clear();
        let density = self.params.initial_density;
        let rng = &mut self.rng;
        match self.params.rule {
            RuleFamily::Life | RuleFamily::Seeds | RuleFamily::BriansBrain => {
                self.grid
                    .fill_with(|_, _| if rng.chance(density) { 1 } else { 0 });
            }
            RuleFamily::Wireworld => seed_wires(&mut self.grid, rng, density),
            RuleFamily::Elementary => {
                let cols = self.grid.cols();
                if self.params.elementary_random_start {
                    for x in 0..cols {
                        if rng.chance(density) {
                            self.grid.set(x, 0, 1);
                        }
                    }
                } else {
                    self.grid.set(cols / 2, 0, 1);
                }
            }
        }
        tracing::debug!(
            rule = self.params.rule.name(),
            cols = self.grid.cols(),
            rows = self.grid.rows(),
            population = self.population(),
            "automaton seeded"
        );
    }

    /// Paints the family's live state under the pointer.
    fn paint(&mut self, point: DVec2) {
        let interaction = self.params.interaction;
        let cs = self.params.cell_size as f64;
        let radius = interaction.radius;
        let state = self.params.rule.paint_state();
        let x0 = ((point.x - radius) / cs).floor().max(0.0) as usize;
        let y0 = ((point.y - radius) / cs).floor().max(0.0) as usize;
        let x1 = (((point.x + radius) / cs).ceil().max(0.0) as usize).min(self.grid.cols());
        let y1 = (((point.y + radius) / cs).ceil().max(0.0) as usize).min(self.grid.rows());
        for y in y0..y1 {
            for x in x0..x1 {
                let center = DVec2::new((x as f64 + 0.5) * cs, (y as f64 + 0.5) * cs);
                let falloff = interaction.falloff(center.distance(point));
                if falloff <= 0.0 {
                    continue;
                }
                let paint = match self.params.rule {
                    RuleFamily::Seeds => self.rng.chance(falloff),
                    _ => true,
                };
                if paint {
                    self.grid.set(x, y, state);
                }
            }
        }
    }

    fn cell_color(&self, state: u8, age: u16, y: usize) -> Option<Rgba> {
        let palette = &self.config.palette;
        let color = match self.params.rule {
            RuleFamily::Life | RuleFamily::Seeds => {
                if state == 0 {
                    return None;
                }
                palette.color_at_progress((age as f64 - 1.0).max(0.0) / AGE_SPAN)
            }
            RuleFamily::BriansBrain => match state {
                rules::ALIVE => palette.first(),
                rules::DYING => palette.last().fade(0.5),
                _ => return None,
            },
            RuleFamily::Wireworld => match state {
                rules::HEAD => palette.last(),
                rules::TAIL => palette.first(),
                rules::CONDUCTOR => palette.color_at_progress(0.5).fade(0.6),
                _ => return None,
            },
            RuleFamily::Elementary => {
                if state == 0 {
                    return None;
                }
                let rows = self.grid.rows().max(2) - 1;
                palette.color_at_progress(y as f64 / rows as f64)
            }
        };
        Some(palette.apply_opacity(color))
    }

    fn draw_grid_lines(&self, surface: &mut dyn Surface) {
        let cs = self.params.cell_size as f64;
        let (w, h) = (self.config.width(), self.config.height());
        let color = Rgba::WHITE.with_alpha(GRID_LINE_ALPHA);
        for x in 1..self.grid.cols() {
            let px = x as f64 * cs;
            surface.draw_line(DVec2::new(px, 0.0), DVec2::new(px, h), 1.0, color);
        }
        for y in 1..self.grid.rows() {
            let py = y as f64 * cs;
            surface.draw_line(DVec2::new(0.0, py), DVec2::new(w, py), 1.0, color);
        }
    }
}

fn grid_dims(config: &Configuration, cell_size: usize) -> (usize, usize) {
    let cs = cell_size.max(1) as f64;
    (
        (config.width() / cs).ceil().max(1.0) as usize,
        (config.height() / cs).ceil().max(1.0) as usize,
    )
}

/// Lays out horizontal and vertical conductor wires and drops electrons on
/// them. `density` scales how many candidate wires are kept.
fn seed_wires(grid: &mut AutomatonGrid, rng: &mut Xorshift64, density: f64) {
    let (cols, rows) = (grid.cols(), grid.rows());
    let keep = density.clamp(0.0, 1.0).sqrt();
    for y in (WIRE_SPACING / 2..rows).step_by(WIRE_SPACING) {
        if rng.chance(keep) {
            for x in 0..cols {
                grid.set(x, y, rules::CONDUCTOR);
            }
        }
    }
    for x in (WIRE_SPACING / 2..cols).step_by(WIRE_SPACING) {
        if rng.chance(keep) {
            for y in 0..rows {
                grid.set(x, y, rules::CONDUCTOR);
            }
        }
    }
    let conductors: Vec<(usize, usize)> = (0..rows)
        .flat_map(|y| (0..cols).map(move |x| (x, y)))
        .filter(|&(x, y)| grid.get(x, y) == rules::CONDUCTOR)
        .collect();
    if conductors.is_empty() {
        return;
    }
    let heads = (conductors.len() / CONDUCTORS_PER_HEAD).max(1);
    for _ in 0..heads {
        let (x, y) = conductors[rng.next_usize(conductors.len())];
        grid.set(x, y, rules::HEAD);
        // A tail behind the head gives the electron a direction.
        if x > 0 && grid.get(x - 1, y) == rules::CONDUCTOR {
            grid.set(x - 1, y, rules::TAIL);
        } else if y > 0 && grid.get(x, y - 1) == rules::CONDUCTOR {
            grid.set(x, y - 1, rules::TAIL);
        }
    }
}

impl Engine for CellularAutomaton {
    fn advance(&mut self, dt: f64) {
        let seconds = frames_from_dt(dt) / FRAME_RATE;
        if seconds <= 0.0 {
            return;
        }
        if self.params.interaction.enabled {
            if let Some(point) = self.pointer.active_position() {
                self.paint(point);
            }
        }
        let period = 1.0 / self.params.steps_per_second;
        self.accumulator += seconds;
        let mut steps = 0;
        while self.accumulator + 1e-9 >= period && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= period;
            self.step();
            steps += 1;
        }
        // Drop backlog beyond the per-frame cap.
        self.accumulator = self.accumulator.clamp(0.0, period);
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        paint_background(surface, self.config.background, 0.0);
        let cs = self.params.cell_size as f64;
        let cols = self.grid.cols();
        let current = self.grid.current().data();
        let ages = self.grid.ages().data();
        for (i, (&state, &age)) in current.iter().zip(ages).enumerate() {
            if state == 0 {
                continue;
            }
            let (x, y) = (i % cols, i / cols);
            if let Some(color) = self.cell_color(state, age, y) {
                surface.fill_rect(x as f64 * cs, y as f64 * cs, cs, cs, color);
            }
        }
        if self.params.show_grid && cs >= 3.0 {
            self.draw_grid_lines(surface);
        }
    }

    fn on_interaction(&mut self, point: Option<DVec2>, active: bool) {
        self.pointer.update(point, active);
    }

    fn apply_configuration(&mut self, config: Configuration) {
        let params = AutomatonParams::from_json(config.options());
        let reinit = self.params.needs_reseed(&params)
            || self.config.canvas_changed(&config)
            || self.config.seed != config.seed;
        self.config = config;
        self.params = params;
        if reinit {
            self.initialize();
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
        AutomatonParams::schema()
    }
}
