#![deny(unsafe_code)]
//! Voronoi engine: drifting seed points rendered as a cell diagram.
//!
//! The diagram is sampled on a coarse grid (`cell_size` pixels per sample)
//! into a [`Raster`] that is blitted each frame; seed-point markers are drawn
//! on top as circles.

pub mod params;
pub mod points;

use glam::DVec2;
use pattern_engine_core::color::Rgba;
use pattern_engine_core::engine::frames_from_dt;
use pattern_engine_core::interaction::PointerState;
use pattern_engine_core::prng::Xorshift64;
use pattern_engine_core::raster::Raster;
use pattern_engine_core::surface::Surface;
use pattern_engine_core::{Configuration, Engine};
use serde_json::Value;

pub use params::{ColorMode, VoronoiParams};
pub use points::{VoronoiPoint, VoronoiPointSet};

/// Velocity impulse per frame at full falloff and strength 1.
const REPULSION_GAIN: f64 = 0.5;
const POINT_RADIUS: f64 = 3.0;

pub struct Voronoi {
    config: Configuration,
    params: VoronoiParams,
    points: VoronoiPointSet,
    rng: Xorshift64,
    pointer: PointerState,
    /// Nearest-point index per sample, reused between frames.
    owners: Vec<usize>,
}

impl Voronoi {
    pub fn new(config: Configuration) -> Self {
        let params = VoronoiParams::from_json(config.options());
        let mut engine = Self {
            rng: Xorshift64::new(config.seed),
            config,
            params,
            points: VoronoiPointSet::default(),
            pointer: PointerState::default(),
            owners: Vec::new(),
        };
        engine.initialize();
        engine
    }

    pub fn points(&self) -> &VoronoiPointSet {
        &self.points
    }

    pub fn nearest_point(&self, p: DVec2) -> Option<usize> {
        self.points.nearest_point(p)
    }

    fn initialize(&mut self) {
        self.rng = Xorshift64::new(self.config.seed);
        self.points = VoronoiPointSet::generate(
            self.params.point_count,
            self.config.width(),
            self.config.height(),
            self.params.speed,
            &self.config.palette,
            &mut self.rng,
        );
        tracing::debug!(points = self.points.len(), "voronoi initialized");
    }

    /// Sampling grid dimensions.
    fn sample_dims(&self) -> (usize, usize) {
        let cs = self.params.cell_size as f64;
        (
            (self.config.width() / cs).ceil().max(1.0) as usize,
            (self.config.height() / cs).ceil().max(1.0) as usize,
        )
    }

    /// Typical cell radius, used to normalize distance coloring.
    fn reference_distance(&self) -> f64 {
        let area = self.config.width() * self.config.height();
        (area / self.points.len().max(1) as f64).sqrt()
    }

    fn sample_color(&self, owner: usize, sample: DVec2) -> Rgba {
        let palette = &self.config.palette;
        let pt = &self.points.points()[owner];
        let color = match self.params.color_mode {
            ColorMode::Cell => pt.color,
            ColorMode::Distance => {
                palette.color_at_progress(pt.position.distance(sample) / self.reference_distance())
            }
            ColorMode::Angle => {
                let d = sample - pt.position;
                palette.color_at_progress((d.y.atan2(d.x) + std::f64::consts::PI) / std::f64::consts::TAU)
            }
        };
        palette.apply_opacity(color)
    }

    /// Computes the nearest point for every sample center.
    fn assign_owners(&mut self, cols: usize, rows: usize) {
        let cs = self.params.cell_size as f64;
        self.owners.clear();
        self.owners.reserve(cols * rows);
        for y in 0..rows {
            for x in 0..cols {
                let center = DVec2::new((x as f64 + 0.5) * cs, (y as f64 + 0.5) * cs);
                let owner = self.points.nearest_point(center).unwrap_or(0);
                self.owners.push(owner);
            }
        }
    }

    fn is_border(&self, x: usize, y: usize, cols: usize, rows: usize) -> bool {
        let i = y * cols + x;
        let own = self.owners[i];
        (x + 1 < cols && self.owners[i + 1] != own) || (y + 1 < rows && self.owners[i + cols] != own)
    }

    fn build_raster(&mut self) -> Option<Raster> {
        let (cols, rows) = self.sample_dims();
        let bg = self.config.background;
        let mut raster = match Raster::new(cols, rows, bg) {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(%err, cols, rows, "cannot allocate voronoi raster");
                return None;
            }
        };
        self.assign_owners(cols, rows);
        let cs = self.params.cell_size as f64;
        for (y, row) in raster.rows_mut() {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let color = if self.params.show_borders && self.is_border(x, y, cols, rows) {
                    bg
                } else {
                    let center = DVec2::new((x as f64 + 0.5) * cs, (y as f64 + 0.5) * cs);
                    self.sample_color(self.owners[y * cols + x], center).over(bg)
                };
                px.copy_from_slice(&color.to_rgba8());
            }
        }
        Some(raster)
    }
}

impl Engine for Voronoi {
    fn advance(&mut self, dt: f64) {
        let frames = frames_from_dt(dt);
        if frames <= 0.0 {
            return;
        }
        let interaction = self.params.interaction;
        if interaction.enabled {
            if let Some(center) = self.pointer.active_position() {
                self.points.repel(
                    center,
                    interaction.strength * REPULSION_GAIN * frames,
                    |d| interaction.falloff(d),
                );
            }
        }
        self.points.damp(self.params.speed, frames, &mut self.rng);
        self.points
            .advance(frames, self.config.width(), self.config.height());
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        if self.points.is_empty() {
            surface.clear(self.config.background);
            return;
        }
        match self.build_raster() {
            Some(raster) => {
                let (w, h) = surface.size();
                let cs = self.params.cell_size as f64;
                // Edge samples may extend past the canvas; scale so one
                // sample covers exactly `cell_size` pixels.
                surface.draw_image(
                    &raster,
                    0.0,
                    0.0,
                    raster.width() as f64 * cs * w / self.config.width(),
                    raster.height() as f64 * cs * h / self.config.height(),
                );
            }
            None => surface.clear(self.config.background),
        }
        if self.params.show_points {
            let marker = self.config.palette.apply_opacity(Rgba::WHITE);
            for pt in self.points.points() {
                surface.fill_circle(pt.position, POINT_RADIUS, marker);
            }
        }
    }

    fn on_interaction(&mut self, point: Option<DVec2>, active: bool) {
        self.pointer.update(point, active);
    }

    fn apply_configuration(&mut self, config: Configuration) {
        let params = VoronoiParams::from_json(config.options());
        let reinit = self.params.needs_reinit(&params)
            || self.config.canvas_changed(&config)
            || self.config.seed != config.seed;
        let recolor = self.config.palette != config.palette;
        self.config = config;
        self.params = params;
        if reinit {
            self.initialize();
        } else if recolor {
            self.points.recolor(&self.config.palette, &mut self.rng);
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
        VoronoiParams::schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pattern_engine_core::config::Algorithm;
    use pattern_engine_core::palette::ColorPalette;
    use pattern_engine_core::surface::{CommandRecorder, DrawCommand, PixelSurface};
    use serde_json::json;

    fn config(options: Value) -> Configuration {
        Configuration::new(Algorithm::Voronoi, 120.0, 80.0).with_options(options)
    }

    fn voronoi(options: Value) -> Voronoi {
        Voronoi::new(config(options))
    }

    fn positions(v: &Voronoi) -> Vec<DVec2> {
        v.points().points().iter().map(|p| p.position).collect()
    }

    #[test]
    fn generates_configured_points_inside_canvas() {
        let v = voronoi(json!({"point_count": 12}));
        assert_eq!(v.points().len(), 12);
        for p in positions(&v) {
            assert!((0.0..=120.0).contains(&p.x) && (0.0..=80.0).contains(&p.y));
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let mut a = voronoi(json!({}));
        let mut b = voronoi(json!({}));
        for _ in 0..20 {
            a.advance(1.0 / 60.0);
            b.advance(1.0 / 60.0);
        }
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut v = voronoi(json!({}));
        let before = positions(&v);
        v.advance(0.0);
        v.advance(-1.0);
        assert_eq!(positions(&v), before);
    }

    #[test]
    fn zero_points_renders_background() {
        let mut v = voronoi(json!({"point_count": 0}));
        v.advance(1.0 / 60.0);
        let mut rec = CommandRecorder::new(120.0, 80.0);
        v.render(&mut rec);
        assert_eq!(rec.commands().len(), 1);
        assert!(matches!(rec.commands()[0], DrawCommand::FillRect { .. }));
    }

    #[test]
    fn render_blits_samples_and_marks_points() {
        let mut v = voronoi(json!({"point_count": 7, "cell_size": 4}));
        let mut rec = CommandRecorder::new(120.0, 80.0);
        v.render(&mut rec);
        assert!(matches!(
            rec.commands()[0],
            DrawCommand::Image { width: 30, height: 20, .. }
        ));
        assert_eq!(rec.shape_count(), 7);

        let mut hidden = voronoi(json!({"point_count": 7, "show_points": false}));
        let mut rec = CommandRecorder::new(120.0, 80.0);
        hidden.render(&mut rec);
        assert_eq!(rec.shape_count(), 0);
    }

    #[test]
    fn single_cell_color_mode_paints_point_color() {
        let palette = ColorPalette::from_hex(&["#ff0000"]).unwrap();
        let cfg = config(json!({"point_count": 1, "show_points": false, "show_borders": false}))
            .with_palette(palette);
        let mut v = Voronoi::new(cfg);
        let mut s = PixelSurface::new(Raster::new(120, 80, Rgba::BLACK).unwrap());
        v.render(&mut s);
        assert_eq!(s.raster().pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(s.raster().pixel(115, 75), Some([255, 0, 0, 255]));
    }

    #[test]
    fn borders_separate_cells() {
        let mut v = voronoi(json!({"point_count": 2, "cell_size": 1, "show_points": false}));
        v.points = VoronoiPointSet::from_points(vec![
            VoronoiPoint { position: DVec2::new(20.0, 40.0), velocity: DVec2::ZERO, color: Rgba::WHITE },
            VoronoiPoint { position: DVec2::new(100.0, 40.0), velocity: DVec2::ZERO, color: Rgba::WHITE },
        ]);
        let mut s = PixelSurface::new(Raster::new(120, 80, Rgba::BLACK).unwrap());
        v.render(&mut s);
        // The bisector sits at x = 60; the last sample owned by the left
        // point is the border.
        assert_eq!(s.raster().pixel(59, 40), Some([0, 0, 0, 255]));
        assert_eq!(s.raster().pixel(30, 40), Some([255, 255, 255, 255]));
        assert_eq!(s.raster().pixel(90, 40), Some([255, 255, 255, 255]));
    }

    #[test]
    fn render_owners_match_nearest_point() {
        let mut v = voronoi(json!({"point_count": 15, "cell_size": 8}));
        let mut rec = CommandRecorder::new(120.0, 80.0);
        v.render(&mut rec);
        let (cols, _) = v.sample_dims();
        for (i, &owner) in v.owners.iter().enumerate() {
            let center = DVec2::new(((i % cols) as f64 + 0.5) * 8.0, ((i / cols) as f64 + 0.5) * 8.0);
            assert_eq!(v.nearest_point(center), Some(owner));
        }
    }

    #[test]
    fn pointer_repels_nearby_points() {
        let mut v = voronoi(json!({"point_count": 1, "speed": 0.0, "interaction_radius": 200.0}));
        let start = DVec2::new(60.0, 40.0);
        v.points = VoronoiPointSet::from_points(vec![VoronoiPoint {
            position: start,
            velocity: DVec2::ZERO,
            color: Rgba::WHITE,
        }]);
        let pointer = start - DVec2::new(10.0, 0.0);
        v.on_interaction(Some(pointer), true);
        v.advance(1.0 / 60.0);
        let now = v.points().points()[0].position;
        assert!(now.distance(pointer) > start.distance(pointer));
    }

    #[test]
    fn speed_change_keeps_points() {
        let mut v = voronoi(json!({}));
        let before = positions(&v);
        v.apply_configuration(config(json!({"speed": 3.0})));
        assert_eq!(positions(&v), before);
        v.apply_configuration(config(json!({"point_count": 10})));
        assert_eq!(v.points().len(), 10);
    }

    #[test]
    fn palette_change_recolors_in_place() {
        let mut v = voronoi(json!({}));
        let before = positions(&v);
        let red = ColorPalette::from_hex(&["#ff0000"]).unwrap();
        v.apply_configuration(config(json!({})).with_palette(red));
        assert_eq!(positions(&v), before);
        assert!(v.points().points().iter().all(|p| p.color == Rgba::rgb(1.0, 0.0, 0.0)));
    }
}
