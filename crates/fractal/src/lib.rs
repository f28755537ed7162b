#![deny(unsafe_code)]
//! Escape-time fractal engine.
//!
//! The image is computed into a [`Raster`] and cached; `render` only blits it
//! until the view, the coloring inputs or the canvas size change.

pub mod escape;
pub mod params;

use glam::DVec2;
use pattern_engine_core::color::Rgba;
use pattern_engine_core::engine::frames_from_dt;
use pattern_engine_core::interaction::PointerState;
use pattern_engine_core::raster::Raster;
use pattern_engine_core::surface::Surface;
use pattern_engine_core::{Configuration, Engine};
use serde_json::Value;

pub use escape::{escape_time, Escape, FractalKind, FractalView};
pub use params::FractalParams;

/// Radians per frame the animated Julia constant travels.
const JULIA_ORBIT_RATE: f64 = 0.004;

pub struct Fractal {
    config: Configuration,
    params: FractalParams,
    view: FractalView,
    julia: DVec2,
    julia_phase: f64,
    pointer: PointerState,
    cache: Option<Raster>,
    dirty: bool,
    computations: u64,
}

impl Fractal {
    pub fn new(config: Configuration) -> Self {
        let params = FractalParams::from_json(config.options());
        Self {
            config,
            view: FractalView::new(params.center, params.zoom),
            julia: params.julia,
            julia_phase: params.julia.y.atan2(params.julia.x),
            params,
            pointer: PointerState::default(),
            cache: None,
            dirty: true,
            computations: 0,
        }
    }

    pub fn view(&self) -> FractalView {
        self.view
    }

    /// Julia constant currently in use.
    pub fn julia_constant(&self) -> DVec2 {
        self.julia
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times the image has been computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    pub fn cached_image(&self) -> Option<&Raster> {
        self.cache.as_ref()
    }

    /// Complex coordinate under a canvas point.
    pub fn to_complex(&self, point: DVec2) -> DVec2 {
        self.view
            .to_complex(point, self.config.width(), self.config.height())
    }

    /// Escape result for the complex point under a canvas pixel.
    pub fn sample(&self, point: DVec2) -> Escape {
        let p = self.to_complex(point);
        let (z0, c) = match self.params.kind {
            FractalKind::Julia => (p, self.julia),
            _ => (DVec2::ZERO, p),
        };
        escape_time(
            self.params.kind,
            z0,
            c,
            self.params.power,
            self.params.max_iterations,
        )
    }

    fn color_for(&self, escape: Escape) -> Rgba {
        let bg = self.config.background;
        match escape {
            Escape::Inside => bg,
            Escape::Escaped { iterations, smooth } => {
                let value = if self.params.smooth_coloring {
                    smooth
                } else {
                    iterations as f64
                };
                let t = value / self.params.max_iterations as f64;
                let palette = &self.config.palette;
                palette
                    .apply_opacity(palette.color_at_progress(t))
                    .over(bg.with_alpha(1.0))
            }
        }
    }

    fn recompute(&mut self) {
        let res = self.params.resolution as f64;
        let (w, h) = (self.config.width(), self.config.height());
        let cols = (w / res).ceil().max(1.0) as usize;
        let rows = (h / res).ceil().max(1.0) as usize;
        let mut raster = match self.cache.take() {
            Some(r) if r.width() == cols && r.height() == rows => r,
            _ => match Raster::new(cols, rows, self.config.background) {
                Ok(r) => r,
                Err(err) => {
                    tracing::warn!(%err, cols, rows, "cannot allocate fractal raster");
                    return;
                }
            },
        };
        for (y, row) in raster.rows_mut() {
            let py = (y as f64 + 0.5) * res;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let point = DVec2::new((x as f64 + 0.5) * res, py);
                px.copy_from_slice(&self.color_for(self.sample(point)).to_rgba8());
            }
        }
        self.cache = Some(raster);
        self.dirty = false;
        self.computations += 1;
        tracing::debug!(
            kind = self.params.kind.name(),
            zoom = self.view.zoom,
            cols,
            rows,
            "fractal recomputed"
        );
    }

    fn handle_pointer(&mut self) {
        if !self.params.interaction.enabled {
            self.pointer.take_press();
            return;
        }
        let press = self.pointer.take_press();
        if self.params.kind == FractalKind::Julia {
            if let Some(point) = self.pointer.active_position() {
                let c = self.to_complex(point);
                if c != self.julia {
                    self.julia = c;
                    self.julia_phase = c.y.atan2(c.x);
                    self.dirty = true;
                }
            }
        } else if let Some(point) = press {
            let (w, h) = (self.config.width(), self.config.height());
            self.view.zoom_at(point, self.params.zoom_factor, w, h);
            self.dirty = true;
        }
    }

    fn animate(&mut self, frames: f64) {
        let held = self.pointer.active_position().is_some();
        if self.params.kind != FractalKind::Julia || !self.params.animate_julia || held {
            return;
        }
        let radius = self.julia.length();
        self.julia_phase = (self.julia_phase + JULIA_ORBIT_RATE * frames) % std::f64::consts::TAU;
        self.julia = DVec2::from_angle(self.julia_phase) * radius;
        self.dirty = true;
    }
}

impl Engine for Fractal {
    fn advance(&mut self, dt: f64) {
        let frames = frames_from_dt(dt);
        if frames <= 0.0 {
            return;
        }
        self.handle_pointer();
        self.animate(frames);
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        if self.dirty || self.cache.is_none() {
            self.recompute();
        }
        if let Some(raster) = &self.cache {
            let (w, h) = surface.size();
            surface.draw_image(raster, 0.0, 0.0, w, h);
        } else {
            surface.clear(self.config.background);
        }
    }

    fn on_interaction(&mut self, point: Option<DVec2>, active: bool) {
        self.pointer.update(point, active);
    }

    fn apply_configuration(&mut self, config: Configuration) {
        let params = FractalParams::from_json(config.options());
        if self.config.canvas_changed(&config) || self.config.appearance_changed(&config) {
            self.dirty = true;
        }
        if params.changes_image(&self.params) {
            self.dirty = true;
        }
        // Pointer zooms persist until the configured view itself changes.
        if params.center != self.params.center || params.zoom != self.params.zoom {
            self.view = FractalView::new(params.center, params.zoom);
        }
        if params.julia != self.params.julia {
            self.julia = params.julia;
            self.julia_phase = params.julia.y.atan2(params.julia.x);
        }
        self.config = config;
        self.params = params;
    }

    fn reset(&mut self) {
        self.pointer.clear();
        self.view = FractalView::new(self.params.center, self.params.zoom);
        self.julia = self.params.julia;
        self.julia_phase = self.julia.y.atan2(self.julia.x);
        self.dirty = true;
    }

    fn configuration(&self) -> &Configuration {
        &self.config
    }

    fn params(&self) -> Value {
        self.params.to_json()
    }

    fn param_schema(&self) -> Value {
        FractalParams::schema()
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
        Configuration::new(Algorithm::Fractal, 80.0, 60.0).with_options(options)
    }

    fn render(f: &mut Fractal) -> CommandRecorder {
        let mut rec = CommandRecorder::new(80.0, 60.0);
        f.render(&mut rec);
        rec
    }

    #[test]
    fn render_blits_one_image() {
        let mut f = Fractal::new(config(json!({})));
        let rec = render(&mut f);
        assert_eq!(rec.commands().len(), 1);
        assert!(matches!(
            rec.commands()[0],
            DrawCommand::Image { width: 80, height: 60, .. }
        ));
    }

    #[test]
    fn center_pixel_is_background_for_mandelbrot() {
        let mut f = Fractal::new(config(json!({"center_x": 0.0})));
        let mut s = PixelSurface::new(Raster::new(80, 60, Rgba::WHITE).unwrap());
        f.render(&mut s);
        assert_eq!(s.raster().pixel(40, 30), Some([0, 0, 0, 255]));
    }

    #[test]
    fn far_pixels_are_colored() {
        let mut f = Fractal::new(config(json!({"zoom": 0.05})));
        assert!(f.sample(DVec2::new(0.0, 0.0)).escaped());
        let mut s = PixelSurface::new(Raster::new(80, 60, Rgba::BLACK).unwrap());
        f.render(&mut s);
        assert_ne!(s.raster().pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn cache_is_reused_until_invalidated() {
        let mut f = Fractal::new(config(json!({})));
        render(&mut f);
        render(&mut f);
        f.advance(1.0 / 60.0);
        render(&mut f);
        assert_eq!(f.computations(), 1);

        f.apply_configuration(config(json!({"interaction_radius": 10.0})));
        render(&mut f);
        assert_eq!(f.computations(), 1);

        f.apply_configuration(config(json!({"max_iterations": 50})));
        assert!(f.is_dirty());
        render(&mut f);
        assert_eq!(f.computations(), 2);

        let recolored = config(json!({"max_iterations": 50}))
            .with_palette(ColorPalette::from_name("fire").unwrap());
        f.apply_configuration(recolored);
        render(&mut f);
        assert_eq!(f.computations(), 3);
    }

    #[test]
    fn resolution_shrinks_the_cached_image() {
        let mut f = Fractal::new(config(json!({"resolution": 4})));
        render(&mut f);
        let img = f.cached_image().unwrap();
        assert_eq!((img.width(), img.height()), (20, 15));
    }

    #[test]
    fn press_zooms_on_pointer() {
        let mut f = Fractal::new(config(json!({"zoom_factor": 3.0})));
        let target = f.to_complex(DVec2::new(60.0, 15.0));
        f.on_interaction(Some(DVec2::new(60.0, 15.0)), true);
        f.advance(1.0 / 60.0);
        assert_eq!(f.view().zoom, 3.0);
        assert!((f.view().center - target).length() < 1e-12);
        // Holding does not zoom again.
        f.advance(1.0 / 60.0);
        assert_eq!(f.view().zoom, 3.0);
    }

    #[test]
    fn zoom_survives_unrelated_updates_and_resets() {
        let mut f = Fractal::new(config(json!({})));
        f.on_interaction(Some(DVec2::new(10.0, 10.0)), true);
        f.advance(1.0 / 60.0);
        f.apply_configuration(config(json!({"smooth_coloring": false})));
        assert_eq!(f.view().zoom, 2.0);
        f.reset();
        assert_eq!(f.view().zoom, 1.0);
        assert_eq!(f.view().center, DVec2::new(-0.5, 0.0));
    }

    #[test]
    fn julia_follows_pointer() {
        let mut f = Fractal::new(config(json!({"fractal_type": "julia"})));
        render(&mut f);
        let expected = f.to_complex(DVec2::new(20.0, 20.0));
        f.on_interaction(Some(DVec2::new(20.0, 20.0)), true);
        f.advance(1.0 / 60.0);
        assert_eq!(f.julia_constant(), expected);
        assert_eq!(f.view().zoom, 1.0);
        assert!(f.is_dirty());
    }

    #[test]
    fn disabled_interaction_ignores_presses() {
        let mut f = Fractal::new(config(json!({"interaction_enabled": false})));
        f.on_interaction(Some(DVec2::new(10.0, 10.0)), true);
        f.advance(1.0 / 60.0);
        assert_eq!(f.view().zoom, 1.0);
    }

    #[test]
    fn animated_julia_keeps_its_radius() {
        let mut f = Fractal::new(config(json!({"fractal_type": "julia", "animate_julia": true})));
        let start = f.julia_constant();
        for _ in 0..30 {
            f.advance(1.0 / 60.0);
        }
        let now = f.julia_constant();
        assert!((now.length() - start.length()).abs() < 1e-9);
        assert!(now.distance(start) > 1e-3);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut f = Fractal::new(config(json!({"fractal_type": "julia", "animate_julia": true})));
        let start = f.julia_constant();
        f.advance(0.0);
        f.advance(f64::NAN);
        assert_eq!(f.julia_constant(), start);
    }
}
