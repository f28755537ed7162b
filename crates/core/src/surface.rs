//! Drawing surface abstraction consumed by `Engine::render`.
//!
//! Engines draw through the object-safe [`Surface`] trait. Two
//! implementations ship with the core:
//!
//! - [`PixelSurface`]: a CPU rasterizer over a [`Raster`], used for PNG
//!   snapshots and headless rendering.
//! - [`CommandRecorder`]: records every call as a [`DrawCommand`], which lets
//!   a host replay frames onto its own canvas and lets tests inspect output.

use crate::color::Rgba;
use crate::raster::Raster;
use glam::DVec2;

/// 2D drawing target.
pub trait Surface {
    /// Surface size in pixels (width, height).
    fn size(&self) -> (f64, f64);

    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba);

    /// Draws a straight line of the given stroke width.
    fn draw_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba);

    /// Fills a circle.
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);

    /// Outlines a circle.
    fn stroke_circle(&mut self, center: DVec2, radius: f64, width: f64, color: Rgba);

    /// Fills a closed polygon (even-odd rule).
    fn fill_path(&mut self, points: &[DVec2], color: Rgba);

    /// Draws `image` scaled into the destination rectangle.
    fn draw_image(&mut self, image: &Raster, x: f64, y: f64, w: f64, h: f64);

    /// Covers the whole surface with `color`.
    fn clear(&mut self, color: Rgba) {
        let (w, h) = self.size();
        self.fill_rect(0.0, 0.0, w, h, color);
    }
}

// ---------------------------------------------------------------------------
// PixelSurface
// ---------------------------------------------------------------------------

/// CPU rasterizer writing into an owned [`Raster`].
///
/// Coverage is decided by pixel centers; there is no anti-aliasing.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    raster: Raster,
}

impl PixelSurface {
    pub fn new(raster: Raster) -> Self {
        Self { raster }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn into_raster(self) -> Raster {
        self.raster
    }

    /// Pixel-space bounding box of a shape, clipped to the raster.
    fn bounds(&self, min: DVec2, max: DVec2) -> Option<(usize, usize, usize, usize)> {
        let w = self.raster.width() as f64;
        let h = self.raster.height() as f64;
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(w);
        let y1 = max.y.ceil().min(h);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    /// Blends `color` into every pixel whose center satisfies `inside`.
    fn cover(&mut self, min: DVec2, max: DVec2, color: Rgba, inside: impl Fn(DVec2) -> bool) {
        let Some((x0, y0, x1, y1)) = self.bounds(min, max) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let center = DVec2::new(px as f64 + 0.5, py as f64 + 0.5);
                if inside(center) {
                    self.raster.blend_pixel(px, py, color);
                }
            }
        }
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (f64, f64) {
        (self.raster.width() as f64, self.raster.height() as f64)
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let min = DVec2::new(x, y);
        let max = DVec2::new(x + w, y + h);
        // Sub-pixel rects still paint the pixel they start in.
        let max = DVec2::new(max.x.max(x.floor() + 1.0), max.y.max(y.floor() + 1.0));
        self.cover(min.floor(), max, color, |p| {
            p.x >= x.floor() && p.x < max.x && p.y >= y.floor() && p.y < max.y
        });
    }

    fn draw_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        let half = (width * 0.5).max(0.5);
        let pad = DVec2::splat(half);
        self.cover(from.min(to) - pad, from.max(to) + pad, color, |p| {
            distance_to_segment(p, from, to) <= half
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let r = radius.max(0.5);
        let pad = DVec2::splat(r);
        self.cover(center - pad, center + pad, color, |p| {
            p.distance_squared(center) <= r * r
        });
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64, width: f64, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let half = (width * 0.5).max(0.5);
        let pad = DVec2::splat(radius + half);
        self.cover(center - pad, center + pad, color, |p| {
            (p.distance(center) - radius).abs() <= half
        });
    }

    fn fill_path(&mut self, points: &[DVec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let min = points.iter().copied().fold(DVec2::splat(f64::INFINITY), DVec2::min);
        let max = points
            .iter()
            .copied()
            .fold(DVec2::splat(f64::NEG_INFINITY), DVec2::max);
        self.cover(min, max, color, |p| point_in_polygon(p, points));
    }

    fn draw_image(&mut self, image: &Raster, x: f64, y: f64, w: f64, h: f64) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.bounds(DVec2::new(x, y), DVec2::new(x + w, y + h))
        else {
            return;
        };
        let sx = image.width() as f64 / w;
        let sy = image.height() as f64 / h;
        for py in y0..y1 {
            let iy = (((py as f64 + 0.5 - y) * sy) as usize).min(image.height() - 1);
            for px in x0..x1 {
                let ix = (((px as f64 + 0.5 - x) * sx) as usize).min(image.width() - 1);
                if let Some(src) = image.pixel(ix, iy) {
                    if src[3] == 255 {
                        self.raster.put_pixel(px, py, src);
                    } else {
                        self.raster.blend_pixel(px, py, Rgba::from_rgba8(src));
                    }
                }
            }
        }
    }
}

fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn point_in_polygon(p: DVec2, poly: &[DVec2]) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ---------------------------------------------------------------------------
// CommandRecorder
// ---------------------------------------------------------------------------

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Rgba,
    },
    Line {
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    },
    FillCircle {
        center: DVec2,
        radius: f64,
        color: Rgba,
    },
    StrokeCircle {
        center: DVec2,
        radius: f64,
        width: f64,
        color: Rgba,
    },
    FillPath {
        points: Vec<DVec2>,
        color: Rgba,
    },
    Image {
        width: usize,
        height: usize,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct CommandRecorder {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of shape commands (everything except rectangle fills and images).
    pub fn shape_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::Line { .. }
                        | DrawCommand::FillCircle { .. }
                        | DrawCommand::StrokeCircle { .. }
                        | DrawCommand::FillPath { .. }
                )
            })
            .count()
    }
}

impl Surface for CommandRecorder {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { x, y, w, h, color });
    }

    fn draw_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn fill_path(&mut self, points: &[DVec2], color: Rgba) {
        self.commands.push(DrawCommand::FillPath {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_image(&mut self, image: &Raster, x: f64, y: f64, w: f64, h: f64) {
        self.commands.push(DrawCommand::Image {
            width: image.width(),
            height: image.height(),
            x,
            y,
            w,
            h,
        });
    }
}
