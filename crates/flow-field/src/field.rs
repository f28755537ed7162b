//! The flow vector grid: one unit direction per `cell_size` square.

use crate::noise_source::NoiseSource;
use glam::DVec2;
use pattern_engine_core::grid::Grid;

/// Mix applied to cells inside the rolling regeneration window.
const WINDOW_BLEND: f64 = 0.5;

/// Grid of unit directions covering the canvas.
///
/// Resolution is `ceil(width / cell_size) × ceil(height / cell_size)`.
#[derive(Debug, Clone)]
pub struct FlowVectorGrid {
    cell_size: f64,
    vectors: Grid<DVec2>,
    /// Next cell of the rolling window.
    cursor: usize,
}

impl FlowVectorGrid {
    /// Creates a grid of `+x` vectors. A non-positive or non-finite cell
    /// size is treated as 1 pixel; the grid always has at least one cell.
    pub fn new(width: f64, height: f64, cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        let cells = |edge: f64| {
            if edge.is_finite() {
                (edge / cell_size).ceil().max(1.0) as usize
            } else {
                1
            }
        };
        Self {
            cell_size,
            vectors: Grid::sized(cells(width), cells(height), DVec2::X),
            cursor: 0,
        }
    }

    pub fn cols(&self) -> usize {
        self.vectors.width()
    }

    pub fn rows(&self) -> usize {
        self.vectors.height()
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn vectors(&self) -> &Grid<DVec2> {
        &self.vectors
    }

    /// Pixel-space center of cell `(col, row)`.
    pub fn cell_center(&self, col: usize, row: usize) -> DVec2 {
        DVec2::new(
            (col as f64 + 0.5) * self.cell_size,
            (row as f64 + 0.5) * self.cell_size,
        )
    }

    fn center_of_index(&self, i: usize) -> DVec2 {
        self.cell_center(i % self.cols(), i / self.cols())
    }

    /// Direction under a pixel position. Out-of-canvas positions read the
    /// nearest edge cell.
    pub fn lookup(&self, position: DVec2) -> DVec2 {
        let to_cell = |v: f64| {
            if v.is_finite() {
                (v / self.cell_size).floor().clamp(isize::MIN as f64, isize::MAX as f64) as isize
            } else {
                0
            }
        };
        self.vectors
            .get_clamped(to_cell(position.x), to_cell(position.y))
    }

    /// Resamples every cell from `source` at `depth`.
    pub fn regenerate(&mut self, source: &NoiseSource, depth: f64) {
        let cols = self.cols();
        let cs = self.cell_size;
        for (i, v) in self.vectors.data_mut().iter_mut().enumerate() {
            let c = DVec2::new(
                ((i % cols) as f64 + 0.5) * cs,
                ((i / cols) as f64 + 0.5) * cs,
            );
            *v = source.direction(c.x, c.y, depth);
        }
        self.cursor = 0;
    }

    /// Blends a rolling window of `fraction` of the cells toward the field
    /// sampled at `depth`. The window continues where the last call ended.
    pub fn blend_window(&mut self, source: &NoiseSource, depth: f64, fraction: f64) {
        let len = self.vectors.len();
        let count = ((fraction.clamp(0.0, 1.0) * len as f64).ceil() as usize).clamp(1, len);
        for k in 0..count {
            let i = (self.cursor + k) % len;
            let c = self.center_of_index(i);
            let target = source.direction(c.x, c.y, depth);
            let current = self.vectors.data()[i];
            self.vectors.data_mut()[i] = blend_unit(current, target, WINDOW_BLEND);
        }
        self.cursor = (self.cursor + count) % len;
    }

    /// Rotates cells within `radius` of `point` toward (`sign > 0`) or away
    /// from (`sign < 0`) it. `weight` scales the blend at the center; it
    /// falls off linearly to zero at the radius.
    pub fn disturb(&mut self, point: DVec2, radius: f64, weight: f64, sign: f64) {
        if radius <= 0.0 || weight <= 0.0 || !point.is_finite() {
            return;
        }
        let cs = self.cell_size;
        let col0 = ((point.x - radius) / cs).floor().max(0.0) as usize;
        let row0 = ((point.y - radius) / cs).floor().max(0.0) as usize;
        let col1 = (((point.x + radius) / cs).ceil().max(0.0) as usize).min(self.cols());
        let row1 = (((point.y + radius) / cs).ceil().max(0.0) as usize).min(self.rows());
        for row in row0..row1 {
            for col in col0..col1 {
                let center = self.cell_center(col, row);
                let delta = center - point;
                let dist = delta.length();
                if dist >= radius || dist < 1e-9 {
                    continue;
                }
                let radial = -delta / dist * sign;
                let t = (weight * (1.0 - dist / radius)).min(1.0);
                let idx = row * self.cols() + col;
                let current = self.vectors.data()[idx];
                self.vectors.data_mut()[idx] = blend_unit(current, radial, t);
            }
        }
    }
}

/// Linear blend renormalized to unit length; falls back to `target` when
/// the mix cancels out.
fn blend_unit(current: DVec2, target: DVec2, t: f64) -> DVec2 {
    let mixed = current.lerp(target, t.clamp(0.0, 1.0));
    let len = mixed.length();
    if len < 1e-9 || !len.is_finite() {
        target
    } else {
        mixed / len
    }
}
