//! Uniform-grid spatial hash for neighborhood queries.
//!
//! Points are bucketed by cell with a counting sort into one flat index
//! array (`cell_start[c]..cell_start[c + 1]` are the members of cell `c`).
//! Rebuilding reuses the allocations, so an engine can keep one hash alive
//! and rebuild it every frame.

use glam::DVec2;

#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f64,
    cols: usize,
    rows: usize,
    cell_start: Vec<usize>,
    entries: Vec<usize>,
    cell_of: Vec<usize>,
}

impl SpatialHash {
    /// Creates an empty hash. Non-positive or non-finite cell sizes become 1.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cols: 1,
            rows: 1,
            cell_start: vec![0, 0],
            entries: Vec::new(),
            cell_of: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-buckets `positions` over a `width × height` area. Positions outside
    /// the area land in the nearest edge cell.
    pub fn rebuild(&mut self, positions: &[DVec2], width: f64, height: f64) {
        self.cols = ((width / self.cell_size).ceil() as usize).max(1);
        self.rows = ((height / self.cell_size).ceil() as usize).max(1);
        let cells = self.cols * self.rows;

        let mut cell_of = std::mem::take(&mut self.cell_of);
        cell_of.clear();
        cell_of.extend(positions.iter().map(|&p| self.cell_index(p)));
        self.cell_of = cell_of;

        self.cell_start.clear();
        self.cell_start.resize(cells + 1, 0);
        for &c in &self.cell_of {
            self.cell_start[c + 1] += 1;
        }
        for c in 0..cells {
            self.cell_start[c + 1] += self.cell_start[c];
        }

        self.entries.clear();
        self.entries.resize(positions.len(), 0);
        let mut cursor = self.cell_start.clone();
        for (i, &c) in self.cell_of.iter().enumerate() {
            self.entries[cursor[c]] = i;
            cursor[c] += 1;
        }
    }

    fn cell_coords(&self, p: DVec2) -> (usize, usize) {
        let cx = if p.x.is_finite() {
            (p.x / self.cell_size).floor().clamp(0.0, (self.cols - 1) as f64) as usize
        } else {
            0
        };
        let cy = if p.y.is_finite() {
            (p.y / self.cell_size).floor().clamp(0.0, (self.rows - 1) as f64) as usize
        } else {
            0
        };
        (cx, cy)
    }

    fn cell_index(&self, p: DVec2) -> usize {
        let (cx, cy) = self.cell_coords(p);
        cy * self.cols + cx
    }

    /// Visits the index of every point bucketed in a cell that intersects the
    /// square of half-size `radius` around `center`. Callers filter by exact
    /// distance.
    pub fn for_each_candidate(&self, center: DVec2, radius: f64, mut visit: impl FnMut(usize)) {
        let r = radius.max(0.0);
        let (x0, y0) = self.cell_coords(center - DVec2::splat(r));
        let (x1, y1) = self.cell_coords(center + DVec2::splat(r));
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let c = cy * self.cols + cx;
                for &i in &self.entries[self.cell_start[c]..self.cell_start[c + 1]] {
                    visit(i);
                }
            }
        }
    }

    /// Collects candidate indices into `out` (cleared first).
    pub fn candidates_into(&self, center: DVec2, radius: f64, out: &mut Vec<usize>) {
        out.clear();
        self.for_each_candidate(center, radius, |i| out.push(i));
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_indexes_every_point() {
        let mut h = SpatialHash::new(10.0);
        let pts = vec![DVec2::new(1.0, 1.0), DVec2::new(55.0, 5.0), DVec2::new(99.0, 99.0)];
        h.rebuild(&pts, 100.0, 100.0);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn query_finds_nearby_and_skips_far() {
        let mut h = SpatialHash::new(10.0);
        let pts = vec![DVec2::new(5.0, 5.0), DVec2::new(12.0, 6.0), DVec2::new(90.0, 90.0)];
        h.rebuild(&pts, 100.0, 100.0);
        let mut out = Vec::new();
        h.candidates_into(DVec2::new(6.0, 6.0), 8.0, &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn out_of_area_points_land_on_edges() {
        let mut h = SpatialHash::new(10.0);
        let pts = vec![DVec2::new(-50.0, -50.0), DVec2::new(500.0, 500.0)];
        h.rebuild(&pts, 100.0, 100.0);
        let mut out = Vec::new();
        h.candidates_into(DVec2::ZERO, 1.0, &mut out);
        assert_eq!(out, vec![0]);
        h.candidates_into(DVec2::new(99.0, 99.0), 1.0, &mut out);
        assert_eq!(out, vec![1]);
    }

    #[test]
    fn invalid_cell_size_defaults_to_one() {
        assert_eq!(SpatialHash::new(0.0).cell_size(), 1.0);
        assert_eq!(SpatialHash::new(f64::NAN).cell_size(), 1.0);
    }

    #[test]
    fn empty_rebuild_yields_nothing() {
        let mut h = SpatialHash::default();
        h.rebuild(&[], 100.0, 100.0);
        assert!(h.is_empty());
        let mut hits = 0;
        h.for_each_candidate(DVec2::new(50.0, 50.0), 100.0, |_| hits += 1);
        assert_eq!(hits, 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn candidates_are_superset_of_true_neighbors(
                pts in prop::collection::vec((0.0_f64..200.0, 0.0_f64..200.0), 1..80),
                cx in 0.0_f64..200.0,
                cy in 0.0_f64..200.0,
                radius in 0.0_f64..60.0,
                cell in 5.0_f64..50.0,
            ) {
                let positions: Vec<DVec2> = pts.iter().map(|&(x, y)| DVec2::new(x, y)).collect();
                let mut h = SpatialHash::new(cell);
                h.rebuild(&positions, 200.0, 200.0);
                let center = DVec2::new(cx, cy);
                let mut found = Vec::new();
                h.candidates_into(center, radius, &mut found);
                for (i, p) in positions.iter().enumerate() {
                    if p.distance(center) <= radius {
                        prop_assert!(found.contains(&i));
                    }
                }
            }
        }
    }
}
