//! Double-buffered cell grid with per-cell ages.

use pattern_engine_core::grid::Grid;

/// `current` and `next` always have the same shape; [`AutomatonGrid::swap`]
/// exchanges them after a synchronous update.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomatonGrid {
    current: Grid<u8>,
    next: Grid<u8>,
    /// Generations each cell has been non-zero, saturating.
    ages: Grid<u16>,
}

impl AutomatonGrid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            current: Grid::sized(cols, rows, 0),
            next: Grid::sized(cols, rows, 0),
            ages: Grid::sized(cols, rows, 0),
        }
    }

    pub fn cols(&self) -> usize {
        self.current.width()
    }

    pub fn rows(&self) -> usize {
        self.current.height()
    }

    pub fn current(&self) -> &Grid<u8> {
        &self.current
    }

    pub fn ages(&self) -> &Grid<u16> {
        &self.ages
    }

    /// Both buffers, for an update that reads one and writes the other.
    pub fn buffers(&mut self) -> (&Grid<u8>, &mut Grid<u8>) {
        (&self.current, &mut self.next)
    }

    /// Promotes `next` to `current` and updates ages.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        for (age, &state) in self
            .ages
            .data_mut()
            .iter_mut()
            .zip(self.current.data())
        {
            *age = if state == 0 { 0 } else { age.saturating_add(1) };
        }
    }

    /// Cell state, or 0 outside the grid.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x < self.cols() && y < self.rows() {
            self.current.get(x as isize, y as isize)
        } else {
            0
        }
    }

    /// Sets a cell; out-of-range coordinates are ignored.
    pub fn set(&mut self, x: usize, y: usize, state: u8) {
        if x < self.cols() && y < self.rows() {
            self.current.set(x as isize, y as isize, state);
            let age = if state == 0 { 0 } else { 1 };
            self.ages.set(x as isize, y as isize, age);
        }
    }

    pub fn clear(&mut self) {
        self.current.fill(0);
        self.next.fill(0);
        self.ages.fill(0);
    }

    /// Replaces every cell from `f(x, y)`.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> u8) {
        let cols = self.cols();
        for (i, (cell, age)) in self
            .current
            .data_mut()
            .iter_mut()
            .zip(self.ages.data_mut())
            .enumerate()
        {
            *cell = f(i % cols, i / cols);
            *age = u16::from(*cell != 0);
        }
    }

    /// Number of cells matching `pred`.
    pub fn count(&self, pred: impl Fn(u8) -> bool) -> usize {
        self.current.data().iter().filter(|&&s| pred(s)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_share_shape() {
        let g = AutomatonGrid::new(7, 3);
        assert_eq!((g.cols(), g.rows()), (7, 3));
        assert_eq!(g.current().len(), 21);
    }

    #[test]
    fn swap_promotes_next_and_ages_cells() {
        let mut g = AutomatonGrid::new(3, 3);
        g.set(1, 1, 1);
        {
            let (cur, next) = g.buffers();
            next.data_mut().copy_from_slice(cur.data());
        }
        g.swap();
        assert_eq!(g.get(1, 1), 1);
        assert_eq!(g.ages().get(1, 1), 2);
        {
            let (_, next) = g.buffers();
            next.fill(0);
        }
        g.swap();
        assert_eq!(g.get(1, 1), 0);
        assert_eq!(g.ages().get(1, 1), 0);
    }

    #[test]
    fn out_of_range_access_is_ignored() {
        let mut g = AutomatonGrid::new(2, 2);
        g.set(5, 5, 1);
        assert_eq!(g.get(5, 5), 0);
        assert_eq!(g.count(|s| s != 0), 0);
    }

    #[test]
    fn fill_with_sets_every_cell() {
        let mut g = AutomatonGrid::new(4, 2);
        g.fill_with(|x, y| ((x + y) % 2) as u8);
        assert_eq!(g.count(|s| s == 1), 4);
        assert_eq!(g.ages().get(1, 0), 1);
        g.clear();
        assert_eq!(g.count(|s| s == 1), 0);
    }
}
