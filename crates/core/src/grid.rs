//! Generic 2D grid with toroidal and clamped addressing.
//!
//! A `Grid<T>` stores `width * height` cells in row-major order. Signed
//! coordinates wrap (`get`/`set`) so neighbor lookups on a torus never need
//! bounds checks; `clamped_index` is the alternative for lookups that must
//! stick to the nearest edge instead.

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Creates a grid filled with `value`.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows.
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Like [`Grid::filled`] but infallible: zero dimensions are raised to 1.
    ///
    /// For callers whose dimensions come from already-sanitized canvas and
    /// cell sizes.
    pub fn sized(width: usize, height: usize, value: T) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wraps an existing row-major buffer; `data.len()` must equal `width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<T>) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let expected = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        if data.len() != expected {
            return Err(EngineError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Flat index with toroidal wrapping on both axes.
    pub fn wrapped_index(&self, x: isize, y: isize) -> usize {
        let xi = x.rem_euclid(self.width as isize) as usize;
        let yi = y.rem_euclid(self.height as isize) as usize;
        yi * self.width + xi
    }

    /// Flat index with coordinates clamped onto the nearest edge cell.
    pub fn clamped_index(&self, x: isize, y: isize) -> usize {
        let xi = x.clamp(0, self.width as isize - 1) as usize;
        let yi = y.clamp(0, self.height as isize - 1) as usize;
        yi * self.width + xi
    }

    /// Value at `(x, y)` with toroidal wrapping.
    pub fn get(&self, x: isize, y: isize) -> T {
        self.data[self.wrapped_index(x, y)]
    }

    /// Sets `(x, y)` with toroidal wrapping.
    pub fn set(&mut self, x: isize, y: isize, value: T) {
        let idx = self.wrapped_index(x, y);
        self.data[idx] = value;
    }

    /// Value at `(x, y)` clamped to the grid bounds.
    pub fn get_clamped(&self, x: isize, y: isize) -> T {
        self.data[self.clamped_index(x, y)]
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Iterates `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(|(i, &v)| (i % self.width, i / self.width, v))
    }

    /// One row as a slice.
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_creates_grid_of_value() {
        let g = Grid::filled(4, 3, 7u8).unwrap();
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 3);
        assert!(g.data().iter().all(|&v| v == 7));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Grid::filled(0, 3, 0u8),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(Grid::filled(3, 0, 0u8).is_err());
        assert!(Grid::filled(usize::MAX, 2, 0u8).is_err());
    }

    #[test]
    fn sized_raises_zero_dimensions() {
        let g = Grid::sized(0, 3, 1u8);
        assert_eq!((g.width(), g.height(), g.len()), (1, 3, 3));
    }

    #[test]
    fn from_data_checks_length() {
        assert!(Grid::from_data(2, 2, vec![0u8; 4]).is_ok());
        assert!(matches!(
            Grid::from_data(2, 2, vec![0u8; 5]),
            Err(EngineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn negative_coordinates_wrap() {
        let mut g = Grid::filled(5, 5, 0u8).unwrap();
        g.set(-1, -1, 9);
        assert_eq!(g.get(4, 4), 9);
        assert_eq!(g.get(-6, 9), 9);
    }

    #[test]
    fn clamped_lookup_sticks_to_edges() {
        let g = Grid::from_data(3, 2, vec![0u8, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(g.get_clamped(-10, 0), 0);
        assert_eq!(g.get_clamped(99, 0), 2);
        assert_eq!(g.get_clamped(1, 99), 4);
    }

    #[test]
    fn iter_yields_row_major_coordinates() {
        let g = Grid::from_data(2, 2, vec![1u8, 2, 3, 4]).unwrap();
        let cells: Vec<_> = g.iter().collect();
        assert_eq!(cells, vec![(0, 0, 1), (1, 0, 2), (0, 1, 3), (1, 1, 4)]);
    }

    #[test]
    fn row_returns_slice() {
        let g = Grid::from_data(2, 2, vec![1u8, 2, 3, 4]).unwrap();
        assert_eq!(g.row(1), &[3, 4]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wrapped_index_always_in_bounds(
                w in 1_usize..64,
                h in 1_usize..64,
                x in -1000_isize..1000,
                y in -1000_isize..1000,
            ) {
                let g = Grid::filled(w, h, 0u8).unwrap();
                prop_assert!(g.wrapped_index(x, y) < w * h);
                prop_assert!(g.clamped_index(x, y) < w * h);
            }
        }
    }
}
