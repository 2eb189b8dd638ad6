//! Dense index structures for item/period data.
//!
//! [`Grid`] stores one value per `(item, period)` pair. [`Triangle`] stores one
//! value per `(item, period, target)` triple with `target >= period`, which is
//! the shape of the production-allocation variables: production in period `t`
//! can only serve demand of the same or a later period.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Row-major `items x periods` matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    items: usize,
    periods: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid filled with `value`.
    #[must_use]
    pub fn filled(items: usize, periods: usize, value: T) -> Self {
        Self {
            items,
            periods,
            data: vec![value; items * periods],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f(item, period)` for every cell.
    pub fn from_fn(items: usize, periods: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(items * periods);
        for j in 0..items {
            for t in 0..periods {
                data.push(f(j, t));
            }
        }
        Self {
            items,
            periods,
            data,
        }
    }

    /// Fallible [`Grid::from_fn`]; stops at the first error.
    pub fn try_from_fn<E>(
        items: usize,
        periods: usize,
        mut f: impl FnMut(usize, usize) -> Result<T, E>,
    ) -> Result<Self, E> {
        let mut data = Vec::with_capacity(items * periods);
        for j in 0..items {
            for t in 0..periods {
                data.push(f(j, t)?);
            }
        }
        Ok(Self {
            items,
            periods,
            data,
        })
    }

    /// Build a grid from nested rows, one row per item.
    ///
    /// Returns `None` when the rows are ragged.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let items = rows.len();
        let periods = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != periods) {
            return None;
        }
        Some(Self {
            items,
            periods,
            data: rows.into_iter().flatten().collect(),
        })
    }

    #[must_use]
    pub const fn items(&self) -> usize {
        self.items
    }

    #[must_use]
    pub const fn periods(&self) -> usize {
        self.periods
    }

    /// Values of a single item across all periods.
    #[must_use]
    pub fn row(&self, item: usize) -> &[T] {
        &self.data[item * self.periods..(item + 1) * self.periods]
    }

    /// Iterate over `((item, period), value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let periods = self.periods;
        self.data
            .iter()
            .enumerate()
            .map(move |(k, v)| ((k / periods, k % periods), v))
    }

    /// Map every cell into a new grid with the same shape.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            items: self.items,
            periods: self.periods,
            data: self.data.iter().map(&mut f).collect(),
        }
    }

    /// Flat row-major view of the values.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Nested rows, one per item.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>>
    where
        T: Clone,
    {
        (0..self.items).map(|j| self.row(j).to_vec()).collect()
    }
}

impl Grid<f64> {
    /// Inner product with another grid of the same shape.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        debug_assert_eq!(self.data.len(), other.data.len());
        self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (item, period): (usize, usize)) -> &T {
        debug_assert!(item < self.items && period < self.periods);
        &self.data[item * self.periods + period]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (item, period): (usize, usize)) -> &mut T {
        debug_assert!(item < self.items && period < self.periods);
        &mut self.data[item * self.periods + period]
    }
}

/// Half-triangular `items x periods x periods` storage, defined only for
/// `target >= period`.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle<T> {
    items: usize,
    periods: usize,
    data: Vec<T>,
}

impl<T> Triangle<T> {
    /// Number of `(period, target)` pairs per item.
    #[must_use]
    pub const fn block_len(periods: usize) -> usize {
        periods * (periods + 1) / 2
    }

    /// Build by evaluating `f(item, period, target)` for every valid triple.
    pub fn from_fn(
        items: usize,
        periods: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Self {
        let mut data = Vec::with_capacity(items * Self::block_len(periods));
        for j in 0..items {
            for t in 0..periods {
                for r in t..periods {
                    data.push(f(j, t, r));
                }
            }
        }
        Self {
            items,
            periods,
            data,
        }
    }

    /// Fallible [`Triangle::from_fn`]; stops at the first error.
    pub fn try_from_fn<E>(
        items: usize,
        periods: usize,
        mut f: impl FnMut(usize, usize, usize) -> Result<T, E>,
    ) -> Result<Self, E> {
        let mut data = Vec::with_capacity(items * Self::block_len(periods));
        for j in 0..items {
            for t in 0..periods {
                for r in t..periods {
                    data.push(f(j, t, r)?);
                }
            }
        }
        Ok(Self {
            items,
            periods,
            data,
        })
    }

    #[must_use]
    pub const fn items(&self) -> usize {
        self.items
    }

    #[must_use]
    pub const fn periods(&self) -> usize {
        self.periods
    }

    /// Map every slot into a new triangle with the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Triangle<U> {
        Triangle {
            items: self.items,
            periods: self.periods,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Flat position of `(item, period, target)`, or `None` when the triple is
    /// outside the triangle.
    #[must_use]
    pub fn offset(&self, item: usize, period: usize, target: usize) -> Option<usize> {
        if item >= self.items || period >= self.periods || target >= self.periods {
            return None;
        }
        if target < period {
            return None;
        }
        // Rows 0..period hold (periods - s) entries each.
        let before = period * self.periods - period * period.saturating_sub(1) / 2;
        Some(item * Self::block_len(self.periods) + before + (target - period))
    }

    #[must_use]
    pub fn get(&self, item: usize, period: usize, target: usize) -> Option<&T> {
        self.offset(item, period, target).map(|k| &self.data[k])
    }

    /// Iterate over `((item, period, target), value)` with `target >= period`.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize, usize), &T)> {
        let periods = self.periods;
        (0..self.items)
            .flat_map(move |j| (0..periods).flat_map(move |t| (t..periods).map(move |r| (j, t, r))))
            .zip(self.data.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Index<(usize, usize, usize)> for Triangle<T> {
    type Output = T;

    fn index(&self, (item, period, target): (usize, usize, usize)) -> &T {
        match self.offset(item, period, target) {
            Some(k) => &self.data[k],
            None => panic!("no production slot for ({item}, {period}, {target})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_indexes_row_major() {
        let grid = Grid::from_fn(2, 3, |j, t| j * 10 + t);
        assert_eq!(grid[(1, 2)], 12);
        assert_eq!(grid.row(0), &[0, 1, 2]);
        assert_eq!(grid.as_slice().len(), 6);
    }

    #[test]
    fn grid_from_rows_rejects_ragged_input() {
        assert!(Grid::from_rows(vec![vec![1, 2], vec![3]]).is_none());
        let grid = Grid::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(grid[(1, 0)], 3);
    }

    #[test]
    fn triangle_offsets_are_dense_and_unique() {
        let tri = Triangle::from_fn(2, 4, |j, t, r| (j, t, r));
        assert_eq!(tri.len(), 2 * 10);
        for (k, ((j, t, r), value)) in tri.iter().enumerate() {
            assert!(r >= t);
            assert_eq!(tri.offset(j, t, r), Some(k));
            assert_eq!(*value, (j, t, r));
        }
    }

    #[test]
    fn triangle_has_no_slot_before_the_production_period() {
        let tri = Triangle::from_fn(1, 3, |_, _, _| 0.0);
        assert_eq!(tri.offset(0, 2, 1), None);
        assert_eq!(tri.offset(0, 1, 0), None);
        assert!(tri.get(0, 0, 0).is_some());
        assert!(tri.get(0, 3, 3).is_none());
    }

    #[test]
    #[should_panic(expected = "no production slot")]
    fn triangle_index_panics_below_diagonal() {
        let tri = Triangle::from_fn(1, 3, |_, _, _| 0.0);
        let _ = tri[(0, 2, 0)];
    }
}
