//! Packed upper triangular storage.

use std::ops::{Index, IndexMut};

/// Upper triangular `edge_size x edge_size` matrix, only cells with `row <= col` are stored.
///
/// Cells are packed row by row in a single buffer, so row `r` starts after the
/// `edge_size - k` cells of every row `k < r`.
///
/// Indexing with `row > col` or with an index outside of the edge size panics.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle<T> {
    /// Amount of rows and columns.
    edge_size: usize,
    /// Packed cells.
    values: Vec<T>,
}

impl<T: Clone> Triangle<T> {
    /// Construct a triangle with every cell set to `value`.
    #[must_use]
    pub fn new(edge_size: usize, value: T) -> Self {
        let values = vec![value; Self::cell_count(edge_size)];

        Self { edge_size, values }
    }
}

impl<T> Triangle<T> {
    /// Amount of rows and columns.
    #[must_use]
    pub const fn edge_size(&self) -> usize {
        self.edge_size
    }

    /// Amount of stored cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there's no cell at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a cell, `None` when the index is in the lower triangle or out of range.
    #[must_use]
    pub fn try_get(&self, row: usize, col: usize) -> Option<&T> {
        self.offset(row, col)
            .and_then(|offset| self.values.get(offset))
    }

    /// Get a mutable cell, `None` when the index is in the lower triangle or out of range.
    #[must_use]
    pub fn try_get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.offset(row, col)
            .and_then(|offset| self.values.get_mut(offset))
    }

    /// Amount of cells for an edge size.
    const fn cell_count(edge_size: usize) -> usize {
        edge_size * (edge_size + 1) / 2
    }

    /// Position of a cell in the packed buffer.
    const fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row > col || col >= self.edge_size {
            return None;
        }

        Some(self.packed_offset(row, col))
    }

    /// Position of a cell in the packed buffer, panicking on invalid indices.
    #[track_caller]
    fn checked_offset(&self, row: usize, col: usize) -> usize {
        assert!(row <= col, "index ({row}, {col}) is in the lower triangle");
        assert!(
            col < self.edge_size,
            "index ({row}, {col}) is out of range for edge size {}",
            self.edge_size
        );

        self.packed_offset(row, col)
    }

    /// Closed form row major offset, expects `row <= col < edge_size`.
    const fn packed_offset(&self, row: usize, col: usize) -> usize {
        row * self.edge_size - row * row.saturating_sub(1) / 2 + (col - row)
    }
}

impl<T> Index<(usize, usize)> for Triangle<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.values[self.checked_offset(row, col)]
    }
}

impl<T> IndexMut<(usize, usize)> for Triangle<T> {
    #[track_caller]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        let offset = self.checked_offset(row, col);

        &mut self.values[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every valid cell should map to its own slot in the buffer.
    #[test]
    fn offsets_are_dense_and_unique() {
        let edge_size = 7;
        let mut triangle = Triangle::new(edge_size, None);
        assert_eq!(triangle.len(), 28);

        let mut counter = 0;
        for row in 0..edge_size {
            for col in row..edge_size {
                assert!(triangle[(row, col)].is_none(), "({row}, {col}) written twice");
                triangle[(row, col)] = Some(counter);
                counter += 1;
            }
        }

        // Row major packing, so the write order equals the buffer position
        let mut expected = 0;
        for row in 0..edge_size {
            for col in row..edge_size {
                assert_eq!(triangle.offset(row, col), Some(expected));
                expected += 1;
            }
        }
        assert!(triangle.values.iter().all(Option::is_some));
    }

    /// Checked access refuses the lower triangle and out of range indices.
    #[test]
    fn try_get_bounds() {
        let mut triangle = Triangle::new(3, 0.0);
        triangle[(1, 2)] = 4.0;

        assert_eq!(triangle.try_get(1, 2), Some(&4.0));
        assert_eq!(triangle.try_get(2, 2), Some(&0.0));
        assert_eq!(triangle.try_get(2, 1), None);
        assert_eq!(triangle.try_get(0, 3), None);
        assert_eq!(triangle.try_get_mut(3, 3), None);
        assert_eq!(triangle.edge_size(), 3);
    }

    /// An empty triangle has no cells.
    #[test]
    fn empty() {
        let triangle = Triangle::new(0, 0_u8);

        assert!(triangle.is_empty());
        assert_eq!(triangle.try_get(0, 0), None);
    }

    /// Reading the lower triangle is a bug.
    #[test]
    #[should_panic(expected = "lower triangle")]
    fn lower_triangle_panics() {
        let triangle = Triangle::new(4, 0.0);

        let _ = triangle[(2, 1)];
    }

    /// Writing outside of the edge size is a bug.
    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_panics() {
        let mut triangle = Triangle::new(4, 0.0);

        triangle[(0, 4)] = 1.0;
    }
}
