//! Flat and shaped result storage with stride-based indexing.
//!
//! `ResultGrid` is the durable output of a sweep: a flat table of float
//! rows addressed by flattened combination index. `ShapedGrid` is its
//! N-dimensional view, one axis per swept parameter plus a trailing
//! result-column axis, for axis-aligned analysis after the fact.

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::space::{ParameterSpace, RowMode};

/// Flat result table: one fixed-width row of floats per combination index.
///
/// Stored row-major. Rows are addressed only by the stable index assigned at
/// combination generation, never by completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultGrid {
    /// Row-major backing data, `rows * columns` long
    data: Vec<f64>,
    rows: usize,
    columns: usize,
}

impl ResultGrid {
    /// Create a zero-filled table
    #[must_use]
    pub fn zeroed(rows: usize, columns: usize) -> Self {
        Self {
            data: vec![0.0; rows * columns],
            rows,
            columns,
        }
    }

    /// Build a table over existing row-major data.
    /// Returns `None` if the data does not divide into `columns`-wide rows.
    pub fn from_flat(columns: usize, data: Vec<f64>) -> Option<Self> {
        if columns == 0 || data.len() % columns != 0 {
            return None;
        }
        let rows = data.len() / columns;
        Some(Self {
            data,
            rows,
            columns,
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Borrow one row
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.rows {
            return None;
        }
        Some(&self.data[index * self.columns..(index + 1) * self.columns])
    }

    /// Iterate rows in index order
    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.columns)
    }

    /// Overwrite one row. Returns false if the index or width is off.
    pub fn set_row(&mut self, index: usize, values: &[f64]) -> bool {
        if index >= self.rows || values.len() != self.columns {
            return false;
        }
        self.data[index * self.columns..(index + 1) * self.columns].copy_from_slice(values);
        true
    }

    /// Elementwise add into one row. Returns false if the index or width is off.
    pub fn add_row(&mut self, index: usize, values: &[f64]) -> bool {
        if index >= self.rows || values.len() != self.columns {
            return false;
        }
        let row = &mut self.data[index * self.columns..(index + 1) * self.columns];
        for (slot, value) in row.iter_mut().zip(values) {
            *slot += value;
        }
        true
    }

    /// Multiply one row by a factor. Returns false if the index is off.
    pub fn scale_row(&mut self, index: usize, factor: f64) -> bool {
        if index >= self.rows {
            return false;
        }
        for slot in &mut self.data[index * self.columns..(index + 1) * self.columns] {
            *slot *= factor;
        }
        true
    }

    /// Row-major backing data
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Reshape into one axis per parameter plus the trailing column axis.
    ///
    /// The space must be the same one the sweep ran with (names, order,
    /// cardinalities); in `PerTrial` mode the run axis reappears as the last
    /// parameter axis, in `Averaged` mode it was folded away. A row count
    /// that does not match the product of the cardinalities means the table
    /// and the space have drifted apart, which is fatal rather than silently
    /// misaligned data.
    pub fn reshape(
        &self,
        space: &ParameterSpace,
        runs: usize,
        mode: RowMode,
    ) -> Result<ShapedGrid, ShapeError> {
        let mut shape = space.cardinalities();
        if mode == RowMode::PerTrial {
            shape.push(runs);
        }
        let expected_rows: usize = shape.iter().product();
        shape.push(self.columns);
        if expected_rows != self.rows {
            return Err(ShapeError {
                expected_rows,
                found_rows: self.rows,
                shape,
            });
        }
        let strides = compute_strides(&shape);
        Ok(ShapedGrid {
            data: self.data.clone(),
            shape,
            strides,
        })
    }
}

/// N-dimensional grid with flat backing storage and stride-based indexing.
///
/// Row-major: the last axis (the result columns) varies fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedGrid {
    data: Vec<f64>,
    shape: Vec<usize>,
    /// Precomputed strides for index calculation
    strides: Vec<usize>,
}

impl ShapedGrid {
    /// Build a grid over existing row-major data.
    /// Returns `None` if the data length does not match the shape's product.
    pub fn from_flat(shape: Vec<usize>, data: Vec<f64>) -> Option<Self> {
        let total: usize = shape.iter().product();
        if data.len() != total {
            return None;
        }
        let strides = compute_strides(&shape);
        Some(Self {
            data,
            shape,
            strides,
        })
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes, result-column axis included
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Convert per-axis indices to a flat position
    #[must_use]
    pub fn flat_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (axis, (&idx, &size)) in indices.iter().zip(&self.shape).enumerate() {
            if idx >= size {
                return None;
            }
            flat += idx * self.strides[axis];
        }
        Some(flat)
    }

    /// Convert a flat position back to per-axis indices
    #[must_use]
    pub fn multi_index(&self, flat: usize) -> Option<Vec<usize>> {
        if flat >= self.data.len() {
            return None;
        }
        let mut indices = Vec::with_capacity(self.shape.len());
        let mut remaining = flat;
        for &stride in &self.strides {
            indices.push(remaining / stride);
            remaining %= stride;
        }
        Some(indices)
    }

    /// Value at the given indices
    #[must_use]
    pub fn get(&self, indices: &[usize]) -> Option<f64> {
        self.flat_index(indices).map(|i| self.data[i])
    }

    /// Iterate all index tuples in row-major order
    #[must_use]
    pub fn indices(&self) -> GridIndices {
        GridIndices {
            shape: self.shape.clone(),
            current: vec![0; self.shape.len()],
            done: self.data.is_empty(),
        }
    }

    /// Values along one axis with every other axis held fixed.
    ///
    /// `fixed` supplies an index for each axis; the entry at `axis` is
    /// ignored. Returns `None` if an index is missing or out of range.
    #[must_use]
    pub fn axis_slice(&self, axis: usize, fixed: &[Option<usize>]) -> Option<Vec<f64>> {
        if axis >= self.ndim() || fixed.len() != self.ndim() {
            return None;
        }
        for (i, f) in fixed.iter().enumerate() {
            if i != axis && f.is_none() {
                return None;
            }
        }

        let mut values = Vec::with_capacity(self.shape[axis]);
        for idx in 0..self.shape[axis] {
            let mut indices: Vec<usize> = fixed.iter().map(|f| f.unwrap_or(0)).collect();
            indices[axis] = idx;
            values.push(self.get(&indices)?);
        }
        Some(values)
    }

    /// Collapse back to the flat row layout (all axes but the last become rows)
    #[must_use]
    pub fn flatten(&self) -> Option<ResultGrid> {
        let columns = *self.shape.last()?;
        ResultGrid::from_flat(columns, self.data.clone())
    }
}

/// Compute strides for row-major order
fn compute_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return Vec::new();
    }
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len() - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Iterator over all index tuples of a grid
pub struct GridIndices {
    shape: Vec<usize>,
    current: Vec<usize>,
    done: bool,
}

impl Iterator for GridIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current.clone();

        // Row-major: last axis varies fastest
        let mut axis = self.shape.len();
        loop {
            if axis == 0 {
                self.done = true;
                break;
            }
            axis -= 1;
            self.current[axis] += 1;
            if self.current[axis] < self.shape[axis] {
                break;
            }
            self.current[axis] = 0;
        }

        Some(result)
    }
}
