//! Coordinate-format sparse matrices and the encoder that builds them.
//!
//! A [`SparseMatrix`] stores only retained entries as `(row, col, value)`
//! triples, split into a `values` vector and a `2 × nnz` index matrix.
//! Every encoder entry point scans in row-major order, so two encodings of
//! the same content are identical element for element.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use num_traits::Zero;

use crate::error::SparseError;

/// Sparse matrix in coordinate (COO) format.
///
/// # Invariants
///
/// - `values.len() == indices.ncols() == nnz` and `indices.nrows() == 2`.
/// - `indices[[0, k]] < shape.0` and `indices[[1, k]] < shape.1`.
///
/// # Examples
///
/// ```
/// use bough_core::sparse::encode;
/// use ndarray::array;
///
/// let m = encode(array![[1.0, 1.0, 0.0], [0.0, 1.0, 1.0]].view());
/// assert_eq!(m.nnz(), 4);
/// assert_eq!(m.shape(), (2, 3));
/// assert_eq!(m.indices().row(0).to_vec(), vec![0, 0, 1, 1]);
/// assert_eq!(m.indices().row(1).to_vec(), vec![0, 1, 1, 2]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix<T> {
    values: Array1<T>,
    indices: Array2<usize>,
    shape: (usize, usize),
}

impl<T> SparseMatrix<T> {
    /// Build a matrix from raw parts, checking every invariant.
    pub fn from_parts(
        values: Array1<T>,
        indices: Array2<usize>,
        shape: (usize, usize),
    ) -> Result<Self, SparseError> {
        if indices.nrows() != 2 || indices.ncols() != values.len() {
            return Err(SparseError::LengthMismatch {
                values: values.len(),
                indices: indices.dim(),
            });
        }
        let bounds = [shape.0, shape.1];
        for (dim, row) in indices.outer_iter().enumerate() {
            if let Some(&index) = row.iter().find(|&&i| i >= bounds[dim]) {
                return Err(SparseError::IndexOutOfBounds {
                    dim,
                    index,
                    bound: bounds[dim],
                });
            }
        }
        Ok(Self {
            values,
            indices,
            shape,
        })
    }

    /// An empty matrix of the given shape.
    pub fn empty(shape: (usize, usize)) -> Self {
        Self {
            values: Array1::from_vec(Vec::new()),
            indices: Array2::zeros((2, 0)),
            shape,
        }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored values, in scan order.
    pub fn values(&self) -> ArrayView1<'_, T> {
        self.values.view()
    }

    /// The `2 × nnz` index matrix.
    pub fn indices(&self) -> ArrayView2<'_, usize> {
        self.indices.view()
    }

    /// Dense dimensions `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Iterate over `(row, col, &value)` triples in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(k, v)| (self.indices[[0, k]], self.indices[[1, k]], v))
    }

    /// Decode to a dense matrix, using `fill` for entries not stored.
    pub fn to_dense(&self, fill: T) -> Array2<T>
    where
        T: Clone,
    {
        let mut dense = Array2::from_elem(self.shape, fill);
        for (r, c, v) in self.iter() {
            dense[[r, c]] = v.clone();
        }
        dense
    }

    fn from_triplets(
        rows: Vec<usize>,
        cols: Vec<usize>,
        values: Vec<T>,
        shape: (usize, usize),
    ) -> Self {
        let nnz = values.len();
        let indices =
            Array2::from_shape_fn((2, nnz), |(d, k)| if d == 0 { rows[k] } else { cols[k] });
        Self {
            values: Array1::from_vec(values),
            indices,
            shape,
        }
    }
}

/// Encode the nonzero entries of a dense matrix.
pub fn encode<T>(dense: ArrayView2<'_, T>) -> SparseMatrix<T>
where
    T: Zero + Clone + PartialEq,
{
    encode_with(dense, |v| !v.is_zero())
}

/// Encode the entries of a dense matrix for which `keep` holds.
pub fn encode_with<T, F>(dense: ArrayView2<'_, T>, keep: F) -> SparseMatrix<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for ((r, c), v) in dense.indexed_iter() {
        if keep(v) {
            rows.push(r);
            cols.push(c);
            values.push(v.clone());
        }
    }
    SparseMatrix::from_triplets(rows, cols, values, dense.dim())
}

/// Encode a matrix given row by row as `(col, value)` pairs.
///
/// Pairs within a row may come in any order; repeated columns are summed
/// before `keep` is applied. The result is identical to [`encode_with`] on
/// the equivalent dense matrix. Rows beyond `n_rows` or columns beyond
/// `n_cols` are rejected.
pub fn encode_rows<T, I, R, F>(
    n_rows: usize,
    n_cols: usize,
    rows: I,
    keep: F,
) -> Result<SparseMatrix<T>, SparseError>
where
    T: Zero + Clone,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = (usize, T)>,
    F: Fn(&T) -> bool,
{
    let mut out_rows = Vec::new();
    let mut out_cols = Vec::new();
    let mut values = Vec::new();
    let mut scratch: Vec<(usize, T)> = Vec::new();

    for (r, row) in rows.into_iter().enumerate() {
        if r >= n_rows {
            return Err(SparseError::IndexOutOfBounds {
                dim: 0,
                index: r,
                bound: n_rows,
            });
        }
        scratch.clear();
        scratch.extend(row);
        if let Some(&(index, _)) = scratch.iter().find(|(c, _)| *c >= n_cols) {
            return Err(SparseError::IndexOutOfBounds {
                dim: 1,
                index,
                bound: n_cols,
            });
        }
        // Stable, so equal columns keep their relative order for summation.
        scratch.sort_by_key(|&(c, _)| c);

        let mut i = 0;
        while i < scratch.len() {
            let col = scratch[i].0;
            let mut acc = T::zero();
            while i < scratch.len() && scratch[i].0 == col {
                acc = acc + scratch[i].1.clone();
                i += 1;
            }
            if keep(&acc) {
                out_rows.push(r);
                out_cols.push(col);
                values.push(acc);
            }
        }
    }

    Ok(SparseMatrix::from_triplets(
        out_rows,
        out_cols,
        values,
        (n_rows, n_cols),
    ))
}
