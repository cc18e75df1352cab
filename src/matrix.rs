//! Sparse rating matrices backed by `sprs`.
//!
//! Matrices are assembled from `(row, col, value)` triples by `MatrixBuilder`
//! and stored as CSR `CsMat`. Every finished row lists its columns in strictly
//! increasing order, so two matrices built from the same logical triples
//! compare equal regardless of the order the triples were pushed in.

use std::fmt;
use std::ops::Add;

use sprs::{CsMat, TriMat};

use crate::config::DuplicatePolicy;
use crate::errors::SplitterError;

/// Value types storable in a `SparseMatrix`.
pub trait SparseValue: Copy + Default + PartialEq + Add<Output = Self> + fmt::Debug {}

impl<T> SparseValue for T where T: Copy + Default + PartialEq + Add<Output = T> + fmt::Debug {}

/// Accumulates triples and compresses them into a `SparseMatrix`.
#[derive(Clone, Debug)]
pub struct MatrixBuilder<T = f64> {
    num_rows: usize,
    num_cols: usize,
    policy: DuplicatePolicy,
    entries: Vec<(usize, usize, T)>,
}

impl<T: SparseValue> MatrixBuilder<T> {
    /// Create a builder for a `num_rows x num_cols` matrix.
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            policy: DuplicatePolicy::default(),
            entries: Vec::new(),
        }
    }

    /// Choose how repeated `(row, col)` pairs are resolved.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reserve room for `additional` triples.
    pub fn with_capacity(mut self, additional: usize) -> Self {
        self.entries.reserve(additional);
        self
    }

    /// Append one triple.
    pub fn push(&mut self, row: usize, col: usize, value: T) -> Result<(), SplitterError> {
        if row >= self.num_rows || col >= self.num_cols {
            return Err(SplitterError::MatrixBounds {
                row,
                col,
                rows: self.num_rows,
                cols: self.num_cols,
            });
        }
        self.entries.push((row, col, value));
        Ok(())
    }

    /// Number of triples pushed so far (duplicates included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compress the pushed triples into CSR form.
    pub fn build(self) -> SparseMatrix<T> {
        let Self {
            num_rows,
            num_cols,
            policy,
            mut entries,
        } = self;

        // `TriMat::to_csr` sums repeated cells, so overwrite needs its own pass.
        if policy == DuplicatePolicy::OverwriteLast {
            // Stable: among equal cells, later pushes stay later.
            entries.sort_by_key(|&(row, col, _)| (row, col));
            entries.dedup_by(|later, kept| {
                if (later.0, later.1) == (kept.0, kept.1) {
                    kept.2 = later.2;
                    true
                } else {
                    false
                }
            });
        }

        let mut triplets = TriMat::with_capacity((num_rows, num_cols), entries.len());
        for (row, col, value) in entries {
            triplets.add_triplet(row, col, value);
        }
        SparseMatrix {
            inner: triplets.to_csr(),
        }
    }
}

/// Row-compressed sparse matrix; rows are users, columns are items.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix<T = f64> {
    inner: CsMat<T>,
}

impl<T: SparseValue> SparseMatrix<T> {
    /// Matrix of the given shape with no stored entries.
    pub fn empty(num_rows: usize, num_cols: usize) -> Self {
        MatrixBuilder::new(num_rows, num_cols).build()
    }

    /// Build a matrix from `(row, col, value)` triples.
    pub fn from_triplets<I>(
        num_rows: usize,
        num_cols: usize,
        triplets: I,
        policy: DuplicatePolicy,
    ) -> Result<Self, SplitterError>
    where
        I: IntoIterator<Item = (usize, usize, T)>,
    {
        let mut builder = MatrixBuilder::new(num_rows, num_cols).with_duplicate_policy(policy);
        for (row, col, value) in triplets {
            builder.push(row, col, value)?;
        }
        Ok(builder.build())
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.inner.rows()
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.inner.cols()
    }

    /// Number of stored entries.
    pub fn size(&self) -> usize {
        self.inner.nnz()
    }

    /// Fraction of cells holding a stored entry.
    pub fn density(&self) -> f64 {
        let cells = self.num_rows() * self.num_cols();
        if cells == 0 {
            0.0
        } else {
            self.size() as f64 / cells as f64
        }
    }

    /// Number of stored entries in `row` (0 for rows outside the matrix).
    pub fn row_size(&self, row: usize) -> usize {
        self.inner
            .outer_view(row)
            .map(|view| view.nnz())
            .unwrap_or(0)
    }

    /// Ordered view over the stored entries of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.num_rows()`.
    pub fn row(&self, row: usize) -> SparseRow<'_, T> {
        assert!(
            row < self.num_rows(),
            "row {row} out of range for a matrix with {} rows",
            self.num_rows()
        );
        let range = self.inner.indptr().outer_inds_sz(row);
        SparseRow {
            indices: &self.inner.indices()[range.clone()],
            values: &self.inner.data()[range],
        }
    }

    /// Stored value at `(row, col)`, or `T::default()` when absent.
    pub fn get(&self, row: usize, col: usize) -> T {
        if row >= self.num_rows() || col >= self.num_cols() {
            return T::default();
        }
        self.inner.get(row, col).copied().unwrap_or_default()
    }

    /// Whether `(row, col)` holds a stored entry.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.num_rows() && col < self.num_cols() && self.inner.get(row, col).is_some()
    }

    /// Stored entries as `(row, col, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.inner
            .iter()
            .map(|(value, (row, col))| (row, col, *value))
    }

    /// Column-major copy: rows become items, columns become users.
    pub fn transpose(&self) -> SparseMatrix<T> {
        SparseMatrix {
            inner: self.inner.transpose_view().to_csr(),
        }
    }

    /// Underlying CSR matrix, for linear algebra on a fold.
    pub fn as_csmat(&self) -> &CsMat<T> {
        &self.inner
    }

    /// Consume into the underlying CSR matrix.
    pub fn into_csmat(self) -> CsMat<T> {
        self.inner
    }
}

/// Borrowed, column-ordered view of one matrix row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparseRow<'a, T = f64> {
    indices: &'a [usize],
    values: &'a [T],
}

impl<'a, T: SparseValue> SparseRow<'a, T> {
    /// Column indices, strictly increasing.
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    /// Values aligned with `indices`.
    pub fn values(&self) -> &'a [T] {
        self.values
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the row stores nothing.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Value stored at `col`.
    pub fn get(&self, col: usize) -> Option<T> {
        self.indices
            .binary_search(&col)
            .ok()
            .map(|pos| self.values[pos])
    }

    /// `(col, value)` pairs in column order.
    pub fn iter(self) -> impl Iterator<Item = (usize, T)> + 'a {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}
