// src/batch.rs
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::BatchOptions;
use crate::error::{EditDistanceError, Result};
use crate::levenshtein::edit_distance;
use crate::pool::Executor;

/// A batch of token sequences padded to a common width.
///
/// `data` is row-major with shape `(lengths.len(), max_len)`; only the first
/// `lengths[i]` tokens of row `i` are ever read.
#[derive(Debug, Clone, Copy)]
pub struct PaddedBatch<'a, T> {
    data: &'a [T],
    max_len: usize,
    lengths: &'a [usize],
}

impl<'a, T> PaddedBatch<'a, T> {
    /// Fails with [`EditDistanceError::Shape`] when `data` is not `lengths.len() * max_len`
    /// tokens or a declared length exceeds `max_len`. Oversized lengths are rejected, not clamped.
    pub fn new(data: &'a [T], max_len: usize, lengths: &'a [usize]) -> Result<Self> {
        let expected = lengths.len().checked_mul(max_len).ok_or_else(|| {
            EditDistanceError::Shape(format!("{} rows of width {} overflow", lengths.len(), max_len))
        })?;
        if data.len() != expected {
            return Err(EditDistanceError::Shape(format!(
                "buffer holds {} tokens, expected {} rows x {} = {}",
                data.len(), lengths.len(), max_len, expected
            )));
        }
        if let Some((row, &len)) = lengths.iter().enumerate().find(|&(_, &len)| len > max_len) {
            return Err(EditDistanceError::Shape(format!(
                "row {} declares length {} beyond padded width {}",
                row, len, max_len
            )));
        }
        Ok(PaddedBatch { data, max_len, lengths })
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Row `i` truncated to its declared length.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn row(&self, i: usize) -> &'a [T] {
        let start = i * self.max_len;
        &self.data[start..start + self.lengths[i]]
    }
}

/// Row-major `nx x ny` matrix of normalized distances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    nx: usize,
    ny: usize,
    values: Vec<f32>,
}

impl DistanceMatrix {
    pub fn zeros(nx: usize, ny: usize) -> Self {
        DistanceMatrix { nx, ny, values: vec![0.0; nx * ny] }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.nx && j < self.ny { Some(self.values[i * self.ny + j]) } else { None }
    }

    /// # Panics
    ///
    /// Panics if `i` is not below the row count.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.ny..(i + 1) * self.ny]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    pub fn transpose(&self) -> DistanceMatrix {
        let mut values = Vec::with_capacity(self.values.len());
        for j in 0..self.ny {
            for i in 0..self.nx {
                values.push(self.values[i * self.ny + j]);
            }
        }
        DistanceMatrix { nx: self.ny, ny: self.nx, values }
    }

    pub fn is_symmetric(&self) -> bool {
        self.nx == self.ny && *self == self.transpose()
    }
}

/// All-pairs normalized edit distance on the global rayon pool.
pub fn batch_edit_distance<T>(
    x: &PaddedBatch<'_, T>,
    y: &PaddedBatch<'_, T>,
    symmetric: bool,
) -> Result<DistanceMatrix>
where
    T: PartialEq + Copy + Send + Sync,
{
    batch_edit_distance_with(x, y, &BatchOptions::symmetric(symmetric))
}

/// All-pairs normalized edit distance: cell `(i, j)` is
/// [`edit_distance`] between `x.row(i)` and `y.row(j)`.
///
/// Output rows are split into contiguous ranges across workers, and a worker only
/// writes the rows it owns. In symmetric mode row `i` fills `j > i` only; the lower
/// triangle is mirrored after every worker has joined, and the diagonal stays 0.
/// The first invalid pair fails the whole call.
pub fn batch_edit_distance_with<T>(
    x: &PaddedBatch<'_, T>,
    y: &PaddedBatch<'_, T>,
    options: &BatchOptions,
) -> Result<DistanceMatrix>
where
    T: PartialEq + Copy + Send + Sync,
{
    let (nx, ny) = (x.len(), y.len());
    let symmetric = options.symmetric;
    if symmetric && nx != ny {
        return Err(EditDistanceError::Shape(format!(
            "symmetric batch needs matching row counts, got {} and {}",
            nx, ny
        )));
    }

    let mut out = DistanceMatrix::zeros(nx, ny);
    if out.is_empty() {
        return Ok(out);
    }
    debug!("Batch edit distance: {} x {} cells, symmetric={}, num_threads={}", nx, ny, symmetric, options.num_threads);

    let fill_row = |(i, row): (usize, &mut [f32])| -> Result<()> {
        let a = x.row(i);
        let start_j = if symmetric { i + 1 } else { 0 };
        for (j, cell) in row.iter_mut().enumerate().skip(start_j) {
            *cell = edit_distance(a, y.row(j))?;
        }
        Ok(())
    };

    let executor = Executor::for_threads(options.num_threads)?;
    if executor.is_serial() {
        out.values.chunks_mut(ny).enumerate().try_for_each(&fill_row)?;
    } else {
        let values = &mut out.values;
        executor.install(|| values.par_chunks_mut(ny).enumerate().try_for_each(&fill_row))?;
    }

    if symmetric {
        mirror_upper_triangle(&mut out.values, nx);
    }
    Ok(out)
}

fn mirror_upper_triangle(values: &mut [f32], n: usize) {
    for i in 0..n {
        for j in (i + 1)..n {
            values[j * n + i] = values[i * n + j];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch<'a>(data: &'a [i64], max_len: usize, lengths: &'a [usize]) -> PaddedBatch<'a, i64> {
        PaddedBatch::new(data, max_len, lengths).unwrap()
    }

    #[test]
    fn rows_are_truncated_to_declared_length() {
        let data = [1, 2, 9, 9, 3, 3, 3, 9];
        let x = batch(&data, 4, &[2, 3]);
        assert_eq!(x.max_len(), 4);
        assert_eq!(x.row(0), &[1, 2]);
        assert_eq!(x.row(1), &[3, 3, 3]);
    }

    #[test]
    #[should_panic]
    fn batch_row_out_of_range_panics() {
        let data = [1i64, 2];
        batch(&data, 1, &[1, 1]).row(2);
    }

    #[test]
    #[should_panic]
    fn matrix_row_out_of_range_panics() {
        let out = DistanceMatrix::zeros(2, 3);
        assert_eq!(out.get(2, 0), None);
        out.row(2);
    }

    #[test]
    fn rejects_inconsistent_shapes() {
        let data = [1i64, 2, 3, 4];
        assert!(matches!(PaddedBatch::new(&data, 3, &[1]), Err(EditDistanceError::Shape(_))));
        assert!(matches!(PaddedBatch::new(&data, 2, &[1, 3]), Err(EditDistanceError::Shape(_))));
    }

    #[test]
    fn oversized_length_is_not_clamped() {
        let data = [1i64, 2, 3, 4];
        assert!(matches!(PaddedBatch::new(&data, 2, &[3, 2]), Err(EditDistanceError::Shape(_))));
    }

    #[test]
    fn empty_batches_give_empty_matrix() {
        let data = [1i64, 2];
        let x = batch(&data, 2, &[2]);
        let none: PaddedBatch<'_, i64> = batch(&[], 2, &[]);
        let out = batch_edit_distance(&x, &none, false).unwrap();
        assert_eq!(out.shape(), (1, 0));
        assert!(out.is_empty());
        let out = batch_edit_distance(&none, &none, true).unwrap();
        assert_eq!(out.shape(), (0, 0));
    }

    #[test]
    fn rectangular_batch_matches_pairwise_calls() {
        let xd = [1, 2, 3, 0, 1, 1, 2, 0];
        let yd = [3, 2, 1, 1, 0, 5, 0, 0, 0, 0, 1, 2, 2, 3, 3];
        let x = batch(&xd, 4, &[3, 3]);
        let y = batch(&yd, 5, &[4, 1, 5]);
        let out = batch_edit_distance(&x, &y, false).unwrap();
        assert_eq!(out.shape(), (2, 3));
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(out.get(i, j).unwrap(), edit_distance(x.row(i), y.row(j)).unwrap());
            }
        }
    }

    #[test]
    fn symmetric_fills_both_triangles_with_zero_diagonal() {
        let data = [1, 2, 3, 3, 2, 1, 1, 1, 2, 4, 4, 4];
        let x = batch(&data, 3, &[3, 3, 3, 1]);
        let out = batch_edit_distance(&x, &x, true).unwrap();
        assert!(out.is_symmetric());
        for i in 0..4 {
            assert_eq!(out.get(i, i), Some(0.0));
        }
        assert_eq!(out.get(0, 1), Some(2.0 / 3.0));
        assert_eq!(out.get(1, 0), Some(2.0 / 3.0));
        assert_eq!(out, batch_edit_distance(&x, &x, false).unwrap());
    }

    #[test]
    fn symmetric_diagonal_skips_empty_rows() {
        let data = [0i64];
        let x = batch(&data, 1, &[0]);
        let out = batch_edit_distance(&x, &x, true).unwrap();
        assert_eq!(out.as_slice(), &[0.0]);
        assert!(batch_edit_distance(&x, &x, false).is_err());
    }

    #[test]
    fn off_diagonal_empty_row_fails_whole_call() {
        let data = [1i64, 2, 0, 0];
        let x = batch(&data, 2, &[2, 0]);
        let err = batch_edit_distance(&x, &x, true).unwrap_err();
        assert!(matches!(err, EditDistanceError::InvalidArgument(_)));
    }

    #[test]
    fn symmetric_requires_square_batches() {
        let data = [1i64, 2];
        let x = batch(&data, 1, &[1, 1]);
        let y = batch(&data[..1], 1, &[1]);
        assert!(matches!(batch_edit_distance(&x, &y, true), Err(EditDistanceError::Shape(_))));
    }

    #[test]
    fn thread_count_does_not_change_result() {
        let data: Vec<i64> = (0..60).map(|k| (k * 7 % 5) as i64).collect();
        let lengths = [6, 5, 4, 6, 3, 2, 6, 1, 5, 6];
        let x = batch(&data, 6, &lengths);
        let serial = batch_edit_distance_with(&x, &x, &BatchOptions::symmetric(true).with_num_threads(1)).unwrap();
        let pooled = batch_edit_distance_with(&x, &x, &BatchOptions::symmetric(true).with_num_threads(3)).unwrap();
        let global = batch_edit_distance(&x, &x, true).unwrap();
        assert_eq!(serial, pooled);
        assert_eq!(serial, global);
    }

    #[test]
    fn transpose_swaps_shape() {
        let data = [1i64, 2, 3];
        let x = batch(&data, 1, &[1, 1, 1]);
        let y = batch(&data[..2], 1, &[1, 1]);
        let out = batch_edit_distance(&x, &y, false).unwrap();
        let t = out.transpose();
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.get(1, 0), out.get(0, 1));
        assert_eq!(t.row(0), &[0.0, 1.0, 1.0]);
    }
}
