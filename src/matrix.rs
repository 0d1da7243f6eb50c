//! A dense, row-major matrix of `f32`.
//!
//! All binary operations require identically shaped operands and panic
//! otherwise.

use crate::utils::ZeroOut;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::StandardNormal;
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mat {
    rows: usize,
    cols: usize,
    data: Vec<f32>, // row-major array
}

impl Mat {
    /// A `0 x 0` placeholder matrix.
    pub fn empty() -> Self {
        Mat::default()
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Mat {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn ones(rows: usize, cols: usize) -> Self {
        Mat {
            rows,
            cols,
            data: vec![1.0; rows * cols],
        }
    }

    /// Builds a matrix from a list of equally sized rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have different lengths.
    pub fn from_rows<R>(rows: &[R]) -> Self
    where
        R: AsRef<[f32]>,
    {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            assert_eq!(row.len(), cols, "ragged rows");
            data.extend_from_slice(row);
        }
        Mat {
            rows: rows.len(),
            cols,
            data,
        }
    }

    /// Samples every element from `distribution`.
    pub fn random<D, R>(distribution: D, rows: usize, cols: usize, rng: &mut R) -> Self
    where
        D: Distribution<f32>,
        R: Rng + ?Sized,
    {
        Mat {
            rows,
            cols,
            data: distribution.sample_iter(rng).take(rows * cols).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        let i = self.index(row, col);
        self.data[i] = value;
    }

    pub fn row(&self, row: usize) -> &[f32] {
        assert!(row < self.rows, "row {} out of bounds", row);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        assert!(row < self.rows, "row {} out of bounds", row);
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.data.split_at_mut(hi * self.cols);
        head[lo * self.cols..(lo + 1) * self.cols].swap_with_slice(&mut tail[..self.cols]);
    }

    /// Fills the matrix with ones.
    pub fn fill_ones(&mut self) {
        for v in &mut self.data {
            *v = 1.0;
        }
    }

    /// Fills the matrix with values drawn uniformly from `[-1, 1]`.
    pub fn randomize_uniform<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let range = Uniform::new_inclusive(-1.0f32, 1.0);
        for v in &mut self.data {
            *v = range.sample(rng);
        }
    }

    /// Fills the matrix with standard-normal samples.
    pub fn randomize_normal<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for v in &mut self.data {
            *v = StandardNormal.sample(rng);
        }
    }

    /// Applies `f` to every element in place.
    pub fn map_inplace<F>(&mut self, mut f: F)
    where
        F: FnMut(f32) -> f32,
    {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// Computes `self * other`.
    pub fn matmul(&self, other: &Mat) -> Mat {
        assert_eq!(self.cols, other.rows, "inner dimensions differ");
        let mut out = Mat::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                let dst = out.row_mut(i);
                for (d, &b) in dst.iter_mut().zip(other.row(k)) {
                    *d += a * b;
                }
            }
        }
        out
    }

    /// Computes `vec^T * self`, i.e. `out[j] = sum_i self[i][j] * vec[i]`.
    ///
    /// The matrix is treated as already transposed: `vec` must have one entry
    /// per row and the result has one entry per column.
    pub fn vec_mul(&self, vec: &[f32]) -> Vec<f32> {
        assert_eq!(vec.len(), self.rows, "vector length must match rows");
        let mut out = vec![0.0; self.cols];
        for (i, &x) in vec.iter().enumerate() {
            for (o, &w) in out.iter_mut().zip(self.row(i)) {
                *o += w * x;
            }
        }
        out
    }

    /// Computes `self * vec`, i.e. `out[i] = sum_j self[i][j] * vec[j]`.
    pub fn mul_vec(&self, vec: &[f32]) -> Vec<f32> {
        assert_eq!(vec.len(), self.cols, "vector length must match columns");
        (0..self.rows)
            .map(|i| self.row(i).iter().zip(vec).map(|(w, x)| w * x).sum::<f32>())
            .collect()
    }

    /// Rank-one update `self += alpha * x * y^T`.
    pub fn ger(&mut self, alpha: f32, x: &[f32], y: &[f32]) {
        assert_eq!(x.len(), self.rows);
        assert_eq!(y.len(), self.cols);
        for (i, &xi) in x.iter().enumerate() {
            let scaled = alpha * xi;
            for (w, &yj) in self.row_mut(i).iter_mut().zip(y) {
                *w += scaled * yj;
            }
        }
    }

    pub fn transpose(&self) -> Mat {
        let mut out = Mat::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(j, i, self.get(i, j));
            }
        }
        out
    }

    /// Elementwise (Hadamard) product.
    pub fn hadamard(&self, other: &Mat) -> Mat {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn scale(&self, scalar: f32) -> Mat {
        let mut out = self.clone();
        out.map_inplace(|v| v * scalar);
        out
    }

    fn zip_with<F>(&self, other: &Mat, f: F) -> Mat
    where
        F: Fn(f32, f32) -> f32,
    {
        self.assert_same_shape(other);
        Mat {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    fn assert_same_shape(&self, other: &Mat) {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "matrix shapes differ"
        );
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        row * self.cols + col
    }
}

impl<'a> Add for &'a Mat {
    type Output = Mat;

    fn add(self, other: &Mat) -> Mat {
        self.zip_with(other, |a, b| a + b)
    }
}

impl<'a> Sub for &'a Mat {
    type Output = Mat;

    fn sub(self, other: &Mat) -> Mat {
        self.zip_with(other, |a, b| a - b)
    }
}

impl<'a> Mul for &'a Mat {
    type Output = Mat;

    fn mul(self, other: &Mat) -> Mat {
        self.matmul(other)
    }
}

impl<'a> AddAssign<&'a Mat> for Mat {
    fn add_assign(&mut self, other: &Mat) {
        self.assert_same_shape(other);
        for (l, r) in self.data.iter_mut().zip(other.data.iter()) {
            *l += *r;
        }
    }
}

impl ZeroOut for Mat {
    fn zero_out(&mut self) {
        self.data.zero_out();
    }
}
