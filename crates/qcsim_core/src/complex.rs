//! Complex buffers for QCSim
//!
//! Gantree: L0_Foundation → ComplexAlgebra
//!
//! State vectors and unitaries are stored split: one array of real parts
//! and one of imaginary parts, always of identical shape. Matrices are
//! row-major. Scalars crossing the API are [`Complex64`].

use crate::error::{QcsError, QcsResult};
use crate::types::qubits_for_dimension;
use num_complex::Complex64;
use std::fmt;

/// `(a+bi)(c+di) = (ac-bd) + (ad+bc)i` on split parts
#[inline(always)]
pub fn complex_mul(a_re: f64, a_im: f64, b_re: f64, b_im: f64) -> (f64, f64) {
    (a_re * b_re - a_im * b_im, a_re * b_im + a_im * b_re)
}

fn check_len(expected: usize, actual: usize) -> QcsResult<()> {
    if expected != actual {
        return Err(QcsError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

// ============================================================================
// ComplexVector
// ============================================================================

/// Complex vector with split real/imaginary storage
/// Gantree: ComplexVector // 상태 벡터
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexVector {
    re: Vec<f64>,
    im: Vec<f64>,
}

impl ComplexVector {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// All-zero vector of length `len`
    pub fn zeros(len: usize) -> Self {
        Self {
            re: vec![0.0; len],
            im: vec![0.0; len],
        }
    }

    /// Computational basis state `index` of an n-qubit register
    /// Gantree: basis(n, i) -> Result<Self> // 기저 상태
    pub fn basis(num_qubits: usize, index: usize) -> QcsResult<Self> {
        crate::types::check_basis_index(index, num_qubits)?;
        let mut v = Self::zeros(crate::types::dimension(num_qubits));
        v.re[index] = 1.0;
        Ok(v)
    }

    /// Build from separate real and imaginary parts
    pub fn from_parts(re: Vec<f64>, im: Vec<f64>) -> QcsResult<Self> {
        check_len(re.len(), im.len())?;
        Ok(Self { re, im })
    }

    /// Build from complex scalars
    pub fn from_complex(values: &[Complex64]) -> Self {
        Self {
            re: values.iter().map(|c| c.re).collect(),
            im: values.iter().map(|c| c.im).collect(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of amplitudes
    pub fn len(&self) -> usize {
        self.re.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    /// Register size if the length is a power of two
    pub fn num_qubits(&self) -> Option<usize> {
        qubits_for_dimension(self.len())
    }

    /// Real parts
    pub fn re(&self) -> &[f64] {
        &self.re
    }

    /// Imaginary parts
    pub fn im(&self) -> &[f64] {
        &self.im
    }

    /// Mutable access to both parts at once
    pub fn parts_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.re, &mut self.im)
    }

    /// Amplitude at `index`
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: usize) -> Complex64 {
        Complex64::new(self.re[index], self.im[index])
    }

    /// Set amplitude at `index`
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn set(&mut self, index: usize, value: Complex64) {
        self.re[index] = value.re;
        self.im[index] = value.im;
    }

    /// Iterate amplitudes as complex scalars
    pub fn iter(&self) -> impl Iterator<Item = Complex64> + '_ {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(&re, &im)| Complex64::new(re, im))
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Elementwise sum
    pub fn add(&self, other: &Self) -> QcsResult<Self> {
        check_len(self.len(), other.len())?;
        Ok(Self {
            re: self.re.iter().zip(&other.re).map(|(a, b)| a + b).collect(),
            im: self.im.iter().zip(&other.im).map(|(a, b)| a + b).collect(),
        })
    }

    /// Multiply every amplitude by a complex scalar
    pub fn scale(&self, factor: Complex64) -> Self {
        let (re, im): (Vec<f64>, Vec<f64>) = self
            .re
            .iter()
            .zip(&self.im)
            .map(|(&a, &b)| complex_mul(a, b, factor.re, factor.im))
            .unzip();
        Self { re, im }
    }

    /// Inner product `<self|other>` (conjugate-linear in `self`)
    pub fn inner(&self, other: &Self) -> QcsResult<Complex64> {
        check_len(self.len(), other.len())?;
        let mut acc_re = 0.0;
        let mut acc_im = 0.0;
        for i in 0..self.len() {
            let (re, im) = complex_mul(self.re[i], -self.im[i], other.re[i], other.im[i]);
            acc_re += re;
            acc_im += im;
        }
        Ok(Complex64::new(acc_re, acc_im))
    }

    /// Euclidean norm `sqrt(Σ|x_i|²)`
    /// Gantree: norm2() -> f64 // 2-노름
    pub fn norm2(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Squared norm `Σ|x_i|²`
    pub fn norm_sqr(&self) -> f64 {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(a, b)| a * a + b * b)
            .sum()
    }

    /// Divide every amplitude by a real scalar
    pub fn div_scalar(&self, divisor: f64) -> Self {
        Self {
            re: self.re.iter().map(|x| x / divisor).collect(),
            im: self.im.iter().map(|x| x / divisor).collect(),
        }
    }

    /// Rescale to unit norm; a zero vector is returned unchanged
    /// Gantree: normalized() -> Self // 정규화
    pub fn normalized(&self) -> Self {
        let norm = self.norm2();
        if norm == 0.0 {
            return self.clone();
        }
        self.div_scalar(norm)
    }

    /// Squared magnitude of each amplitude
    pub fn probabilities(&self) -> Vec<f64> {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(a, b)| a * a + b * b)
            .collect()
    }

    /// Elementwise comparison within `tol`
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| (a - b).norm() <= tol)
    }
}

impl fmt::Display for ComplexVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.6}{:+.6}i", c.re, c.im)?;
        }
        write!(f, "]")
    }
}

// ============================================================================
// ComplexMatrix
// ============================================================================

/// Dense complex matrix with split, row-major storage
/// Gantree: ComplexMatrix // 유니터리 행렬
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    rows: usize,
    cols: usize,
    re: Vec<f64>,
    im: Vec<f64>,
}

impl ComplexMatrix {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// All-zero `rows × cols` matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            re: vec![0.0; rows * cols],
            im: vec![0.0; rows * cols],
        }
    }

    /// Identity of dimension `dim`
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zeros(dim, dim);
        for i in 0..dim {
            m.re[i * dim + i] = 1.0;
        }
        m
    }

    /// Build from 2D real and imaginary arrays.
    ///
    /// Rejects ragged rows and parts of different shape.
    pub fn from_rows(re: Vec<Vec<f64>>, im: Vec<Vec<f64>>) -> QcsResult<Self> {
        check_len(re.len(), im.len())?;
        let rows = re.len();
        let cols = re.first().map_or(0, Vec::len);
        let mut out = Self::zeros(rows, cols);
        for (r, (re_row, im_row)) in re.iter().zip(&im).enumerate() {
            check_len(cols, re_row.len())?;
            check_len(cols, im_row.len())?;
            out.re[r * cols..(r + 1) * cols].copy_from_slice(re_row);
            out.im[r * cols..(r + 1) * cols].copy_from_slice(im_row);
        }
        Ok(out)
    }

    /// Build from rows of complex scalars
    pub fn from_complex_rows(rows: &[Vec<Complex64>]) -> QcsResult<Self> {
        let re = rows
            .iter()
            .map(|row| row.iter().map(|c| c.re).collect())
            .collect();
        let im = rows
            .iter()
            .map(|row| row.iter().map(|c| c.im).collect())
            .collect();
        Self::from_rows(re, im)
    }

    /// Build a real matrix from row-major entries
    pub fn from_real(rows: usize, cols: usize, data: &[f64]) -> QcsResult<Self> {
        check_len(rows * cols, data.len())?;
        Ok(Self {
            rows,
            cols,
            re: data.to_vec(),
            im: vec![0.0; data.len()],
        })
    }

    /// Diagonal matrix from complex entries
    pub fn diagonal(entries: &[Complex64]) -> Self {
        let dim = entries.len();
        let mut m = Self::zeros(dim, dim);
        for (i, c) in entries.iter().enumerate() {
            m.set(i, i, *c);
        }
        m
    }

    /// Split 2D arrays `(re, im)`, e.g. for persistence
    pub fn to_rows(&self) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let split = |data: &[f64]| {
            data.chunks(self.cols.max(1))
                .take(self.rows)
                .map(<[f64]>::to_vec)
                .collect::<Vec<_>>()
        };
        if self.cols == 0 {
            return (vec![Vec::new(); self.rows], vec![Vec::new(); self.rows]);
        }
        (split(&self.re), split(&self.im))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check if square
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Register size if square with a power-of-two side
    pub fn num_qubits(&self) -> Option<usize> {
        if self.is_square() {
            qubits_for_dimension(self.rows)
        } else {
            None
        }
    }

    /// Row-major real parts
    pub fn re(&self) -> &[f64] {
        &self.re
    }

    /// Row-major imaginary parts
    pub fn im(&self) -> &[f64] {
        &self.im
    }

    /// Mutable access to both parts at once
    pub fn parts_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.re, &mut self.im)
    }

    /// Entry at (`row`, `col`)
    ///
    /// # Panics
    /// Panics if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        let k = row * self.cols + col;
        Complex64::new(self.re[k], self.im[k])
    }

    /// Set entry at (`row`, `col`)
    ///
    /// # Panics
    /// Panics if out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Complex64) {
        let k = row * self.cols + col;
        self.re[k] = value.re;
        self.im[k] = value.im;
    }

    /// Copy of column `col`
    pub fn column(&self, col: usize) -> QcsResult<ComplexVector> {
        if col >= self.cols {
            return Err(QcsError::out_of_range(col, self.cols));
        }
        let mut v = ComplexVector::zeros(self.rows);
        for r in 0..self.rows {
            v.set(r, self.get(r, col));
        }
        Ok(v)
    }

    /// Overwrite column `col`
    pub fn set_column(&mut self, col: usize, values: &ComplexVector) -> QcsResult<()> {
        if col >= self.cols {
            return Err(QcsError::out_of_range(col, self.cols));
        }
        check_len(self.rows, values.len())?;
        for r in 0..self.rows {
            self.set(r, col, values.get(r));
        }
        Ok(())
    }

    // ========================================================================
    // Products
    // ========================================================================

    /// Matrix-vector product
    pub fn mul_vector(&self, v: &ComplexVector) -> QcsResult<ComplexVector> {
        check_len(self.cols, v.len())?;
        let mut out = ComplexVector::zeros(self.rows);
        let (out_re, out_im) = out.parts_mut();
        for r in 0..self.rows {
            let base = r * self.cols;
            let (mut acc_re, mut acc_im) = (0.0, 0.0);
            for c in 0..self.cols {
                let (re, im) =
                    complex_mul(self.re[base + c], self.im[base + c], v.re[c], v.im[c]);
                acc_re += re;
                acc_im += im;
            }
            out_re[r] = acc_re;
            out_im[r] = acc_im;
        }
        Ok(out)
    }

    /// Matrix-matrix product `self · other`
    pub fn matmul(&self, other: &Self) -> QcsResult<Self> {
        check_len(self.cols, other.rows)?;
        let mut out = Self::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for k in 0..self.cols {
                let a = r * self.cols + k;
                let (a_re, a_im) = (self.re[a], self.im[a]);
                if a_re == 0.0 && a_im == 0.0 {
                    continue;
                }
                for c in 0..other.cols {
                    let b = k * other.cols + c;
                    let (re, im) = complex_mul(a_re, a_im, other.re[b], other.im[b]);
                    out.re[r * other.cols + c] += re;
                    out.im[r * other.cols + c] += im;
                }
            }
        }
        Ok(out)
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.set(c, r, self.get(r, c).conj());
            }
        }
        out
    }

    /// Elementwise sum
    pub fn add(&self, other: &Self) -> QcsResult<Self> {
        check_len(self.rows, other.rows)?;
        check_len(self.cols, other.cols)?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            re: self.re.iter().zip(&other.re).map(|(a, b)| a + b).collect(),
            im: self.im.iter().zip(&other.im).map(|(a, b)| a + b).collect(),
        })
    }

    /// Multiply every entry by a complex scalar
    pub fn scale(&self, factor: Complex64) -> Self {
        let (re, im): (Vec<f64>, Vec<f64>) = self
            .re
            .iter()
            .zip(&self.im)
            .map(|(&a, &b)| complex_mul(a, b, factor.re, factor.im))
            .unzip();
        Self {
            rows: self.rows,
            cols: self.cols,
            re,
            im,
        }
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    /// Check `U†U = I` within `tol`
    pub fn is_unitary(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        match self.adjoint().matmul(self) {
            Ok(product) => product.approx_eq(&Self::identity(self.rows), tol),
            Err(_) => false,
        }
    }

    /// Elementwise comparison within `tol`
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .re
                .iter()
                .zip(&self.im)
                .zip(other.re.iter().zip(&other.im))
                .all(|((a_re, a_im), (b_re, b_im))| {
                    let (d_re, d_im) = (a_re - b_re, a_im - b_im);
                    (d_re * d_re + d_im * d_im).sqrt() <= tol
                })
    }
}

impl fmt::Display for ComplexMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                if c > 0 {
                    write!(f, ", ")?;
                }
                let z = self.get(r, c);
                write!(f, "{:.4}{:+.4}i", z.re, z.im)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
