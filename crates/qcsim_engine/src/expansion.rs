//! Gate expansion for QCSim
//!
//! Gantree: L3_Expansion → Expansion
//!
//! Applies a k-qubit matrix at arbitrary target qubits of an n-qubit
//! buffer without building the 2^n × 2^n operator.
//!
//! For an output index `i`, the target bits of `i` (packed in target order,
//! first target = bit 0) select the matrix row. Every column `col` of that
//! row pairs with the input index `j` obtained by overwriting the target
//! bits of `i` with the bits of `col`:
//!
//! ```text
//! new[i] = Σ_col  U[row(i)][col] · old[(i & !mask) | scatter(col)]
//! ```
//!
//! Cost is O(2^n · 2^k) per application. In matrix mode the same map is
//! applied to every column of a square 2^n buffer.

use qcsim_core::{
    complex_mul, dimension, ComplexMatrix, ComplexVector, GateDefinition, QcsError, QcsResult,
    QubitId,
};
use std::collections::HashSet;

// ============================================================================
// Expansion Plan
// ============================================================================

/// Precomputed bit layout for one placement on an n-qubit register
/// Gantree: Expansion // 확장 계획
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Register size
    num_qubits: usize,

    /// Target qubits in placement order
    targets: Vec<QubitId>,

    /// Union of target bits
    target_mask: usize,

    /// `scatter[col]`: bits of `col` moved onto the target positions
    scatter: Vec<usize>,
}

impl Expansion {
    /// Plan the application of a `2^arity` gate at `targets`.
    ///
    /// `arity == 0` is `InvalidArity`; a target count different from the
    /// arity or a repeated target is `InvalidPlacement`; a target `>= n` is
    /// `OutOfRange`.
    /// Gantree: new(n, k, targets) -> Result<Self> // 계획 생성
    pub fn new(num_qubits: usize, arity: usize, targets: &[QubitId]) -> QcsResult<Self> {
        if arity == 0 {
            return Err(QcsError::InvalidArity(
                "gate must act on at least one qubit".to_string(),
            ));
        }
        if targets.len() != arity {
            return Err(QcsError::InvalidPlacement(format!(
                "gate acts on {} qubit(s) but {} target(s) were given",
                arity,
                targets.len()
            )));
        }

        let mut seen = HashSet::with_capacity(arity);
        let mut target_mask = 0usize;
        for &t in targets {
            if t >= num_qubits {
                return Err(QcsError::out_of_range(t, num_qubits));
            }
            if !seen.insert(t) {
                return Err(QcsError::InvalidPlacement(format!(
                    "qubit {} is targeted more than once",
                    t
                )));
            }
            target_mask |= 1 << t;
        }

        let scatter = (0..dimension(arity))
            .map(|col| {
                targets
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| (col >> bit) & 1 == 1)
                    .fold(0usize, |acc, (_, &t)| acc | (1 << t))
            })
            .collect();

        Ok(Self {
            num_qubits,
            targets: targets.to_vec(),
            target_mask,
            scatter,
        })
    }

    /// Register size
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Gate arity
    pub fn arity(&self) -> usize {
        self.targets.len()
    }

    /// Mask of all target bits
    pub fn target_mask(&self) -> usize {
        self.target_mask
    }

    /// Target bits of `index`, packed in target order
    #[inline]
    pub fn row_of(&self, index: usize) -> usize {
        self.targets
            .iter()
            .enumerate()
            .fold(0usize, |acc, (bit, &t)| acc | (((index >> t) & 1) << bit))
    }

    /// Input index feeding `col` of the gate for output `index`
    #[inline]
    pub fn source_index(&self, index: usize, col: usize) -> usize {
        (index & !self.target_mask) | self.scatter[col]
    }

    fn check_matrix(&self, matrix: &ComplexMatrix) -> QcsResult<()> {
        let k = GateDefinition::arity_of(matrix)?;
        if k != self.arity() {
            return Err(QcsError::InvalidPlacement(format!(
                "gate acts on {} qubit(s) but {} target(s) were given",
                k,
                self.arity()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Vector Mode
    // ========================================================================

    /// Apply `matrix` to a state vector of length 2^n
    /// Gantree: apply_vector(U, ψ) -> Result<ψ'> // 벡터 적용
    pub fn apply_vector(
        &self,
        matrix: &ComplexMatrix,
        state: &ComplexVector,
    ) -> QcsResult<ComplexVector> {
        self.check_matrix(matrix)?;
        let dim = dimension(self.num_qubits);
        if state.len() != dim {
            return Err(QcsError::DimensionMismatch {
                expected: dim,
                actual: state.len(),
            });
        }

        let k_dim = self.scatter.len();
        let (m_re, m_im) = (matrix.re(), matrix.im());
        let (old_re, old_im) = (state.re(), state.im());
        let mut out = ComplexVector::zeros(dim);
        let (out_re, out_im) = out.parts_mut();

        for i in 0..dim {
            let row = self.row_of(i) * k_dim;
            let base = i & !self.target_mask;
            let (mut acc_re, mut acc_im) = (0.0, 0.0);
            for (col, &offset) in self.scatter.iter().enumerate() {
                let j = base | offset;
                let (re, im) = complex_mul(m_re[row + col], m_im[row + col], old_re[j], old_im[j]);
                acc_re += re;
                acc_im += im;
            }
            out_re[i] = acc_re;
            out_im[i] = acc_im;
        }
        Ok(out)
    }

    // ========================================================================
    // Matrix Mode
    // ========================================================================

    /// Apply `matrix` to every column of a square 2^n × 2^n buffer
    /// Gantree: apply_matrix(U, M) -> Result<M'> // 행렬 적용
    pub fn apply_matrix(
        &self,
        matrix: &ComplexMatrix,
        state: &ComplexMatrix,
    ) -> QcsResult<ComplexMatrix> {
        self.check_matrix(matrix)?;
        let dim = dimension(self.num_qubits);
        if !state.is_square() {
            return Err(QcsError::DimensionMismatch {
                expected: state.rows(),
                actual: state.cols(),
            });
        }
        if state.rows() != dim {
            return Err(QcsError::DimensionMismatch {
                expected: dim,
                actual: state.rows(),
            });
        }

        let k_dim = self.scatter.len();
        let (m_re, m_im) = (matrix.re(), matrix.im());
        let (old_re, old_im) = (state.re(), state.im());
        let mut out = ComplexMatrix::zeros(dim, dim);
        let (out_re, out_im) = out.parts_mut();

        // Row i of the result mixes rows j of the input; every column of the
        // buffer is transformed by the same coefficients.
        for i in 0..dim {
            let row = self.row_of(i) * k_dim;
            let base = i & !self.target_mask;
            let out_row = i * dim;
            for (col, &offset) in self.scatter.iter().enumerate() {
                let (a_re, a_im) = (m_re[row + col], m_im[row + col]);
                if a_re == 0.0 && a_im == 0.0 {
                    continue;
                }
                let in_row = (base | offset) * dim;
                for c in 0..dim {
                    let (re, im) = complex_mul(a_re, a_im, old_re[in_row + c], old_im[in_row + c]);
                    out_re[out_row + c] += re;
                    out_im[out_row + c] += im;
                }
            }
        }
        Ok(out)
    }
}

// ============================================================================
// State Buffers
// ============================================================================

/// A buffer the evaluator can fold a circuit over
/// Gantree: StateBuffer // 상태 버퍼 trait
pub trait StateBuffer: Sized {
    /// Register size implied by the buffer's shape
    fn num_qubits(&self) -> QcsResult<usize>;

    /// Buffer with `matrix` applied according to `plan`
    fn apply(&self, plan: &Expansion, matrix: &ComplexMatrix) -> QcsResult<Self>;

    /// Short label for logs
    fn mode() -> &'static str;

    /// Buffer with `matrix` applied at `targets`
    fn apply_gate(&self, matrix: &ComplexMatrix, targets: &[QubitId]) -> QcsResult<Self> {
        let plan = Expansion::new(self.num_qubits()?, GateDefinition::arity_of(matrix)?, targets)?;
        self.apply(&plan, matrix)
    }
}

impl StateBuffer for ComplexVector {
    fn num_qubits(&self) -> QcsResult<usize> {
        ComplexVector::num_qubits(self).ok_or(QcsError::DimensionMismatch {
            expected: self.len().next_power_of_two().max(1),
            actual: self.len(),
        })
    }

    fn apply(&self, plan: &Expansion, matrix: &ComplexMatrix) -> QcsResult<Self> {
        plan.apply_vector(matrix, self)
    }

    fn mode() -> &'static str {
        "vector"
    }
}

impl StateBuffer for ComplexMatrix {
    fn num_qubits(&self) -> QcsResult<usize> {
        if !self.is_square() {
            return Err(QcsError::DimensionMismatch {
                expected: self.rows(),
                actual: self.cols(),
            });
        }
        ComplexMatrix::num_qubits(self).ok_or(QcsError::DimensionMismatch {
            expected: self.rows().next_power_of_two().max(1),
            actual: self.rows(),
        })
    }

    fn apply(&self, plan: &Expansion, matrix: &ComplexMatrix) -> QcsResult<Self> {
        plan.apply_matrix(matrix, self)
    }

    fn mode() -> &'static str {
        "matrix"
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Apply `matrix` at `targets` to an n-qubit state vector
pub fn apply_to_vector(
    matrix: &ComplexMatrix,
    targets: &[QubitId],
    state: &ComplexVector,
) -> QcsResult<ComplexVector> {
    state.apply_gate(matrix, targets)
}

/// Apply `matrix` at `targets` to every column of a square 2^n buffer
pub fn apply_to_matrix(
    matrix: &ComplexMatrix,
    targets: &[QubitId],
    state: &ComplexMatrix,
) -> QcsResult<ComplexMatrix> {
    state.apply_gate(matrix, targets)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qcsim_core::{matrices, Complex64};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn random_state(n: usize, rng: &mut ChaCha8Rng) -> ComplexVector {
        let dim = dimension(n);
        let re = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let im = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
        ComplexVector::from_parts(re, im).unwrap().normalized()
    }

    /// Random 2-qubit unitary built from rotations and a CNOT
    fn random_two_qubit(rng: &mut ChaCha8Rng) -> ComplexMatrix {
        let mut u = ComplexMatrix::identity(4);
        for _ in 0..3 {
            let a = rng.gen_range(0.0..6.3);
            let b = rng.gen_range(0.0..6.3);
            let layer = apply_to_matrix(&matrices::ry(a), &[0], &u).unwrap();
            let layer = apply_to_matrix(&matrices::rz(b), &[1], &layer).unwrap();
            u = apply_to_matrix(&matrices::cnot(), &[0, 1], &layer).unwrap();
        }
        u
    }

    #[test]
    fn test_row_and_source_index() {
        // targets (2, 0): first target is qubit 2
        let plan = Expansion::new(3, 2, &[2, 0]).unwrap();
        assert_eq!(plan.target_mask(), 0b101);
        assert_eq!(plan.row_of(0b100), 0b01);
        assert_eq!(plan.row_of(0b001), 0b10);
        assert_eq!(plan.row_of(0b111), 0b11);
        // spectator bit 1 kept, targets overwritten by col = 0b01 -> qubit 2
        assert_eq!(plan.source_index(0b011, 0b01), 0b110);
    }

    #[test]
    fn test_placement_errors() {
        assert!(matches!(
            Expansion::new(2, 0, &[]),
            Err(QcsError::InvalidArity(_))
        ));
        assert!(matches!(
            Expansion::new(2, 2, &[0]),
            Err(QcsError::InvalidPlacement(_))
        ));
        assert!(matches!(
            Expansion::new(2, 2, &[1, 1]),
            Err(QcsError::InvalidPlacement(_))
        ));
        assert_eq!(
            Expansion::new(2, 1, &[2]),
            Err(QcsError::OutOfRange { index: 2, limit: 2 })
        );
    }

    #[test]
    fn test_hadamard_on_qubit_one() {
        let state = ComplexVector::basis(2, 0).unwrap();
        let out = apply_to_vector(&matrices::hadamard(), &[1], &state).unwrap();
        assert_abs_diff_eq!(out.get(0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(out.get(2).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(out.get(1).norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.get(3).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cnot_reversed_targets() {
        // control qubit 1, target qubit 0: |10> (2) -> |11> (3)
        let state = ComplexVector::basis(2, 0b10).unwrap();
        let out = apply_to_vector(&matrices::cnot(), &[1, 0], &state).unwrap();
        assert!(out.approx_eq(&ComplexVector::basis(2, 0b11).unwrap(), 1e-12));

        // control unset: unchanged
        let state = ComplexVector::basis(2, 0b01).unwrap();
        let out = apply_to_vector(&matrices::cnot(), &[1, 0], &state).unwrap();
        assert!(out.approx_eq(&state, 1e-12));
    }

    #[test]
    fn test_non_contiguous_toffoli() {
        // controls on qubits 0 and 3, target qubit 1, spectator qubit 2 set
        let input = 0b1101;
        let state = ComplexVector::basis(4, input).unwrap();
        let out = apply_to_vector(&matrices::toffoli(), &[0, 3, 1], &state).unwrap();
        assert!(out.approx_eq(&ComplexVector::basis(4, 0b1111).unwrap(), 1e-12));
    }

    #[test]
    fn test_phase_is_applied() {
        let state = ComplexVector::basis(1, 1).unwrap();
        let out = apply_to_vector(&matrices::pauli_y(), &[0], &state).unwrap();
        // Y|1> = -i|0>
        assert_eq!(out.get(0), Complex64::new(0.0, -1.0));
    }

    #[test]
    fn test_matches_dense_kronecker_on_contiguous_targets() {
        // Gate on qubit 0 of 2 equals I ⊗ U in little-endian order
        let u = matrices::sqrt_not();
        let expanded = apply_to_matrix(&u, &[0], &ComplexMatrix::identity(4)).unwrap();
        for r in 0..4 {
            for c in 0..4 {
                let expected = if (r >> 1) == (c >> 1) {
                    u.get(r & 1, c & 1)
                } else {
                    Complex64::new(0.0, 0.0)
                };
                assert_abs_diff_eq!((expanded.get(r, c) - expected).norm(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_matrix_mode_columns_match_vector_mode() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let u = random_two_qubit(&mut rng);
        let start = apply_to_matrix(&matrices::hadamard(), &[1], &ComplexMatrix::identity(8)).unwrap();
        let out = apply_to_matrix(&u, &[2, 0], &start).unwrap();
        for c in 0..8 {
            let col = apply_to_vector(&u, &[2, 0], &start.column(c).unwrap()).unwrap();
            assert!(col.approx_eq(&out.column(c).unwrap(), 1e-12));
        }
    }

    #[test]
    fn test_norm_preserved_for_random_placements() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            let n = rng.gen_range(2..6);
            let state = random_state(n, &mut rng);
            let u = random_two_qubit(&mut rng);
            let a = rng.gen_range(0..n);
            let mut b = rng.gen_range(0..n);
            while b == a {
                b = rng.gen_range(0..n);
            }
            let out = apply_to_vector(&u, &[a, b], &state).unwrap();
            assert_abs_diff_eq!(out.norm2(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_shape_errors() {
        let odd = ComplexVector::zeros(3);
        assert!(matches!(
            apply_to_vector(&matrices::pauli_x(), &[0], &odd),
            Err(QcsError::DimensionMismatch { .. })
        ));
        let rect = ComplexMatrix::zeros(4, 2);
        assert!(matches!(
            apply_to_matrix(&matrices::pauli_x(), &[0], &rect),
            Err(QcsError::DimensionMismatch { .. })
        ));
        let plan = Expansion::new(2, 1, &[0]).unwrap();
        assert!(matches!(
            plan.apply_vector(&matrices::cnot(), &ComplexVector::zeros(4)),
            Err(QcsError::InvalidPlacement(_))
        ));
    }
}
