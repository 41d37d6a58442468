//! Circuit evaluator for QCSim
//!
//! Gantree: L4_Evaluator → Evaluator
//!
//! Folds a circuit's placements, in time-slot order, over a state vector or
//! a square matrix buffer. Evaluation is a pure function of the circuit,
//! the library and the initial buffer.

use crate::config::EngineConfig;
use crate::expansion::{Expansion, StateBuffer};
use crate::library::GateLibrary;
use log::{debug, warn};
use qcsim_core::{
    dimension, limits, tolerance, types::check_basis_index, BasisIndex, Circuit, ComplexMatrix,
    ComplexVector, Placement, QcsError, QcsResult,
};

/// Apply one placement to `buffer`, resolving the gate in `library` now
pub(crate) fn apply_placement<B: StateBuffer>(
    library: &GateLibrary,
    placement: &Placement,
    num_qubits: usize,
    buffer: &B,
) -> QcsResult<B> {
    let gate = library.lookup(&placement.gate)?;
    let plan = Expansion::new(num_qubits, gate.arity(), &placement.targets)?;
    buffer.apply(&plan, gate.matrix())
}

/// Circuit evaluator bound to a gate library
/// Gantree: Evaluator // 회로 평가기
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'lib> {
    library: &'lib GateLibrary,
    max_qubits: usize,
    normalize_tolerance: f64,
}

impl<'lib> Evaluator<'lib> {
    /// Evaluator with default limits
    pub fn new(library: &'lib GateLibrary) -> Self {
        Self {
            library,
            max_qubits: limits::DEFAULT_MAX_QUBITS,
            normalize_tolerance: tolerance::NORM,
        }
    }

    /// Evaluator using the limits of `config`
    pub fn with_config(library: &'lib GateLibrary, config: &EngineConfig) -> Self {
        Self {
            library,
            max_qubits: config.max_qubits,
            normalize_tolerance: config.normalize_tolerance,
        }
    }

    /// Library used for gate lookup
    pub fn library(&self) -> &'lib GateLibrary {
        self.library
    }

    // ========================================================================
    // Checks
    // ========================================================================

    /// Register size guard shared by every entry point
    pub fn check_size(&self, num_qubits: usize) -> QcsResult<()> {
        if num_qubits > self.max_qubits {
            return Err(QcsError::TooManyQubits {
                qubits: num_qubits,
                max: self.max_qubits,
            });
        }
        Ok(())
    }

    /// Verify that every placement names a known gate with matching arity
    /// and valid targets, without evaluating anything
    /// Gantree: check_circuit(circuit) -> Result // 사전 검사
    pub fn check_circuit(&self, circuit: &Circuit) -> QcsResult<()> {
        circuit.validate()?;
        self.check_size(circuit.num_qubits())?;
        for placement in circuit.placements() {
            let gate = self.library.lookup(&placement.gate)?;
            Expansion::new(circuit.num_qubits(), gate.arity(), &placement.targets)?;
        }
        Ok(())
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Apply every placement of `circuit` to `initial`, in time-slot order.
    ///
    /// Placements sharing a slot run in insertion order. The result has the
    /// same shape as `initial`; nothing is normalized.
    /// Gantree: evaluate(circuit, initial) -> Result<B> // 평가
    pub fn evaluate<B: StateBuffer>(&self, circuit: &Circuit, initial: B) -> QcsResult<B> {
        let n = circuit.num_qubits();
        self.check_size(n)?;
        let buffer_qubits = initial.num_qubits()?;
        if buffer_qubits != n {
            return Err(QcsError::DimensionMismatch {
                expected: dimension(n),
                actual: dimension(buffer_qubits),
            });
        }

        let schedule = circuit.schedule();
        debug!(
            "evaluating {} placement(s) on {} qubit(s) in {} mode",
            schedule.len(),
            n,
            B::mode()
        );

        schedule.iter().try_fold(initial, |buffer, placement| {
            apply_placement(self.library, placement, n, &buffer)
        })
    }

    /// Evaluate on the basis vector `|basis>`
    /// Gantree: evaluate_to_vector(circuit, basis) -> Result<ψ> // 벡터 평가
    pub fn evaluate_to_vector(
        &self,
        circuit: &Circuit,
        basis: BasisIndex,
    ) -> QcsResult<ComplexVector> {
        let n = circuit.num_qubits();
        self.check_size(n)?;
        check_basis_index(basis, n)?;

        let state = self.evaluate(circuit, ComplexVector::basis(n, basis)?)?;
        let norm = state.norm2();
        if (norm - 1.0).abs() > self.normalize_tolerance {
            warn!(
                "output norm {} drifted from 1 by more than {:e}",
                norm, self.normalize_tolerance
            );
        }
        Ok(state)
    }

    /// Evaluate on the identity, giving the circuit's full unitary
    /// Gantree: evaluate_to_unitary(circuit) -> Result<U> // 행렬 평가
    pub fn evaluate_to_unitary(&self, circuit: &Circuit) -> QcsResult<ComplexMatrix> {
        let n = circuit.num_qubits();
        self.check_size(n)?;
        self.evaluate(circuit, ComplexMatrix::identity(dimension(n)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qcsim_core::{BuiltinGate, CircuitBuilder};
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_gate_free_circuit_is_identity() {
        let lib = GateLibrary::new();
        let eval = Evaluator::new(&lib);
        let circuit = Circuit::new(3);
        for basis in 0..8 {
            let out = eval.evaluate_to_vector(&circuit, basis).unwrap();
            assert!(out.approx_eq(&ComplexVector::basis(3, basis).unwrap(), 0.0));
        }
        let u = eval.evaluate_to_unitary(&circuit).unwrap();
        assert!(u.approx_eq(&ComplexMatrix::identity(8), 0.0));
    }

    #[test]
    fn test_x_twice_is_identity() {
        let lib = GateLibrary::new();
        let eval = Evaluator::new(&lib);
        let circuit = CircuitBuilder::new(2).x(1).x(1).build();
        for basis in 0..4 {
            let out = eval.evaluate_to_vector(&circuit, basis).unwrap();
            assert!(out.approx_eq(&ComplexVector::basis(2, basis).unwrap(), 1e-12));
        }
    }

    #[test]
    fn test_bell_state() {
        let lib = GateLibrary::new();
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
        let out = Evaluator::new(&lib).evaluate_to_vector(&circuit, 0).unwrap();

        assert_abs_diff_eq!(out.get(0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(out.get(3).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(out.get(1).norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.get(2).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_toffoli_flips_target() {
        let lib = GateLibrary::new();
        let circuit = CircuitBuilder::new(3).toffoli(0, 1, 2).build();
        let out = Evaluator::new(&lib)
            .evaluate_to_vector(&circuit, 0b011)
            .unwrap();
        assert!(out.approx_eq(&ComplexVector::basis(3, 0b111).unwrap(), 1e-12));
    }

    #[test]
    fn test_single_gate_compiles_to_its_matrix() {
        let lib = GateLibrary::new();
        let eval = Evaluator::new(&lib);
        for gate in BuiltinGate::ALL {
            let k = gate.arity();
            let targets: Vec<_> = (0..k).collect();
            let circuit = CircuitBuilder::new(k).gate(gate.name(), &targets).build();
            let u = eval.evaluate_to_unitary(&circuit).unwrap();
            assert!(u.approx_eq(&gate.matrix(), 1e-12), "{}", gate.name());
        }
    }

    #[test]
    fn test_time_order_not_insertion_order() {
        let lib = GateLibrary::new();
        // H written first but scheduled after X: H X |0> = |->
        let circuit = CircuitBuilder::new(1)
            .gate_at("h", &[0], 1)
            .gate_at("x", &[0], 0)
            .build();
        let out = Evaluator::new(&lib).evaluate_to_vector(&circuit, 0).unwrap();
        assert_abs_diff_eq!(out.get(1).re, -FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_equal_slot_overlap_uses_insertion_order() {
        let lib = GateLibrary::new();
        let circuit = CircuitBuilder::new(1)
            .gate_at("x", &[0], 0)
            .gate_at("h", &[0], 0)
            .build();
        let out = Evaluator::new(&lib).evaluate_to_vector(&circuit, 0).unwrap();
        assert_abs_diff_eq!(out.get(1).re, -FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_unitary_columns_match_vectors() {
        let lib = GateLibrary::new();
        let eval = Evaluator::new(&lib);
        let circuit = CircuitBuilder::new(3).h(2).cnot(2, 0).t(0).swap(0, 1).build();
        let u = eval.evaluate_to_unitary(&circuit).unwrap();
        assert!(u.is_unitary(1e-10));
        for basis in 0..8 {
            let v = eval.evaluate_to_vector(&circuit, basis).unwrap();
            assert!(v.approx_eq(&u.column(basis).unwrap(), 1e-12));
        }
    }

    #[test]
    fn test_errors() {
        let lib = GateLibrary::new();
        let eval = Evaluator::new(&lib);

        let unknown = CircuitBuilder::new(1).gate("F", &[0]).build();
        assert_eq!(
            eval.evaluate_to_vector(&unknown, 0),
            Err(QcsError::UnknownGate("F".into()))
        );
        assert!(eval.check_circuit(&unknown).is_err());

        let wrong_arity = CircuitBuilder::new(2).gate("cnot", &[0]).build();
        assert!(matches!(
            eval.evaluate_to_vector(&wrong_arity, 0),
            Err(QcsError::InvalidPlacement(_))
        ));

        let bell = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
        assert!(eval.check_circuit(&bell).is_ok());
        assert_eq!(
            eval.evaluate_to_vector(&bell, 4),
            Err(QcsError::OutOfRange { index: 4, limit: 4 })
        );
        assert!(matches!(
            eval.evaluate(&bell, ComplexVector::zeros(8)),
            Err(QcsError::DimensionMismatch { expected: 4, actual: 8 })
        ));
    }

    #[test]
    fn test_qubit_limit() {
        let lib = GateLibrary::new();
        let config = EngineConfig::new().with_max_qubits(2);
        let eval = Evaluator::with_config(&lib, &config);
        assert_eq!(
            eval.evaluate_to_unitary(&Circuit::new(3)),
            Err(QcsError::TooManyQubits { qubits: 3, max: 2 })
        );
    }
}
