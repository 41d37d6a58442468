//! Interactive workspace for QCSim
//!
//! Gantree: L6_Workspace → Workspace
//!
//! A workspace is one editing session: the gate library, the circuit being
//! edited with its input basis state, and an executor for incremental
//! evaluations. Composite gates are compiled here from circuits and
//! registered into the session's library.

use log::{debug, info};
use qcsim_core::{
    dimension, limits, types::check_basis_index, BasisIndex, Circuit, ComplexMatrix,
    ComplexVector, GateDefinition, QcsError, QcsResult,
};
use qcsim_engine::{
    CooperativeExecutor, EngineConfig, EvaluationTask, Evaluator, GateLibrary, TaskId,
};

/// Editing session
/// Gantree: Workspace // 작업 공간
#[derive(Debug)]
pub struct Workspace {
    /// Gate definitions of this session
    library: GateLibrary,

    /// Circuit being edited
    circuit: Circuit,

    /// Input basis state for the edited circuit
    input: BasisIndex,

    /// Engine settings
    config: EngineConfig,

    /// Incremental evaluations awaiting turns
    executor: CooperativeExecutor,
}

impl Workspace {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Empty workspace on `num_qubits` qubits with default settings
    /// Gantree: new(n) -> Result<Self> // 생성자
    pub fn new(num_qubits: usize) -> QcsResult<Self> {
        Self::with_config(num_qubits, EngineConfig::default())
    }

    /// Empty workspace with explicit settings
    pub fn with_config(num_qubits: usize, config: EngineConfig) -> QcsResult<Self> {
        Self::from_parts(Circuit::new(num_qubits), config)
    }

    /// Workspace editing `circuit`
    pub fn from_parts(circuit: Circuit, config: EngineConfig) -> QcsResult<Self> {
        config.validate()?;
        circuit.validate()?;
        Self::check_register(&config, circuit.num_qubits())?;
        Ok(Self {
            library: GateLibrary::new().with_unitarity_tolerance(config.unitarity_tolerance),
            executor: CooperativeExecutor::from_config(&config),
            circuit,
            input: 0,
            config,
        })
    }

    fn check_register(config: &EngineConfig, num_qubits: usize) -> QcsResult<()> {
        if num_qubits > config.max_qubits {
            return Err(QcsError::TooManyQubits {
                qubits: num_qubits,
                max: config.max_qubits,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Gate library
    pub fn library(&self) -> &GateLibrary {
        &self.library
    }

    /// Engine settings
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Circuit being edited
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Mutable access to the edited circuit
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    /// Replace the edited circuit; the input resets to `|0…0>`
    pub fn set_circuit(&mut self, circuit: Circuit) -> QcsResult<()> {
        circuit.validate()?;
        Self::check_register(&self.config, circuit.num_qubits())?;
        self.circuit = circuit;
        self.input = 0;
        Ok(())
    }

    /// Input basis state of the edited circuit
    pub fn input(&self) -> BasisIndex {
        self.input
    }

    /// Set the input basis state
    pub fn set_input(&mut self, basis: BasisIndex) -> QcsResult<()> {
        check_basis_index(basis, self.circuit.num_qubits())?;
        self.input = basis;
        Ok(())
    }

    /// Resize the edited register to between 1 and
    /// [`limits::EDITOR_MAX_QUBITS`] qubits (or the configured maximum, if
    /// lower). Placements touching removed qubits are dropped and their
    /// count returned; input bits on removed qubits are cleared.
    /// Gantree: resize(n) -> Result<usize> // 크기 변경
    pub fn resize(&mut self, num_qubits: usize) -> QcsResult<usize> {
        if num_qubits == 0 {
            return Err(QcsError::InvalidPlacement(
                "register needs at least one qubit".to_string(),
            ));
        }
        let max = self.config.max_qubits.min(limits::EDITOR_MAX_QUBITS);
        if num_qubits > max {
            return Err(QcsError::TooManyQubits {
                qubits: num_qubits,
                max,
            });
        }
        let removed = self.circuit.resize(num_qubits);
        self.input &= dimension(num_qubits) - 1;
        if removed > 0 {
            info!(
                "resized register to {} qubit(s), removed {} placement(s)",
                num_qubits, removed
            );
        }
        Ok(removed)
    }

    /// Evaluator bound to this session's library and limits
    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::with_config(&self.library, &self.config)
    }

    // ========================================================================
    // Synchronous Evaluation
    // ========================================================================

    /// State reached by `circuit` from `|basis>`
    /// Gantree: evaluate_to_vector(circuit, basis) -> Result<ψ> // 벡터 평가
    pub fn evaluate_to_vector(
        &self,
        circuit: &Circuit,
        basis: BasisIndex,
    ) -> QcsResult<ComplexVector> {
        self.evaluator().evaluate_to_vector(circuit, basis)
    }

    /// Unitary of `circuit`
    /// Gantree: evaluate_to_unitary(circuit) -> Result<U> // 행렬 평가
    pub fn evaluate_to_unitary(&self, circuit: &Circuit) -> QcsResult<ComplexMatrix> {
        self.evaluator().evaluate_to_unitary(circuit)
    }

    /// Edited circuit evaluated on the current input
    pub fn evaluate(&self) -> QcsResult<ComplexVector> {
        self.evaluate_to_vector(&self.circuit, self.input)
    }

    // ========================================================================
    // Incremental Evaluation
    // ========================================================================

    /// Queue an incremental evaluation of `circuit` from `|basis>`.
    ///
    /// Shape and size errors are returned immediately; gate errors reach
    /// `callback` once [`Workspace::run_pending`] gets to them.
    pub fn evaluate_to_vector_with<F>(
        &mut self,
        circuit: &Circuit,
        basis: BasisIndex,
        callback: F,
    ) -> QcsResult<TaskId>
    where
        F: FnOnce(QcsResult<ComplexVector>) + 'static,
    {
        let n = circuit.num_qubits();
        self.evaluator().check_size(n)?;
        check_basis_index(basis, n)?;
        let task = EvaluationTask::new(circuit, ComplexVector::basis(n, basis)?)?;
        Ok(self.executor.submit(task, callback))
    }

    /// Queue an incremental evaluation of `circuit` on the identity
    pub fn evaluate_to_unitary_with<F>(&mut self, circuit: &Circuit, callback: F) -> QcsResult<TaskId>
    where
        F: FnOnce(QcsResult<ComplexMatrix>) + 'static,
    {
        let n = circuit.num_qubits();
        self.evaluator().check_size(n)?;
        let task = EvaluationTask::new(circuit, ComplexMatrix::identity(dimension(n)))?;
        Ok(self.executor.submit(task, callback))
    }

    /// Give every queued evaluation one chunk; returns how many remain
    pub fn run_turn(&mut self) -> usize {
        self.executor.run_turn(&self.library)
    }

    /// Drive queued evaluations to completion; returns the turns taken
    /// Gantree: run_pending() -> usize // 대기 작업 실행
    pub fn run_pending(&mut self) -> usize {
        let turns = self.executor.run_until_idle(&self.library);
        if turns > 0 {
            debug!("drained evaluation queue in {} turn(s)", turns);
        }
        turns
    }

    /// Evaluations still queued
    pub fn pending(&self) -> usize {
        self.executor.pending()
    }

    // ========================================================================
    // Gates
    // ========================================================================

    /// Get a gate definition by name
    pub fn lookup_gate(&self, name: &str) -> QcsResult<&GateDefinition> {
        self.library.lookup(name)
    }

    /// Compile `circuit` to its unitary and register it as composite `name`,
    /// replacing any earlier composite of that name. `basis` is kept as the
    /// source input for later editing.
    /// Gantree: compile_composite(name, circuit, basis) -> Result<&GateDefinition> // 합성 컴파일
    pub fn compile_composite(
        &mut self,
        name: &str,
        circuit: &Circuit,
        basis: BasisIndex,
    ) -> QcsResult<&GateDefinition> {
        if GateLibrary::is_reserved(name) {
            return Err(QcsError::ReservedName(name.to_string()));
        }
        check_basis_index(basis, circuit.num_qubits())?;
        let matrix = self.evaluate_to_unitary(circuit)?;
        self.library
            .register_composite(name, matrix, circuit.clone(), basis)
    }

    /// Compile the edited circuit and its input as composite `name`
    pub fn compile_current(&mut self, name: &str) -> QcsResult<&GateDefinition> {
        let circuit = self.circuit.clone();
        self.compile_composite(name, &circuit, self.input)
    }

    /// Rebuild composite `name` from its stored source circuit, after first
    /// rebuilding every composite that source depends on.
    pub fn recompile(&mut self, name: &str) -> QcsResult<&GateDefinition> {
        let source = self
            .library
            .lookup(name)?
            .source()
            .cloned()
            .ok_or_else(|| QcsError::ReservedName(name.to_string()))?;

        for dependency in self.library.composite_dependencies(&source.circuit) {
            self.rebuild(&dependency)?;
        }
        self.rebuild(name)?;
        self.library.lookup(name)
    }

    fn rebuild(&mut self, name: &str) -> QcsResult<()> {
        let source = self
            .library
            .lookup(name)?
            .source()
            .cloned()
            .ok_or_else(|| QcsError::ReservedName(name.to_string()))?;
        let matrix = self.evaluate_to_unitary(&source.circuit)?;
        self.library
            .register_composite(name, matrix, source.circuit, source.input)?;
        Ok(())
    }

    /// Remove composite `name`
    pub fn remove_gate(&mut self, name: &str) -> QcsResult<GateDefinition> {
        self.library.remove_composite(name)
    }

    pub(crate) fn library_mut(&mut self) -> &mut GateLibrary {
        &mut self.library
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qcsim_core::{matrices, CircuitBuilder};
    use std::cell::RefCell;
    use std::f64::consts::FRAC_1_SQRT_2;
    use std::rc::Rc;

    #[test]
    fn test_new_workspace() {
        let ws = Workspace::new(2).unwrap();
        assert_eq!(ws.circuit().num_qubits(), 2);
        assert_eq!(ws.input(), 0);
        assert!(ws.lookup_gate("h").unwrap().is_builtin());
        assert!(matches!(Workspace::new(0), Err(QcsError::InvalidPlacement(_))));
        assert!(matches!(
            Workspace::new(17),
            Err(QcsError::TooManyQubits { qubits: 17, max: 16 })
        ));
    }

    #[test]
    fn test_evaluate_edited_circuit() {
        let mut ws = Workspace::new(2).unwrap();
        ws.circuit_mut().add("h", vec![0], 0).unwrap();
        ws.circuit_mut().add("cnot", vec![0, 1], 1).unwrap();
        let state = ws.evaluate().unwrap();
        assert_abs_diff_eq!(state.get(0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(state.get(3).re, FRAC_1_SQRT_2, epsilon = 1e-12);

        ws.set_input(0b10).unwrap();
        assert!(ws.set_input(4).is_err());
    }

    #[test]
    fn test_compile_single_gate() {
        let mut ws = Workspace::new(2).unwrap();
        let circuit = CircuitBuilder::new(2).cnot(0, 1).build();
        let def = ws.compile_composite("CX", &circuit, 0).unwrap();
        assert!(def.matrix().approx_eq(&matrices::cnot(), 1e-12));
        assert_eq!(def.arity(), 2);
    }

    #[test]
    fn test_compile_rejects_reserved_and_bad_input() {
        let mut ws = Workspace::new(1).unwrap();
        let circuit = CircuitBuilder::new(1).x(0).build();
        assert_eq!(
            ws.compile_composite("x", &circuit, 0).unwrap_err(),
            QcsError::ReservedName("x".into())
        );
        assert!(matches!(
            ws.compile_composite("F", &circuit, 2),
            Err(QcsError::OutOfRange { index: 2, limit: 2 })
        ));
    }

    #[test]
    fn test_compile_current() {
        let mut ws = Workspace::new(1).unwrap();
        ws.circuit_mut().add("x", vec![0], 0).unwrap();
        ws.set_input(1).unwrap();
        let def = ws.compile_current("NOT").unwrap();
        assert_eq!(def.source().unwrap().input, 1);
        assert!(def.matrix().approx_eq(&matrices::pauli_x(), 1e-12));
    }

    #[test]
    fn test_recompile_propagates_dependencies() {
        let mut ws = Workspace::new(1).unwrap();
        ws.compile_composite("A", &CircuitBuilder::new(1).x(0).build(), 0)
            .unwrap();
        ws.compile_composite("B", &CircuitBuilder::new(1).gate("A", &[0]).h(0).build(), 0)
            .unwrap();

        // A's stored source changes without its matrix being rebuilt
        let z = CircuitBuilder::new(1).z(0).build();
        ws.library_mut()
            .register_composite("A", matrices::pauli_x(), z, 0)
            .unwrap();

        let b = ws.recompile("B").unwrap();
        // B = H · Z
        let expected = matrices::hadamard().matmul(&matrices::pauli_z()).unwrap();
        assert!(b.matrix().approx_eq(&expected, 1e-12));
        assert!(ws
            .lookup_gate("A")
            .unwrap()
            .matrix()
            .approx_eq(&matrices::pauli_z(), 1e-12));

        assert!(matches!(ws.recompile("h"), Err(QcsError::ReservedName(_))));
        assert!(matches!(ws.recompile("nope"), Err(QcsError::UnknownGate(_))));
    }

    #[test]
    fn test_incremental_callbacks() {
        let mut ws = Workspace::with_config(2, EngineConfig::new().with_chunk_size(1)).unwrap();
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
        let vector = Rc::new(RefCell::new(None));
        let unitary = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&vector);
        ws.evaluate_to_vector_with(&circuit, 0, move |r| *slot.borrow_mut() = Some(r))
            .unwrap();
        let slot = Rc::clone(&unitary);
        ws.evaluate_to_unitary_with(&circuit, move |r| *slot.borrow_mut() = Some(r))
            .unwrap();
        assert_eq!(ws.pending(), 2);
        assert!(vector.borrow().is_none());

        assert_eq!(ws.run_pending(), 2);
        assert_eq!(ws.pending(), 0);

        let v = vector.borrow_mut().take().unwrap().unwrap();
        assert!(v.approx_eq(&ws.evaluate_to_vector(&circuit, 0).unwrap(), 0.0));
        let u = unitary.borrow_mut().take().unwrap().unwrap();
        assert!(u.approx_eq(&ws.evaluate_to_unitary(&circuit).unwrap(), 0.0));
    }

    #[test]
    fn test_incremental_rejects_bad_basis_immediately() {
        let mut ws = Workspace::new(2).unwrap();
        let circuit = Circuit::new(2);
        assert!(ws
            .evaluate_to_vector_with(&circuit, 9, |_| {})
            .is_err());
        assert_eq!(ws.pending(), 0);
    }

    #[test]
    fn test_resize() {
        let mut ws = Workspace::new(3).unwrap();
        ws.circuit_mut().add("h", vec![0], 0).unwrap();
        ws.circuit_mut().add("cnot", vec![0, 2], 1).unwrap();
        ws.set_input(0b101).unwrap();

        assert_eq!(ws.resize(2).unwrap(), 1);
        assert_eq!(ws.circuit().len(), 1);
        assert_eq!(ws.input(), 0b01);
        assert!(matches!(ws.resize(0), Err(QcsError::InvalidPlacement(_))));
        assert!(matches!(
            ws.resize(11),
            Err(QcsError::TooManyQubits { qubits: 11, .. })
        ));
        assert_eq!(ws.circuit().num_qubits(), 2);
    }
}
