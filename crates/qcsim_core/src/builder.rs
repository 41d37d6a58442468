//! Circuit builder for QCSim
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent construction of circuits. Each gate call occupies the next
//! time-slot, so gates run in the order they are written unless a slot is
//! given explicitly with [`CircuitBuilder::gate_at`].

use crate::circuit::{Circuit, Placement};
use crate::error::QcsResult;
use crate::gate::BuiltinGate;
use crate::types::{QubitId, TimeSlot};

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
pub struct CircuitBuilder {
    /// Internal circuit being built
    /// Gantree: circuit: Circuit // 내부 회로
    circuit: Circuit,

    /// Next free time-slot
    next_time: TimeSlot,

    /// First placement error, reported by `try_build`
    error: Option<crate::error::QcsError>,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
            next_time: 0,
            error: None,
        }
    }

    /// Create with circuit name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(num_qubits, name),
            next_time: 0,
            error: None,
        }
    }

    // ========================================================================
    // Generic Placement
    // ========================================================================

    /// Place any gate by name at the next time-slot
    /// Gantree: gate(self, name, targets) -> Self // 게이트 추가
    pub fn gate(self, name: &str, targets: &[QubitId]) -> Self {
        let time = self.next_time;
        self.gate_at(name, targets, time)
    }

    /// Place a gate at an explicit time-slot.
    ///
    /// The cursor moves past `time`, so later calls land after it.
    pub fn gate_at(mut self, name: &str, targets: &[QubitId], time: TimeSlot) -> Self {
        let placement = Placement::new(name, targets.to_vec(), time);
        if let Err(e) = self.circuit.place(placement) {
            self.error.get_or_insert(e);
        }
        self.next_time = self.next_time.max(time.saturating_add(1));
        self
    }

    /// Leave an empty time-slot
    pub fn barrier_step(mut self) -> Self {
        self.next_time = self.next_time.saturating_add(1);
        self
    }

    fn builtin(self, gate: BuiltinGate, targets: &[QubitId]) -> Self {
        self.gate(gate.name(), targets)
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Add Hadamard gate
    /// Gantree: h(self, q) -> Self // H 추가
    pub fn h(self, qubit: QubitId) -> Self {
        self.builtin(BuiltinGate::Hadamard, &[qubit])
    }

    /// Add Pauli-X gate
    pub fn x(self, qubit: QubitId) -> Self {
        self.builtin(BuiltinGate::PauliX, &[qubit])
    }

    /// Add Pauli-Y gate
    pub fn y(self, qubit: QubitId) -> Self {
        self.builtin(BuiltinGate::PauliY, &[qubit])
    }

    /// Add Pauli-Z gate
    pub fn z(self, qubit: QubitId) -> Self {
        self.builtin(BuiltinGate::PauliZ, &[qubit])
    }

    /// Add S gate
    pub fn s(self, qubit: QubitId) -> Self {
        self.builtin(BuiltinGate::S, &[qubit])
    }

    /// Add T gate
    pub fn t(self, qubit: QubitId) -> Self {
        self.builtin(BuiltinGate::T, &[qubit])
    }

    /// Add square-root-of-NOT gate
    pub fn srn(self, qubit: QubitId) -> Self {
        self.builtin(BuiltinGate::SqrtNot, &[qubit])
    }

    /// Hadamard on every qubit, all in one time-slot
    pub fn h_layer(self) -> Self {
        let time = self.next_time;
        (0..self.circuit.num_qubits()).fold(self, |b, q| b.gate_at("h", &[q], time))
    }

    // ========================================================================
    // Multi-Qubit Gates
    // ========================================================================

    /// Add CNOT (control, target)
    /// Gantree: cnot(self, c, t) -> Self // CNOT 추가
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.builtin(BuiltinGate::Cnot, &[control, target])
    }

    /// Add SWAP
    pub fn swap(self, a: QubitId, b: QubitId) -> Self {
        self.builtin(BuiltinGate::Swap, &[a, b])
    }

    /// Add Toffoli (control, control, target)
    pub fn toffoli(self, c1: QubitId, c2: QubitId, target: QubitId) -> Self {
        self.builtin(BuiltinGate::Toffoli, &[c1, c2, target])
    }

    /// CNOT chain 0→1→…→n-1
    pub fn cx_chain(self) -> Self {
        let n = self.circuit.num_qubits();
        (0..n.saturating_sub(1)).fold(self, |b, q| b.cnot(q, q + 1))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Finish, silently dropping invalid placements
    /// Gantree: build(self) -> Circuit // 회로 생성
    pub fn build(self) -> Circuit {
        self.circuit
    }

    /// Finish, reporting the first invalid placement
    pub fn try_build(self) -> QcsResult<Circuit> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.circuit),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
