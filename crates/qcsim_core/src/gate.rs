//! Gate definitions for QCSim
//!
//! Gantree: L1_Circuit → Gate
//!
//! A gate is a name, an arity k, and a dense 2^k × 2^k matrix. Multi-qubit
//! matrices are written over the packed sub-index of the placement's
//! targets: the first target is bit 0, the second bit 1, and so on.

use crate::circuit::Circuit;
use crate::complex::ComplexMatrix;
use crate::error::{QcsError, QcsResult};
use crate::types::{qubits_for_dimension, BasisIndex};
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::fmt;

// ============================================================================
// Matrix Constructors
// Gantree: matrices // 게이트 행렬
// ============================================================================

pub mod matrices {
    //! Standard gate matrices

    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn square2(a: Complex64, b: Complex64, c_: Complex64, d: Complex64) -> ComplexMatrix {
        let mut m = ComplexMatrix::zeros(2, 2);
        m.set(0, 0, a);
        m.set(0, 1, b);
        m.set(1, 0, c_);
        m.set(1, 1, d);
        m
    }

    /// Identity on `k` qubits
    pub fn identity(k: usize) -> ComplexMatrix {
        ComplexMatrix::identity(1 << k)
    }

    /// Pauli-X (NOT)
    pub fn pauli_x() -> ComplexMatrix {
        square2(c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0))
    }

    /// Pauli-Y
    pub fn pauli_y() -> ComplexMatrix {
        square2(c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0))
    }

    /// Pauli-Z
    pub fn pauli_z() -> ComplexMatrix {
        ComplexMatrix::diagonal(&[c(1.0, 0.0), c(-1.0, 0.0)])
    }

    /// Hadamard
    pub fn hadamard() -> ComplexMatrix {
        let h = FRAC_1_SQRT_2;
        square2(c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0))
    }

    /// Square root of NOT: `((1+i)/2, (1-i)/2; (1-i)/2, (1+i)/2)`
    pub fn sqrt_not() -> ComplexMatrix {
        let p = c(0.5, 0.5);
        let m = c(0.5, -0.5);
        square2(p, m, m, p)
    }

    /// Phase shift `diag(1, e^{iθ})`
    pub fn phase(theta: f64) -> ComplexMatrix {
        ComplexMatrix::diagonal(&[c(1.0, 0.0), Complex64::from_polar(1.0, theta)])
    }

    /// Rotation about X
    pub fn rx(theta: f64) -> ComplexMatrix {
        let (s, co) = (theta / 2.0).sin_cos();
        square2(c(co, 0.0), c(0.0, -s), c(0.0, -s), c(co, 0.0))
    }

    /// Rotation about Y
    pub fn ry(theta: f64) -> ComplexMatrix {
        let (s, co) = (theta / 2.0).sin_cos();
        square2(c(co, 0.0), c(-s, 0.0), c(s, 0.0), c(co, 0.0))
    }

    /// Rotation about Z
    pub fn rz(theta: f64) -> ComplexMatrix {
        ComplexMatrix::diagonal(&[
            Complex64::from_polar(1.0, -theta / 2.0),
            Complex64::from_polar(1.0, theta / 2.0),
        ])
    }

    /// Controlled version of `u`; the control is the first target.
    ///
    /// With the control as bit 0 of the sub-index, sub-index `s` maps to
    /// `u`'s index `s >> 1` when the control is set and to itself otherwise.
    pub fn controlled(u: &ComplexMatrix) -> ComplexMatrix {
        let d = u.rows();
        let mut m = ComplexMatrix::zeros(2 * d, 2 * d);
        for r in 0..2 * d {
            for col in 0..2 * d {
                if (r & 1) != (col & 1) {
                    continue;
                }
                if col & 1 == 0 {
                    if r == col {
                        m.set(r, col, c(1.0, 0.0));
                    }
                } else {
                    m.set(r, col, u.get(r >> 1, col >> 1));
                }
            }
        }
        m
    }

    /// CNOT: control = first target, flipped = second target
    pub fn cnot() -> ComplexMatrix {
        controlled(&pauli_x())
    }

    /// SWAP
    pub fn swap() -> ComplexMatrix {
        let mut m = ComplexMatrix::zeros(4, 4);
        for (r, col) in [(0, 0), (1, 2), (2, 1), (3, 3)] {
            m.set(r, col, c(1.0, 0.0));
        }
        m
    }

    /// Toffoli: controls = first two targets, flipped = third
    pub fn toffoli() -> ComplexMatrix {
        controlled(&cnot())
    }
}

// ============================================================================
// Built-in Gates
// ============================================================================

/// Built-in gate catalogue; these names are reserved
/// Gantree: BuiltinGate // 내장 게이트
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinGate {
    /// Identity
    Identity,
    /// Pauli-X
    PauliX,
    /// Pauli-Y
    PauliY,
    /// Pauli-Z
    PauliZ,
    /// Hadamard
    Hadamard,
    /// S = R2
    S,
    /// T = R4
    T,
    /// Square root of NOT
    SqrtNot,
    /// Phase π/2
    R2,
    /// Phase π/4
    R4,
    /// Phase π/8
    R8,
    /// Controlled-X
    Cnot,
    /// SWAP
    Swap,
    /// Controlled-controlled-X
    Toffoli,
}

impl BuiltinGate {
    /// Every built-in gate
    pub const ALL: [BuiltinGate; 14] = [
        BuiltinGate::Identity,
        BuiltinGate::PauliX,
        BuiltinGate::PauliY,
        BuiltinGate::PauliZ,
        BuiltinGate::Hadamard,
        BuiltinGate::S,
        BuiltinGate::T,
        BuiltinGate::SqrtNot,
        BuiltinGate::R2,
        BuiltinGate::R4,
        BuiltinGate::R8,
        BuiltinGate::Cnot,
        BuiltinGate::Swap,
        BuiltinGate::Toffoli,
    ];

    /// Library name
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinGate::Identity => "i",
            BuiltinGate::PauliX => "x",
            BuiltinGate::PauliY => "y",
            BuiltinGate::PauliZ => "z",
            BuiltinGate::Hadamard => "h",
            BuiltinGate::S => "s",
            BuiltinGate::T => "t",
            BuiltinGate::SqrtNot => "srn",
            BuiltinGate::R2 => "r2",
            BuiltinGate::R4 => "r4",
            BuiltinGate::R8 => "r8",
            BuiltinGate::Cnot => "cnot",
            BuiltinGate::Swap => "swap",
            BuiltinGate::Toffoli => "toffoli",
        }
    }

    /// Look up by library name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.name() == name)
    }

    /// Number of qubits acted on
    pub fn arity(&self) -> usize {
        match self {
            BuiltinGate::Cnot | BuiltinGate::Swap => 2,
            BuiltinGate::Toffoli => 3,
            _ => 1,
        }
    }

    /// Gate matrix
    pub fn matrix(&self) -> ComplexMatrix {
        match self {
            BuiltinGate::Identity => matrices::identity(1),
            BuiltinGate::PauliX => matrices::pauli_x(),
            BuiltinGate::PauliY => matrices::pauli_y(),
            BuiltinGate::PauliZ => matrices::pauli_z(),
            BuiltinGate::Hadamard => matrices::hadamard(),
            BuiltinGate::S | BuiltinGate::R2 => matrices::phase(PI / 2.0),
            BuiltinGate::T | BuiltinGate::R4 => matrices::phase(PI / 4.0),
            BuiltinGate::SqrtNot => matrices::sqrt_not(),
            BuiltinGate::R8 => matrices::phase(PI / 8.0),
            BuiltinGate::Cnot => matrices::cnot(),
            BuiltinGate::Swap => matrices::swap(),
            BuiltinGate::Toffoli => matrices::toffoli(),
        }
    }

    /// Full definition
    pub fn definition(&self) -> GateDefinition {
        GateDefinition {
            name: self.name().to_string(),
            arity: self.arity(),
            matrix: self.matrix(),
            kind: GateKind::Builtin,
        }
    }
}

impl fmt::Display for BuiltinGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Gate Definition
// ============================================================================

/// Where a composite gate's matrix came from
/// Gantree: CompositeSource // 합성 원본
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSource {
    /// Sub-circuit compiled into the matrix
    pub circuit: Circuit,
    /// Basis input the editor had selected when compiling
    pub input: BasisIndex,
}

/// Built-in or user-compiled
#[derive(Debug, Clone, PartialEq)]
pub enum GateKind {
    /// Immutable, reserved name
    Builtin,
    /// Compiled from a sub-circuit; replaceable by name
    Composite(CompositeSource),
}

/// A named unitary acting on `arity` qubits
/// Gantree: GateDefinition // 게이트 정의
#[derive(Debug, Clone, PartialEq)]
pub struct GateDefinition {
    name: String,
    arity: usize,
    matrix: ComplexMatrix,
    kind: GateKind,
}

impl GateDefinition {
    /// Arity `k` of a `2^k × 2^k` matrix; `k = 0` is rejected
    /// Gantree: arity_of(matrix) -> Result<usize> // 차원 검사
    pub fn arity_of(matrix: &ComplexMatrix) -> QcsResult<usize> {
        if !matrix.is_square() {
            return Err(QcsError::InvalidArity(format!(
                "matrix is {}x{}, expected square",
                matrix.rows(),
                matrix.cols()
            )));
        }
        match qubits_for_dimension(matrix.rows()) {
            Some(0) => Err(QcsError::InvalidArity(
                "gate must act on at least one qubit".to_string(),
            )),
            Some(k) => Ok(k),
            None => Err(QcsError::InvalidArity(format!(
                "matrix side {} is not a power of two",
                matrix.rows()
            ))),
        }
    }

    /// Composite definition compiled from `circuit`
    pub fn composite(
        name: impl Into<String>,
        matrix: ComplexMatrix,
        circuit: Circuit,
        input: BasisIndex,
    ) -> QcsResult<Self> {
        let name = name.into();
        let arity = Self::arity_of(&matrix)?;
        if arity != circuit.num_qubits() {
            return Err(QcsError::InvalidArity(format!(
                "composite '{}' matrix acts on {} qubits but its circuit has {}",
                name,
                arity,
                circuit.num_qubits()
            )));
        }
        Ok(Self {
            name,
            arity,
            matrix,
            kind: GateKind::Composite(CompositeSource { circuit, input }),
        })
    }

    /// Gate name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits acted on
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Gate matrix over the packed target sub-index
    pub fn matrix(&self) -> &ComplexMatrix {
        &self.matrix
    }

    /// Built-in or composite
    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    /// Check if built-in
    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, GateKind::Builtin)
    }

    /// Check if composite
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, GateKind::Composite(_))
    }

    /// Source sub-circuit for composites
    pub fn source(&self) -> Option<&CompositeSource> {
        match &self.kind {
            GateKind::Composite(src) => Some(src),
            GateKind::Builtin => None,
        }
    }

    /// Replace matrix and source of a composite in place
    pub fn replace_composite(&mut self, other: GateDefinition) -> QcsResult<()> {
        if self.is_builtin() {
            return Err(QcsError::ReservedName(self.name.clone()));
        }
        self.arity = other.arity;
        self.matrix = other.matrix;
        self.kind = other.kind;
        Ok(())
    }
}

impl fmt::Display for GateDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_builtin() { "builtin" } else { "composite" };
        write!(f, "{} ({}, {} qubit(s))", self.name, kind, self.arity)
    }
}

// ============================================================================
// Tests
// ============================================================================
