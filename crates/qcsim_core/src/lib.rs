//! # QCSim Core
//!
//! Complex buffers, gate definitions, and circuits for the QCSim quantum
//! circuit simulator.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcsim_core // L0+L1: Foundation + Circuit
//!     L0_Foundation // 기반 타입/상수/에러
//!         CoreTypes // 큐비트, 시간 슬롯, 기저 인덱스
//!         Constants // 허용 오차, 한계, 파일 버전
//!         Errors // 에러 타입
//!         ComplexAlgebra // 분리 저장 복소 벡터/행렬
//!     L1_Circuit // 회로 구조
//!         Gate // 게이트 정의 + 내장 행렬
//!         Circuit // 배치 목록
//!         CircuitBuilder // 빌더 패턴
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcsim_core::prelude::*;
//!
//! // Bell-state preparation: H on qubit 0, then CNOT 0 -> 1
//! let circuit = CircuitBuilder::new(2)
//!     .h(0)
//!     .cnot(0, 1)
//!     .build();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.duration(), 2);
//! println!("{}", circuit);
//! ```
//!
//! ## Basis Conventions
//!
//! ```rust
//! use qcsim_core::prelude::*;
//!
//! // qubit j is bit j of the basis index
//! let v = ComplexVector::basis(3, 0b011).unwrap();
//! assert_eq!(v.get(3).re, 1.0);
//! assert_eq!(format_ket(0b011, 3), "|011>");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Complex buffers (Gantree: L0_Foundation → ComplexAlgebra)
pub mod complex;

/// Gate definitions (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::{Circuit, Placement};
pub use complex::{complex_mul, ComplexMatrix, ComplexVector};
pub use constants::{format, limits, tolerance};
pub use error::{QcsError, QcsResult};
pub use gate::{matrices, BuiltinGate, CompositeSource, GateDefinition, GateKind};
pub use num_complex::Complex64;
pub use types::{
    basis_index_from_bits, bits_from_basis_index, dimension, format_ket, BasisIndex, QubitId,
    TimeSlot,
};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qcsim_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::{Circuit, Placement};
    pub use crate::complex::{ComplexMatrix, ComplexVector};
    pub use crate::error::{QcsError, QcsResult};
    pub use crate::gate::{matrices, BuiltinGate, GateDefinition, GateKind};
    pub use crate::types::{
        basis_index_from_bits, bits_from_basis_index, dimension, format_ket, BasisIndex, QubitId,
        TimeSlot,
    };
    pub use num_complex::Complex64;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
