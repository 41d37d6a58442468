//! # QCSim Engine
//!
//! Gate library, gate expansion and circuit evaluation.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcsim_engine // L2-L5: Library + Evaluation
//!     L2_Library // 게이트 저장소
//!         GateLibrary // 내장 + 합성 게이트
//!     L3_Expansion // 게이트 확장
//!         Expansion // 대상 큐비트 비트 배치
//!         StateBuffer // 벡터/행렬 버퍼 trait
//!     L4_Evaluator // 회로 평가
//!         Evaluator // 동기 평가
//!         EvaluationTask // 증분 평가
//!         CooperativeExecutor // 단일 스레드 협력 실행
//!     L5_Config // 엔진 설정
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcsim_core::prelude::*;
//! use qcsim_engine::prelude::*;
//!
//! let library = GateLibrary::new();
//! let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
//!
//! let state = Evaluator::new(&library).evaluate_to_vector(&circuit, 0).unwrap();
//! assert!((state.get(3).re - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
//! ```
//!
//! ## Incremental Evaluation
//!
//! ```rust
//! use qcsim_core::prelude::*;
//! use qcsim_engine::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let library = GateLibrary::new();
//! let circuit = CircuitBuilder::new(3).h(0).cnot(0, 1).cnot(1, 2).build();
//!
//! let mut executor = CooperativeExecutor::new(1);
//! let result = Rc::new(RefCell::new(None));
//! let slot = Rc::clone(&result);
//! let task = EvaluationTask::new(&circuit, ComplexVector::basis(3, 0).unwrap()).unwrap();
//! executor.submit(task, move |r| *slot.borrow_mut() = Some(r));
//!
//! while executor.run_turn(&library) > 0 {}
//! assert!(result.borrow().is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Gate library (Gantree: L2_Library → GateLibrary)
pub mod library;

/// Gate expansion (Gantree: L3_Expansion → Expansion)
pub mod expansion;

/// Synchronous evaluation (Gantree: L4_Evaluator → Evaluator)
pub mod evaluator;

/// Incremental evaluation (Gantree: L4_Evaluator → Task)
pub mod task;

/// Engine configuration (Gantree: L5_Config → EngineConfig)
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::EngineConfig;
pub use evaluator::Evaluator;
pub use expansion::{apply_to_matrix, apply_to_vector, Expansion, StateBuffer};
pub use library::GateLibrary;
pub use task::{Callback, CooperativeExecutor, EvaluationTask, Progress, TaskId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::config::EngineConfig;
    pub use crate::evaluator::Evaluator;
    pub use crate::expansion::StateBuffer;
    pub use crate::library::GateLibrary;
    pub use crate::task::{CooperativeExecutor, EvaluationTask, Progress, TaskId};
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

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use qcsim_core::prelude::*;

    #[test]
    fn test_compiled_composite_matches_inlined() {
        let mut library = GateLibrary::new();
        let sub = CircuitBuilder::new(2).h(0).cnot(0, 1).t(1).build();
        let u = Evaluator::new(&library).evaluate_to_unitary(&sub).unwrap();
        library
            .register_composite("B", u, sub.clone(), 0)
            .unwrap();

        // composite on (2, 0) vs. the same gates remapped by hand
        let with_composite = CircuitBuilder::new(3).x(1).gate("B", &[2, 0]).h(1).build();
        let inlined = CircuitBuilder::new(3)
            .x(1)
            .h(2)
            .cnot(2, 0)
            .t(0)
            .h(1)
            .build();

        let eval = Evaluator::new(&library);
        for basis in 0..8 {
            let a = eval.evaluate_to_vector(&with_composite, basis).unwrap();
            let b = eval.evaluate_to_vector(&inlined, basis).unwrap();
            assert!(a.approx_eq(&b, 1e-12), "basis {}", basis);
        }
    }

    #[test]
    fn test_recompiled_composite_seen_by_existing_circuit() {
        let mut library = GateLibrary::new();
        let circuit = CircuitBuilder::new(1).gate("F", &[0]).build();

        library
            .register_composite("F", matrices::pauli_x(), CircuitBuilder::new(1).x(0).build(), 0)
            .unwrap();
        let before = Evaluator::new(&library).evaluate_to_vector(&circuit, 0).unwrap();
        assert_abs_diff_eq!(before.get(1).re, 1.0, epsilon = 1e-12);

        let sub = CircuitBuilder::new(1).h(0).build();
        let u = Evaluator::new(&library).evaluate_to_unitary(&sub).unwrap();
        library.register_composite("F", u, sub, 0).unwrap();
        let after = Evaluator::new(&library).evaluate_to_vector(&circuit, 0).unwrap();
        assert_abs_diff_eq!(after.get(1).re, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_executor_uses_config_chunk() {
        let config = EngineConfig::new().with_chunk_size(2);
        let executor = CooperativeExecutor::from_config(&config);
        assert_eq!(executor.chunk_size(), 2);
        assert!(executor.is_idle());
    }

    #[test]
    fn test_version_info() {
        assert_eq!(super::NAME, "qcsim_engine");
        assert!(!super::VERSION.is_empty());
    }
}
