//! # QCSim Workspace
//!
//! Editing sessions, composite compilation and persisted documents.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcsim_workspace // L6: Session
//!     Workspace // 라이브러리 + 편집 회로 + 실행기
//!     Document // 버전 JSON 문서
//!     Presets // 예제 작업 공간
//!     Report // 진폭 표, 행렬 CSV
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcsim_core::prelude::*;
//! use qcsim_workspace::prelude::*;
//!
//! let mut ws = Workspace::new(3).unwrap();
//!
//! // compile a Bell-pair preparation into a 2-qubit gate
//! let bell = CircuitBuilder::new(2).h(0).cnot(0, 1).build();
//! ws.compile_composite("BELL", &bell, 0).unwrap();
//!
//! // and place it on qubits 2 and 0 of the edited circuit
//! ws.circuit_mut().add("BELL", vec![2, 0], 0).unwrap();
//! let state = ws.evaluate().unwrap();
//! assert!((state.get(0b101).re - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
//!
//! let json = ws.to_json().unwrap();
//! let restored = Workspace::from_json(&json).unwrap();
//! assert!(restored.lookup_gate("BELL").unwrap().is_composite());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Editing session (Gantree: L6_Workspace → Workspace)
pub mod workspace;

/// Persisted documents (Gantree: L6_Workspace → Document)
pub mod document;

/// Ready-made workspaces (Gantree: L6_Workspace → Presets)
pub mod presets;

/// Text output (Gantree: L6_Workspace → Report)
pub mod report;

// ============================================================================
// Re-exports
// ============================================================================

pub use document::{GateDocument, MatrixDocument, WorkspaceDocument};
pub use report::{amplitude_table, matrix_csv, AmplitudeRow};
pub use workspace::Workspace;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::document::WorkspaceDocument;
    pub use crate::presets;
    pub use crate::report::{amplitude_table, matrix_csv};
    pub use crate::workspace::Workspace;
    pub use qcsim_engine::prelude::*;
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
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_composite_equals_inlined_sub_circuit() {
        let mut ws = Workspace::new(3).unwrap();
        let sub = CircuitBuilder::new(2).h(1).cnot(1, 0).s(0).build();
        ws.compile_composite("G", &sub, 0).unwrap();

        let placed = CircuitBuilder::new(3).x(2).gate("G", &[0, 2]).build();
        // sub qubit 0 -> 0, sub qubit 1 -> 2
        let inlined = CircuitBuilder::new(3).x(2).h(2).cnot(2, 0).s(0).build();

        for basis in 0..8 {
            let a = ws.evaluate_to_vector(&placed, basis).unwrap();
            let b = ws.evaluate_to_vector(&inlined, basis).unwrap();
            assert!(a.approx_eq(&b, 1e-12), "basis {}", basis);
        }
    }

    #[test]
    fn test_recompile_visible_to_existing_placements() {
        let mut ws = Workspace::new(1).unwrap();
        ws.compile_composite("F", &CircuitBuilder::new(1).x(0).build(), 0)
            .unwrap();
        ws.circuit_mut().add("F", vec![0], 0).unwrap();
        assert_abs_diff_eq!(ws.evaluate().unwrap().get(1).re, 1.0, epsilon = 1e-12);

        ws.compile_composite("F", &CircuitBuilder::new(1).y(0).build(), 0)
            .unwrap();
        // Y|0> = i|1>
        assert_abs_diff_eq!(ws.evaluate().unwrap().get(1).im, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compile_between_turns_reaches_queued_task() {
        let mut ws = Workspace::new(1).unwrap();
        ws.compile_composite("F", &CircuitBuilder::new(1).x(0).build(), 0)
            .unwrap();
        let circuit = CircuitBuilder::new(1).h(0).gate("F", &[0]).build();

        let out = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&out);
        ws.evaluate_to_vector_with(&circuit, 0, move |r| *slot.borrow_mut() = Some(r))
            .unwrap();
        assert_eq!(ws.run_turn(), 1);

        // F becomes Z before the task reaches it: Z H |0> = |->
        ws.compile_composite("F", &CircuitBuilder::new(1).z(0).build(), 0)
            .unwrap();
        ws.run_pending();

        let v = out.borrow_mut().take().unwrap().unwrap();
        assert_abs_diff_eq!(v.get(1).re, -std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_cycle_rejected_through_workspace() {
        let mut ws = Workspace::new(1).unwrap();
        ws.compile_composite("F", &CircuitBuilder::new(1).x(0).build(), 0)
            .unwrap();
        ws.compile_composite("G", &CircuitBuilder::new(1).gate("F", &[0]).build(), 0)
            .unwrap();
        let err = ws
            .compile_composite("F", &CircuitBuilder::new(1).gate("G", &[0]).build(), 0)
            .unwrap_err();
        assert!(matches!(err, QcsError::CyclicComposite { .. }));
        assert!(err.is_library_error());
    }

    #[test]
    fn test_document_with_non_square_matrix() {
        let json = r#"{
            "version": 1,
            "circuit": { "nqubits": 1, "gates": [] },
            "gates": [{
                "name": "F", "qubits": 1,
                "matrix": { "re": [[1, 0]], "im": [[0, 0]] },
                "circuit": { "nqubits": 1, "gates": [] },
                "input": [0]
            }]
        }"#;
        let err = Workspace::from_json(json).unwrap_err();
        assert!(matches!(err, QcsError::MalformedDocument(_)));
        assert!(err.is_document_error());
    }

    #[test]
    fn test_amplitudes_of_preset() {
        let ws = presets::bell_state().unwrap();
        let rows = amplitude_table(&ws.evaluate().unwrap(), 2, true);
        let kets: Vec<_> = rows.iter().map(|r| r.ket.as_str()).collect();
        assert_eq!(kets, vec!["|00>", "|11>"]);
    }

    #[test]
    fn test_version_info() {
        assert_eq!(super::NAME, "qcsim_workspace");
        assert!(!super::VERSION.is_empty());
    }
}
