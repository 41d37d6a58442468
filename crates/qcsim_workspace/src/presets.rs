//! Ready-made workspaces
//!
//! Gantree: L6_Workspace → Presets

use crate::workspace::Workspace;
use qcsim_core::{CircuitBuilder, QcsResult, QubitId};
use qcsim_engine::EngineConfig;

/// Bell pair: H on qubit 0, then CNOT 0 → 1
pub fn bell_state() -> QcsResult<Workspace> {
    let circuit = CircuitBuilder::with_name(2, "Bell State")
        .h(0)
        .cnot(0, 1)
        .try_build()?;
    Workspace::from_parts(circuit, EngineConfig::default())
}

/// n-qubit GHZ state: H on qubit 0, then a CNOT chain
pub fn ghz(num_qubits: usize) -> QcsResult<Workspace> {
    let circuit = CircuitBuilder::with_name(num_qubits, "GHZ")
        .h(0)
        .cx_chain()
        .try_build()?;
    Workspace::from_parts(circuit, EngineConfig::default())
}

/// Toffoli on (0, 1, 2) with both controls set in the input
pub fn toffoli() -> QcsResult<Workspace> {
    let circuit = CircuitBuilder::with_name(3, "Toffoli")
        .toffoli(0, 1, 2)
        .try_build()?;
    let mut workspace = Workspace::from_parts(circuit, EngineConfig::default())?;
    workspace.set_input(0b011)?;
    Ok(workspace)
}

/// Controlled phase π/2 from built-ins: T on both qubits, then T† on the
/// target between two CNOTs
fn controlled_s(builder: CircuitBuilder, control: QubitId, target: QubitId) -> CircuitBuilder {
    builder
        .t(control)
        .t(target)
        .cnot(control, target)
        // T† = Z S T
        .z(target)
        .s(target)
        .t(target)
        .cnot(control, target)
}

/// Controlled phase through an ancilla in |0>: the ancilla is set exactly
/// when both qubits are, picks up `phase` and is cleared again
fn controlled_phase(
    builder: CircuitBuilder,
    phase: &str,
    control: QubitId,
    target: QubitId,
    ancilla: QubitId,
) -> CircuitBuilder {
    builder
        .toffoli(control, target, ancilla)
        .gate(phase, &[ancilla])
        .toffoli(control, target, ancilla)
}

/// Two-qubit quantum Fourier transform, qubit 1 most significant
pub fn qft2() -> QcsResult<Workspace> {
    let builder = CircuitBuilder::with_name(2, "2 Qubit QFT").h(1);
    let circuit = controlled_s(builder, 0, 1).h(0).swap(0, 1).try_build()?;
    Workspace::from_parts(circuit, EngineConfig::default())
}

/// Four-qubit quantum Fourier transform on qubits 0..4, qubit 3 most
/// significant. Qubit 4 is an ancilla that starts and ends in |0>; it carries
/// the controlled r2/r4/r8 phases, since controlled-r8 has no exact
/// ancilla-free form over the built-in gates.
pub fn qft4() -> QcsResult<Workspace> {
    const ANCILLA: QubitId = 4;
    const PHASES: [&str; 3] = ["r2", "r4", "r8"];

    let mut builder = CircuitBuilder::with_name(5, "4 Qubit QFT");
    for target in (0..4).rev() {
        builder = builder.h(target);
        for (distance, phase) in (1..=target).zip(PHASES) {
            builder = controlled_phase(builder, phase, target - distance, target, ANCILLA);
        }
    }
    let circuit = builder.swap(0, 3).swap(1, 2).try_build()?;
    Workspace::from_parts(circuit, EngineConfig::default())
}

/// Grover search over two qubits with the oracle marking |11>; a single
/// iteration lands on the marked state
pub fn grover() -> QcsResult<Workspace> {
    // CZ as H CNOT H on the second qubit
    let cz = |b: CircuitBuilder| b.h(1).cnot(0, 1).h(1);

    let builder = CircuitBuilder::with_name(2, "Grover's Algorithm").h(0).h(1);
    let builder = cz(builder).h(0).h(1).x(0).x(1);
    let circuit = cz(builder).x(0).x(1).h(0).h(1).try_build()?;
    Workspace::from_parts(circuit, EngineConfig::default())
}

/// Teleport qubit 0 onto qubit 2 through a Bell pair on qubits 1 and 2.
/// Measurement-controlled corrections are deferred to CNOT and CZ.
/// The input sends |1>.
pub fn teleportation() -> QcsResult<Workspace> {
    let circuit = CircuitBuilder::with_name(3, "Quantum Teleportation")
        .h(1)
        .cnot(1, 2)
        .cnot(0, 1)
        .h(0)
        .cnot(1, 2)
        .h(2)
        .cnot(0, 2)
        .h(2)
        .try_build()?;
    let mut workspace = Workspace::from_parts(circuit, EngineConfig::default())?;
    workspace.set_input(0b001)?;
    Ok(workspace)
}

/// Preset by display name
pub fn by_name(name: &str) -> Option<QcsResult<Workspace>> {
    match name {
        "Toffoli" => Some(toffoli()),
        "Bell State" => Some(bell_state()),
        "2 Qubit QFT" => Some(qft2()),
        "4 Qubit QFT" => Some(qft4()),
        "Grover's Algorithm" => Some(grover()),
        "Quantum Teleportation" => Some(teleportation()),
        "GHZ" => Some(ghz(3)),
        _ => None,
    }
}

/// Display names accepted by [`by_name`]
pub const NAMES: &[&str] = &[
    "Toffoli",
    "Bell State",
    "2 Qubit QFT",
    "4 Qubit QFT",
    "Grover's Algorithm",
    "Quantum Teleportation",
    "GHZ",
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qcsim_core::{CircuitBuilder, Complex64, ComplexVector, QcsError};
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4, PI};

    /// Amplitude of |y> in the n-point discrete Fourier transform of |x>
    fn dft(x: usize, y: usize, n: usize) -> Complex64 {
        let angle = 2.0 * PI * ((x * y) % n) as f64 / n as f64;
        Complex64::from_polar(1.0 / (n as f64).sqrt(), angle)
    }

    #[test]
    fn test_bell() {
        let state = bell_state().unwrap().evaluate().unwrap();
        assert_abs_diff_eq!(state.get(0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(state.get(3).re, FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_ghz() {
        let state = ghz(4).unwrap().evaluate().unwrap();
        assert_abs_diff_eq!(state.get(0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(state.get(0b1111).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_abs_diff_eq!(state.norm2(), 1.0, epsilon = 1e-12);
        assert!(matches!(ghz(0), Err(QcsError::OutOfRange { .. })));
    }

    #[test]
    fn test_toffoli() {
        let ws = toffoli().unwrap();
        assert_eq!(ws.input(), 0b011);
        let state = ws.evaluate().unwrap();
        assert!(state.approx_eq(&ComplexVector::basis(3, 0b111).unwrap(), 1e-12));
    }

    #[test]
    fn test_by_name() {
        for name in NAMES {
            assert!(by_name(name).unwrap().is_ok(), "{}", name);
        }
        assert!(by_name("Teleport").is_none());
        assert!(by_name("bell state").is_none());
    }

    #[test]
    fn test_qft2_matches_dft() {
        let ws = qft2().unwrap();
        let state = ws.evaluate().unwrap();
        for y in 0..4 {
            assert_abs_diff_eq!(state.get(y).re, 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(state.get(y).im, 0.0, epsilon = 1e-12);
        }

        for x in 0..4 {
            let state = ws.evaluate_to_vector(ws.circuit(), x).unwrap();
            for y in 0..4 {
                assert!((state.get(y) - dft(x, y, 4)).norm() < 1e-12, "x={} y={}", x, y);
            }
        }
    }

    #[test]
    fn test_qft4_matches_dft() {
        let ws = qft4().unwrap();
        assert_eq!(ws.circuit().num_qubits(), 5);

        for x in [0, 1, 6, 11, 15] {
            let state = ws.evaluate_to_vector(ws.circuit(), x).unwrap();
            for y in 0..16 {
                assert!((state.get(y) - dft(x, y, 16)).norm() < 1e-12, "x={} y={}", x, y);
                // ancilla returned to |0>
                assert!(state.get(16 + y).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_grover_finds_marked_state() {
        let state = grover().unwrap().evaluate().unwrap();
        assert_abs_diff_eq!(state.get(0b11).norm_sqr(), 1.0, epsilon = 1e-12);
        for y in 0..3 {
            assert!(state.get(y).norm() < 1e-12);
        }
    }

    #[test]
    fn test_teleportation_moves_state_to_last_qubit() {
        let ws = teleportation().unwrap();
        let state = ws.evaluate().unwrap();
        let p_one: f64 = (4..8).map(|i| state.get(i).norm_sqr()).sum();
        assert_abs_diff_eq!(p_one, 1.0, epsilon = 1e-12);

        // send T H |0> instead: qubit 2 ends in it, qubits 0 and 1 uniform
        let mut circuit = CircuitBuilder::new(3).h(0).t(0).build();
        for p in ws.circuit().placements() {
            circuit.add(&p.gate, p.targets.clone(), p.time + 2).unwrap();
        }
        let state = ws.evaluate_to_vector(&circuit, 0).unwrap();
        let alpha = Complex64::new(0.5 * FRAC_1_SQRT_2, 0.0);
        let beta = Complex64::from_polar(0.5 * FRAC_1_SQRT_2, FRAC_PI_4);
        for low in 0..4 {
            assert!((state.get(low) - alpha).norm() < 1e-12, "low={}", low);
            assert!((state.get(4 | low) - beta).norm() < 1e-12, "low={}", low);
        }
    }
}
