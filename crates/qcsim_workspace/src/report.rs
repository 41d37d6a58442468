//! Text output for evaluation results
//!
//! Gantree: L6_Workspace → Report
//!
//! Amplitude tables for state vectors and CSV dumps of unitaries.

use qcsim_core::{format_ket, tolerance, BasisIndex, Complex64, ComplexMatrix, ComplexVector};
use std::fmt;

/// One line of an amplitude table
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeRow {
    /// Basis index
    pub index: BasisIndex,

    /// Ket label, qubit 0 rightmost
    pub ket: String,

    /// Normalized amplitude
    pub amplitude: Complex64,

    /// |amplitude|²
    pub probability: f64,
}

impl AmplitudeRow {
    /// Check if the probability is below machine epsilon
    pub fn is_negligible(&self) -> bool {
        self.probability < tolerance::NEGLIGIBLE_PROBABILITY
    }
}

impl fmt::Display for AmplitudeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amplitude.im < 0.0 { '-' } else { '+' };
        write!(
            f,
            "{:.8}{}{:.8}i  {}  {:.4}%",
            self.amplitude.re,
            sign,
            self.amplitude.im.abs(),
            self.ket,
            self.probability * 100.0
        )
    }
}

/// Amplitude rows of `state` after normalization, optionally without the
/// negligible ones. A zero vector is reported as is.
pub fn amplitude_table(
    state: &ComplexVector,
    num_qubits: usize,
    hide_negligible: bool,
) -> Vec<AmplitudeRow> {
    state
        .normalized()
        .iter()
        .enumerate()
        .map(|(index, amplitude)| AmplitudeRow {
            index,
            ket: format_ket(index, num_qubits),
            amplitude,
            probability: amplitude.norm_sqr(),
        })
        .filter(|row| !(hide_negligible && row.is_negligible()))
        .collect()
}

/// Unitary as CSV, one row per line, entries written `a+bi` with 16 digits
pub fn matrix_csv(matrix: &ComplexMatrix) -> String {
    let mut out = String::new();
    for r in 0..matrix.rows() {
        let row: Vec<String> = (0..matrix.cols())
            .map(|c| {
                let z = matrix.get(r, c);
                let sign = if z.im < 0.0 { '-' } else { '+' };
                format!("{:.16}{}{:.16}i", z.re, sign, z.im.abs())
            })
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcsim_core::matrices;

    #[test]
    fn test_amplitude_table() {
        let state = ComplexVector::from_complex(&[
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, -1.0),
            Complex64::new(0.0, 0.0),
        ]);
        let all = amplitude_table(&state, 2, false);
        assert_eq!(all.len(), 4);
        assert!(all[1].is_negligible());

        let shown = amplitude_table(&state, 2, true);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[1].ket, "|10>");
        assert!((shown[1].probability - 0.5).abs() < 1e-12);
        assert_eq!(shown[1].to_string(), "0.00000000-0.70710678i  |10>  50.0000%");
    }

    #[test]
    fn test_matrix_csv() {
        let csv = matrix_csv(&matrices::pauli_y());
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0.0000000000000000+0.0000000000000000i,0.0000000000000000-1.0000000000000000i"
        );
    }
}
