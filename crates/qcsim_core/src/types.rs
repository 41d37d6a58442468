//! Core types for QCSim
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases and basis-index helpers shared by every crate.
//! Qubit j of basis index i is bit j of i (qubit 0 is least significant).

use crate::error::{QcsError, QcsResult};

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Time-slot of a placement; only used for ordering
/// Gantree: TimeSlot // pub type TimeSlot = usize
pub type TimeSlot = usize;

/// Index into the 2^n computational basis
/// Gantree: BasisIndex // pub type BasisIndex = usize
pub type BasisIndex = usize;

// ============================================================================
// Register Helpers
// ============================================================================

/// Dimension 2^n of an n-qubit register
#[inline]
pub fn dimension(num_qubits: usize) -> usize {
    1usize << num_qubits
}

/// Inverse of [`dimension`]: returns `Some(n)` if `dim == 2^n`
#[inline]
pub fn qubits_for_dimension(dim: usize) -> Option<usize> {
    if dim.is_power_of_two() {
        Some(dim.trailing_zeros() as usize)
    } else {
        None
    }
}

/// Value of qubit `qubit` in basis state `index`
#[inline]
pub fn qubit_value(index: BasisIndex, qubit: QubitId) -> u8 {
    ((index >> qubit) & 1) as u8
}

/// Validate that `index` addresses an n-qubit basis state
pub fn check_basis_index(index: BasisIndex, num_qubits: usize) -> QcsResult<()> {
    let dim = dimension(num_qubits);
    if index >= dim {
        return Err(QcsError::out_of_range(index, dim));
    }
    Ok(())
}

// ============================================================================
// Bit Lists
// ============================================================================

/// Build a basis index from a bit list written most-significant first.
///
/// `[0, 1, 1]` is qubit 2 = 0, qubit 1 = 1, qubit 0 = 1, i.e. index 3.
pub fn basis_index_from_bits(bits: &[u8]) -> QcsResult<BasisIndex> {
    if bits.len() >= usize::BITS as usize {
        return Err(QcsError::out_of_range(bits.len(), usize::BITS as usize));
    }
    bits.iter().try_fold(0usize, |acc, &b| match b {
        0 | 1 => Ok((acc << 1) | b as usize),
        other => Err(QcsError::InvalidPlacement(format!(
            "basis input bit must be 0 or 1, got {}",
            other
        ))),
    })
}

/// Inverse of [`basis_index_from_bits`] for an n-qubit register
pub fn bits_from_basis_index(index: BasisIndex, num_qubits: usize) -> Vec<u8> {
    (0..num_qubits)
        .rev()
        .map(|q| qubit_value(index, q))
        .collect()
}

/// Ket label for a basis state, qubit 0 rightmost (e.g. `|011>`)
pub fn format_ket(index: BasisIndex, num_qubits: usize) -> String {
    let bits: String = bits_from_basis_index(index, num_qubits)
        .into_iter()
        .map(|b| if b == 1 { '1' } else { '0' })
        .collect();
    format!("|{}>", bits)
}

// ============================================================================
// Tests
// ============================================================================
