//! Constants for QCSim
//!
//! Gantree: L0_Foundation → Constants
//!
//! Numerical tolerances, register limits, and document format version.

// ============================================================================
// Numerical Tolerances
// Gantree: tolerance // 수치 허용 오차
// ============================================================================

pub mod tolerance {
    //! Floating-point tolerances used across the simulator

    /// Default tolerance for norm checks after evaluation
    /// Gantree: NORM: f64 = 1e-10
    pub const NORM: f64 = 1e-10;

    /// Default tolerance for `U†U = I` checks on registered matrices
    /// Gantree: UNITARITY: f64 = 1e-8
    pub const UNITARITY: f64 = 1e-8;

    /// Amplitudes with squared magnitude below this are "impossible"
    pub const NEGLIGIBLE_PROBABILITY: f64 = f64::EPSILON;
}

// ============================================================================
// Register Limits
// Gantree: limits // 레지스터 한계
// ============================================================================

pub mod limits {
    //! Size limits for the dense representation

    /// Default upper bound on register size (2^16 amplitudes)
    pub const DEFAULT_MAX_QUBITS: usize = 16;

    /// Largest register the editor offers
    pub const EDITOR_MAX_QUBITS: usize = 10;

    /// Default number of placements applied per cooperative turn
    pub const DEFAULT_CHUNK_SIZE: usize = 1;
}

// ============================================================================
// Document Format
// ============================================================================

pub mod format {
    //! Persisted workspace format

    /// Current document format version
    pub const FILE_VERSION: u32 = 1;

    /// Versions this build can read
    pub const SUPPORTED_VERSIONS: &[u32] = &[1];

    /// Check whether a document version can be loaded
    pub fn is_supported(version: u32) -> bool {
        SUPPORTED_VERSIONS.contains(&version)
    }
}

// ============================================================================
// Tests
// ============================================================================
