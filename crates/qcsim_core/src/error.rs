//! Error types for QCSim
//!
//! Gantree: L0_Foundation → Errors
//!
//! Every failure the simulator can report is a distinct, recoverable
//! variant of [`QcsError`]. Nothing in the core panics on bad input.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QCSim
/// Gantree: QcsError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QcsError {
    // ========================================================================
    // Gate Library Errors
    // ========================================================================
    /// Gate name not present in the library
    /// Gantree: UnknownGate(String) // 미등록 게이트
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Attempt to redefine or remove a built-in gate
    /// Gantree: ReservedName(String) // 예약된 이름
    #[error("Gate name '{0}' is reserved for a built-in gate")]
    ReservedName(String),

    /// Zero arity, or matrix side that is not 2^k
    /// Gantree: InvalidArity{{..}} // 차원 오류
    #[error("Invalid arity: {0}")]
    InvalidArity(String),

    /// Composite gate whose source circuit references itself
    /// Gantree: CyclicComposite(String) // 순환 참조
    #[error("Composite gate '{name}' references itself via {path}")]
    CyclicComposite { name: String, path: String },

    // ========================================================================
    // Placement Errors
    // ========================================================================
    /// Duplicate targets or target count not equal to gate arity
    /// Gantree: InvalidPlacement(String) // 배치 오류
    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    /// Target qubit or basis index outside the register
    /// Gantree: OutOfRange{{index,limit}} // 범위 초과
    #[error("Index {index} out of range: must be < {limit}")]
    OutOfRange { index: usize, limit: usize },

    // ========================================================================
    // Buffer Errors
    // ========================================================================
    /// Buffer shape does not match what the operation expects
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Register larger than the configured dense limit
    #[error("{qubits} qubits exceeds the configured maximum of {max}")]
    TooManyQubits { qubits: usize, max: usize },

    // ========================================================================
    // Evaluation Errors
    // ========================================================================
    /// Result requested before an incremental evaluation finished
    #[error("Evaluation still pending: {applied}/{total} placements applied")]
    EvaluationPending { applied: usize, total: usize },

    // ========================================================================
    // Document / Configuration Errors
    // ========================================================================
    /// Persisted state failed version or shape validation
    /// Gantree: MalformedDocument(String) // 문서 오류
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),
}

/// Result type alias for QCSim operations
/// Gantree: QcsResult<T> // type alias
pub type QcsResult<T> = Result<T, QcsError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QcsError {
    fn from(err: serde_json::Error) -> Self {
        QcsError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for QcsError {
    fn from(err: std::io::Error) -> Self {
        QcsError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QcsError {
    /// Shorthand for an out-of-range index
    pub fn out_of_range(index: usize, limit: usize) -> Self {
        QcsError::OutOfRange { index, limit }
    }

    /// Check if error comes from the gate library
    pub fn is_library_error(&self) -> bool {
        matches!(
            self,
            QcsError::UnknownGate(_)
                | QcsError::ReservedName(_)
                | QcsError::InvalidArity(_)
                | QcsError::CyclicComposite { .. }
        )
    }

    /// Check if error describes a bad placement
    pub fn is_placement_error(&self) -> bool {
        matches!(
            self,
            QcsError::InvalidPlacement(_) | QcsError::OutOfRange { .. }
        )
    }

    /// Check if error comes from loading persisted state
    pub fn is_document_error(&self) -> bool {
        matches!(self, QcsError::MalformedDocument(_) | QcsError::JsonError(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
