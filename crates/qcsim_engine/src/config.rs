//! Engine configuration for QCSim
//!
//! Gantree: L5_Config → EngineConfig
//!
//! Tunables shared by the evaluator, the gate library and the cooperative
//! executor.

use qcsim_core::{limits, tolerance, QcsError, QcsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine configuration
/// Gantree: EngineConfig // 엔진 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Placements applied per task per cooperative turn
    pub chunk_size: usize,

    /// Largest register the dense buffers may hold
    pub max_qubits: usize,

    /// Allowed drift of the output norm before a warning is logged
    pub normalize_tolerance: f64,

    /// Tolerance for the unitarity check on registered composites
    pub unitarity_tolerance: f64,
}

impl EngineConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Default configuration
    pub fn new() -> Self {
        Self {
            chunk_size: limits::DEFAULT_CHUNK_SIZE,
            max_qubits: limits::DEFAULT_MAX_QUBITS,
            normalize_tolerance: tolerance::NORM,
            unitarity_tolerance: tolerance::UNITARITY,
        }
    }

    /// Limits matching the interactive editor (1..=10 qubits)
    pub fn editor() -> Self {
        Self::new().with_max_qubits(limits::EDITOR_MAX_QUBITS)
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set register limit
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set norm tolerance
    pub fn with_normalize_tolerance(mut self, tol: f64) -> Self {
        self.normalize_tolerance = tol;
        self
    }

    /// Set unitarity tolerance
    pub fn with_unitarity_tolerance(mut self, tol: f64) -> Self {
        self.unitarity_tolerance = tol;
        self
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    /// Gantree: validate() -> Result<()> // 검증
    pub fn validate(&self) -> QcsResult<()> {
        if self.chunk_size == 0 {
            return Err(QcsError::InvalidConfig(
                "chunk_size must be > 0".to_string(),
            ));
        }

        // 2^max_qubits must fit in usize with room for a square buffer
        let bound = (usize::BITS / 2) as usize;
        if self.max_qubits == 0 || self.max_qubits >= bound {
            return Err(QcsError::InvalidConfig(format!(
                "max_qubits must be in [1, {}), got {}",
                bound, self.max_qubits
            )));
        }

        for (name, value) in [
            ("normalize_tolerance", self.normalize_tolerance),
            ("unitarity_tolerance", self.unitarity_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QcsError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Parse and validate from JSON
    pub fn from_json(json: &str) -> QcsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> QcsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EngineConfig:")?;
        writeln!(f, "  chunk_size: {}", self.chunk_size)?;
        writeln!(f, "  max_qubits: {}", self.max_qubits)?;
        writeln!(f, "  normalize_tolerance: {:e}", self.normalize_tolerance)?;
        write!(f, "  unitarity_tolerance: {:e}", self.unitarity_tolerance)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.chunk_size, 1);
        assert_eq!(config.max_qubits, 16);
        assert_eq!(config.normalize_tolerance, 1e-10);
        assert_eq!(config.unitarity_tolerance, 1e-8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_editor_limits() {
        assert_eq!(EngineConfig::editor().max_qubits, 10);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_chunk_size(4)
            .with_max_qubits(8)
            .with_normalize_tolerance(1e-6);
        assert_eq!(config.chunk_size, 4);
        assert_eq!(config.max_qubits, 8);
        assert_eq!(config.normalize_tolerance, 1e-6);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            EngineConfig::new().with_chunk_size(0).validate(),
            Err(QcsError::InvalidConfig(_))
        ));
        assert!(EngineConfig::new().with_max_qubits(0).validate().is_err());
        assert!(EngineConfig::new().with_max_qubits(64).validate().is_err());
        assert!(EngineConfig::new()
            .with_unitarity_tolerance(f64::NAN)
            .validate()
            .is_err());
        assert!(EngineConfig::new()
            .with_normalize_tolerance(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_json() {
        let config = EngineConfig::new().with_chunk_size(3);
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);

        // missing fields take defaults
        let partial = EngineConfig::from_json(r#"{"max_qubits": 5}"#).unwrap();
        assert_eq!(partial.max_qubits, 5);
        assert_eq!(partial.chunk_size, 1);

        assert!(matches!(
            EngineConfig::from_json(r#"{"chunk_size": 0}"#),
            Err(QcsError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(QcsError::JsonError(_))
        ));
    }
}
