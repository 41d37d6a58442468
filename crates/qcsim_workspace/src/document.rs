//! Persisted workspace documents
//!
//! Gantree: L6_Workspace → Document
//!
//! A document is the JSON form of a workspace: the edited circuit plus
//! every composite gate with its matrix, source circuit and source input.
//! Loading checks the whole document before anything is registered, so a
//! malformed file never yields a half-built workspace.
//!
//! ```json
//! {
//!   "version": 1,
//!   "circuit": { "nqubits": 2, "gates": [{ "name": "h", "targets": [0], "time": 0 }] },
//!   "gates": [{
//!     "name": "F", "qubits": 1,
//!     "matrix": { "re": [[0, 1], [1, 0]], "im": [[0, 0], [0, 0]] },
//!     "circuit": { "nqubits": 1, "gates": [{ "name": "x", "targets": [0], "time": 0 }] },
//!     "input": [0]
//!   }]
//! }
//! ```

use crate::workspace::Workspace;
use log::info;
use qcsim_core::types::qubits_for_dimension;
use qcsim_core::{
    basis_index_from_bits, bits_from_basis_index, format, Circuit, ComplexMatrix, GateDefinition,
    QcsError, QcsResult,
};
use qcsim_engine::{EngineConfig, Expansion};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// Document Types
// ============================================================================

/// Matrix as separate real and imaginary row lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixDocument {
    /// Real parts, row-major
    #[serde(alias = "x")]
    pub re: Vec<Vec<f64>>,

    /// Imaginary parts, row-major
    #[serde(alias = "y")]
    pub im: Vec<Vec<f64>>,
}

impl MatrixDocument {
    /// Snapshot of `matrix`
    pub fn from_matrix(matrix: &ComplexMatrix) -> Self {
        let (re, im) = matrix.to_rows();
        Self { re, im }
    }

    /// Side length of a well-formed square matrix
    fn checked_side(&self, gate: &str) -> QcsResult<usize> {
        let side = self.re.len();
        let malformed = |what: &str| {
            QcsError::MalformedDocument(format!("gate '{}' matrix {}", gate, what))
        };
        if side == 0 {
            return Err(malformed("is empty"));
        }
        if self.im.len() != side {
            return Err(malformed("has different real and imaginary row counts"));
        }
        for (re_row, im_row) in self.re.iter().zip(&self.im) {
            if re_row.len() != im_row.len() {
                return Err(malformed("has different real and imaginary row lengths"));
            }
            if re_row.len() != side {
                return Err(malformed("is not square"));
            }
        }
        if !side.is_power_of_two() || side < 2 {
            return Err(malformed("side is not a power of two"));
        }
        Ok(side)
    }

    /// Validated conversion to a matrix
    fn to_matrix(&self, gate: &str) -> QcsResult<ComplexMatrix> {
        self.checked_side(gate)?;
        ComplexMatrix::from_rows(self.re.clone(), self.im.clone())
            .map_err(|e| QcsError::MalformedDocument(format!("gate '{}': {}", gate, e)))
    }
}

/// One composite gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDocument {
    /// Gate name
    pub name: String,

    /// Arity
    pub qubits: usize,

    /// Compiled matrix
    pub matrix: MatrixDocument,

    /// Source circuit
    pub circuit: Circuit,

    /// Source input bits, most significant first
    #[serde(default)]
    pub input: Vec<u8>,
}

impl GateDocument {
    /// Snapshot of a composite definition; `None` for built-ins
    pub fn from_definition(gate: &GateDefinition) -> Option<Self> {
        let source = gate.source()?;
        Some(Self {
            name: gate.name().to_string(),
            qubits: gate.arity(),
            matrix: MatrixDocument::from_matrix(gate.matrix()),
            circuit: source.circuit.clone(),
            input: bits_from_basis_index(source.input, source.circuit.num_qubits()),
        })
    }

    /// Structural checks that need no library
    fn validate(&self) -> QcsResult<(ComplexMatrix, usize)> {
        let side = self.matrix.checked_side(&self.name)?;
        // compare via the side so an absurd arity is never shifted
        if qubits_for_dimension(side) != Some(self.qubits) {
            return Err(QcsError::MalformedDocument(format!(
                "gate '{}' declares {} qubit(s) but its matrix side is {}",
                self.name, self.qubits, side
            )));
        }
        if self.circuit.num_qubits() != self.qubits {
            return Err(QcsError::MalformedDocument(format!(
                "gate '{}' declares {} qubit(s) but its circuit has {}",
                self.name,
                self.qubits,
                self.circuit.num_qubits()
            )));
        }
        validate_circuit(&self.circuit, &self.name)?;

        if self.input.len() > self.qubits {
            return Err(QcsError::MalformedDocument(format!(
                "gate '{}' input {:?} has more bits than its {} qubit(s)",
                self.name, self.input, self.qubits
            )));
        }
        let input = basis_index_from_bits(&self.input).map_err(|e| {
            QcsError::MalformedDocument(format!("gate '{}' input: {}", self.name, e))
        })?;
        Ok((self.matrix.to_matrix(&self.name)?, input))
    }
}

/// Whole workspace
/// Gantree: WorkspaceDocument // 저장 문서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    /// Format version
    pub version: u32,

    /// Edited circuit
    pub circuit: Circuit,

    /// Composite gates, dependencies first
    #[serde(default)]
    pub gates: Vec<GateDocument>,
}

fn validate_circuit(circuit: &Circuit, owner: &str) -> QcsResult<()> {
    circuit
        .validate()
        .map_err(|e| QcsError::MalformedDocument(format!("circuit of '{}': {}", owner, e)))
}

impl WorkspaceDocument {
    // ========================================================================
    // Serialization
    // ========================================================================

    /// Parse from JSON without validating
    pub fn from_json(json: &str) -> QcsResult<Self> {
        serde_json::from_str(json).map_err(|e| QcsError::MalformedDocument(e.to_string()))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QcsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to a file
    pub fn save(&self, path: impl AsRef<Path>) -> QcsResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from a file without validating
    pub fn load(path: impl AsRef<Path>) -> QcsResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Build a workspace, checking version, matrix shapes and gate names.
    /// Gantree: into_workspace(config) -> Result<Workspace> // 문서 적용
    pub fn into_workspace(self, config: EngineConfig) -> QcsResult<Workspace> {
        if !format::is_supported(self.version) {
            return Err(QcsError::MalformedDocument(format!(
                "unsupported version {} (supported: {:?})",
                self.version,
                format::SUPPORTED_VERSIONS
            )));
        }
        validate_circuit(&self.circuit, "workspace")?;

        let mut names = HashSet::new();
        let mut gates = Vec::with_capacity(self.gates.len());
        for gate in self.gates {
            if !names.insert(gate.name.clone()) {
                return Err(QcsError::MalformedDocument(format!(
                    "gate '{}' is defined twice",
                    gate.name
                )));
            }
            let (matrix, input) = gate.validate()?;
            gates.push((gate.name, matrix, gate.circuit, input));
        }

        let mut workspace = Workspace::from_parts(self.circuit, config)?;
        let count = gates.len();
        for (name, matrix, circuit, input) in gates {
            workspace
                .library_mut()
                .register_composite(&name, matrix, circuit, input)?;
        }

        // every placement must resolve once all composites are in
        let library = workspace.library();
        let sources = library
            .composites()
            .filter_map(GateDefinition::source)
            .map(|s| &s.circuit);
        for circuit in std::iter::once(workspace.circuit()).chain(sources) {
            for name in circuit.references() {
                library.lookup(name)?;
            }
            for placement in circuit.placements() {
                let arity = library.lookup(&placement.gate)?.arity();
                Expansion::new(circuit.num_qubits(), arity, &placement.targets).map_err(|e| {
                    QcsError::MalformedDocument(format!(
                        "placement of '{}' at t={}: {}",
                        placement.gate, placement.time, e
                    ))
                })?;
            }
        }

        info!(
            "loaded workspace: {} qubit(s), {} placement(s), {} composite gate(s)",
            workspace.circuit().num_qubits(),
            workspace.circuit().len(),
            count
        );
        Ok(workspace)
    }
}

// ============================================================================
// Workspace Persistence
// ============================================================================

impl Workspace {
    /// Snapshot as a document, composites ordered dependencies first
    pub fn to_document(&self) -> WorkspaceDocument {
        let library = self.library();
        let mut order: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for gate in library.composites() {
            let mut chain = gate
                .source()
                .map(|s| library.composite_dependencies(&s.circuit))
                .unwrap_or_default();
            chain.push(gate.name().to_string());
            for name in chain {
                if seen.insert(name.clone()) {
                    order.push(name);
                }
            }
        }

        let gates = order
            .iter()
            .filter_map(|name| library.lookup(name).ok())
            .filter_map(GateDocument::from_definition)
            .collect();

        WorkspaceDocument {
            version: format::FILE_VERSION,
            circuit: self.circuit().clone(),
            gates,
        }
    }

    /// Build from a document
    pub fn from_document(document: WorkspaceDocument, config: EngineConfig) -> QcsResult<Self> {
        document.into_workspace(config)
    }

    /// Export as JSON
    pub fn to_json(&self) -> QcsResult<String> {
        self.to_document().to_json()
    }

    /// Import from JSON with default settings
    pub fn from_json(json: &str) -> QcsResult<Self> {
        WorkspaceDocument::from_json(json)?.into_workspace(EngineConfig::default())
    }

    /// Write the workspace to a file
    pub fn save(&self, path: impl AsRef<Path>) -> QcsResult<()> {
        self.to_document().save(path)
    }

    /// Read a workspace from a file with default settings
    pub fn load(path: impl AsRef<Path>) -> QcsResult<Self> {
        WorkspaceDocument::load(path)?.into_workspace(EngineConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
