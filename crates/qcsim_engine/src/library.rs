//! Gate library for QCSim
//!
//! Gantree: L2_Library → GateLibrary
//!
//! Owns every gate definition of a session, keyed by name. Built-ins are
//! loaded once when the library is created and can never be replaced.
//! Composites are inserted or replaced through [`GateLibrary::register_composite`]
//! only, so every placement naming a composite sees its latest matrix.

use log::{info, warn};
use qcsim_core::{
    tolerance, BasisIndex, BuiltinGate, Circuit, ComplexMatrix, GateDefinition, QcsError,
    QcsResult,
};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Registry of gate definitions
/// Gantree: GateLibrary // 게이트 저장소
#[derive(Debug, Clone)]
pub struct GateLibrary {
    /// Definitions by name
    /// Gantree: gates: BTreeMap<String,GateDefinition> // 이름 → 정의
    gates: BTreeMap<String, GateDefinition>,

    /// Tolerance for the unitarity warning on registration
    unitarity_tolerance: f64,
}

impl GateLibrary {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a library holding only the built-in gates
    /// Gantree: new() -> Self // 내장 게이트 로드
    pub fn new() -> Self {
        let gates = BuiltinGate::ALL
            .iter()
            .map(|g| (g.name().to_string(), g.definition()))
            .collect();
        Self {
            gates,
            unitarity_tolerance: tolerance::UNITARITY,
        }
    }

    /// Set the tolerance used when checking registered matrices
    pub fn with_unitarity_tolerance(mut self, tol: f64) -> Self {
        self.unitarity_tolerance = tol;
        self
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Get a definition by name
    /// Gantree: lookup(name) -> Result<&GateDefinition> // 조회
    pub fn lookup(&self, name: &str) -> QcsResult<&GateDefinition> {
        self.gates
            .get(name)
            .ok_or_else(|| QcsError::UnknownGate(name.to_string()))
    }

    /// Check if a gate with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.gates.contains_key(name)
    }

    /// Check if `name` belongs to a built-in gate
    pub fn is_reserved(name: &str) -> bool {
        BuiltinGate::parse(name).is_some()
    }

    /// All gate names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.gates.keys().map(String::as_str)
    }

    /// Built-in definitions
    pub fn builtins(&self) -> impl Iterator<Item = &GateDefinition> {
        self.gates.values().filter(|g| g.is_builtin())
    }

    /// Composite definitions
    pub fn composites(&self) -> impl Iterator<Item = &GateDefinition> {
        self.gates.values().filter(|g| g.is_composite())
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Always false: built-ins are present from construction
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    // ========================================================================
    // Composite Registration
    // ========================================================================

    /// Insert a composite gate, or replace an existing composite in place.
    ///
    /// Fails with `ReservedName` for built-in names, `InvalidArity` for a
    /// matrix that is not `2^k × 2^k` over the source circuit's qubits, and
    /// `CyclicComposite` if `source_circuit` reaches `name` through any
    /// chain of composite sources.
    /// Gantree: register_composite(name,U,circuit,input) -> Result // 합성 등록
    pub fn register_composite(
        &mut self,
        name: &str,
        matrix: ComplexMatrix,
        source_circuit: Circuit,
        source_input: BasisIndex,
    ) -> QcsResult<&GateDefinition> {
        if Self::is_reserved(name) {
            return Err(QcsError::ReservedName(name.to_string()));
        }
        if let Some(path) = self.find_cycle(name, &source_circuit) {
            return Err(QcsError::CyclicComposite {
                name: name.to_string(),
                path: path.join(" -> "),
            });
        }

        let definition = GateDefinition::composite(name, matrix, source_circuit, source_input)?;
        if !definition.matrix().is_unitary(self.unitarity_tolerance) {
            warn!(
                "composite '{}' is not unitary within {:e}; accepting as given",
                name, self.unitarity_tolerance
            );
        }

        match self.gates.get_mut(name) {
            Some(existing) => {
                existing.replace_composite(definition)?;
                info!("recompiled composite gate '{}'", name);
            }
            None => {
                info!(
                    "registered composite gate '{}' ({} qubit(s))",
                    name,
                    definition.arity()
                );
                self.gates.insert(name.to_string(), definition);
            }
        }
        self.lookup(name)
    }

    /// Remove a composite gate; built-ins cannot be removed
    pub fn remove_composite(&mut self, name: &str) -> QcsResult<GateDefinition> {
        if Self::is_reserved(name) {
            return Err(QcsError::ReservedName(name.to_string()));
        }
        self.gates
            .remove(name)
            .ok_or_else(|| QcsError::UnknownGate(name.to_string()))
    }

    // ========================================================================
    // Dependency Analysis
    // ========================================================================

    /// Composites whose source circuits place `name` directly
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        self.composites()
            .filter(|g| g.source().map_or(false, |s| s.circuit.uses(name)))
            .map(GateDefinition::name)
            .collect()
    }

    /// Composite gates that `circuit` depends on, directly or transitively
    pub fn composite_dependencies(&self, circuit: &Circuit) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        self.collect_dependencies(circuit, &mut seen, &mut order);
        order
    }

    fn collect_dependencies(
        &self,
        circuit: &Circuit,
        seen: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) {
        for gate in circuit.references() {
            let Some(source) = self.gates.get(gate).and_then(GateDefinition::source) else {
                continue;
            };
            if seen.insert(gate.to_string()) {
                self.collect_dependencies(&source.circuit, seen, order);
                order.push(gate.to_string());
            }
        }
    }

    /// Path from `name` back to itself through `circuit`, if one exists.
    ///
    /// The returned path starts and ends with `name`.
    pub fn find_cycle(&self, name: &str, circuit: &Circuit) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut path = vec![name.to_string()];
        if self.search_cycle(name, circuit, &mut visited, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn search_cycle(
        &self,
        target: &str,
        circuit: &Circuit,
        visited: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> bool {
        for gate in circuit.references() {
            if gate == target {
                path.push(gate.to_string());
                return true;
            }
            if !visited.insert(gate.to_string()) {
                continue;
            }
            if let Some(source) = self.gates.get(gate).and_then(GateDefinition::source) {
                path.push(gate.to_string());
                if self.search_cycle(target, &source.circuit, visited, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }
}

impl Default for GateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GateLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "GateLibrary ({} built-in, {} composite)",
            self.builtins().count(),
            self.composites().count()
        )?;
        for gate in self.gates.values() {
            writeln!(f, "  {}", gate)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
