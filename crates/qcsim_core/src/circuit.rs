//! Quantum circuit structure for QCSim
//!
//! Gantree: L1_Circuit → Circuit
//!
//! A circuit is a register size plus a bag of gate placements. Placements
//! refer to gates by name only, so a recompiled composite gate is picked up
//! by every circuit that uses it.

use crate::error::{QcsError, QcsResult};
use crate::types::{QubitId, TimeSlot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

// ============================================================================
// Placement
// ============================================================================

/// A gate bound to target qubits and a time-slot
/// Gantree: Placement // 게이트 배치
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Gate name in the library
    /// Gantree: gate: String // 게이트 이름
    #[serde(rename = "name")]
    pub gate: String,

    /// Ordered targets; the first target is the least-significant bit of
    /// the gate's sub-index
    /// Gantree: targets: Vec<QubitId> // 대상 큐비트
    pub targets: Vec<QubitId>,

    /// Ordering key; equal slots keep insertion order
    /// Gantree: time: TimeSlot // 시간 슬롯
    pub time: TimeSlot,
}

impl Placement {
    /// Create a new placement
    pub fn new(gate: impl Into<String>, targets: Vec<QubitId>, time: TimeSlot) -> Self {
        Self {
            gate: gate.into(),
            targets,
            time,
        }
    }

    /// Number of targets
    pub fn width(&self) -> usize {
        self.targets.len()
    }

    /// Lowest and highest target qubit
    pub fn range(&self) -> Option<(QubitId, QubitId)> {
        let lo = self.targets.iter().min()?;
        let hi = self.targets.iter().max()?;
        Some((*lo, *hi))
    }

    /// Check if this placement touches `qubit`
    pub fn touches(&self, qubit: QubitId) -> bool {
        self.targets.contains(&qubit)
    }

    /// Validate targets against an n-qubit register.
    ///
    /// Empty or duplicate targets are `InvalidPlacement`, targets `>= n`
    /// are `OutOfRange`.
    pub fn validate(&self, num_qubits: usize) -> QcsResult<()> {
        if self.targets.is_empty() {
            return Err(QcsError::InvalidPlacement(format!(
                "gate '{}' has no target qubits",
                self.gate
            )));
        }
        let mut seen = HashSet::with_capacity(self.targets.len());
        for &q in &self.targets {
            if q >= num_qubits {
                return Err(QcsError::out_of_range(q, num_qubits));
            }
            if !seen.insert(q) {
                return Err(QcsError::InvalidPlacement(format!(
                    "gate '{}' targets qubit {} more than once",
                    self.gate, q
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} {} {:?}", self.time, self.gate, self.targets)
    }
}

// ============================================================================
// Circuit
// ============================================================================

/// Quantum circuit
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits
    /// Gantree: num_qubits: usize // 큐비트 수
    #[serde(rename = "nqubits")]
    num_qubits: usize,

    /// Placements in insertion order
    /// Gantree: placements: Vec<Placement> // 배치 목록
    #[serde(rename = "gates", default)]
    placements: Vec<Placement>,

    /// Optional circuit name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            placements: Vec::new(),
            name: None,
        }
    }

    /// Create a circuit with a name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            num_qubits,
            placements: Vec::new(),
            name: Some(name.into()),
        }
    }

    /// Create from placements, validating each one
    pub fn from_placements(num_qubits: usize, placements: Vec<Placement>) -> QcsResult<Self> {
        let circuit = Self {
            num_qubits,
            placements,
            name: None,
        };
        circuit.validate()?;
        Ok(circuit)
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Add a placement
    /// Gantree: place(&mut, Placement) -> Result // 배치 추가
    pub fn place(&mut self, placement: Placement) -> QcsResult<()> {
        placement.validate(self.num_qubits)?;
        self.placements.push(placement);
        Ok(())
    }

    /// Add a placement from parts
    pub fn add(
        &mut self,
        gate: impl Into<String>,
        targets: Vec<QubitId>,
        time: TimeSlot,
    ) -> QcsResult<()> {
        self.place(Placement::new(gate, targets, time))
    }

    /// Remove every placement
    pub fn clear(&mut self) {
        self.placements.clear();
    }

    /// Change the register size, dropping placements that no longer fit.
    ///
    /// Returns the number of placements removed.
    pub fn resize(&mut self, num_qubits: usize) -> usize {
        let before = self.placements.len();
        self.placements
            .retain(|p| p.targets.iter().all(|&q| q < num_qubits));
        self.num_qubits = num_qubits;
        before - self.placements.len()
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Placements in insertion order
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Get circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if circuit has no placements
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of placements
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Placements stable-sorted by time-slot.
    ///
    /// Equal slots keep insertion order. Overlapping placements in one slot
    /// are left as they are.
    /// Gantree: schedule(&self) -> Vec<Placement> // 시간순 정렬
    pub fn schedule(&self) -> Vec<Placement> {
        let mut sorted = self.placements.clone();
        sorted.sort_by_key(|p| p.time);
        sorted
    }

    /// One past the last occupied time-slot
    pub fn duration(&self) -> TimeSlot {
        self.placements
            .iter()
            .map(|p| p.time.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Names of every gate referenced
    pub fn references(&self) -> BTreeSet<&str> {
        self.placements.iter().map(|p| p.gate.as_str()).collect()
    }

    /// Check if any placement uses `gate`
    pub fn uses(&self, gate: &str) -> bool {
        self.placements.iter().any(|p| p.gate == gate)
    }

    /// Count placements of `gate`
    pub fn count_gate(&self, gate: &str) -> usize {
        self.placements.iter().filter(|p| p.gate == gate).count()
    }

    /// Validate every placement against the register
    /// Gantree: validate(&self) -> Result // 검증
    pub fn validate(&self) -> QcsResult<()> {
        if self.num_qubits == 0 {
            return Err(QcsError::InvalidPlacement(
                "circuit must have at least one qubit".to_string(),
            ));
        }
        for p in &self.placements {
            p.validate(self.num_qubits)?;
        }
        Ok(())
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => writeln!(f, "Circuit '{}' ({} qubits)", name, self.num_qubits)?,
            None => writeln!(f, "Circuit ({} qubits)", self.num_qubits)?,
        }
        for p in self.schedule() {
            writeln!(f, "  {}", p)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
