//! Incremental evaluation for QCSim
//!
//! Gantree: L4_Evaluator → Task
//!
//! An [`EvaluationTask`] is a resumable evaluation: a sorted schedule, a
//! cursor and the one buffer in flight. It never holds the library; each
//! [`EvaluationTask::step`] borrows it, so composites registered between
//! steps are seen by the placements applied afterwards.
//!
//! [`CooperativeExecutor`] interleaves many tasks on one thread. Every
//! [`CooperativeExecutor::run_turn`] advances each queued task by one chunk
//! and hands finished results to their callbacks.

use crate::config::EngineConfig;
use crate::evaluator::apply_placement;
use crate::expansion::StateBuffer;
use crate::library::GateLibrary;
use log::debug;
use qcsim_core::{dimension, Circuit, Placement, QcsError, QcsResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ============================================================================
// Progress
// ============================================================================

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    /// More placements remain
    Pending {
        /// Placements applied so far
        applied: usize,
        /// Placements in the schedule
        total: usize,
    },
    /// Every placement has been applied
    Done,
}

impl Progress {
    /// Check if finished
    pub fn is_done(&self) -> bool {
        matches!(self, Progress::Done)
    }
}

// ============================================================================
// Evaluation Task
// ============================================================================

/// Resumable evaluation of one circuit
/// Gantree: EvaluationTask<B> // 증분 평가 상태
#[derive(Debug, Clone)]
pub struct EvaluationTask<B> {
    /// Placements in time-slot order
    schedule: Vec<Placement>,

    /// Index of the next placement to apply
    cursor: usize,

    /// Register size
    num_qubits: usize,

    /// Buffer in flight
    buffer: B,
}

impl<B: StateBuffer> EvaluationTask<B> {
    /// Prepare `circuit` for evaluation on `initial`
    pub fn new(circuit: &Circuit, initial: B) -> QcsResult<Self> {
        let n = circuit.num_qubits();
        let buffer_qubits = initial.num_qubits()?;
        if buffer_qubits != n {
            return Err(QcsError::DimensionMismatch {
                expected: dimension(n),
                actual: dimension(buffer_qubits),
            });
        }
        Ok(Self {
            schedule: circuit.schedule(),
            cursor: 0,
            num_qubits: n,
            buffer: initial,
        })
    }

    /// Apply up to `max_gates` placements (at least one).
    ///
    /// A failing placement stops the step: placements before it in the chunk
    /// stay applied and the cursor rests on the failing one.
    /// Gantree: step(library, max_gates) -> Result<Progress> // 부분 적용
    pub fn step(&mut self, library: &GateLibrary, max_gates: usize) -> QcsResult<Progress> {
        let end = (self.cursor + max_gates.max(1)).min(self.schedule.len());
        while self.cursor < end {
            let placement = &self.schedule[self.cursor];
            self.buffer = apply_placement(library, placement, self.num_qubits, &self.buffer)?;
            self.cursor += 1;
        }
        Ok(self.progress())
    }

    /// Current progress
    pub fn progress(&self) -> Progress {
        if self.is_done() {
            Progress::Done
        } else {
            Progress::Pending {
                applied: self.cursor,
                total: self.schedule.len(),
            }
        }
    }

    /// Check if every placement has been applied
    pub fn is_done(&self) -> bool {
        self.cursor >= self.schedule.len()
    }

    /// Placements applied so far
    pub fn applied(&self) -> usize {
        self.cursor
    }

    /// Placements in the schedule
    pub fn total(&self) -> usize {
        self.schedule.len()
    }

    /// Final buffer; `EvaluationPending` if placements remain
    pub fn finish(self) -> QcsResult<B> {
        if !self.is_done() {
            return Err(QcsError::EvaluationPending {
                applied: self.cursor,
                total: self.schedule.len(),
            });
        }
        Ok(self.buffer)
    }

    /// Step to completion
    pub fn run(mut self, library: &GateLibrary) -> QcsResult<B> {
        let remaining = self.schedule.len() - self.cursor;
        self.step(library, remaining)?;
        self.finish()
    }
}

// ============================================================================
// Cooperative Executor
// ============================================================================

/// Handle for a submitted task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Completion callback, invoked exactly once
pub type Callback<B> = Box<dyn FnOnce(QcsResult<B>)>;

/// Object-safe view of a queued task
trait Job {
    fn id(&self) -> TaskId;

    /// Advance one chunk; true once the callback has fired
    fn turn(&mut self, library: &GateLibrary, chunk_size: usize) -> bool;
}

struct PendingJob<B> {
    id: TaskId,
    task: Option<EvaluationTask<B>>,
    callback: Option<Callback<B>>,
}

impl<B: StateBuffer> PendingJob<B> {
    fn complete(&mut self, result: QcsResult<B>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<B: StateBuffer> Job for PendingJob<B> {
    fn id(&self) -> TaskId {
        self.id
    }

    fn turn(&mut self, library: &GateLibrary, chunk_size: usize) -> bool {
        let Some(task) = self.task.as_mut() else {
            return true;
        };
        match task.step(library, chunk_size) {
            Ok(Progress::Pending { applied, total }) => {
                debug!("{}: {}/{} placements applied", self.id, applied, total);
                false
            }
            Ok(Progress::Done) => {
                debug!("{}: done", self.id);
                if let Some(task) = self.task.take() {
                    self.complete(task.finish());
                }
                true
            }
            Err(e) => {
                debug!("{}: failed: {}", self.id, e);
                self.task = None;
                self.complete(Err(e));
                true
            }
        }
    }
}

/// Single-threaded round-robin runner for evaluation tasks
/// Gantree: CooperativeExecutor // 협력 스케줄러
pub struct CooperativeExecutor {
    /// Tasks awaiting their next chunk
    queue: VecDeque<Box<dyn Job>>,

    /// Placements per task per turn
    chunk_size: usize,

    next_id: u64,
}

impl CooperativeExecutor {
    /// Executor applying `chunk_size` placements per task per turn
    pub fn new(chunk_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            chunk_size: chunk_size.max(1),
            next_id: 0,
        }
    }

    /// Executor using `config.chunk_size`
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.chunk_size)
    }

    /// Placements per task per turn
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Change the chunk size for subsequent turns
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
    }

    /// Queue `task`; `callback` receives its result when it completes
    /// Gantree: submit(task, callback) -> TaskId // 작업 등록
    pub fn submit<B, F>(&mut self, task: EvaluationTask<B>, callback: F) -> TaskId
    where
        B: StateBuffer + 'static,
        F: FnOnce(QcsResult<B>) + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        debug!("{}: queued with {} placement(s)", id, task.total());
        self.queue.push_back(Box::new(PendingJob {
            id,
            task: Some(task),
            callback: Some(Box::new(callback)),
        }));
        id
    }

    /// Advance every queued task by one chunk; returns tasks still pending
    /// Gantree: run_turn(library) -> usize // 한 차례 실행
    pub fn run_turn(&mut self, library: &GateLibrary) -> usize {
        for _ in 0..self.queue.len() {
            let Some(mut job) = self.queue.pop_front() else {
                break;
            };
            if !job.turn(library, self.chunk_size) {
                self.queue.push_back(job);
            }
        }
        self.queue.len()
    }

    /// Run turns until the queue is empty; returns the number of turns
    pub fn run_until_idle(&mut self, library: &GateLibrary) -> usize {
        let mut turns = 0;
        while !self.queue.is_empty() {
            self.run_turn(library);
            turns += 1;
        }
        turns
    }

    /// Tasks still queued
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Ids of tasks still queued, in run order
    pub fn pending_ids(&self) -> Vec<TaskId> {
        self.queue.iter().map(|job| job.id()).collect()
    }

    /// Check if nothing is queued
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for CooperativeExecutor {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl fmt::Debug for CooperativeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CooperativeExecutor")
            .field("pending", &self.pending_ids())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
