//! Deterministic probe fakes for exercising the tracers without touching
//! the host. Each fake replays a script and counts how often it was asked.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::kernel::probe::{
    FaultCounters, FaultDiagnostics, FaultStats, HeapStats, ProbeError, ProcessClock,
    ProcessTimes, FAULT_INDEX_ENTRIES,
};

/// Heap whose figures are set by the test.
#[derive(Debug, Default)]
pub struct FixedHeap {
    used: AtomicUsize,
    capacity: AtomicUsize,
}

impl FixedHeap {
    pub fn new(used: usize, capacity: usize) -> Self {
        Self {
            used: AtomicUsize::new(used),
            capacity: AtomicUsize::new(capacity),
        }
    }

    pub fn set_used(&self, used: usize) {
        self.used.store(used, Ordering::Relaxed);
    }

    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.store(capacity, Ordering::Relaxed);
    }
}

impl HeapStats for FixedHeap {
    fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }
}

/// Replays a list of results, then fails with `Unsupported` once exhausted.
#[derive(Debug)]
struct Script<T> {
    results: Mutex<VecDeque<Result<T, ProbeError>>>,
    calls: AtomicUsize,
}

impl<T> Script<T> {
    fn new(results: Vec<Result<T, ProbeError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn next(&self, what: &'static str) -> Result<T, ProbeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.results
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or(Err(ProbeError::Unsupported(what)))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct ScriptedFaults {
    script: Script<FaultCounters>,
}

impl ScriptedFaults {
    pub fn new(results: Vec<Result<FaultCounters, ProbeError>>) -> Self {
        Self { script: Script::new(results) }
    }

    /// Successive successful reads with the given major-fault counts.
    pub fn counts(majflts: &[u32]) -> Self {
        Self::new(
            majflts
                .iter()
                .map(|&majflt| Ok(FaultCounters { majflt, majflt_in_region: 0 }))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

impl FaultStats for ScriptedFaults {
    fn read_fault_stats(&self) -> Result<FaultCounters, ProbeError> {
        self.script.next("get_swap_stats")
    }
}

/// Fault-location source that either fills the buffer from a generator or
/// always fails. Reset always succeeds.
#[derive(Debug)]
pub struct ScriptedDiagnostics {
    fill: Option<fn(usize) -> u64>,
    reads: AtomicUsize,
    resets: AtomicUsize,
}

impl ScriptedDiagnostics {
    pub fn succeeding(fill: fn(usize) -> u64) -> Self {
        Self {
            fill: Some(fill),
            reads: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fill: None,
            reads: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::Relaxed)
    }
}

impl FaultDiagnostics for ScriptedDiagnostics {
    fn read_fault_indices(&self, indices: &mut [u64; FAULT_INDEX_ENTRIES]) -> Result<(), ProbeError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let fill = self.fill.ok_or(ProbeError::Syscall { call: "faulty_page_index", errno: 38 })?;
        for (i, slot) in indices.iter_mut().enumerate() {
            *slot = fill(i);
        }
        Ok(())
    }

    fn reset_sampling(&self) -> Result<(), ProbeError> {
        self.resets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Debug)]
pub struct ScriptedClock {
    script: Script<ProcessTimes>,
}

impl ScriptedClock {
    pub fn new(results: Vec<Result<ProcessTimes, ProbeError>>) -> Self {
        Self { script: Script::new(results) }
    }

    /// Successive valid readings given as (real, user, system) seconds.
    pub fn readings(readings: &[(f64, f64, f64)]) -> Self {
        Self::new(
            readings
                .iter()
                .map(|&(real, user, system)| Ok(ProcessTimes { real, user, system }))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

impl ProcessClock for ScriptedClock {
    fn read_process_times(&self) -> Result<ProcessTimes, ProbeError> {
        self.script.next("process times")
    }
}
