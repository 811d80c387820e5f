//! Capability interfaces for the runtime and host state the tracers read.
//!
//! Every source the trace layer samples (heap occupancy, fault counters, the
//! fault-location diagnostic, process timers) sits behind a trait so the
//! tracers can run against the host or against deterministic fakes.
//!
//! A source that the platform lacks is an implementation that always fails
//! ([`UnsupportedProbe`]); callers never branch on the target.

pub mod host;
pub mod unsupported;

use serde::{Serialize, Deserialize};
use thiserror::Error;

pub use host::HostProbe;
pub use unsupported::UnsupportedProbe;

/// Entries in one fault-location dump.
pub const FAULT_INDEX_ENTRIES: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
    #[error("{call} failed (errno {errno})")]
    Syscall { call: &'static str, errno: i32 },
    #[error("process clock returned an invalid reading")]
    InvalidTimes,
    #[error("could not allocate a {0}-entry scratch buffer")]
    Allocation(usize),
}

/// Major-fault counters as reported by the swap statistics source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaultCounters {
    pub majflt: u32,
    pub majflt_in_region: u32,
}

/// Process timers in seconds since an arbitrary epoch. Only deltas between
/// two readings are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessTimes {
    pub real: f64,
    pub user: f64,
    pub system: f64,
}

impl ProcessTimes {
    pub fn since(&self, start: &ProcessTimes) -> ProcessTimes {
        ProcessTimes {
            real: self.real - start.real,
            user: self.user - start.user,
            system: self.system - start.system,
        }
    }
}

/// Occupancy and capacity of the managed heap, in bytes.
pub trait HeapStats: Send + Sync {
    fn used(&self) -> usize;
    fn capacity(&self) -> usize;
}

pub trait FaultStats: Send + Sync {
    fn read_fault_stats(&self) -> Result<FaultCounters, ProbeError>;
}

/// Fault-location sampling. `reset_sampling` mutates shared sampling state and
/// must not race another full pause.
pub trait FaultDiagnostics: Send + Sync {
    fn read_fault_indices(&self, indices: &mut [u64; FAULT_INDEX_ENTRIES]) -> Result<(), ProbeError>;
    fn reset_sampling(&self) -> Result<(), ProbeError>;
}

pub trait ProcessClock: Send + Sync {
    fn read_process_times(&self) -> Result<ProcessTimes, ProbeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_times_since() {
        let start = ProcessTimes { real: 10.0, user: 4.0, system: 1.0 };
        let end = ProcessTimes { real: 15.0, user: 6.0, system: 2.0 };
        let d = end.since(&start);
        assert_eq!(d, ProcessTimes { real: 5.0, user: 2.0, system: 1.0 });
    }

    #[test]
    fn test_error_messages() {
        let e = ProbeError::Syscall { call: "get_swap_stats", errno: 38 };
        assert_eq!(e.to_string(), "get_swap_stats failed (errno 38)");
        assert_eq!(
            ProbeError::Unsupported("faulty_page_index").to_string(),
            "faulty_page_index is not supported on this platform"
        );
    }
}
