use super::{
    FaultCounters, FaultDiagnostics, FaultStats, HeapStats, ProbeError, ProcessClock,
    ProcessTimes, FAULT_INDEX_ENTRIES,
};

/// A probe for a platform that has none of the sources. Every read fails
/// and the heap reports as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedProbe;

impl HeapStats for UnsupportedProbe {
    fn used(&self) -> usize {
        0
    }

    fn capacity(&self) -> usize {
        0
    }
}

impl FaultStats for UnsupportedProbe {
    #[inline]
    fn read_fault_stats(&self) -> Result<FaultCounters, ProbeError> {
        Err(ProbeError::Unsupported("get_swap_stats"))
    }
}

impl FaultDiagnostics for UnsupportedProbe {
    #[inline]
    fn read_fault_indices(&self, _indices: &mut [u64; FAULT_INDEX_ENTRIES]) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("faulty_page_index"))
    }

    #[inline]
    fn reset_sampling(&self) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("faulty_page_index"))
    }
}

impl ProcessClock for UnsupportedProbe {
    #[inline]
    fn read_process_times(&self) -> Result<ProcessTimes, ProbeError> {
        Err(ProbeError::Unsupported("process times"))
    }
}
