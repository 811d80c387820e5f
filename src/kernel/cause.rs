use std::fmt;
use serde::{Serialize, Deserialize};

/// Why a collection was triggered. `NoGc` is the "no cause" sentinel and is
/// never printed by the trace logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GcCause {
    JavaLangSystemGc,
    FullGcAlot,
    ScavengeAlot,
    AllocationProfiler,
    JvmtiForceGc,
    GcLocker,
    HeapInspection,
    HeapDump,
    WbYoungGc,
    WbFullGc,
    WbBreakpoint,
    #[default]
    NoGc,
    AllocationFailure,
    CodeCacheGcThreshold,
    CodeCacheGcAggressive,
    MetadataGcThreshold,
    MetadataGcClearSoftRefs,
    OldGenerationExpandedOnLastScavenge,
    OldGenerationTooFullToScavenge,
    AdaptiveSizePolicy,
    G1IncCollectionPause,
    G1CompactionPause,
    G1HumongousAllocation,
    G1PeriodicCollection,
    G1PreventiveCollection,
    DcmdGcRun,
    ZTimer,
    ZWarmup,
    ZAllocationRate,
    ZAllocationStall,
    ZProactive,
    ZHighUsage,
}

impl GcCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            GcCause::JavaLangSystemGc => "System.gc()",
            GcCause::FullGcAlot => "FullGCAlot",
            GcCause::ScavengeAlot => "ScavengeAlot",
            GcCause::AllocationProfiler => "Allocation Profiler",
            GcCause::JvmtiForceGc => "JvmtiEnv ForceGarbageCollection",
            GcCause::GcLocker => "GCLocker Initiated GC",
            GcCause::HeapInspection => "Heap Inspection Initiated GC",
            GcCause::HeapDump => "Heap Dump Initiated GC",
            GcCause::WbYoungGc => "WhiteBox Initiated Young GC",
            GcCause::WbFullGc => "WhiteBox Initiated Full GC",
            GcCause::WbBreakpoint => "WhiteBox Initiated Run to Breakpoint",
            GcCause::NoGc => "No GC",
            GcCause::AllocationFailure => "Allocation Failure",
            GcCause::CodeCacheGcThreshold => "CodeCache GC Threshold",
            GcCause::CodeCacheGcAggressive => "CodeCache GC Aggressive",
            GcCause::MetadataGcThreshold => "Metadata GC Threshold",
            GcCause::MetadataGcClearSoftRefs => "Metadata GC Clear Soft References",
            GcCause::OldGenerationExpandedOnLastScavenge => "Old Generation Expanded On Last Scavenge",
            GcCause::OldGenerationTooFullToScavenge => "Old Generation Too Full To Scavenge",
            GcCause::AdaptiveSizePolicy => "Ergonomics",
            GcCause::G1IncCollectionPause => "G1 Evacuation Pause",
            GcCause::G1CompactionPause => "G1 Compaction Pause",
            GcCause::G1HumongousAllocation => "G1 Humongous Allocation",
            GcCause::G1PeriodicCollection => "G1 Periodic Collection",
            GcCause::G1PreventiveCollection => "G1 Preventive Collection",
            GcCause::DcmdGcRun => "Diagnostic Command",
            GcCause::ZTimer => "Timer",
            GcCause::ZWarmup => "Warmup",
            GcCause::ZAllocationRate => "Allocation Rate",
            GcCause::ZAllocationStall => "Allocation Stall",
            GcCause::ZProactive => "Proactive",
            GcCause::ZHighUsage => "High Usage",
        }
    }

    pub fn is_no_gc(&self) -> bool {
        *self == GcCause::NoGc
    }

    /// Explicitly requested by the application or an operator command.
    pub fn is_user_requested(&self) -> bool {
        matches!(self, GcCause::JavaLangSystemGc | GcCause::DcmdGcRun)
    }

    /// Requested by a serviceability agent (debugger, heap tooling).
    pub fn is_serviceability_requested(&self) -> bool {
        matches!(
            self,
            GcCause::JvmtiForceGc | GcCause::HeapInspection | GcCause::HeapDump
        )
    }
}

impl fmt::Display for GcCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(GcCause::JavaLangSystemGc.to_string(), "System.gc()");
        assert_eq!(GcCause::AdaptiveSizePolicy.to_string(), "Ergonomics");
        assert_eq!(GcCause::G1IncCollectionPause.to_string(), "G1 Evacuation Pause");
    }

    #[test]
    fn test_classification() {
        assert!(GcCause::default().is_no_gc());
        assert!(GcCause::DcmdGcRun.is_user_requested());
        assert!(!GcCause::AllocationFailure.is_user_requested());
        assert!(GcCause::HeapDump.is_serviceability_requested());
    }
}
