use crate::kernel::probe::{
    FaultDiagnostics, FaultStats, HeapStats, HostProbe, ProcessClock, UnsupportedProbe,
};
use super::sink::{LogSink, TracingSink};

static HOST: HostProbe = HostProbe::new();
static PATCHED_HOST: HostProbe = HostProbe::with_fault_syscalls();
static UNSUPPORTED: UnsupportedProbe = UnsupportedProbe;
static TRACING: TracingSink = TracingSink;

/// The collaborators a tracer reads from and writes to. Cheap to copy;
/// every field is a shared borrow that must outlive the tracers built on it.
#[derive(Clone, Copy)]
pub struct TraceContext<'a> {
    pub heap: &'a dyn HeapStats,
    pub faults: &'a dyn FaultStats,
    pub diagnostics: &'a dyn FaultDiagnostics,
    pub clock: &'a dyn ProcessClock,
    pub sink: &'a dyn LogSink,
}

impl<'a> TraceContext<'a> {
    /// Host process clock, logging through `tracing`. Fault sources are
    /// unsupported until [`with_host_fault_syscalls`](Self::with_host_fault_syscalls).
    pub fn host(heap: &'a dyn HeapStats) -> Self {
        Self {
            heap,
            faults: &UNSUPPORTED,
            diagnostics: &UNSUPPORTED,
            clock: &HOST,
            sink: &TRACING,
        }
    }

    /// Read faults and fault locations through the patched-kernel syscalls.
    /// Never enable this on a mainline kernel.
    pub fn with_host_fault_syscalls(mut self) -> Self {
        self.faults = &PATCHED_HOST;
        self.diagnostics = &PATCHED_HOST;
        self
    }

    /// No fault sources and no process clock.
    pub fn unsupported(heap: &'a dyn HeapStats, sink: &'a dyn LogSink) -> Self {
        Self {
            heap,
            faults: &UNSUPPORTED,
            diagnostics: &UNSUPPORTED,
            clock: &UNSUPPORTED,
            sink,
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn LogSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_faults(mut self, faults: &'a dyn FaultStats) -> Self {
        self.faults = faults;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: &'a dyn FaultDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_clock(mut self, clock: &'a dyn ProcessClock) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for TraceContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceContext").finish_non_exhaustive()
    }
}
