//! Simulated collector used by the `gctrace-demo` binary: a heap that fills
//! on a fixed cadence and pauses that are traced like a real collector's.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::config::{ConfigError, TraceConfig};
use crate::kernel::cause::GcCause;
use crate::kernel::probe::HeapStats;
use crate::kernel::telemetry::metrics::CpuTimeSnapshot;
use crate::kernel::telemetry::{
    CpuTimeRecorder, GcTimer, GcTraceCpuTime, GcTraceTime, GcTraceTimeLogger, TraceContext,
};
use crate::kernel::time::Ticks;

/// Full collection once occupancy reaches this share of capacity (percent).
const FULL_GC_THRESHOLD: usize = 90;
const YOUNG_SURVIVORS: usize = 90;
const FULL_SURVIVORS: usize = 20;

#[derive(Debug)]
pub struct SimulatedHeap {
    used: AtomicUsize,
    capacity: usize,
}

impl SimulatedHeap {
    pub fn new(capacity: usize) -> Self {
        Self { used: AtomicUsize::new(0), capacity }
    }

    pub fn allocate(&self, bytes: usize) {
        let used = self.used.load(Ordering::Relaxed);
        self.used.store(used.saturating_add(bytes).min(self.capacity), Ordering::Relaxed);
    }

    /// Keeps `survivors` percent of the occupied bytes.
    pub fn collect(&self, survivors: usize) {
        let used = self.used.load(Ordering::Relaxed);
        self.used.store(used / 100 * survivors, Ordering::Relaxed);
    }

    fn needs_full_gc(&self) -> bool {
        self.used() * 100 >= self.capacity * FULL_GC_THRESHOLD
    }
}

impl HeapStats for SimulatedHeap {
    fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DemoSummary {
    pub young_pauses: usize,
    pub full_pauses: usize,
    pub longest_pause_ms: f64,
    pub cpu: CpuTimeSnapshot,
}

/// Runs `pauses` simulated collections, one per `period`, each allocating a
/// quarter of the heap first.
pub async fn run_pauses(
    config: &TraceConfig,
    ctx: TraceContext<'_>,
    heap: &SimulatedHeap,
    pauses: usize,
    period: Duration,
) -> Result<DemoSummary, ConfigError> {
    let level = config.level()?;
    let recorder = CpuTimeRecorder::with_capacity(config.max_cpu_samples)
        .set_report_cpu_time(config.report_cpu_time);
    let mut timer = GcTimer::new();
    let mut summary = DemoSummary::default();

    let mut cadence = interval(period);
    cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

    for _ in 0..pauses {
        cadence.tick().await;
        heap.allocate(heap.capacity() / 4);

        let full = heap.needs_full_gc();
        let (title, cause, survivors) = if full {
            summary.full_pauses += 1;
            ("Pause Full", GcCause::AllocationFailure, FULL_SURVIVORS)
        } else {
            summary.young_pauses += 1;
            ("Pause Young", GcCause::G1IncCollectionPause, YOUNG_SURVIVORS)
        };

        timer.register_gc_start(Ticks::now());
        {
            let _cpu = GcTraceCpuTime::new(ctx.clock, ctx.sink, Some(&recorder));
            let logger = GcTraceTimeLogger::new(title, cause, config.log_heap_usage, ctx)
                .with_level(level);
            let _pause = GcTraceTime::new(logger, Some(&mut timer));
            heap.collect(survivors);
        }
        timer.register_gc_end(Ticks::now());

        summary.longest_pause_ms = summary.longest_pause_ms.max(timer.longest_pause_ms());
    }

    summary.cpu = recorder.snapshot();
    Ok(summary)
}
